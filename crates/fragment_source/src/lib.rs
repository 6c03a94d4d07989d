//! Minimal source-agnostic contract for streaming one assistant message.
//!
//! This crate intentionally defines only the fragment delivery lifecycle. It
//! excludes transport details, retry policy, and multi-message session
//! concerns.

/// Identifier for one streamed message.
pub type MessageId = u64;

/// Lifecycle event emitted while a message streams in.
///
/// A well-behaved source emits zero or more `Fragment` events followed by
/// exactly one terminal event. Fragments carry arbitrary slices of the final
/// text; no boundary guarantees are made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FragmentEvent {
    Fragment { message_id: MessageId, text: String },
    Completed { message_id: MessageId },
    Failed { message_id: MessageId, error: String },
}

impl FragmentEvent {
    /// Returns the message id this event belongs to.
    #[must_use]
    pub fn message_id(&self) -> MessageId {
        match self {
            Self::Fragment { message_id, .. }
            | Self::Completed { message_id }
            | Self::Failed { message_id, .. } => *message_id,
        }
    }

    /// Returns whether this event ends the stream.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed { .. } | Self::Failed { .. })
    }
}

/// Input required to start streaming one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamRequest {
    pub message_id: MessageId,
    pub prompt: String,
}

/// Contract implemented by message sources.
pub trait FragmentSource {
    /// Streams one message, delivering events through `emit` in order.
    ///
    /// Returns an error only for failures to start the stream; failures
    /// mid-stream are reported through a terminal `Failed` event.
    fn stream(
        &self,
        request: &StreamRequest,
        emit: &mut dyn FnMut(FragmentEvent),
    ) -> Result<(), String>;
}
