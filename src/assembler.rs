//! Per-message streaming assembly.
//!
//! One assembler owns one message buffer. Every fragment triggers a full
//! re-scan of the accumulated text, so detection is correct regardless of
//! how the fragment source chunks the stream, including one byte at a time.

use crate::gate;
use crate::scanner;
use crate::segment::{BlockKind, RenderSegment};

/// Lifecycle of one in-flight assistant message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyStatus {
    Streaming,
    Completed,
    Failed,
}

/// Owns the mutable text buffer for one assistant message and derives the
/// current render segments from it.
///
/// Terminal states are immutable: a new message requires a new assembler.
#[derive(Debug, Default)]
pub struct StreamingMessageAssembler {
    raw: String,
    status: AssemblyStatus,
    last_error: Option<String>,
    segments: Vec<RenderSegment>,
}

impl Default for AssemblyStatus {
    fn default() -> Self {
        Self::Streaming
    }
}

impl StreamingMessageAssembler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one fragment and recomputes the segment sequence.
    ///
    /// Silent no-op after termination: fragments can arrive after a
    /// cancellation race, and discarding them is safer than resurrecting a
    /// terminated buffer.
    pub fn append_fragment(&mut self, fragment: &str) {
        if self.status != AssemblyStatus::Streaming {
            return;
        }
        self.raw.push_str(fragment);
        self.segments = derive_segments(&self.raw, false);
    }

    /// Marks the stream as finished and freezes the final segments. Any
    /// still-open diagram fence will never close, so it finalizes as code.
    pub fn complete(&mut self) {
        if self.status != AssemblyStatus::Streaming {
            return;
        }
        self.status = AssemblyStatus::Completed;
        self.segments = derive_segments(&self.raw, true);
    }

    /// Marks the stream as failed, retaining partial output so it stays
    /// visible alongside the error indicator.
    pub fn fail(&mut self, reason: impl Into<String>) {
        if self.status != AssemblyStatus::Streaming {
            return;
        }
        self.status = AssemblyStatus::Failed;
        self.last_error = Some(reason.into());
        self.segments = derive_segments(&self.raw, true);
    }

    /// Read-only snapshot of the current segments; safe in any state.
    #[must_use]
    pub fn current_segments(&self) -> &[RenderSegment] {
        &self.segments
    }

    #[must_use]
    pub fn status(&self) -> AssemblyStatus {
        self.status
    }

    #[must_use]
    pub fn raw_text(&self) -> &str {
        &self.raw
    }

    /// Present only when the stream failed.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

/// Recomputes the whole segment sequence from the buffer.
///
/// `finalized` converts still-open diagram fences to code: once the stream
/// has terminated they can never close, and leaving them pending forever
/// would hide their content behind an inert placeholder.
fn derive_segments(raw: &str, finalized: bool) -> Vec<RenderSegment> {
    let mut segments = Vec::new();
    let mut cursor = 0;

    for block in scanner::scan(raw) {
        push_text(&mut segments, &raw[cursor..block.start]);

        let payload = block.payload(raw);
        let open_diagram = !block.complete && matches!(block.kind, BlockKind::Diagram(_));
        if finalized && open_diagram {
            segments.push(RenderSegment::Code {
                language: block.tag.clone(),
                content: payload.to_string(),
            });
        } else {
            segments.push(gate::classify(&block, payload));
        }

        cursor = block.end.unwrap_or(raw.len());
    }

    push_text(&mut segments, &raw[cursor..]);
    segments
}

fn push_text(segments: &mut Vec<RenderSegment>, slice: &str) {
    let trimmed = slice.trim();
    if !trimmed.is_empty() {
        segments.push(RenderSegment::Text {
            markdown: trimmed.to_string(),
        });
    }
}
