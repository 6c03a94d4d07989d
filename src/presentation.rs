//! Chat presentation policy: turns assembly state plus viewport class into a
//! declarative render plan.
//!
//! The controller owns the only mutable rendering state in the crate: a
//! memoization cache keyed by diagram content, so an unchanged diagram is
//! never handed to the renderer twice.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use crate::assembler::{AssemblyStatus, StreamingMessageAssembler};
use crate::config::EnvConfig;
use crate::segment::{DiagramKind, RenderSegment};
use crate::viewport::ViewportClass;

/// A diagram payload was rejected by the rendering backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("diagram render failed: {reason}")]
pub struct RenderFailure {
    pub reason: String,
}

impl RenderFailure {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Opaque handle to a successfully rendered diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderedDiagram {
    pub id: u64,
}

/// Rendering backend seam. Implementations may be expensive; the controller
/// shields them behind content-hash memoization.
pub trait DiagramRenderer {
    fn render(&mut self, kind: DiagramKind, payload: &str) -> Result<RenderedDiagram, RenderFailure>;
}

/// Whether a message send is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendState {
    Idle,
    Sending,
}

/// Composer surface styling, resolved per viewport class and send state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComposerStyle {
    pub action_label: &'static str,
    pub input_class: &'static str,
    pub gap_class: &'static str,
}

/// Every (class, state) pair resolves here; there is no fallthrough default.
#[must_use]
pub fn composer_style(class: ViewportClass, state: SendState) -> ComposerStyle {
    match (class, state) {
        (ViewportClass::Compact, SendState::Idle) => ComposerStyle {
            action_label: "Send",
            input_class: "input-sm",
            gap_class: "gap-2",
        },
        (ViewportClass::Compact, SendState::Sending) => ComposerStyle {
            action_label: "Stop",
            input_class: "input-sm",
            gap_class: "gap-2",
        },
        (ViewportClass::Regular, SendState::Idle) => ComposerStyle {
            action_label: "Send message",
            input_class: "input-lg",
            gap_class: "gap-4",
        },
        (ViewportClass::Regular, SendState::Sending) => ComposerStyle {
            action_label: "Stop generating",
            input_class: "input-lg",
            gap_class: "gap-4",
        },
    }
}

/// Display state of one diagram entry in the plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagramState {
    /// Not rendered yet: fence still open, or the closed fence sits too
    /// close to the live tail of a streaming message.
    Deferred,
    Rendered(RenderedDiagram),
    /// The backend rejected the payload; the entry degrades to code.
    Unavailable { reason: String },
}

/// One displayable unit of the plan, in message order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanEntry {
    Prose {
        markdown: String,
    },
    Code {
        language: String,
        content: String,
    },
    Diagram {
        kind: DiagramKind,
        payload: String,
        state: DiagramState,
    },
}

/// Full declarative description of what the chat surface should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderPlan {
    pub entries: Vec<PlanEntry>,
    pub composer: ComposerStyle,
    pub stream_error: Option<String>,
}

/// Resolves assembly output into render plans under the re-render policy.
pub struct ChatPresentationController {
    renderer: Box<dyn DiagramRenderer>,
    rerender_margin: usize,
    plain_diagrams: bool,
    cache: HashMap<u64, Result<RenderedDiagram, RenderFailure>>,
}

impl ChatPresentationController {
    #[must_use]
    pub fn new(renderer: Box<dyn DiagramRenderer>, config: &EnvConfig) -> Self {
        Self {
            renderer,
            rerender_margin: config.rerender_margin,
            plain_diagrams: config.plain_diagrams,
            cache: HashMap::new(),
        }
    }

    /// Builds the plan for the assembler's current snapshot.
    pub fn plan(
        &mut self,
        assembler: &StreamingMessageAssembler,
        class: ViewportClass,
        send_state: SendState,
    ) -> RenderPlan {
        let streaming = assembler.status() == AssemblyStatus::Streaming;
        let tail = assembler.raw_text().len();

        let mut entries = Vec::new();
        for segment in assembler.current_segments() {
            entries.push(self.plan_segment(segment, streaming, tail));
        }

        RenderPlan {
            entries,
            composer: composer_style(class, send_state),
            stream_error: assembler.last_error().map(str::to_owned),
        }
    }

    fn plan_segment(&mut self, segment: &RenderSegment, streaming: bool, tail: usize) -> PlanEntry {
        match segment {
            RenderSegment::Text { markdown } => PlanEntry::Prose {
                markdown: markdown.clone(),
            },
            RenderSegment::Code { language, content } => PlanEntry::Code {
                language: language.clone(),
                content: content.clone(),
            },
            RenderSegment::DiagramPending { kind, partial } => {
                if self.plain_diagrams {
                    PlanEntry::Code {
                        language: kind.fence_tag().to_owned(),
                        content: partial.clone(),
                    }
                } else {
                    PlanEntry::Diagram {
                        kind: *kind,
                        payload: partial.clone(),
                        state: DiagramState::Deferred,
                    }
                }
            }
            RenderSegment::DiagramReady { kind, payload, end } => {
                if self.plain_diagrams {
                    return PlanEntry::Code {
                        language: kind.fence_tag().to_owned(),
                        content: payload.clone(),
                    };
                }
                // While streaming, only render once the fence has fallen a
                // full margin behind the live tail; a fence near the tail may
                // still be followed by content that re-flows the transcript.
                let eager = !streaming || end + self.rerender_margin < tail;
                let state = if eager {
                    match self.render_memoized(*kind, payload) {
                        Ok(rendered) => DiagramState::Rendered(rendered),
                        Err(failure) => DiagramState::Unavailable {
                            reason: failure.reason,
                        },
                    }
                } else {
                    DiagramState::Deferred
                };
                PlanEntry::Diagram {
                    kind: *kind,
                    payload: payload.clone(),
                    state,
                }
            }
        }
    }

    fn render_memoized(
        &mut self,
        kind: DiagramKind,
        payload: &str,
    ) -> Result<RenderedDiagram, RenderFailure> {
        let key = content_key(kind, payload);
        if !self.cache.contains_key(&key) {
            let result = self.renderer.render(kind, payload);
            self.cache.insert(key, result);
        }
        self.cache[&key].clone()
    }
}

fn content_key(kind: DiagramKind, payload: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    kind.hash(&mut hasher);
    payload.hash(&mut hasher);
    hasher.finish()
}
