//! Streaming chat transcript engine.
//!
//! Invariant: the render model is a pure function of the accumulated message
//! buffer — every fragment append recomputes segments from scratch, so the
//! same final text yields the same segments regardless of how it was chunked.
//!
//! # Public API Overview
//! - Accumulate fragments into a message with [`StreamingMessageAssembler`].
//! - Scan fenced blocks and classify payloads via [`scanner`] and [`gate`].
//! - Track the display breakpoint with [`ViewportClassController`].
//! - Turn assembly state into a declarative [`RenderPlan`] with
//!   [`ChatPresentationController`].
//! - Render prose segments to wrapped styled lines via [`render_prose`].

pub mod assembler;
pub mod config;
pub mod gate;
pub mod presentation;
pub mod prose;
pub mod scanner;
pub mod segment;
pub mod viewport;

/// Message assembly state machine.
pub use crate::assembler::{AssemblyStatus, StreamingMessageAssembler};

/// Environment configuration.
pub use crate::config::EnvConfig;

/// Derived message-model types.
pub use crate::segment::{
    diagram_kind_for_tag, BlockKind, DiagramKind, FenceBlock, RenderSegment,
};

/// Presentation policy types.
pub use crate::presentation::{
    composer_style, ChatPresentationController, ComposerStyle, DiagramRenderer, DiagramState,
    PlanEntry, RenderFailure, RenderPlan, RenderedDiagram, SendState,
};

/// Prose rendering helpers.
pub use crate::prose::{render_prose, visible_width, wrap_text, ProseTheme};

/// Viewport classification.
pub use crate::viewport::{
    SharedViewportEnvironment, SubscriptionId, ViewportClass, ViewportClassController,
    ViewportEnvironment, ViewportListener, ViewportRegistration,
};
