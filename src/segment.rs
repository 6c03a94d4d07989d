//! Derived message-model types: fence blocks and render segments.
//!
//! Everything here is recomputed wholesale from the message buffer on each
//! mutation; nothing is patched in place.

use once_cell::sync::Lazy;

/// A registered category of fenced content eligible for visual rendering
/// once its fence has closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagramKind {
    /// Flowchart descriptions (mermaid syntax).
    Flowchart,
    /// Declarative chart specifications (vega-lite JSON).
    ChartSpec,
}

impl DiagramKind {
    /// Returns a stable human-readable label for this kind.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Flowchart => "flowchart",
            Self::ChartSpec => "chart-spec",
        }
    }

    /// Returns the canonical fence tag this kind is registered under.
    #[must_use]
    pub fn fence_tag(self) -> &'static str {
        match self {
            Self::Flowchart => "mermaid",
            Self::ChartSpec => "vega-lite",
        }
    }
}

/// Fixed registry mapping lowercased fence info tags to diagram kinds.
static DIAGRAM_REGISTRY: Lazy<Vec<(&'static str, DiagramKind)>> = Lazy::new(|| {
    vec![
        ("mermaid", DiagramKind::Flowchart),
        ("vega-lite", DiagramKind::ChartSpec),
    ]
});

/// Looks up a diagram kind for an already-lowercased fence tag.
#[must_use]
pub fn diagram_kind_for_tag(tag: &str) -> Option<DiagramKind> {
    DIAGRAM_REGISTRY
        .iter()
        .find(|(registered, _)| *registered == tag)
        .map(|(_, kind)| *kind)
}

/// Classification of a fenced block by its info tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// Tag matched the diagram registry.
    Diagram(DiagramKind),
    /// Empty tag: ordinary fenced code.
    PlainCode,
    /// Non-empty tag with no registry match; rendered like plain code.
    Unrecognized,
}

/// One fenced block found in a buffer snapshot.
///
/// Offsets are byte offsets into the scanned text. Blocks never overlap and
/// are ordered by appearance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenceBlock {
    /// Offset of the first byte of the opening fence line.
    pub start: usize,
    /// Offset one past the closing fence marker; `None` while open.
    pub end: Option<usize>,
    /// Trimmed fence info string as written (e.g. "mermaid", "python", "").
    pub tag: String,
    pub kind: BlockKind,
    /// A closing fence has been observed at or before the buffer end.
    pub complete: bool,
    /// Offset of the first payload byte (start of the line after the
    /// opening fence).
    pub payload_start: usize,
    /// Offset one past the last payload byte.
    pub payload_end: usize,
}

impl FenceBlock {
    /// Returns the block's payload slice from the text it was scanned from.
    #[must_use]
    pub fn payload<'a>(&self, text: &'a str) -> &'a str {
        &text[self.payload_start..self.payload_end]
    }
}

/// Externally visible display unit derived from one buffer snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderSegment {
    /// Markdown prose between fences, trimmed of surrounding blank lines.
    Text { markdown: String },
    /// Fenced non-diagram content, or a diagram fallback that must stay
    /// readable as literal code.
    Code { language: String, content: String },
    /// Diagram fence still open; must be displayed inert, never drawn.
    DiagramPending { kind: DiagramKind, partial: String },
    /// Closed, recognized, structurally sound diagram payload. `end` is the
    /// block's end offset in the buffer, used by the re-render policy.
    DiagramReady {
        kind: DiagramKind,
        payload: String,
        end: usize,
    },
}
