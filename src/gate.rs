//! Diagram render gating.
//!
//! Decides, per fenced block, whether its payload is eligible for diagram
//! rendering now or must fall back to literal code. The structural checks
//! here are cheap syntactic preconditions only; full validation belongs to
//! the external renderer.

use crate::segment::{BlockKind, DiagramKind, FenceBlock, RenderSegment};

/// Maps one scanned block to its render segment.
///
/// Policy: a complete, recognized, structurally sound diagram payload is
/// ready; a complete but malformed payload degrades to code (content is
/// never dropped); an open diagram fence is pending; everything else is
/// code.
#[must_use]
pub fn classify(block: &FenceBlock, payload: &str) -> RenderSegment {
    match block.kind {
        BlockKind::Diagram(kind) if block.complete => {
            if structurally_sound(kind, payload) {
                RenderSegment::DiagramReady {
                    kind,
                    payload: payload.to_string(),
                    end: block.end.unwrap_or(0),
                }
            } else {
                RenderSegment::Code {
                    language: block.tag.clone(),
                    content: payload.to_string(),
                }
            }
        }
        BlockKind::Diagram(kind) => RenderSegment::DiagramPending {
            kind,
            partial: payload.to_string(),
        },
        BlockKind::PlainCode | BlockKind::Unrecognized => RenderSegment::Code {
            language: block.tag.clone(),
            content: payload.to_string(),
        },
    }
}

/// Cheap syntactic precondition for handing a payload to the external
/// renderer.
#[must_use]
pub fn structurally_sound(kind: DiagramKind, payload: &str) -> bool {
    match kind {
        DiagramKind::Flowchart => flowchart_sound(payload),
        DiagramKind::ChartSpec => chart_spec_sound(payload),
    }
}

/// Non-empty payload with balanced node delimiters. `%%` comment lines are
/// ignored, matching flowchart comment syntax.
fn flowchart_sound(payload: &str) -> bool {
    if payload.trim().is_empty() {
        return false;
    }

    let mut square = 0i64;
    let mut brace = 0i64;
    let mut paren = 0i64;
    for line in payload.lines() {
        if line.trim_start().starts_with("%%") {
            continue;
        }
        for ch in line.chars() {
            match ch {
                '[' => square += 1,
                ']' => square -= 1,
                '{' => brace += 1,
                '}' => brace -= 1,
                '(' => paren += 1,
                ')' => paren -= 1,
                _ => {}
            }
            if square < 0 || brace < 0 || paren < 0 {
                return false;
            }
        }
    }
    square == 0 && brace == 0 && paren == 0
}

/// Chart specs are declarative JSON; anything that is not a JSON object is
/// not worth handing to the renderer.
fn chart_spec_sound(payload: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(payload)
        .map(|value| value.is_object())
        .unwrap_or(false)
}
