//! Fence scanning over a growing message buffer.
//!
//! `scan` is a pure function: re-scanning identical text always yields
//! identical block boundaries, which is what lets the assembler recompute
//! from scratch on every fragment without ever reinterpreting an
//! already-closed block as open.

use crate::segment::{diagram_kind_for_tag, BlockKind, FenceBlock};

const MAX_FENCE_INDENT: usize = 3;
const MIN_FENCE_LEN: usize = 3;

struct FenceLine<'a> {
    marker: char,
    len: usize,
    info: &'a str,
}

struct OpenFence {
    marker: char,
    len: usize,
    tag: String,
    start: usize,
    payload_start: usize,
}

/// Finds all fenced blocks in `text`, in order of appearance.
///
/// A fence line is at most three spaces of indent, three or more identical
/// fence characters (backtick or tilde), then an optional info string. The
/// next fence line with the same marker, at least the opening length, and no
/// info string closes the block. Fence-looking lines that do not satisfy the
/// closing rule are literal content of the open block; nesting is not
/// supported, matching common markdown fence semantics.
#[must_use]
pub fn scan(text: &str) -> Vec<FenceBlock> {
    let mut blocks = Vec::new();
    let mut open: Option<OpenFence> = None;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();

        let content = line.strip_suffix('\n').unwrap_or(line);
        let content = content.strip_suffix('\r').unwrap_or(content);

        match open.as_ref() {
            None => {
                if let Some(fence) = parse_fence_line(content) {
                    open = Some(OpenFence {
                        marker: fence.marker,
                        len: fence.len,
                        tag: fence.info.to_string(),
                        start: line_start,
                        payload_start: offset,
                    });
                }
            }
            Some(opening) => {
                let closes = parse_fence_line(content).is_some_and(|fence| {
                    fence.marker == opening.marker
                        && fence.len >= opening.len
                        && fence.info.is_empty()
                });
                if closes {
                    let opening = open.take().expect("open fence present");
                    let payload_end = strip_line_break(text, opening.payload_start, line_start);
                    blocks.push(finish_block(
                        opening,
                        Some(line_start + content.len()),
                        payload_end,
                        true,
                    ));
                }
            }
        }
    }

    if let Some(opening) = open {
        let payload_start = opening.payload_start.min(text.len());
        let mut block = finish_block(opening, None, text.len(), false);
        block.payload_start = payload_start;
        blocks.push(block);
    }

    blocks
}

fn finish_block(
    opening: OpenFence,
    end: Option<usize>,
    payload_end: usize,
    complete: bool,
) -> FenceBlock {
    let kind = classify_tag(&opening.tag);
    FenceBlock {
        start: opening.start,
        end,
        tag: opening.tag,
        kind,
        complete,
        payload_start: opening.payload_start,
        payload_end,
    }
}

fn parse_fence_line(line: &str) -> Option<FenceLine<'_>> {
    let trimmed = line.trim_start_matches(' ');
    if line.len() - trimmed.len() > MAX_FENCE_INDENT {
        return None;
    }
    let marker = trimmed.chars().next()?;
    if marker != '`' && marker != '~' {
        return None;
    }
    let len = trimmed.chars().take_while(|ch| *ch == marker).count();
    if len < MIN_FENCE_LEN {
        return None;
    }
    // Fence markers are ASCII, so byte indexing by count is safe.
    Some(FenceLine {
        marker,
        len,
        info: trimmed[len..].trim(),
    })
}

fn classify_tag(tag: &str) -> BlockKind {
    let first = tag.split_whitespace().next().unwrap_or("");
    if first.is_empty() {
        return BlockKind::PlainCode;
    }
    match diagram_kind_for_tag(&first.to_lowercase()) {
        Some(kind) => BlockKind::Diagram(kind),
        None => BlockKind::Unrecognized,
    }
}

/// Drops the line break that terminated the last payload line, so payloads
/// carry exactly the text between the fences.
fn strip_line_break(text: &str, payload_start: usize, mut payload_end: usize) -> usize {
    if payload_end > payload_start && text.as_bytes()[payload_end - 1] == b'\n' {
        payload_end -= 1;
        if payload_end > payload_start && text.as_bytes()[payload_end - 1] == b'\r' {
            payload_end -= 1;
        }
    }
    payload_end
}
