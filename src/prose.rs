//! Prose rendering for text segments.
//!
//! Parses a markdown fragment to an mdast tree and flattens it to styled,
//! wrapped display lines. Styling is injected as closures so the crate stays
//! agnostic of the host's color scheme.

use markdown::{mdast, to_mdast, ParseOptions};
use unicode_width::UnicodeWidthChar;

pub type ProseStyleFn = Box<dyn Fn(&str) -> String>;

pub struct ProseTheme {
    pub heading: ProseStyleFn,
    pub bold: ProseStyleFn,
    pub italic: ProseStyleFn,
    pub strikethrough: ProseStyleFn,
    pub code: ProseStyleFn,
    pub quote: ProseStyleFn,
    pub list_bullet: ProseStyleFn,
    pub link: ProseStyleFn,
}

impl Default for ProseTheme {
    /// Identity theme: no escape sequences, useful for tests and plain sinks.
    fn default() -> Self {
        fn plain() -> ProseStyleFn {
            Box::new(|text| text.to_string())
        }
        Self {
            heading: plain(),
            bold: plain(),
            italic: plain(),
            strikethrough: plain(),
            code: plain(),
            quote: plain(),
            list_bullet: plain(),
            link: plain(),
        }
    }
}

/// Renders a markdown fragment to wrapped display lines.
///
/// Unparseable input falls back to its raw lines, wrapped; prose is never
/// dropped.
pub fn render_prose(text: &str, width: usize, theme: &ProseTheme) -> Vec<String> {
    let width = width.max(1);
    let Ok(tree) = to_mdast(text, &ParseOptions::gfm()) else {
        return wrap_text(text, width);
    };

    let mut lines = Vec::new();
    match tree {
        mdast::Node::Root(root) => {
            for (i, node) in root.children.iter().enumerate() {
                if i > 0 {
                    lines.push(String::new());
                }
                render_block(node, width, theme, &mut lines);
            }
        }
        other => render_block(&other, width, theme, &mut lines),
    }

    if lines.is_empty() {
        vec![String::new()]
    } else {
        lines
    }
}

fn render_block(node: &mdast::Node, width: usize, theme: &ProseTheme, lines: &mut Vec<String>) {
    match node {
        mdast::Node::Heading(heading) => {
            let text = render_inline_nodes(&heading.children, theme);
            let marked = format!("{} {}", "#".repeat(heading.depth as usize), text);
            for line in wrap_text(&marked, width) {
                lines.push((theme.heading)(&line));
            }
        }
        mdast::Node::Paragraph(paragraph) => {
            let text = render_inline_nodes(&paragraph.children, theme);
            lines.extend(wrap_text(&text, width));
        }
        mdast::Node::List(list) => {
            lines.extend(render_list(list, width, theme));
        }
        mdast::Node::Blockquote(quote) => {
            let mut inner = Vec::new();
            for (i, child) in quote.children.iter().enumerate() {
                if i > 0 {
                    inner.push(String::new());
                }
                render_block(child, width.saturating_sub(2).max(1), theme, &mut inner);
            }
            for line in inner {
                lines.push(format!("{}{}", (theme.quote)("│ "), line));
            }
        }
        mdast::Node::ThematicBreak(_) => {
            lines.push("─".repeat(width.min(40)));
        }
        mdast::Node::Code(code) => {
            // Prose segments never contain fenced blocks after segmentation,
            // but indented code can still reach here.
            for line in code.value.split('\n') {
                lines.push((theme.code)(line));
            }
        }
        mdast::Node::Html(html) => {
            lines.extend(wrap_text(&html.value, width));
        }
        mdast::Node::Text(text) => {
            lines.extend(wrap_text(&text.value, width));
        }
        other => {
            let text = render_inline_nodes(std::slice::from_ref(other), theme);
            if !text.is_empty() {
                lines.extend(wrap_text(&text, width));
            }
        }
    }
}

fn render_list(list: &mdast::List, width: usize, theme: &ProseTheme) -> Vec<String> {
    let mut lines = Vec::new();
    let start_number = list.start.unwrap_or(1);

    for (i, node) in list.children.iter().enumerate() {
        let mdast::Node::ListItem(item) = node else {
            continue;
        };
        let bullet = if list.ordered {
            format!("{}. ", start_number + i as u32)
        } else {
            "- ".to_string()
        };

        let mut item_lines = Vec::new();
        for child in &item.children {
            match child {
                // Nested lists land in the continuation lines, which pick up
                // this item's indent below.
                mdast::Node::List(nested) => {
                    item_lines.extend(render_list(nested, width.saturating_sub(2), theme));
                }
                mdast::Node::Paragraph(paragraph) => {
                    let text = render_inline_nodes(&paragraph.children, theme);
                    let inner_width = width.saturating_sub(bullet.len()).max(1);
                    item_lines.extend(wrap_text(&text, inner_width));
                }
                other => {
                    render_block(other, width, theme, &mut item_lines);
                }
            }
        }

        if item_lines.is_empty() {
            lines.push((theme.list_bullet)(&bullet));
            continue;
        }
        lines.push(format!("{}{}", (theme.list_bullet)(&bullet), item_lines[0]));
        for line in item_lines.iter().skip(1) {
            lines.push(format!("  {line}"));
        }
    }

    lines
}

fn render_inline_nodes(nodes: &[mdast::Node], theme: &ProseTheme) -> String {
    let mut result = String::new();
    for node in nodes {
        match node {
            mdast::Node::Text(text) => result.push_str(&text.value),
            mdast::Node::Strong(strong) => {
                result.push_str(&(theme.bold)(&render_inline_nodes(&strong.children, theme)));
            }
            mdast::Node::Emphasis(emphasis) => {
                result.push_str(&(theme.italic)(&render_inline_nodes(&emphasis.children, theme)));
            }
            mdast::Node::Delete(delete) => {
                result.push_str(
                    &(theme.strikethrough)(&render_inline_nodes(&delete.children, theme)),
                );
            }
            mdast::Node::InlineCode(code) => {
                result.push_str(&(theme.code)(&code.value));
            }
            mdast::Node::Link(link) => {
                let label = render_inline_nodes(&link.children, theme);
                if label == link.url {
                    result.push_str(&(theme.link)(&label));
                } else {
                    result.push_str(&(theme.link)(&label));
                    result.push_str(&format!(" ({})", link.url));
                }
            }
            mdast::Node::Break(_) => result.push('\n'),
            mdast::Node::Html(html) => result.push_str(&html.value),
            mdast::Node::Image(image) => {
                let alt = if image.alt.is_empty() {
                    image.url.as_str()
                } else {
                    image.alt.as_str()
                };
                result.push_str(alt);
            }
            mdast::Node::Paragraph(paragraph) => {
                result.push_str(&render_inline_nodes(&paragraph.children, theme));
            }
            _ => {}
        }
    }
    result
}

/// Display width of a string, skipping CSI escape sequences.
#[must_use]
pub fn visible_width(input: &str) -> usize {
    let mut width = 0;
    let mut chars = input.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\x1b' {
            if chars.peek() == Some(&'[') {
                chars.next();
                for follow in chars.by_ref() {
                    if follow.is_ascii_alphabetic() {
                        break;
                    }
                }
            }
            continue;
        }
        width += UnicodeWidthChar::width(ch).unwrap_or(0);
    }
    width
}

/// Word-wraps text to the given display width, preserving existing newlines.
/// Words longer than the width are emitted on their own line unbroken.
#[must_use]
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for input_line in text.split('\n') {
        if input_line.trim().is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current = String::new();
        let mut current_width = 0;
        for word in input_line.split_whitespace() {
            let word_width = visible_width(word);
            if current.is_empty() {
                current.push_str(word);
                current_width = word_width;
            } else if current_width + 1 + word_width <= width {
                current.push(' ');
                current.push_str(word);
                current_width += 1 + word_width;
            } else {
                lines.push(current);
                current = word.to_string();
                current_width = word_width;
            }
        }
        lines.push(current);
    }

    if lines.is_empty() {
        vec![String::new()]
    } else {
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::{render_prose, visible_width, wrap_text, ProseTheme};

    #[test]
    fn paragraph_wraps_at_word_boundaries() {
        let lines = render_prose("one two three four", 9, &ProseTheme::default());
        assert_eq!(lines, vec!["one two", "three", "four"]);
    }

    #[test]
    fn heading_and_paragraph_are_separated_by_blank_line() {
        let lines = render_prose("# Title\n\nbody", 40, &ProseTheme::default());
        assert_eq!(lines, vec!["# Title", "", "body"]);
    }

    #[test]
    fn list_items_get_bullets_and_nested_indent() {
        let lines = render_prose("- first\n- second\n  - nested", 40, &ProseTheme::default());
        assert_eq!(lines, vec!["- first", "- second", "  - nested"]);
    }

    #[test]
    fn blockquote_gets_border_prefix() {
        let lines = render_prose("> quoted words", 40, &ProseTheme::default());
        assert_eq!(lines, vec!["│ quoted words"]);
    }

    #[test]
    fn inline_styles_pass_through_theme() {
        let mut theme = ProseTheme::default();
        theme.bold = Box::new(|text| format!("<b>{text}</b>"));
        theme.code = Box::new(|text| format!("<c>{text}</c>"));
        let lines = render_prose("plain **strong** `ticked`", 80, &theme);
        assert_eq!(lines, vec!["plain <b>strong</b> <c>ticked</c>"]);
    }

    #[test]
    fn link_with_distinct_label_shows_url() {
        let lines = render_prose("see [docs](https://example.com)", 80, &ProseTheme::default());
        assert_eq!(lines, vec!["see docs (https://example.com)"]);
    }

    #[test]
    fn visible_width_skips_csi_sequences() {
        assert_eq!(visible_width("hi\x1b[31m!!\x1b[0m"), 4);
        assert_eq!(visible_width("宽"), 2);
    }

    #[test]
    fn long_word_is_not_broken() {
        let lines = wrap_text("supercalifragilistic", 5);
        assert_eq!(lines, vec!["supercalifragilistic"]);
    }
}
