//! Atlassian Document Format builder.
//!
//! Converts the small markdown subset produced by the drafting prompts into
//! an ADF `doc` node:
//!
//! | input | node |
//! |---|---|
//! | `#` .. `######` + space | `heading` with `level` |
//! | `- ` / `* ` | `bulletList` item |
//! | `1. ` | `orderedList` item |
//! | `**bold**` | text with `strong` mark |
//! | `` `code` `` | text with `code` mark |
//! | blank line | skipped |
//! | anything else | `paragraph` |
//!
//! Consecutive list items of the same kind are grouped into one list.

use serde_json::{Value, json};

#[derive(Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Bullet,
    Ordered,
}

impl ListKind {
    const fn node_type(self) -> &'static str {
        match self {
            Self::Bullet => "bulletList",
            Self::Ordered => "orderedList",
        }
    }
}

enum Line<'a> {
    Heading(u8, &'a str),
    Item(ListKind, &'a str),
    Paragraph(&'a str),
}

fn classify(line: &str) -> Line<'_> {
    let hashes = line.bytes().take_while(|&b| b == b'#').count();
    if (1..=6).contains(&hashes)
        && let Some(text) = line[hashes..].strip_prefix(' ')
    {
        #[allow(clippy::cast_possible_truncation)]
        return Line::Heading(hashes as u8, text.trim());
    }

    if let Some(text) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
        return Line::Item(ListKind::Bullet, text.trim());
    }

    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits > 0
        && let Some(text) = line[digits..].strip_prefix(". ")
    {
        return Line::Item(ListKind::Ordered, text.trim());
    }

    Line::Paragraph(line)
}

/// Builds an ADF document from markdown-like text.
#[must_use]
pub fn markdown_to_adf(text: &str) -> Value {
    let mut content: Vec<Value> = Vec::new();
    let mut list: Option<(ListKind, Vec<Value>)> = None;

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let parsed = classify(line);

        if let Some((kind, items)) = list.take() {
            match parsed {
                Line::Item(next, _) if next == kind => list = Some((kind, items)),
                _ => content.push(list_node(kind, items)),
            }
        }

        match parsed {
            Line::Heading(level, text) => content.push(json!({
                "type": "heading",
                "attrs": {"level": level},
                "content": inline(text),
            })),
            Line::Item(kind, text) => {
                let item = json!({
                    "type": "listItem",
                    "content": [paragraph(text)],
                });
                match list.as_mut() {
                    Some((_, items)) => items.push(item),
                    None => list = Some((kind, vec![item])),
                }
            }
            Line::Paragraph(text) => content.push(paragraph(text)),
        }
    }

    if let Some((kind, items)) = list {
        content.push(list_node(kind, items));
    }

    json!({
        "type": "doc",
        "version": 1,
        "content": content,
    })
}

fn list_node(kind: ListKind, items: Vec<Value>) -> Value {
    json!({"type": kind.node_type(), "content": items})
}

fn paragraph(text: &str) -> Value {
    json!({"type": "paragraph", "content": inline(text)})
}

/// Splits a line into text nodes, applying `strong` and `code` marks.
fn inline(text: &str) -> Vec<Value> {
    let mut nodes = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        let bold = rest.find("**");
        let code = rest.find('`');

        let (start, marker, mark) = match (bold, code) {
            (Some(b), Some(c)) if c < b => (c, "`", "code"),
            (Some(b), _) => (b, "**", "strong"),
            (None, Some(c)) => (c, "`", "code"),
            (None, None) => break,
        };

        let after = &rest[start + marker.len()..];
        let Some(end) = after.find(marker) else {
            break;
        };
        if end == 0 {
            push_text(&mut nodes, &rest[..start + marker.len() * 2], None);
            rest = &after[marker.len()..];
            continue;
        }

        push_text(&mut nodes, &rest[..start], None);
        push_text(&mut nodes, &after[..end], Some(mark));
        rest = &after[end + marker.len()..];
    }

    push_text(&mut nodes, rest, None);
    nodes
}

fn push_text(nodes: &mut Vec<Value>, text: &str, mark: Option<&str>) {
    if text.is_empty() {
        return;
    }
    let node = match mark {
        Some(mark) => json!({"type": "text", "text": text, "marks": [{"type": mark}]}),
        None => json!({"type": "text", "text": text}),
    };
    nodes.push(node);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn types(doc: &Value) -> Vec<&str> {
        doc["content"]
            .as_array()
            .map(|nodes| nodes.iter().filter_map(|n| n["type"].as_str()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_document_envelope() {
        let doc = markdown_to_adf("hello");
        assert_eq!(doc["type"], "doc");
        assert_eq!(doc["version"], 1);
        assert_eq!(
            doc["content"][0],
            json!({"type": "paragraph", "content": [{"type": "text", "text": "hello"}]})
        );
    }

    #[test]
    fn test_headings() {
        let doc = markdown_to_adf("# One\n### Three\n###### Six\n####### Seven\n#NoSpace");
        assert_eq!(
            types(&doc),
            vec!["heading", "heading", "heading", "paragraph", "paragraph"]
        );
        assert_eq!(doc["content"][0]["attrs"]["level"], 1);
        assert_eq!(doc["content"][1]["attrs"]["level"], 3);
        assert_eq!(doc["content"][2]["attrs"]["level"], 6);
        assert_eq!(doc["content"][1]["content"][0]["text"], "Three");
    }

    #[test]
    fn test_lists_are_grouped() {
        let doc = markdown_to_adf("- a\n* b\n\n1. one\n2. two\ntail");
        assert_eq!(types(&doc), vec!["bulletList", "orderedList", "paragraph"]);

        let bullets = doc["content"][0]["content"].as_array().map(Vec::len);
        assert_eq!(bullets, Some(2));
        assert_eq!(
            doc["content"][1]["content"][1]["content"][0]["content"][0]["text"],
            "two"
        );
    }

    #[test]
    fn test_blank_lines_skipped() {
        let doc = markdown_to_adf("\n\nfirst\n   \nsecond\n");
        assert_eq!(types(&doc), vec!["paragraph", "paragraph"]);
    }

    #[test]
    fn test_inline_marks() {
        let nodes = inline("Use **care** with `rm -rf` now");
        assert_eq!(
            Value::Array(nodes),
            json!([
                {"type": "text", "text": "Use "},
                {"type": "text", "text": "care", "marks": [{"type": "strong"}]},
                {"type": "text", "text": " with "},
                {"type": "text", "text": "rm -rf", "marks": [{"type": "code"}]},
                {"type": "text", "text": " now"}
            ])
        );
    }

    #[test]
    fn test_unclosed_marker_is_literal() {
        let nodes = inline("2 ** 3 is eight");
        assert_eq!(
            Value::Array(nodes),
            json!([{"type": "text", "text": "2 ** 3 is eight"}])
        );
    }

    #[test]
    fn test_bold_heading_content() {
        let doc = markdown_to_adf("## **Current situation**");
        assert_eq!(
            doc["content"][0]["content"][0]["marks"][0]["type"],
            "strong"
        );
    }

    #[test]
    fn test_empty_input() {
        let doc = markdown_to_adf("");
        assert_eq!(doc["content"], json!([]));
    }
}
