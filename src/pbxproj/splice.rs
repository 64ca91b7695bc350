//! Multi-point insertion into the original manifest text.
//!
//! Every insertion is planned as an `(offset, text)` pair against the text as
//! it was read, then all of them are applied in a single pass ordered by
//! offset. No planned offset is ever invalidated by another insertion, so the
//! order steps are planned in only matters for edits sharing an offset, which
//! keep their planning order.

use super::anchor::{line_indent, AggregateMatch};

/// A single planned insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Splice {
    pub offset: usize,
    pub text: String,
}

/// Insertions planned against one immutable document.
#[derive(Debug, Clone, Default)]
pub struct SpliceSet {
    edits: Vec<Splice>,
}

impl SpliceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Insert raw text at `offset`.
    pub fn insert(&mut self, offset: usize, text: impl Into<String>) {
        let text = text.into();
        if !text.is_empty() {
            self.edits.push(Splice { offset, text });
        }
    }

    /// Insert whole lines at `offset`, which should be the start of a line
    /// (typically a section's end marker line).
    pub fn insert_lines(&mut self, offset: usize, lines: &[String]) {
        self.insert(offset, terminated(lines));
    }

    /// Append `lines` to the listing matched by `aggregate`, right after its
    /// last item (or the opening `(`) and before the closing `)`. Blank lines
    /// between the last item and `)` stay after the new lines.
    pub fn insert_within_aggregate(
        &mut self,
        document: &str,
        aggregate: &AggregateMatch,
        lines: &[String],
    ) {
        if lines.is_empty() {
            return;
        }

        let captured = aggregate.captured(document);
        let kept = captured.trim_end().len();
        let tail = &captured[kept..];

        match tail.find('\n') {
            // `)` sits on a later line: start on the line after the last item.
            Some(nl) => {
                let offset = aggregate.list_start + kept + nl + 1;
                self.insert_lines(offset, lines);
            }
            // `)` shares a line with the items or the opener.
            None => {
                let offset = aggregate.list_start + kept;
                let indent = line_indent(document, aggregate.list_start);
                let text = format!("\n{}{}", terminated(lines), indent);
                self.insert(offset, text);
            }
        }
    }

    /// Produce the patched document.
    pub fn apply(mut self, original: &str) -> String {
        let crlf = original.contains("\r\n");
        self.edits.sort_by_key(|edit| edit.offset);

        let added: usize = self.edits.iter().map(|edit| edit.text.len()).sum();
        let mut out = String::with_capacity(original.len() + added * 2);
        let mut cursor = 0;
        for edit in &self.edits {
            let offset = edit.offset.min(original.len());
            out.push_str(&original[cursor..offset]);
            if crlf {
                out.push_str(&edit.text.replace("\r\n", "\n").replace('\n', "\r\n"));
            } else {
                out.push_str(&edit.text);
            }
            cursor = offset;
        }
        out.push_str(&original[cursor..]);
        out
    }
}

fn terminated(lines: &[String]) -> String {
    let mut text = String::new();
    for line in lines {
        text.push_str(line);
        text.push('\n');
    }
    text
}
