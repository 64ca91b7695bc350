//! Locating splice points in manifest text.
//!
//! Nothing here parses the whole manifest. Each function finds one landmark
//! (a section end marker, an object keyed by identifier, a listing inside that
//! object) and returns byte offsets into the text it was given. `None` means
//! the landmark is absent; callers skip the insertion that needed it.

use regex::Regex;

use super::synth::unquote_value;
use super::Identifier;
use crate::models::ChildRef;

pub const FILE_REFERENCE_SECTION: &str = "PBXFileReference";
pub const BUILD_FILE_SECTION: &str = "PBXBuildFile";
pub const GROUP_SECTION: &str = "PBXGroup";
pub const SOURCES_PHASE_ISA: &str = "PBXSourcesBuildPhase";

/// Pattern of an object head: `ID /* comment */ = {`.
const OBJECT_HEAD: &str = r"(?m)^[ \t]*([0-9A-Fa-f]{24})(?:[ \t]*/\*[ \t]*(.*?)[ \t]*\*/)?[ \t]*=[ \t]*\{";

pub fn section_end_marker(section: &str) -> String {
    format!("/* End {} section */", section)
}

/// Offset of the start of the line holding the section's end marker.
///
/// Inserting there appends to the section while staying before the marker.
pub fn find_section_end(document: &str, section: &str) -> Option<usize> {
    let marker_at = document.find(&section_end_marker(section))?;
    Some(line_start(document, marker_at))
}

/// Byte span of one object in the `objects` dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectSpan {
    /// Start of the line holding the object head.
    pub start: usize,
    /// Offset of the opening `{`.
    pub open: usize,
    /// One past the closing `}` (and its `;` when present).
    pub end: usize,
}

impl ObjectSpan {
    /// Text between the braces.
    pub fn body<'a>(&self, document: &'a str) -> &'a str {
        let close = document[..self.end].rfind('}').unwrap_or(self.open);
        &document[self.open + 1..close.max(self.open + 1)]
    }

    /// Start of the line after the object, where a sibling object would go.
    pub fn next_line(&self, document: &str) -> usize {
        match document[self.end..].find('\n') {
            Some(nl) if document[self.end..self.end + nl].trim().is_empty() => self.end + nl + 1,
            _ => self.end,
        }
    }
}

/// Find the object keyed by `id`.
pub fn find_object(document: &str, id: &Identifier) -> Option<ObjectSpan> {
    let pattern = format!(
        r"(?m)^[ \t]*{}(?:[ \t]*/\*.*?\*/)?[ \t]*=[ \t]*\{{",
        regex::escape(id.as_str())
    );
    let head = Regex::new(&pattern).ok()?.find(document)?;
    let open = head.end() - 1;
    let close = find_closing(document, open)?;
    Some(ObjectSpan {
        start: line_start(document, head.start()),
        open,
        end: skip_semicolon(document, close + 1),
    })
}

/// Identifier of the first object whose `isa` is `isa`.
pub fn find_object_with_isa(document: &str, isa: &str) -> Option<Identifier> {
    let pattern = format!(
        r"(?m)^[ \t]*([0-9A-Fa-f]{{24}})(?:[ \t]*/\*.*?\*/)?[ \t]*=[ \t]*\{{\s*isa\s*=\s*{}\s*;",
        regex::escape(isa)
    );
    let captures = Regex::new(&pattern).ok()?.captures(document)?;
    captures.get(1).map(|m| Identifier::from_matched(m.as_str()))
}

/// The root group named by the project object's `mainGroup`.
pub fn find_main_group(document: &str) -> Option<Identifier> {
    let re = Regex::new(r"\bmainGroup\s*=\s*([0-9A-Fa-f]{24})\b").ok()?;
    let captures = re.captures(document)?;
    captures.get(1).map(|m| Identifier::from_matched(m.as_str()))
}

/// An object found by scanning heads: identifier, head comment and span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectHead {
    pub id: Identifier,
    pub comment: Option<String>,
    pub span: ObjectSpan,
}

/// Every object in the document, in document order.
pub fn object_heads(document: &str) -> Vec<ObjectHead> {
    let Ok(re) = Regex::new(OBJECT_HEAD) else {
        return Vec::new();
    };
    re.captures_iter(document)
        .filter_map(|captures| {
            let whole = captures.get(0)?;
            let open = whole.end() - 1;
            let close = find_closing(document, open)?;
            Some(ObjectHead {
                id: Identifier::from_matched(captures.get(1)?.as_str()),
                comment: captures.get(2).map(|m| m.as_str().to_string()),
                span: ObjectSpan {
                    start: line_start(document, whole.start()),
                    open,
                    end: skip_semicolon(document, close + 1),
                },
            })
        })
        .collect()
}

/// Read a scalar attribute (`key = value;`) from the top level of an object.
pub fn object_attribute(document: &str, span: &ObjectSpan, key: &str) -> Option<String> {
    let body = span.body(document);
    let pattern = format!(
        r#"(?:^|[\s;{{]){}\s*=\s*("(?:[^"\\]|\\.)*"|[^;\s"]+)\s*;"#,
        regex::escape(key)
    );
    let re = Regex::new(&pattern).ok()?;
    let mut offset = 0;
    while let Some(captures) = re.captures(&body[offset..]) {
        let whole = captures.get(0)?;
        let start = offset + whole.start();
        // Skip matches that sit inside a nested listing or dictionary.
        if depth_at(body, start) == 0 {
            return captures.get(1).map(|m| unquote_value(m.as_str()));
        }
        offset += whole.end();
    }
    None
}

/// A parenthesized listing inside an object, e.g. a group's `children`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateMatch {
    /// The owning object.
    pub object: ObjectSpan,
    /// One past the opening `(`.
    pub list_start: usize,
    /// Offset of the closing `)`.
    pub list_end: usize,
}

impl AggregateMatch {
    /// The listing's items as written, between the parentheses.
    pub fn captured<'a>(&self, document: &'a str) -> &'a str {
        &document[self.list_start..self.list_end]
    }

    /// Parse the listing's `ID /* label */,` items.
    pub fn items(&self, document: &str) -> Vec<ChildRef> {
        parse_items(self.captured(document))
    }
}

/// Find the `field = ( ... );` listing of the object keyed by `owner`.
pub fn find_named_block(document: &str, owner: &Identifier, field: &str) -> Option<AggregateMatch> {
    let object = find_object(document, owner)?;
    find_listing_in(document, &object, field)
}

/// Find the `field = ( ... );` listing at the top level of `object`.
pub fn find_listing_in(document: &str, object: &ObjectSpan, field: &str) -> Option<AggregateMatch> {
    let body_start = object.open + 1;
    let body = object.body(document);
    let pattern = format!(r"(?:^|[\s;{{]){}\s*=\s*\(", regex::escape(field));
    let re = Regex::new(&pattern).ok()?;

    let mut offset = 0;
    while let Some(found) = re.find(&body[offset..]) {
        let at = offset + found.start();
        if depth_at(body, at) == 0 {
            let open = body_start + offset + found.end() - 1;
            let close = find_closing(document, open)?;
            return Some(AggregateMatch {
                object: *object,
                list_start: open + 1,
                list_end: close,
            });
        }
        offset += found.end();
    }
    None
}

/// Parse `ID /* label */,` items from a listing's text.
pub fn parse_items(listing: &str) -> Vec<ChildRef> {
    let Ok(re) = Regex::new(r"([0-9A-Fa-f]{24})(?:\s*/\*\s*(.*?)\s*\*/)?\s*,") else {
        return Vec::new();
    };
    re.captures_iter(listing)
        .filter_map(|captures| {
            Some(ChildRef {
                id: Identifier::from_matched(captures.get(1)?.as_str()),
                label: captures.get(2).map(|m| m.as_str().to_string()),
            })
        })
        .collect()
}

/// Offset of the start of the line containing `offset`.
pub(crate) fn line_start(document: &str, offset: usize) -> usize {
    document[..offset].rfind('\n').map_or(0, |nl| nl + 1)
}

/// Leading whitespace of the line containing `offset`.
pub(crate) fn line_indent(document: &str, offset: usize) -> &str {
    let start = line_start(document, offset);
    let line = &document[start..];
    let width = line.len() - line.trim_start_matches([' ', '\t']).len();
    &line[..width]
}

fn skip_semicolon(document: &str, offset: usize) -> usize {
    let rest = &document[offset..];
    let trimmed = rest.trim_start_matches([' ', '\t']);
    if trimmed.starts_with(';') {
        offset + (rest.len() - trimmed.len()) + 1
    } else {
        offset
    }
}

/// Offset of the delimiter closing the one at `open`, skipping comments and
/// quoted strings.
fn find_closing(document: &str, open: usize) -> Option<usize> {
    let bytes = document.as_bytes();
    let (opener, closer) = match bytes.get(open)? {
        b'{' => (b'{', b'}'),
        b'(' => (b'(', b')'),
        _ => return None,
    };

    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        match bytes[i] {
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = document[i + 2..].find("*/").map(|at| i + 2 + at + 1)?;
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                i = document[i..].find('\n').map_or(bytes.len(), |at| i + at);
            }
            b'"' => {
                i += 1;
                while i < bytes.len() && bytes[i] != b'"' {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
            }
            b if b == opener => depth += 1,
            b if b == closer => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Nesting depth of `offset` within `text`, counting braces and parentheses
/// outside comments and strings.
fn depth_at(text: &str, offset: usize) -> usize {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;
    while i < offset.min(bytes.len()) {
        match bytes[i] {
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                match text[i + 2..].find("*/") {
                    Some(at) => i += 2 + at + 1,
                    None => return depth,
                }
            }
            b'"' => {
                i += 1;
                while i < bytes.len() && bytes[i] != b'"' {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
            }
            b'{' | b'(' => depth += 1,
            b'}' | b')' => depth = depth.saturating_sub(1),
            _ => {}
        }
        i += 1;
    }
    depth
}
