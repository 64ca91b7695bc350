//! Text fragments for a new source file.

use crate::models::LogicalFile;

use super::Identifier;

/// Name of the build phase new build files are listed under.
pub const SOURCES_PHASE: &str = "Sources";

/// Indentation of objects inside the `objects` dictionary.
pub(crate) const OBJECT_INDENT: &str = "\t\t";
/// Indentation of items inside an object's listing.
pub(crate) const ITEM_INDENT: &str = "\t\t\t\t";

/// Everything the manifest needs to know about one new file.
///
/// Texts are single lines without a terminator; the splicer adds the
/// document's own line ending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedEntity {
    pub reference_id: Identifier,
    /// `PBXFileReference` entry.
    pub reference_text: String,
    pub build_id: Identifier,
    /// `PBXBuildFile` entry pointing back at the reference.
    pub build_text: String,
    /// Line for the sources phase `files` listing.
    pub phase_line: String,
    /// Line for the owning group's `children` listing.
    pub group_line: String,
}

/// Build the entries for `file`. The name must be non-empty.
pub fn synthesize(file: &LogicalFile) -> SynthesizedEntity {
    let reference_id = Identifier::generate(&file.reference_key());
    let build_id = Identifier::generate(&file.build_key());
    let name = &file.name;
    let comment = comment_text(name);

    let reference_text = format!(
        "{OBJECT_INDENT}{reference_id} /* {comment} */ = {{isa = PBXFileReference; lastKnownFileType = {}; path = {}; sourceTree = \"<group>\"; }};",
        file.kind().last_known_file_type(),
        quote_value(name),
    );
    let build_text = format!(
        "{OBJECT_INDENT}{build_id} /* {comment} in {SOURCES_PHASE} */ = {{isa = PBXBuildFile; fileRef = {reference_id} /* {comment} */; }};"
    );
    let phase_line = format!("{ITEM_INDENT}{build_id} /* {comment} in {SOURCES_PHASE} */,");
    let group_line = listing_line(&reference_id, name);

    SynthesizedEntity {
        reference_id,
        reference_text,
        build_id,
        build_text,
        phase_line,
        group_line,
    }
}

/// `ID /* label */,` at listing indentation.
pub fn listing_line(id: &Identifier, label: &str) -> String {
    format!("{ITEM_INDENT}{id} /* {} */,", comment_text(label))
}

/// Quote a value unless Xcode would write it bare.
pub fn quote_value(value: &str) -> String {
    let bare = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '/' | ':' | '.' | '-'));
    if bare {
        return value.to_string();
    }

    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// Undo [`quote_value`].
pub fn unquote_value(value: &str) -> String {
    let value = value.trim();
    let Some(inner) = value
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    else {
        return value.to_string();
    };

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some(other) => out.push(other),
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Comments end at the first `*/`, so a name must not close one early.
fn comment_text(label: &str) -> String {
    label.replace("*/", "*\\/")
}
