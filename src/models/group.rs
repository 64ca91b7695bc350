use serde::{Deserialize, Serialize};

use crate::pbxproj::Identifier;

/// A `PBXGroup` object as it appears in a manifest.
///
/// Groups form the navigator tree Xcode shows. The root group is referenced by
/// the project object's `mainGroup`; every other group must be reachable from it
/// through `children` for Xcode to display it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupNode {
    pub id: Identifier,
    /// Display name: the `name` attribute, else `path`, else the head comment.
    pub name: Option<String>,
    pub path: Option<String>,
    pub children: Vec<ChildRef>,
}

impl GroupNode {
    /// Whether this group answers to `segment`, by name or by path.
    pub fn matches(&self, segment: &str) -> bool {
        self.name.as_deref() == Some(segment) || self.path.as_deref() == Some(segment)
    }

    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.path.as_deref())
            .unwrap_or(self.id.as_str())
    }

    /// Whether a child carries `label` as its inline comment.
    pub fn has_child_labelled(&self, label: &str) -> bool {
        self.children
            .iter()
            .any(|child| child.label.as_deref() == Some(label))
    }
}

/// One entry of a `children = ( ... );` listing: `ID /* label */,`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildRef {
    pub id: Identifier,
    pub label: Option<String>,
}
