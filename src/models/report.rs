use serde::{Deserialize, Serialize};

/// Outcome counters of a patch run, for reporting only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchReport {
    pub references_added: usize,
    pub build_files_added: usize,
    pub phase_entries_added: usize,
    pub groups_created: usize,
    /// Children appended to groups that already existed.
    pub group_children_added: usize,
    pub skipped: Vec<SkippedFile>,
    pub anchor_misses: Vec<AnchorMiss>,
}

impl PatchReport {
    /// Whether the run changed the document at all.
    pub fn is_noop(&self) -> bool {
        self.references_added == 0
            && self.build_files_added == 0
            && self.phase_entries_added == 0
            && self.groups_created == 0
            && self.group_children_added == 0
    }
}

/// A requested file that never reached synthesis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFile {
    pub name: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Named in the plan's skip list.
    SkipList,
    /// Not found under the source root.
    Missing,
    /// Already referenced by the manifest (only with `skip_existing`).
    AlreadyPresent,
}

/// An anchor the engine could not find; the matching insertion was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "anchor", rename_all = "snake_case")]
pub enum AnchorMiss {
    /// `/* End PBXFileReference section */`
    References,
    /// `/* End PBXBuildFile section */`
    BuildFiles,
    /// The sources build phase or its `files` listing.
    SourcesPhase,
    /// The `children` listing of an existing group.
    GroupChildren { group: String },
    /// The parent listing a new group would be linked into.
    ParentGroup { group: String },
    /// Neither the anchor node nor the `PBXGroup` section end was found.
    GroupInsertionPoint { group: String },
}

impl std::fmt::Display for AnchorMiss {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::References => write!(f, "PBXFileReference section end"),
            Self::BuildFiles => write!(f, "PBXBuildFile section end"),
            Self::SourcesPhase => write!(f, "sources build phase files"),
            Self::GroupChildren { group } => write!(f, "children of group '{}'", group),
            Self::ParentGroup { group } => write!(f, "parent listing for new group '{}'", group),
            Self::GroupInsertionPoint { group } => {
                write!(f, "insertion point for new group '{}'", group)
            }
        }
    }
}
