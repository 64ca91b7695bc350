//! Patch plans: which files go into which manifest.
//!
//! A plan is a JSON file:
//!
//! ```json
//! {
//!   "project": "KPOPVOTE.xcodeproj/project.pbxproj",
//!   "source_root": "KPOPVOTE",
//!   "skip": ["AuthViewModel.swift"],
//!   "anchors": { "main_group": "4FF2C7D42EC4102800186296" },
//!   "files": [{ "name": "Bias.swift", "group": "Models", "path": "Models/Bias.swift" }]
//! }
//! ```
//!
//! Relative `project` and `source_root` paths resolve against the directory
//! holding the plan.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PatchError, Result};
use crate::models::LogicalFile;
use crate::pbxproj::{Anchors, EngineOptions};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Plan {
    /// The `project.pbxproj` to patch.
    pub project: Option<PathBuf>,
    /// Directory `files[].path` is relative to. Defaults to the plan's directory.
    pub source_root: Option<PathBuf>,
    /// File names never added, whatever `files` says.
    pub skip: BTreeSet<String>,
    /// Skip files the manifest already references.
    pub skip_existing: bool,
    pub anchors: Anchors,
    pub files: Vec<LogicalFile>,
}

impl Plan {
    /// Load and validate a plan, resolving its relative paths.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| PatchError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut plan: Plan = serde_json::from_str(&content).map_err(|source| PatchError::Plan {
            path: path.to_path_buf(),
            source,
        })?;
        plan.validate()?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        plan.project = plan.project.map(|project| base.join(project));
        plan.source_root = Some(match plan.source_root.take() {
            Some(root) => base.join(root),
            None => base.to_path_buf(),
        });

        tracing::debug!(
            "Loaded plan {} with {} files",
            path.display(),
            plan.files.len()
        );
        Ok(plan)
    }

    /// Reject entries the engine cannot synthesize.
    pub fn validate(&self) -> Result<()> {
        for (index, file) in self.files.iter().enumerate() {
            let reason = if file.name.trim().is_empty() {
                "name is empty"
            } else if file.group_name.trim().is_empty() {
                "group is empty"
            } else if file.relative_path.trim().is_empty() {
                "path is empty"
            } else if file.name.contains('/') {
                "name must be a file name, not a path"
            } else {
                continue;
            };
            return Err(PatchError::InvalidFile {
                index,
                reason: reason.to_string(),
            });
        }
        Ok(())
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            anchors: self.anchors.clone(),
            skip_existing: self.skip_existing,
        }
    }
}
