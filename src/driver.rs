//! File selection and manifest I/O around the engine.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Plan;
use crate::error::{PatchError, Result};
use crate::models::{LogicalFile, PatchReport, SkipReason, SkippedFile};
use crate::pbxproj;

/// Options for one driver run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Compute the patch without writing the manifest back.
    pub dry_run: bool,
}

/// What a driver run produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub project: PathBuf,
    pub document: String,
    pub report: PatchReport,
    pub written: bool,
}

/// Split the plan's files into those to hand to the engine and those skipped
/// by name or because they are missing under `source_root`.
pub fn select_files(plan: &Plan, source_root: &Path) -> (Vec<LogicalFile>, Vec<SkippedFile>) {
    let mut selected = Vec::new();
    let mut skipped = Vec::new();

    for file in &plan.files {
        if plan.skip.contains(&file.name) {
            tracing::info!("Skipping {} (in skip list)", file.name);
            skipped.push(SkippedFile {
                name: file.name.clone(),
                reason: SkipReason::SkipList,
            });
            continue;
        }

        let on_disk = source_root.join(&file.relative_path);
        if !on_disk.exists() {
            tracing::warn!("File not found: {}", on_disk.display());
            skipped.push(SkippedFile {
                name: file.name.clone(),
                reason: SkipReason::Missing,
            });
            continue;
        }

        tracing::debug!("Selected {} for group {}", file.name, file.group_name);
        selected.push(file.clone());
    }

    (selected, skipped)
}

/// Patch the plan's manifest in place (or not, for a dry run).
pub fn run(plan: &Plan, options: &RunOptions) -> Result<RunOutcome> {
    let project = plan.project.clone().ok_or(PatchError::MissingProject)?;
    let source_root = plan
        .source_root
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));

    let original = fs::read_to_string(&project).map_err(|source| PatchError::Read {
        path: project.clone(),
        source,
    })?;

    let (files, skipped) = select_files(plan, &source_root);
    let outcome = pbxproj::patch(&original, &files, &plan.engine_options());

    let mut report = outcome.report;
    let mut all_skipped = skipped;
    all_skipped.append(&mut report.skipped);
    report.skipped = all_skipped;

    let written = !options.dry_run && outcome.document != original;
    if written {
        fs::write(&project, &outcome.document).map_err(|source| PatchError::Write {
            path: project.clone(),
            source,
        })?;
        tracing::info!("Updated {}", project.display());
    } else if options.dry_run {
        tracing::info!("Dry run; {} left untouched", project.display());
    }

    Ok(RunOutcome {
        project,
        document: outcome.document,
        report,
        written,
    })
}
