//! The manifest mutation engine.
//!
//! [`patch`] takes the manifest text and the files to add and returns the
//! patched text plus a [`PatchReport`]. It never performs I/O and never fails:
//! a missing anchor skips the insertions that needed it and is recorded in the
//! report, everything else still goes in.
//!
//! Insertions are planned against the original text in a fixed order
//! (references, build files, sources phase, existing group children, new group
//! nodes, parent linkage) and applied in one pass by [`SpliceSet`].

pub mod anchor;
mod check;
mod groups;
mod ident;
mod splice;
mod synth;
mod tree_render;

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

pub use check::*;
pub use groups::*;
pub use ident::*;
pub use splice::*;
pub use synth::*;
pub use tree_render::*;

use crate::models::{AnchorMiss, LogicalFile, PatchReport, SkipReason, SkippedFile};
use anchor::{
    find_main_group, find_named_block, find_object, find_object_with_isa, find_section_end,
    BUILD_FILE_SECTION, FILE_REFERENCE_SECTION, GROUP_SECTION, SOURCES_PHASE_ISA,
};

/// Known object identifiers to anchor on. Unset anchors are discovered from
/// the document where possible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Anchors {
    /// The `PBXSourcesBuildPhase` new build files join. Defaults to the first
    /// sources phase in the document.
    pub sources_phase: Option<Identifier>,
    /// The root group. Defaults to the project's `mainGroup`.
    pub main_group: Option<Identifier>,
    /// Object new groups are inserted after. Defaults to the end of the
    /// `PBXGroup` section.
    pub group_anchor: Option<Identifier>,
    /// Logical group name to existing group, bypassing name resolution.
    pub groups: BTreeMap<String, Identifier>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineOptions {
    pub anchors: Anchors,
    /// Skip files the document already references instead of adding them again.
    pub skip_existing: bool,
}

/// Result of one engine run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchOutcome {
    pub document: String,
    pub report: PatchReport,
}

/// Files of one logical group awaiting group membership.
struct GroupBatch<'a> {
    name: &'a str,
    children: Vec<String>,
}

/// Add `files` to `document`.
///
/// Files must already be filtered by the driver (skip list, existence on disk)
/// and have non-empty names.
pub fn patch(document: &str, files: &[LogicalFile], options: &EngineOptions) -> PatchOutcome {
    let mut report = PatchReport::default();
    let index = GroupIndex::scan(document);
    let main_group = options
        .anchors
        .main_group
        .clone()
        .or_else(|| find_main_group(document));

    let mut references = Vec::new();
    let mut build_files = Vec::new();
    let mut phase_lines = Vec::new();
    let mut batches: Vec<GroupBatch> = Vec::new();
    let mut accepted: HashSet<Identifier> = HashSet::new();

    for file in files {
        let entity = synthesize(file);

        if options.skip_existing
            && (accepted.contains(&entity.reference_id)
                || already_present(document, &index, main_group.as_ref(), options, file, &entity))
        {
            tracing::info!("Skipping {} (already in project)", file.name);
            report.skipped.push(SkippedFile {
                name: file.name.clone(),
                reason: SkipReason::AlreadyPresent,
            });
            continue;
        }
        accepted.insert(entity.reference_id.clone());

        tracing::debug!(
            "Adding {} to {} as {}",
            file.name,
            file.group_name,
            entity.reference_id
        );

        references.push(entity.reference_text);
        if file.kind().compiles() {
            build_files.push(entity.build_text);
            phase_lines.push(entity.phase_line);
        }
        match batches.iter_mut().find(|batch| batch.name == file.group_name) {
            Some(batch) => batch.children.push(entity.group_line),
            None => batches.push(GroupBatch {
                name: &file.group_name,
                children: vec![entity.group_line],
            }),
        }
    }

    let mut splices = SpliceSet::new();

    if !references.is_empty() {
        match find_section_end(document, FILE_REFERENCE_SECTION) {
            Some(offset) => {
                splices.insert_lines(offset, &references);
                report.references_added = references.len();
            }
            None => miss(&mut report, AnchorMiss::References),
        }
    }

    if !build_files.is_empty() {
        match find_section_end(document, BUILD_FILE_SECTION) {
            Some(offset) => {
                splices.insert_lines(offset, &build_files);
                report.build_files_added = build_files.len();
            }
            None => miss(&mut report, AnchorMiss::BuildFiles),
        }
    }

    if !phase_lines.is_empty() {
        let phase = options
            .anchors
            .sources_phase
            .clone()
            .or_else(|| find_object_with_isa(document, SOURCES_PHASE_ISA));
        match phase.and_then(|id| find_named_block(document, &id, "files")) {
            Some(aggregate) => {
                splices.insert_within_aggregate(document, &aggregate, &phase_lines);
                report.phase_entries_added = phase_lines.len();
            }
            None => miss(&mut report, AnchorMiss::SourcesPhase),
        }
    }

    plan_groups(
        document,
        &index,
        main_group.as_ref(),
        options,
        &batches,
        &mut splices,
        &mut report,
    );

    if splices.is_empty() {
        tracing::debug!("Nothing to insert");
    }
    let document = splices.apply(document);

    tracing::info!(
        "Added {} file references, {} build files, {} source phase entries, {} new groups",
        report.references_added,
        report.build_files_added,
        report.phase_entries_added,
        report.groups_created
    );

    PatchOutcome { document, report }
}

/// A group node synthesized by this run.
struct NewGroup {
    name: String,
    id: Identifier,
    path: String,
    children: Vec<String>,
}

/// Resolve a logical group name: plan anchors first, then a group an earlier
/// run created under the same name, then the tree under the root group.
fn resolve_group(
    index: &GroupIndex,
    main_group: Option<&Identifier>,
    anchors: &Anchors,
    group_name: &str,
) -> Option<GroupResolution> {
    if let Some(id) = anchors.groups.get(group_name) {
        return Some(GroupResolution::Existing(id.clone()));
    }
    let generated = new_group_id(group_name);
    if index.contains(&generated) {
        return Some(GroupResolution::Existing(generated));
    }
    main_group.map(|root| index.resolve(root, group_name))
}

/// Plan group membership: children of existing groups first, then new group
/// nodes, then their linkage into parents.
fn plan_groups(
    document: &str,
    index: &GroupIndex,
    main_group: Option<&Identifier>,
    options: &EngineOptions,
    batches: &[GroupBatch],
    splices: &mut SpliceSet,
    report: &mut PatchReport,
) {
    let mut missing = Vec::new();

    for batch in batches {
        match resolve_group(index, main_group, &options.anchors, batch.name) {
            Some(GroupResolution::Existing(id)) => {
                match find_named_block(document, &id, "children") {
                    Some(aggregate) => {
                        splices.insert_within_aggregate(document, &aggregate, &batch.children);
                        report.group_children_added += batch.children.len();
                    }
                    None => miss(
                        report,
                        AnchorMiss::GroupChildren {
                            group: batch.name.to_string(),
                        },
                    ),
                }
            }
            Some(GroupResolution::Missing { parent, path }) => missing.push((batch, parent, path)),
            None => miss(
                report,
                AnchorMiss::ParentGroup {
                    group: batch.name.to_string(),
                },
            ),
        }
    }

    if missing.is_empty() {
        return;
    }

    let insertion_point = options
        .anchors
        .group_anchor
        .as_ref()
        .and_then(|anchor| find_object(document, anchor))
        .map(|span| span.next_line(document))
        .or_else(|| find_section_end(document, GROUP_SECTION));
    let Some(offset) = insertion_point else {
        for (batch, _, _) in missing {
            miss(
                report,
                AnchorMiss::GroupInsertionPoint {
                    group: batch.name.to_string(),
                },
            );
        }
        return;
    };

    // Shallow names first, so `Views/Auth` can nest under a `Views` made here.
    missing.sort_by_key(|(batch, _, _)| batch.name.split('/').filter(|s| !s.is_empty()).count());

    let mut created: Vec<NewGroup> = Vec::new();
    let mut links = Vec::new();
    for (batch, parent, path) in missing {
        let id = new_group_id(batch.name);

        let enclosing = created
            .iter()
            .enumerate()
            .filter_map(|(i, group)| {
                let rest = batch.name.strip_prefix(group.name.as_str())?.strip_prefix('/')?;
                Some((i, group.name.len(), rest.to_string()))
            })
            .max_by_key(|&(_, depth, _)| depth);

        let path = match enclosing {
            Some((i, _, rest)) => {
                tracing::info!("Creating group {} ({}) under {}", batch.name, id, created[i].id);
                created[i].children.push(listing_line(&id, &rest));
                rest
            }
            None => {
                // A group nobody lists is invisible in Xcode, so no parent, no group.
                let Some(parent_children) = find_named_block(document, &parent, "children") else {
                    miss(
                        report,
                        AnchorMiss::ParentGroup {
                            group: batch.name.to_string(),
                        },
                    );
                    continue;
                };
                tracing::info!("Creating group {} ({}) under {}", batch.name, id, parent);
                links.push((parent_children, listing_line(&id, &path)));
                path
            }
        };

        created.push(NewGroup {
            name: batch.name.to_string(),
            id,
            path,
            children: batch.children.clone(),
        });
        report.groups_created += 1;
    }

    for group in &created {
        splices.insert_lines(offset, &group_block(&group.id, &group.path, &group.children));
    }
    for (aggregate, line) in links {
        splices.insert_within_aggregate(document, &aggregate, &[line]);
    }
}

fn already_present(
    document: &str,
    index: &GroupIndex,
    main_group: Option<&Identifier>,
    options: &EngineOptions,
    file: &LogicalFile,
    entity: &SynthesizedEntity,
) -> bool {
    if document.contains(entity.reference_id.as_str()) {
        return true;
    }

    let group = match resolve_group(index, main_group, &options.anchors, &file.group_name) {
        Some(GroupResolution::Existing(id)) => Some(id),
        _ => None,
    };

    group
        .and_then(|id| index.get(&id))
        .is_some_and(|group| group.has_child_labelled(&file.name))
}

fn miss(report: &mut PatchReport, anchor: AnchorMiss) {
    tracing::warn!("Anchor not found: {}; skipping", anchor);
    report.anchor_misses.push(anchor);
}
