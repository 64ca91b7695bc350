//! Reference integrity checks over a whole manifest.

use std::collections::HashSet;

use regex::Regex;
use serde::Serialize;

use super::anchor::{find_main_group, object_heads, ObjectHead};
use super::{GroupIndex, Identifier};

/// Broken references found in a manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    /// The root group, when the document names one.
    pub main_group: Option<Identifier>,
    /// Groups the root group cannot reach.
    pub unreachable_groups: Vec<Identifier>,
    /// `(group, child)` pairs whose child names no object.
    pub dangling_children: Vec<(Identifier, Identifier)>,
    /// `fileRef` values of build files that name no object.
    pub dangling_file_refs: Vec<Identifier>,
    /// Identifiers keying more than one object, once each.
    pub duplicate_ids: Vec<Identifier>,
}

impl CheckReport {
    pub fn is_clean(&self) -> bool {
        self.main_group.is_some()
            && self.unreachable_groups.is_empty()
            && self.dangling_children.is_empty()
            && self.dangling_file_refs.is_empty()
            && self.duplicate_ids.is_empty()
    }
}

/// Verify reachability and reference resolution for `document`.
pub fn check(document: &str) -> CheckReport {
    let heads = object_heads(document);
    let objects: HashSet<Identifier> = heads.iter().map(|head| head.id.clone()).collect();
    let duplicate_ids = duplicate_ids(&heads);
    let index = GroupIndex::scan(document);
    let main_group = find_main_group(document);

    let unreachable_groups = match &main_group {
        Some(root) => index
            .unreachable_from(root)
            .into_iter()
            .map(|group| group.id.clone())
            .collect(),
        None => Vec::new(),
    };

    let dangling_children = index
        .iter()
        .flat_map(|group| {
            group
                .children
                .iter()
                .filter(|child| !objects.contains(&child.id))
                .map(|child| (group.id.clone(), child.id.clone()))
        })
        .collect();

    let dangling_file_refs = Regex::new(r"\bfileRef\s*=\s*([0-9A-Fa-f]{24})\b")
        .map(|re| {
            re.captures_iter(document)
                .filter_map(|captures| captures.get(1))
                .map(|m| Identifier::from_matched(m.as_str()))
                .filter(|id| !objects.contains(id))
                .collect()
        })
        .unwrap_or_default();

    CheckReport {
        main_group,
        unreachable_groups,
        dangling_children,
        dangling_file_refs,
        duplicate_ids,
    }
}

/// Identifiers of top-level objects that occur more than once. Heads nested in
/// another object (`TargetAttributes` keyed by target) are not objects of their
/// own and are ignored.
fn duplicate_ids(heads: &[ObjectHead]) -> Vec<Identifier> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    let mut enclosing_end = 0;
    for head in heads {
        if head.span.start < enclosing_end {
            continue;
        }
        enclosing_end = head.span.end;
        if !seen.insert(&head.id) && !duplicates.contains(&head.id) {
            duplicates.push(head.id.clone());
        }
    }
    duplicates
}
