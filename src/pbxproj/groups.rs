//! Group nodes: scanning existing ones and synthesizing missing ones.

use std::collections::{HashMap, HashSet};

use crate::models::{group_key, GroupNode};

use super::anchor::{find_listing_in, object_attribute, object_heads, ObjectHead};
use super::synth::{quote_value, OBJECT_INDENT};
use super::Identifier;

/// All `PBXGroup` objects of a document, in document order.
#[derive(Debug, Clone, Default)]
pub struct GroupIndex {
    groups: Vec<GroupNode>,
    by_id: HashMap<Identifier, usize>,
}

/// Where a logical group name landed in the existing tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupResolution {
    /// The group exists.
    Existing(Identifier),
    /// The group is missing. `parent` is the deepest existing ancestor and
    /// `path` the part of the name below it.
    Missing { parent: Identifier, path: String },
}

impl GroupIndex {
    pub fn scan(document: &str) -> Self {
        let mut index = Self::default();
        for head in object_heads(document) {
            let ObjectHead { id, comment, span } = head;
            if !span.body(document).contains("PBXGroup") {
                continue;
            }
            if object_attribute(document, &span, "isa").as_deref() != Some("PBXGroup") {
                continue;
            }
            let children = find_listing_in(document, &span, "children")
                .map(|aggregate| aggregate.items(document))
                .unwrap_or_default();
            let path = object_attribute(document, &span, "path");
            let name = object_attribute(document, &span, "name")
                .or_else(|| path.clone())
                .or(comment);

            index.by_id.insert(id.clone(), index.groups.len());
            index.groups.push(GroupNode {
                id,
                name,
                path,
                children,
            });
        }
        index
    }

    pub fn iter(&self) -> impl Iterator<Item = &GroupNode> {
        self.groups.iter()
    }

    pub fn get(&self, id: &Identifier) -> Option<&GroupNode> {
        self.by_id.get(id).map(|&i| &self.groups[i])
    }

    pub fn contains(&self, id: &Identifier) -> bool {
        self.by_id.contains_key(id)
    }

    /// Resolve a `/`-separated logical group name against the tree under `root`.
    ///
    /// The walk matches child group names and paths, trying the longest run of
    /// segments first so a group created with a multi-segment path (`Views/Auth`)
    /// is found again. When the walk stops early, a group elsewhere whose name
    /// or path equals the whole logical name is accepted if it is the only one.
    pub fn resolve(&self, root: &Identifier, group_name: &str) -> GroupResolution {
        let segments: Vec<&str> = group_name
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();

        let mut current = root.clone();
        let mut matched = 0;
        while matched < segments.len() {
            let step = (matched + 1..=segments.len()).rev().find_map(|end| {
                self.child_group(&current, &segments[matched..end].join("/"))
                    .map(|child| (child.id.clone(), end))
            });
            match step {
                Some((child, end)) => {
                    current = child;
                    matched = end;
                }
                None => break,
            }
        }

        if matched == segments.len() {
            return GroupResolution::Existing(current);
        }

        let mut anywhere = self.groups.iter().filter(|group| group.matches(group_name));
        if let (Some(only), None) = (anywhere.next(), anywhere.next()) {
            return GroupResolution::Existing(only.id.clone());
        }

        GroupResolution::Missing {
            parent: current,
            path: segments[matched..].join("/"),
        }
    }

    fn child_group(&self, parent: &Identifier, segment: &str) -> Option<&GroupNode> {
        self.get(parent)?
            .children
            .iter()
            .filter_map(|child| self.get(&child.id))
            .find(|group| group.matches(segment))
    }

    /// Groups not reachable from `root` through `children`.
    pub fn unreachable_from(&self, root: &Identifier) -> Vec<&GroupNode> {
        let mut seen = HashSet::new();
        let mut stack = vec![root.clone()];
        while let Some(id) = stack.pop() {
            if !seen.insert(id.clone()) {
                continue;
            }
            if let Some(group) = self.get(&id) {
                stack.extend(group.children.iter().map(|child| child.id.clone()));
            }
        }
        self.groups
            .iter()
            .filter(|group| !seen.contains(&group.id))
            .collect()
    }
}

/// Identifier of the group synthesized for a logical group name.
pub fn new_group_id(group_name: &str) -> Identifier {
    Identifier::generate(&group_key(group_name))
}

/// Text of a new `PBXGroup` object, one line per element, unterminated.
pub fn group_block(id: &Identifier, path: &str, child_lines: &[String]) -> Vec<String> {
    let comment = path.replace("*/", "*\\/");
    let mut lines = Vec::with_capacity(child_lines.len() + 7);
    lines.push(format!("{OBJECT_INDENT}{id} /* {comment} */ = {{"));
    lines.push(format!("{OBJECT_INDENT}\tisa = PBXGroup;"));
    lines.push(format!("{OBJECT_INDENT}\tchildren = ("));
    lines.extend(child_lines.iter().cloned());
    lines.push(format!("{OBJECT_INDENT}\t);"));
    lines.push(format!("{OBJECT_INDENT}\tpath = {};", quote_value(path)));
    lines.push(format!("{OBJECT_INDENT}\tsourceTree = \"<group>\";"));
    lines.push(format!("{OBJECT_INDENT}}};"));
    lines
}
