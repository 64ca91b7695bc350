//! ASCII tree rendering for group hierarchies.

use std::collections::HashSet;

use super::{GroupIndex, Identifier};
use crate::models::ChildRef;

const GROUP: char = '▸';
const FILE: char = '•';
const DANGLING: char = '✗';

/// Render the group tree under `root` as ASCII art.
///
/// Example output:
/// ```text
/// KPOPVOTE
/// ├── ▸ Models
/// │   ├── • Bias.swift
/// │   └── • Task.swift
/// ├── • ContentView.swift
/// └── ✗ 9F1A2B3C4D5E6F7A8B9C0D1E
/// ```
///
/// Children that are neither groups nor labelled are shown by identifier with
/// the dangling marker. A group listed under itself is printed once.
pub fn render_tree(index: &GroupIndex, root: &Identifier) -> String {
    let mut output = String::new();
    let mut visiting = HashSet::new();

    let title = index
        .get(root)
        .map_or(root.as_str(), |group| group.display_name());
    output.push_str(title);
    output.push('\n');

    if let Some(group) = index.get(root) {
        visiting.insert(root.clone());
        render_children(&mut output, index, &group.children, "", &mut visiting);
    }
    output
}

fn render_children(
    output: &mut String,
    index: &GroupIndex,
    children: &[ChildRef],
    prefix: &str,
    visiting: &mut HashSet<Identifier>,
) {
    for (i, child) in children.iter().enumerate() {
        let is_last = i == children.len() - 1;
        let branch = if is_last { "└── " } else { "├── " };
        output.push_str(prefix);
        output.push_str(branch);

        match index.get(&child.id) {
            Some(group) => {
                output.push(GROUP);
                output.push(' ');
                output.push_str(group.display_name());
                output.push('\n');

                if visiting.insert(child.id.clone()) {
                    let continuation = if is_last { "    " } else { "│   " };
                    let child_prefix = format!("{}{}", prefix, continuation);
                    render_children(output, index, &group.children, &child_prefix, visiting);
                    visiting.remove(&child.id);
                }
            }
            None => {
                match &child.label {
                    Some(label) => {
                        output.push(FILE);
                        output.push(' ');
                        output.push_str(label);
                    }
                    None => {
                        output.push(DANGLING);
                        output.push(' ');
                        output.push_str(child.id.as_str());
                    }
                }
                output.push('\n');
            }
        }
    }
}
