//! Domain models for pbxproj-patch.
//!
//! # Core Concepts
//!
//! - [`LogicalFile`]: A source file the driver wants compiled, with the group it
//!   belongs to and its path relative to the source root.
//! - [`FileKind`]: What the file extension says about the file, which decides its
//!   `lastKnownFileType` and whether it joins the sources build phase.
//! - [`GroupNode`]: A `PBXGroup` object found in an existing manifest, with its
//!   ordered children.
//! - [`PatchReport`]: What one engine run added, skipped and could not anchor.

mod file;
mod group;
mod report;

pub use file::*;
pub use group::*;
pub use report::*;
