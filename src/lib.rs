//! Splice source files into Xcode `project.pbxproj` manifests.
//!
//! The [`pbxproj`] module holds the mutation engine; [`driver`] and [`config`]
//! wrap it with the plan file, the skip list and the on-disk checks.

pub mod config;
pub mod driver;
pub mod error;
pub mod models;
pub mod pbxproj;
