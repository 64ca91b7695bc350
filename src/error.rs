//! Errors raised around the engine: plan loading, validation and file I/O.
//!
//! The engine itself has no error path; anchor misses are reported in
//! [`PatchReport`](crate::models::PatchReport) instead.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PatchError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse plan {}: {source}", path.display())]
    Plan {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid file entry #{index}: {reason}")]
    InvalidFile { index: usize, reason: String },

    #[error("Invalid identifier '{0}': expected 24 hexadecimal characters")]
    InvalidIdentifier(String),

    #[error("No project manifest given (set \"project\" in the plan or pass --project)")]
    MissingProject,
}

pub type Result<T> = std::result::Result<T, PatchError>;
