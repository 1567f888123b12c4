#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Persistence adapters for Skyfall progress.
//!
//! Progress is stored as four string-keyed, human-readable entries (see
//! [`keys`]). A [`KeyValueStore`] backend holds the raw entries and
//! [`KeyValueProgressStore`] maps them onto a
//! [`ProgressRecord`](skyfall_core::ProgressRecord).

use std::{io, path::PathBuf};

use thiserror::Error;

mod file;
mod memory;
mod progress;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use progress::KeyValueProgressStore;

/// Keys under which the progress record is stored.
pub mod keys {
    /// Level the player resumes at.
    pub const CURRENT_LEVEL: &str = "currentLevel";
    /// Score banked from passed levels.
    pub const TOTAL_SCORE: &str = "totalScore";
    /// Best total score ever reached.
    pub const HIGHEST_SCORE: &str = "highestScore";
    /// JSON object mapping passed levels to their scores.
    pub const LEVEL_SCORES: &str = "levelScores";
}

/// String-keyed storage with all-or-nothing batch writes.
pub trait KeyValueStore {
    /// Returns the value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Writes every entry, or none of them when an error is returned.
    fn put_all(&mut self, entries: &[(&str, String)]) -> Result<(), StoreError>;
}

/// Errors raised while persisting progress.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The progress file exists but could not be read.
    #[error("failed to read progress file at {}", .path.display())]
    Read {
        /// Location of the progress file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// A temporary file could not be created or written.
    #[error("failed to write progress data next to {}", .path.display())]
    Write {
        /// Location of the progress file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The entries could not be encoded.
    #[error("failed to encode progress entries")]
    Encode(#[from] serde_json::Error),
    /// The written temporary file could not replace the progress file.
    #[error("failed to replace progress file at {}", .path.display())]
    Persist {
        /// Location of the progress file.
        path: PathBuf,
        /// Underlying rename failure.
        #[source]
        source: tempfile::PersistError,
    },
}
