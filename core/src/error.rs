use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the indexing and retrieval engine.
///
/// Malformed queries are not represented here: bad query tokens are dropped
/// during parsing and degrade to an empty result instead of failing.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A persisted index file is missing, truncated, or structurally invalid.
    /// Callers fall back to a full rebuild.
    #[error("failed to load index file {path}: {reason}")]
    LoadFailure { path: PathBuf, reason: String },

    /// I/O failure while enumerating or reading the corpus during a rebuild.
    /// The rebuild aborts and nothing is persisted.
    #[error("failed to read corpus entry {path}")]
    BuildFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O failure while writing an index file.
    #[error("failed to write index file {path}")]
    PersistenceFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
