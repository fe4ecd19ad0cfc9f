//! Error types for the dataset pipeline.
//!
//! Fatal conditions (missing input, no surviving windows, missing artifacts
//! when resuming) are explicit variants so callers can match on them.
//! Everything recoverable (short periods, low-coverage candidates, unmatched
//! windows) is reported through stats and never becomes an error.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DatasetError>;

/// Errors produced by the loader, windowing, labeling and export stages.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// Raw input is absent, empty, or inconsistent.
    #[error("data error: {0}")]
    Data(String),

    /// Every period was skipped or every candidate window was dropped.
    #[error(
        "no windows could be created from any continuous period \
         ({periods} periods, {candidates} candidate windows)"
    )]
    NoWindows {
        /// Number of continuous periods that were examined
        periods: usize,
        /// Number of candidate windows that were considered
        candidates: usize,
    },

    /// A required artifact is missing when resuming from disk.
    #[error("required artifact not found: {}", .0.display())]
    MissingArtifact(PathBuf),

    /// Invalid configuration or label rule.
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),

    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),

    #[error("failed to write npy array: {0}")]
    NpyWrite(#[from] ndarray_npy::WriteNpyError),

    #[error("failed to read npy array: {0}")]
    NpyRead(#[from] ndarray_npy::ReadNpyError),

    #[error("array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

impl DatasetError {
    pub(crate) fn data(msg: impl Into<String>) -> Self {
        DatasetError::Data(msg.into())
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        DatasetError::Config(msg.into())
    }

    /// Whether this error aborts the pipeline before any output is written.
    pub fn is_fatal_precondition(&self) -> bool {
        matches!(
            self,
            DatasetError::Data(_) | DatasetError::NoWindows { .. } | DatasetError::MissingArtifact(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_windows_message_names_counts() {
        let err = DatasetError::NoWindows {
            periods: 3,
            candidates: 7,
        };
        let msg = err.to_string();
        assert!(msg.contains("no windows"));
        assert!(msg.contains("3 periods"));
        assert!(msg.contains("7 candidate"));
        assert!(err.is_fatal_precondition());
    }

    #[test]
    fn test_missing_artifact_message_has_path() {
        let err = DatasetError::MissingArtifact(PathBuf::from("out/window_timestamps.npy"));
        assert!(err.to_string().contains("window_timestamps.npy"));
    }

    #[test]
    fn test_config_error_is_not_fatal_precondition() {
        assert!(!DatasetError::config("bad").is_fatal_precondition());
    }
}
