use std::path::PathBuf;

use thiserror::Error;

/// Why a schedule could not be loaded. Loading is all-or-nothing.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid record set: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV is missing required columns (need {needed}); found {found:?}")]
    MissingColumns { needed: String, found: Vec<String> },

    #[error("no tasks found ({skipped} rows skipped)")]
    NoTasks { skipped: usize },
}

impl LoadError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
