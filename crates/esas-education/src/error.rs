use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EducationError {
    #[error("unsupported catalog version {found} (supported: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("duplicate article id: {0}")]
    DuplicateId(String),

    #[error("catalog parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
