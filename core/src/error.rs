use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("snapshot {path:?} could not be read: {source}")]
    SourceNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("snapshot {path:?} is malformed: {reason}")]
    MalformedSnapshot { path: PathBuf, reason: String },
    #[error("failed to render host '{host}': {reason}")]
    RenderFailure { host: String, reason: String },
    #[error("failed to write {path:?}: {source}")]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid report configuration: {0}")]
    InvalidConfig(String),
}

impl ReportError {
    pub fn step(&self) -> &'static str {
        match self {
            ReportError::SourceNotFound { .. } | ReportError::MalformedSnapshot { .. } => "load",
            ReportError::RenderFailure { .. } => "render",
            ReportError::WriteFailure { .. } => "write",
            ReportError::InvalidConfig(_) => "config",
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ReportError::WriteFailure {
            path: path.into(),
            source,
        }
    }
}
