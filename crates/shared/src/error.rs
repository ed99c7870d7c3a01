use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    HttpStatus,
    Network,
    Read,
    InvalidSource,
    CorruptState,
    Navigation,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("source list request failed with status {0}")]
    Status(u16),
    #[error("source list request failed: {0}")]
    Transport(String),
    #[error("source list body could not be read: {0}")]
    Body(String),
    #[error("source list file could not be read: {0}")]
    Io(String),
    #[error("invalid source location '{0}'")]
    InvalidLocation(String),
}

impl SourceError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Status(_) => FailureKind::HttpStatus,
            Self::Transport(_) => FailureKind::Network,
            Self::Body(_) | Self::Io(_) => FailureKind::Read,
            Self::InvalidLocation(_) => FailureKind::InvalidSource,
        }
    }
}

#[derive(Debug, Error)]
pub enum DrawError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("persisted draw state is unusable: {0}")]
    State(String),
    #[error("failed to open '{url}': {message}")]
    Navigation { url: String, message: String },
}

impl DrawError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Source(err) => err.kind(),
            Self::State(_) => FailureKind::CorruptState,
            Self::Navigation { .. } => FailureKind::Navigation,
        }
    }

    /// Short message suitable for the blocking notice shown to the user.
    pub fn notice(&self) -> String {
        match self {
            Self::Source(SourceError::Status(status)) => format!(
                "Failed to load the URL list (status {status}). Check the source location."
            ),
            Self::Source(_) => "Failed to load the URL list. See the log for details.".into(),
            Self::State(_) => "Saved draw history is unreadable. Run `reset` to clear it.".into(),
            Self::Navigation { url, .. } => format!("Drew {url} but could not open it."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_errors_mention_code_in_notice() {
        let err = DrawError::from(SourceError::Status(404));
        assert_eq!(err.kind(), FailureKind::HttpStatus);
        assert!(err.notice().contains("404"));
    }

    #[test]
    fn failure_kind_serializes_snake_case() {
        let json = serde_json::to_string(&FailureKind::CorruptState).expect("json");
        assert_eq!(json, "\"corrupt_state\"");
    }
}
