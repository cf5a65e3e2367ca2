use serde::{Deserialize, Serialize};

/// Failures surfaced by the remote catalogue and the pipelines built on it.
///
/// Errors travel inside actions, so they carry rendered messages rather than
/// the underlying transport or decoder errors.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CatalogueError {
    #[error("network error: {0}")]
    Network(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("not found: {0}")]
    NotFound(String),
}

impl CatalogueError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogueError::NotFound(_))
    }
}

impl From<reqwest::Error> for CatalogueError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            CatalogueError::Parse(err.to_string())
        } else {
            CatalogueError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for CatalogueError {
    fn from(err: serde_json::Error) -> Self {
        CatalogueError::Parse(err.to_string())
    }
}
