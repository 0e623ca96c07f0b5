use crate::model::ProfileId;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("profile index {index} out of range (store holds {len})")]
    NotFound { index: usize, len: usize },

    #[error("no profile with id {0}")]
    UnknownId(ProfileId),

    #[error("malformed profile data in {}: {message}", .path.display())]
    MalformedData { path: PathBuf, message: String },

    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to serialize profiles: {message}")]
    Serialize { message: String },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::MalformedData {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::UnknownId(_))
    }
}
