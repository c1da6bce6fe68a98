use std::{io, path::PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced by the engine.
///
/// Malformed record bodies found while listing are not errors; they decode
/// to [`Body::Raw`](crate::Body::Raw) instead.
#[derive(Debug, Error)]
pub enum Error {
    /// The invocation does not match any known command shape
    #[error("{0}")]
    Usage(String),

    #[error("invalid database name `{0}`")]
    InvalidDatabase(String),

    /// The insert payload is not valid JSON
    #[error("invalid JSON payload: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write output: {0}")]
    Output(#[source] io::Error),
}

impl Error {
    /// Process exit status for this error.
    ///
    /// Usage problems share clap's status code so callers see one value for
    /// every malformed invocation.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Usage(_) | Self::InvalidDatabase(_) => 2,
            _ => 1,
        }
    }
}
