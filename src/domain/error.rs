//! Domain-level errors (no external dependencies)

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::record::RecordKey;

/// Domain errors represent violations detected while shaping or decoding data.
/// These are independent of CLI and configuration concerns.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("cycle detected in hierarchy at record id: {0}")]
    CycleDetected(RecordKey),

    #[error("invalid data url: {message}")]
    InvalidDataUrl { message: String },

    #[error("cannot determine mime type of data url")]
    UnknownMimeType,

    #[error("file name must not be empty")]
    EmptyFileName,

    #[error("base64 decoding failed: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    #[error("image processing failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DomainError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
