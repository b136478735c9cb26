use crate::constants::{COMPRESSION_FAILED_MESSAGE, UNSUPPORTED_MEDIA_TYPE_MESSAGE};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported media type: {0:?}. Expected image/jpeg or image/png")]
    UnsupportedMediaType(String),

    #[error("Compression failed: {0}")]
    CompressionFailure(String),

    #[error("Invalid quality value: {0}. Must be between 0 and 100")]
    InvalidQuality(u8),

    #[error("File too large: {0} bytes. Maximum allowed: {1} bytes")]
    FileTooLarge(u64, u64),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Not a regular file: {0}")]
    NotAFile(PathBuf),

    #[error("Failed to create output directory: {0}")]
    DirectoryCreationFailed(PathBuf),

    #[error("Unknown command: {0}")]
    InvalidCommand(String),

    #[error("Invalid download file name: {0:?}")]
    InvalidFileName(String),
}

impl SessionError {
    /// Message shown to the user through a notification sink.
    pub fn notification(&self) -> String {
        match self {
            SessionError::UnsupportedMediaType(_) => UNSUPPORTED_MEDIA_TYPE_MESSAGE.to_string(),
            SessionError::CompressionFailure(_) => COMPRESSION_FAILED_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

impl From<image::ImageError> for SessionError {
    fn from(err: image::ImageError) -> Self {
        SessionError::CompressionFailure(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;
