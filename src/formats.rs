//! Media type handling for the two accepted image kinds
//!
//! Declared media types are matched exactly (case-sensitive) against
//! `image/jpeg` and `image/png`. Anything else is rejected.

use crate::constants::{FALLBACK_MIME, JPEG_MIME, PNG_MIME};
use crate::error::{Result, SessionError};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Accepted image media types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaType {
    /// `image/jpeg`, re-encoded lossily at the session quality
    Jpeg,
    /// `image/png`, re-encoded and optimized with oxipng
    Png,
}

impl MediaType {
    /// Parse a declared media type, accepting only exact matches.
    pub fn from_declared(declared: &str) -> Result<Self> {
        match declared {
            JPEG_MIME => Ok(MediaType::Jpeg),
            PNG_MIME => Ok(MediaType::Png),
            other => Err(SessionError::UnsupportedMediaType(other.to_string())),
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            MediaType::Jpeg => JPEG_MIME,
            MediaType::Png => PNG_MIME,
        }
    }

}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MediaType::Jpeg => "JPEG",
            MediaType::Png => "PNG",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for MediaType {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self> {
        MediaType::from_declared(s)
    }
}

/// Declared media type for a file on disk, guessed from its extension.
///
/// Unknown or missing extensions map to `application/octet-stream`, which the
/// session rejects.
pub fn guess_declared_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => JPEG_MIME,
        Some("png") => PNG_MIME,
        _ => FALLBACK_MIME,
    }
}
