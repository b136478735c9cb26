use crate::error::Result;
use crate::formats::{guess_declared_type, MediaType};
use crate::validation::validate_input_path;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// An image handed to the session by a file source.
///
/// The declared media type is kept verbatim; validation happens when the file
/// is submitted. Bytes are shared so requests can snapshot the file cheaply.
#[derive(Debug, Clone)]
pub struct ImageFile {
    name: String,
    media_type: String,
    bytes: Arc<[u8]>,
}

impl ImageFile {
    pub fn new(
        name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Reads a file from disk, declaring its media type from the extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        validate_input_path(path)?;

        let bytes = fs::read(path)?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self::new(name, guess_declared_type(path), bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub(crate) fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Output of a compressor.
#[derive(Debug, Clone)]
pub struct CompressedBlob {
    media_type: MediaType,
    bytes: Arc<[u8]>,
}

impl CompressedBlob {
    pub fn new(bytes: impl Into<Arc<[u8]>>, media_type: MediaType) -> Self {
        Self {
            media_type,
            bytes: bytes.into(),
        }
    }

    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}
