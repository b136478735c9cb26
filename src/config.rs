use crate::compressor::CompressOptions;
use crate::constants::{DEFAULT_QUALITY, MAX_QUALITY, MAX_SIZE_MB, MAX_WIDTH_OR_HEIGHT, USE_WORKER};
use crate::error::{Result, SessionError};

/// Settings a session is created with
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Initial quality on the 0-100 scale
    pub quality: u8,
    pub max_size_mb: f64,
    pub max_width_or_height: u32,
    pub use_worker: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            max_size_mb: MAX_SIZE_MB,
            max_width_or_height: MAX_WIDTH_OR_HEIGHT,
            use_worker: USE_WORKER,
        }
    }
}

impl SessionConfig {
    pub fn new(quality: Option<u8>, use_worker: bool) -> Result<Self> {
        let quality = quality.unwrap_or(DEFAULT_QUALITY);
        if quality > MAX_QUALITY {
            return Err(SessionError::InvalidQuality(quality));
        }

        Ok(Self {
            quality,
            use_worker,
            ..Self::default()
        })
    }

    pub fn compress_options(&self, quality: f32) -> CompressOptions {
        CompressOptions {
            max_size_mb: self.max_size_mb,
            max_width_or_height: self.max_width_or_height,
            quality,
            use_worker: self.use_worker,
        }
    }
}
