//! The compressor seam used by the session

use crate::error::Result;
use crate::file::{CompressedBlob, ImageFile};
use async_trait::async_trait;

/// Options passed to a compressor for a single request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressOptions {
    pub max_size_mb: f64,
    pub max_width_or_height: u32,
    /// Quality in `[0.0, 1.0]`
    pub quality: f32,
    /// Run the work off the calling task
    pub use_worker: bool,
}

impl CompressOptions {
    pub fn max_size_bytes(&self) -> u64 {
        (self.max_size_mb * 1024.0 * 1024.0) as u64
    }
}

/// Something that turns an original image into a compressed one.
///
/// Implementations produce exactly one outcome per call and must not block
/// the caller when `use_worker` is set.
#[async_trait]
pub trait Compressor: Send + Sync {
    async fn compress(&self, file: &ImageFile, options: &CompressOptions)
        -> Result<CompressedBlob>;
}
