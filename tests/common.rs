#![allow(dead_code)]

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use img_squeeze_session::{
    CompressOptions, CompressedBlob, Compressor, DownloadSink, ImageFile, MediaType, Result,
    SessionError,
};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A real, decodable image with some texture so encoders have work to do
pub fn sample_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 7 % 256) as u8, (y * 3 % 256) as u8, ((x ^ y) % 256) as u8])
    }))
}

pub fn encode_image(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), format).unwrap();
    buf
}

pub fn write_test_image(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let format = ImageFormat::from_path(name).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, encode_image(&sample_image(width, height), format)).unwrap();
    path
}

pub fn png_file(name: &str, size: usize) -> ImageFile {
    ImageFile::new(name, "image/png", vec![0xAB; size])
}

pub fn jpeg_file(name: &str, size: usize) -> ImageFile {
    ImageFile::new(name, "image/jpeg", vec![0xCD; size])
}

/// Returns a blob of a fixed size and records every call's options
#[derive(Clone, Default)]
pub struct MockCompressor {
    output_size: Option<usize>,
    calls: Arc<Mutex<Vec<CompressOptions>>>,
}

impl MockCompressor {
    /// Output is `original size * quality`
    pub fn quality_scaled() -> Self {
        Self::default()
    }

    pub fn fixed(output_size: usize) -> Self {
        Self {
            output_size: Some(output_size),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<CompressOptions> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Compressor for MockCompressor {
    async fn compress(&self, file: &ImageFile, options: &CompressOptions) -> Result<CompressedBlob> {
        self.calls.lock().unwrap().push(*options);
        let size = self
            .output_size
            .unwrap_or((file.size() as f64 * options.quality as f64).round() as usize);
        Ok(CompressedBlob::new(
            vec![0u8; size],
            MediaType::from_declared(file.media_type())?,
        ))
    }
}

/// Fails every call after the first `successes`
#[derive(Clone)]
pub struct FlakyCompressor {
    successes: usize,
    calls: Arc<AtomicUsize>,
}

impl FlakyCompressor {
    pub fn failing() -> Self {
        Self::succeeding_first(0)
    }

    pub fn succeeding_first(successes: usize) -> Self {
        Self {
            successes,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl Compressor for FlakyCompressor {
    async fn compress(&self, file: &ImageFile, _options: &CompressOptions) -> Result<CompressedBlob> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call >= self.successes {
            return Err(SessionError::CompressionFailure("decoder gave up".to_string()));
        }
        Ok(CompressedBlob::new(
            vec![0u8; (file.size() / 4) as usize],
            MediaType::from_declared(file.media_type())?,
        ))
    }
}

/// Keeps downloads in memory
#[derive(Default)]
pub struct MemoryDownloadSink {
    saved: Mutex<Vec<(String, u64)>>,
}

impl MemoryDownloadSink {
    pub fn saved(&self) -> Vec<(String, u64)> {
        self.saved.lock().unwrap().clone()
    }
}

impl DownloadSink for MemoryDownloadSink {
    fn save(&self, blob: &CompressedBlob, file_name: &str) -> Result<()> {
        self.saved
            .lock()
            .unwrap()
            .push((file_name.to_string(), blob.size()));
        Ok(())
    }
}
