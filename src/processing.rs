use crate::compressor::{CompressOptions, Compressor};
use crate::constants::{
    LIBDEFLATER_HIGH_LEVEL, LIBDEFLATER_LOW_LEVEL, MAX_SIZE_ITERATIONS, MIN_JPEG_QUALITY,
    OXIPNG_PRESET, QUALITY_STEP, SCALE_STEP, ZOPFLI_ITERATIONS,
};
use crate::error::{Result, SessionError};
use crate::file::{CompressedBlob, ImageFile};
use crate::formats::MediaType;
use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, GenericImageView, ImageFormat};
use oxipng::{Deflaters, Options};
use std::io::Cursor;
use std::num::NonZeroU8;
use tokio::task;

/// Compressor backed by the `image` crate, with oxipng for PNG output.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCompressor;

impl ImageCompressor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Compressor for ImageCompressor {
    async fn compress(
        &self,
        file: &ImageFile,
        options: &CompressOptions,
    ) -> Result<CompressedBlob> {
        let media_type = MediaType::from_declared(file.media_type())?;
        let bytes = file.shared_bytes();
        let options = *options;

        if options.use_worker {
            // Decoding and encoding are CPU-bound; keep them off the async workers
            task::spawn_blocking(move || compress_bytes(&bytes, media_type, &options))
                .await
                .map_err(|e| SessionError::CompressionFailure(format!("worker task failed: {}", e)))?
        } else {
            compress_bytes(&bytes, media_type, &options)
        }
    }
}

/// Core compression pipeline: decode -> fit -> encode, shrinking until the
/// output fits the size cap or the attempts run out.
///
/// # Arguments
/// * `data` - Encoded original image
/// * `media_type` - Output format, same as the original's declared type
/// * `options` - Quality and size/dimension caps
///
/// # Returns
/// * `Ok(blob)` - The last encoding attempt. It can exceed the size cap when
///   every attempt did; a warning is logged in that case.
/// * `Err(SessionError::CompressionFailure)` - If decoding or encoding fails
pub fn compress_bytes(
    data: &[u8],
    media_type: MediaType,
    options: &CompressOptions,
) -> Result<CompressedBlob> {
    let img = image::load_from_memory(data)?;
    let (width, height) = img.dimensions();
    crate::verbose!("Decoded {}x{} {} ({} bytes)", width, height, media_type, data.len());

    let mut img = fit_within(img, options.max_width_or_height);
    let mut quality = options.quality;
    let max_bytes = options.max_size_bytes();

    let mut encoded = encode(&img, media_type, quality)?;
    let mut attempt = 0;
    while encoded.len() as u64 > max_bytes && attempt < MAX_SIZE_ITERATIONS {
        attempt += 1;
        img = shrink(&img, SCALE_STEP);
        if media_type == MediaType::Jpeg {
            quality = (quality - QUALITY_STEP).max(0.0);
        }
        crate::verbose!(
            "Output {} bytes over cap {}, retry {} at {}x{} quality {:.2}",
            encoded.len(),
            max_bytes,
            attempt,
            img.width(),
            img.height(),
            quality
        );
        encoded = encode(&img, media_type, quality)?;
    }

    if encoded.len() as u64 > max_bytes {
        crate::warn!(
            "Compressed output is still {} bytes after {} attempts (cap {} bytes)",
            encoded.len(),
            attempt,
            max_bytes
        );
    }

    Ok(CompressedBlob::new(encoded, media_type))
}

/// Downsizes so the longest side is at most `max_side`, preserving the aspect
/// ratio. Never upscales.
pub fn fit_within(img: DynamicImage, max_side: u32) -> DynamicImage {
    let (width, height) = img.dimensions();
    if max_side == 0 || width.max(height) <= max_side {
        return img;
    }

    crate::verbose!("Resizing {}x{} to fit {}px", width, height, max_side);
    img.resize(max_side, max_side, FilterType::Lanczos3)
}

fn shrink(img: &DynamicImage, factor: f32) -> DynamicImage {
    let width = ((img.width() as f32 * factor) as u32).max(1);
    let height = ((img.height() as f32 * factor) as u32).max(1);
    img.resize_exact(width, height, FilterType::Lanczos3)
}

/// Maps a `[0.0, 1.0]` quality onto the JPEG encoder's 1-100 scale
pub fn jpeg_quality(quality: f32) -> u8 {
    (quality * 100.0).round().clamp(MIN_JPEG_QUALITY as f32, 100.0) as u8
}

/// Picks the oxipng deflater for a quality band
pub fn png_deflater(quality: f32) -> Deflaters {
    if quality >= 0.9 {
        if let Some(iterations) = NonZeroU8::new(ZOPFLI_ITERATIONS) {
            return Deflaters::Zopfli { iterations };
        }
    }

    if quality >= 0.7 {
        Deflaters::Libdeflater {
            compression: LIBDEFLATER_HIGH_LEVEL,
        }
    } else {
        Deflaters::Libdeflater {
            compression: LIBDEFLATER_LOW_LEVEL,
        }
    }
}

fn encode(img: &DynamicImage, media_type: MediaType, quality: f32) -> Result<Vec<u8>> {
    let mut output = Vec::new();

    match media_type {
        MediaType::Jpeg => {
            // JPEG has no alpha channel
            let rgb = img.to_rgb8();
            let mut encoder = JpegEncoder::new_with_quality(&mut output, jpeg_quality(quality));
            encoder.encode(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)?;
        }
        MediaType::Png => {
            let mut raw = Vec::new();
            img.write_to(&mut Cursor::new(&mut raw), ImageFormat::Png)?;

            let mut oxipng_options = Options::from_preset(OXIPNG_PRESET);
            oxipng_options.deflate = png_deflater(quality);

            output = oxipng::optimize_from_memory(&raw, &oxipng_options).map_err(|e| {
                SessionError::CompressionFailure(format!("PNG optimization error: {}", e))
            })?;
        }
    }

    Ok(output)
}
