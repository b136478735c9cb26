pub const DEFAULT_QUALITY: u8 = 80;
pub const MAX_QUALITY: u8 = 100;

pub const MAX_SIZE_MB: f64 = 10.0;
pub const MAX_WIDTH_OR_HEIGHT: u32 = 1920;
pub const USE_WORKER: bool = true;

/// Inserted between the base name and the extension of a downloaded result.
pub const COMPRESSED_SUFFIX: &str = "_compressed";

pub const JPEG_MIME: &str = "image/jpeg";
pub const PNG_MIME: &str = "image/png";
pub const FALLBACK_MIME: &str = "application/octet-stream";

// Size-cap retry loop
pub const MAX_SIZE_ITERATIONS: u32 = 10;
pub const SCALE_STEP: f32 = 0.9;
pub const QUALITY_STEP: f32 = 0.05;
pub const MIN_JPEG_QUALITY: u8 = 1;

pub const OXIPNG_PRESET: u8 = 4;
pub const ZOPFLI_ITERATIONS: u8 = 15;
pub const LIBDEFLATER_HIGH_LEVEL: u8 = 12;
pub const LIBDEFLATER_LOW_LEVEL: u8 = 8;

/// Upper bound for files read by the filesystem file source (100MB)
pub const MAX_INPUT_FILE_SIZE: u64 = 100 * 1024 * 1024;

pub const PROGRESS_SPINNER_TEMPLATE: &str = "{spinner:.green} {msg}";

// User-facing notifications
pub const UNSUPPORTED_MEDIA_TYPE_MESSAGE: &str = "Please upload a JPG or PNG image!";
pub const COMPRESSION_FAILED_MESSAGE: &str = "Image compression failed, please try again!";

// Common output message prefixes
pub const ORIGINAL_SIZE_PREFIX: &str = "📊 Original size:";
pub const COMPRESSED_SIZE_PREFIX: &str = "📈 Compressed size:";
pub const SAVINGS_PREFIX: &str = "🎯 Saved";
pub const QUALITY_PREFIX: &str = "🎚️  Quality:";
pub const SAVED_FILE_PREFIX: &str = "💾 Saved:";
