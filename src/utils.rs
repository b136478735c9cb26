//! Helpers shared by the session and the hosts: size formatting, savings,
//! output naming and progress display.

use crate::constants::{COMPRESSED_SUFFIX, PROGRESS_SPINNER_TEMPLATE};
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;

/// Format a byte count the way the size labels show it
///
/// Base 1024, units Bytes/KB/MB/GB, at most two decimals with trailing zeros
/// dropped (`1536` -> `"1.5 KB"`, `1024` -> `"1 KB"`).
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["Bytes", "KB", "MB", "GB"];
    const THRESHOLD: f64 = 1024.0;

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= THRESHOLD && unit_index < UNITS.len() - 1 {
        size /= THRESHOLD;
        unit_index += 1;
    }

    let fixed = format!("{:.2}", size);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit_index])
}

/// Percentage of the original size saved by compression.
///
/// Rounded to one decimal place. Negative when the output grew.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Savings(f64);

impl Savings {
    pub fn between(original_size: u64, compressed_size: u64) -> Self {
        if original_size == 0 {
            return Savings(0.0);
        }

        let ratio =
            (original_size as f64 - compressed_size as f64) / original_size as f64 * 100.0;
        let rounded = (ratio * 10.0).round() / 10.0;
        // Avoid rendering "-0.0%"
        Savings(if rounded == 0.0 { 0.0 } else { rounded })
    }

    pub fn percent(&self) -> f64 {
        self.0
    }

    pub fn is_reduction(&self) -> bool {
        self.0 > 0.0
    }
}

impl fmt::Display for Savings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}%", self.0)
    }
}

/// Name for a downloaded result: the suffix goes before the last extension
///
/// `photo.png` -> `photo_compressed.png`, `archive.tar.gz` ->
/// `archive.tar_compressed.gz`, `noext` -> `noext_compressed`.
pub fn compressed_file_name(original_name: &str) -> String {
    match original_name.rsplit_once('.') {
        Some((base, extension)) => format!("{}{}.{}", base, COMPRESSED_SUFFIX, extension),
        None => format!("{}{}", original_name, COMPRESSED_SUFFIX),
    }
}

/// Create a progress spinner with consistent styling
///
/// Hidden in quiet mode.
pub fn create_progress_spinner(message: &str) -> ProgressBar {
    if crate::logger::is_quiet() {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template(PROGRESS_SPINNER_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb
}
