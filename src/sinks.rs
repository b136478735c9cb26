//! Outbound collaborators of a session: where downloads go and where
//! user-facing messages are shown.

use crate::error::{Result, SessionError};
use crate::file::CompressedBlob;
use crate::validation::validate_output_dir;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Performs the platform save/download of a compressed result.
pub trait DownloadSink {
    fn save(&self, blob: &CompressedBlob, file_name: &str) -> Result<()>;
}

/// Shows a user-facing message for validation and compression failures.
pub trait NotificationSink {
    fn notify(&self, message: &str);
}

/// Writes downloads into a directory, creating it on first use
#[derive(Debug, Clone)]
pub struct DirectoryDownloadSink {
    dir: PathBuf,
}

impl DirectoryDownloadSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadSink for DirectoryDownloadSink {
    fn save(&self, blob: &CompressedBlob, file_name: &str) -> Result<()> {
        let dir = validate_output_dir(&self.dir)?;
        let target = dir.join(download_name(file_name)?);
        fs::write(&target, blob.bytes())?;
        crate::verbose!("Wrote {} bytes to {:?}", blob.size(), target);
        Ok(())
    }
}

/// Keeps only the final path component so a save never leaves the directory
fn download_name(file_name: &str) -> Result<&OsStr> {
    match Path::new(file_name).file_name() {
        Some(name) => Ok(name),
        None => Err(SessionError::InvalidFileName(file_name.to_string())),
    }
}

/// Prints notifications to stderr, quiet mode included.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl NotificationSink for ConsoleNotifier {
    fn notify(&self, message: &str) {
        crate::notice!("{}", message);
    }
}

/// Keeps notifications in memory; clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl NotificationSink for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(message.to_string());
    }
}

impl<T: DownloadSink + ?Sized> DownloadSink for &T {
    fn save(&self, blob: &CompressedBlob, file_name: &str) -> Result<()> {
        (**self).save(blob, file_name)
    }
}

impl<T: NotificationSink + ?Sized> NotificationSink for &T {
    fn notify(&self, message: &str) {
        (**self).notify(message)
    }
}
