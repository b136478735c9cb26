use crate::constants::MAX_INPUT_FILE_SIZE;
use crate::error::{Result, SessionError};
use std::fs;
use std::path::{Path, PathBuf};

/// Validate an input path before it is read into an `ImageFile`
pub fn validate_input_path(path: &Path) -> Result<u64> {
    if !path.exists() {
        return Err(SessionError::FileNotFound(path.to_path_buf()));
    }

    if !path.is_file() {
        return Err(SessionError::NotAFile(path.to_path_buf()));
    }

    let metadata =
        fs::metadata(path).map_err(|_| SessionError::FileNotFound(path.to_path_buf()))?;

    if metadata.len() > MAX_INPUT_FILE_SIZE {
        return Err(SessionError::FileTooLarge(metadata.len(), MAX_INPUT_FILE_SIZE));
    }

    Ok(metadata.len())
}

/// Validate the download directory, creating it if it doesn't exist
pub fn validate_output_dir(path: &Path) -> Result<PathBuf> {
    fs::create_dir_all(path)
        .map_err(|_| SessionError::DirectoryCreationFailed(path.to_path_buf()))?;

    let canonical = path
        .canonicalize()
        .map_err(|_| SessionError::DirectoryCreationFailed(path.to_path_buf()))?;

    if !canonical.is_dir() {
        return Err(SessionError::DirectoryCreationFailed(path.to_path_buf()));
    }

    Ok(canonical)
}
