use std::fs;
use std::path::{Path, PathBuf};

use crate::models::error::SessionError;
use crate::models::session_result::SessionMetadata;

/// Sidecar path for a log: `run.csv` → `run.metadata.json`.
pub fn metadata_path(log_path: &Path) -> PathBuf {
    log_path.with_extension("metadata.json")
}

/// Write session metadata as a JSON sidecar file.
pub fn write_metadata(metadata: &SessionMetadata, log_path: &Path) -> Result<(), SessionError> {
    let json = serde_json::to_string_pretty(metadata)
        .map_err(|e| SessionError::StorageError(format!("failed to serialize metadata: {}", e)))?;
    fs::write(metadata_path(log_path), json)
        .map_err(|e| SessionError::StorageError(format!("failed to write metadata: {}", e)))?;
    Ok(())
}

/// Read session metadata from a JSON sidecar file.
pub fn read_metadata(log_path: &Path) -> Result<SessionMetadata, SessionError> {
    let json = fs::read_to_string(metadata_path(log_path))
        .map_err(|e| SessionError::StorageError(format!("failed to read metadata: {}", e)))?;
    serde_json::from_str(&json)
        .map_err(|e| SessionError::StorageError(format!("failed to parse metadata: {}", e)))
}
