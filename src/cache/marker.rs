//! Install marker (`hash.txt`)
//!
//! Records which fingerprint an install directory currently reflects, so a
//! cache hit against an up-to-date directory can skip extraction.

use crate::cache::fingerprint::Fingerprint;
use crate::error::{DepcacheError, DepcacheResult};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Marker file name inside the install directory
pub const MARKER_FILE: &str = "hash.txt";

/// Marker path for an install directory
pub fn marker_path(install_dir: &Path) -> PathBuf {
    install_dir.join(MARKER_FILE)
}

/// Whether the marker in `install_dir` holds exactly `fingerprint`.
/// A missing or unreadable marker never matches.
pub async fn is_current(install_dir: &Path, fingerprint: &Fingerprint) -> bool {
    match fs::read(marker_path(install_dir)).await {
        Ok(stored) => fingerprint.matches(&stored),
        Err(_) => false,
    }
}

/// Write `fingerprint` as the raw marker contents (no trailing newline)
pub async fn write(install_dir: &Path, fingerprint: &Fingerprint) -> DepcacheResult<()> {
    let path = marker_path(install_dir);
    fs::write(&path, fingerprint.as_str())
        .await
        .map_err(|e| DepcacheError::io(format!("writing marker {}", path.display()), e))
}
