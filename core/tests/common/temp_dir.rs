// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Temporary directory management for integration tests.
//!
//! Every peer gets its own storage root while all of them share one sync
//! log directory, like devices syncing a folder.

use std::fs;
use std::path::{Path, PathBuf};

/// Temporary directories used for testing.
///
/// Automatically cleans up all created directories when dropped.
#[derive(Debug)]
pub struct TempDirs {
    base: PathBuf,
    /// Sync log directory shared by all peers.
    pub decsync_dir: PathBuf,
}

impl TempDirs {
    /// Creates new temporary directories for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation fails.
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let base = tempfile::tempdir()?.keep();
        let decsync_dir = base.join("decsync");
        fs::create_dir_all(&decsync_dir)?;
        Ok(Self { base, decsync_dir })
    }

    /// Gets the base temporary directory.
    #[must_use]
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Storage root of the peer called `name`.
    #[must_use]
    pub fn storage_root(&self, name: &str) -> PathBuf {
        self.base.join("storage").join(name)
    }
}

/// Sets up temporary directories for integration tests.
///
/// # Errors
///
/// Returns an error if directory creation fails.
pub fn setup_temp_dirs() -> Result<TempDirs, Box<dyn std::error::Error>> {
    TempDirs::new()
}

impl Drop for TempDirs {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_dir_all(&self.base) {
            tracing::warn!(path = %self.base.display(), err = %e, "failed to clean up temp directory");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_dirs_creates_decsync_dir() {
        let dirs = TempDirs::new().unwrap();
        assert!(dirs.decsync_dir.is_dir());
        assert!(dirs.storage_root("a").starts_with(dirs.base()));
    }

    #[test]
    fn temp_dirs_cleanup_on_drop() {
        let base = {
            let dirs = TempDirs::new().unwrap();
            dirs.base().to_path_buf()
        };
        assert!(!base.exists());
    }
}
