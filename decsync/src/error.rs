// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::io;
use std::path::{Path, PathBuf};

/// Sync log errors.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum DecsyncError {
    /// Reading or writing a log file failed.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// An entry could not be encoded.
    #[error("failed to encode entry: {0}")]
    Encode(#[from] serde_json::Error),

    /// A path segment that cannot be represented on disk.
    #[error("invalid path: {0:?}")]
    InvalidPath(Vec<String>),
}

impl DecsyncError {
    pub(crate) fn io(path: &Path) -> impl FnOnce(io::Error) -> Self + '_ {
        move |source| Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
