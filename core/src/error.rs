// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::io;
use std::path::{Path, PathBuf};

use davsync_decsync::{DecsyncError, Value};
use davsync_vobject::{ItemError, ParseError};

/// Bridge errors.
///
/// The protocol variants ([`Error::is_protocol_violation`]) mean a peer
/// speaks an incompatible version and are never absorbed.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Storage I/O failed.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// An item could not be parsed.
    #[error("failed to parse item: {0}")]
    Parse(#[from] ParseError),

    /// An item does not fit its collection.
    #[error("invalid item: {0}")]
    Item(#[from] ItemError),

    /// The sync log failed.
    #[error(transparent)]
    Decsync(#[from] DecsyncError),

    /// Metadata could not be encoded or decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An `info` entry with a key this bridge does not know.
    #[error("unknown info key {0}")]
    UnknownInfoKey(String),

    /// An `info` entry whose value has the wrong type.
    #[error("invalid value for info key {key}: {value}")]
    InvalidInfoValue {
        /// Info key
        key: String,
        /// Offending value
        value: Value,
    },

    /// A `resources` entry whose path is not a single uid.
    #[error("invalid resources path {0:?}")]
    InvalidResourcePath(Vec<String>),

    /// A `resources` entry whose value is neither an item nor a tombstone.
    #[error("invalid resources value for {uid}: {value}")]
    InvalidResourceValue {
        /// Uid of the entry
        uid: String,
        /// Offending value
        value: Value,
    },

    /// A sync type that is neither contacts nor calendars.
    #[error("unknown sync type {0:?}")]
    UnknownSyncType(String),

    /// A collection tag that is neither `VADDRESSBOOK` nor `VCALENDAR`.
    #[error("unknown collection tag {0:?}")]
    UnknownTag(String),

    /// A collection path that cannot be mapped to storage.
    #[error("invalid path {0:?}")]
    InvalidPath(String),

    /// An href that cannot name an item file.
    #[error("invalid href {0:?}")]
    InvalidHref(String),

    /// A sync token this store never issued in that form.
    #[error("invalid sync token {0:?}")]
    InvalidSyncToken(String),

    /// No item at the href.
    #[error("item not found: {0}")]
    NotFound(String),
}

impl Error {
    pub(crate) fn io(path: &Path) -> impl FnOnce(io::Error) -> Self + '_ {
        move |source| Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Whether the error signals an incompatible peer or configuration.
    #[must_use]
    pub const fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            Self::UnknownInfoKey(_)
                | Self::InvalidInfoValue { .. }
                | Self::InvalidResourcePath(_)
                | Self::InvalidResourceValue { .. }
                | Self::UnknownSyncType(_)
                | Self::UnknownTag(_)
        )
    }
}
