// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Bridges CalDAV/CardDAV collections to a DecSync directory.
//!
//! Local mutations are published to the sync log of their collection, and
//! entries other writers appended are applied locally before every read of
//! a collection's state.

mod collection;
mod config;
mod discover;
mod error;
mod hrefs;
mod inbound;
mod io;
mod item;
pub mod storage;
mod types;

pub use crate::collection::{DecsyncCollection, LogSettings};
pub use crate::config::{APP_NAME, Config, DECSYNC_DIR_ENV};
pub use crate::discover::DecsyncStore;
pub use crate::error::Error;
pub use crate::hrefs::{HREFS_FILE, HrefMap};
pub use crate::item::Item;
pub use crate::types::{Depth, Origin, SyncType};

use crate::storage::FsStore;

/// Opens the bridged file system store described by `config`.
///
/// # Errors
///
/// Returns an error if the configuration cannot be normalized.
pub fn open(mut config: Config) -> Result<DecsyncStore<FsStore>, Box<dyn std::error::Error>> {
    config.normalize()?;
    let settings = LogSettings {
        decsync_dir: config.decsync_dir.ok_or("Decsync directory not configured")?,
        app_id: config.app_id.ok_or("App id not configured")?,
    };
    tracing::debug!(
        storage_root = %config.storage_root.display(),
        decsync_dir = %settings.decsync_dir.display(),
        app_id = %settings.app_id,
        "opening store"
    );
    Ok(DecsyncStore::new(FsStore::new(&config.storage_root), settings))
}
