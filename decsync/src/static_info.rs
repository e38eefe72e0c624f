// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Queries that need no open collection log.

use std::path::Path;

use serde_json::Value;

use crate::entry::Entry;
use crate::error::DecsyncError;
use crate::layout::{encode_segment, list_dirs, read_entries};

/// Identity of this instance of `app_name`: `"<hostname>-<app_name>"`.
#[must_use]
pub fn app_id(app_name: &str) -> String {
    format!("{}-{app_name}", hostname())
}

fn hostname() -> String {
    match hostname::get().map(std::ffi::OsString::into_string) {
        Ok(Ok(name)) if !name.trim().is_empty() => name.trim().to_string(),
        Ok(_) => {
            tracing::warn!("hostname is empty or not valid unicode, using localhost");
            "localhost".to_string()
        }
        Err(err) => {
            tracing::warn!(%err, "failed to get hostname, using localhost");
            "localhost".to_string()
        }
    }
}

/// Collection ids of `sync_type` that have a log under `decsync_dir`.
///
/// # Errors
///
/// Returns an error if the directory exists but cannot be read.
pub fn list_collections(decsync_dir: &Path, sync_type: &str) -> Result<Vec<String>, DecsyncError> {
    list_dirs(&decsync_dir.join(encode_segment(sync_type)))
}

/// Newest value of `info` key `key` of a collection across all instances,
/// `null` if it was never set.
///
/// # Errors
///
/// Returns an error if a log file exists but cannot be read.
pub fn get_static_info(
    decsync_dir: &Path,
    sync_type: &str,
    collection: &str,
    key: &str,
) -> Result<Value, DecsyncError> {
    let new_entries = decsync_dir
        .join(encode_segment(sync_type))
        .join(encode_segment(collection))
        .join("new-entries");

    let key = Value::String(key.to_string());
    let mut latest: Option<Entry> = None;
    for app_id in list_dirs(&new_entries)? {
        let file = new_entries.join(encode_segment(&app_id)).join("info");
        for entry in read_entries(&file)? {
            if entry.key != key {
                continue;
            }
            if latest.as_ref().is_none_or(|current| entry.supersedes(current)) {
                latest = Some(entry);
            }
        }
    }
    Ok(latest.map_or(Value::Null, |e| e.value))
}
