// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Assertion helpers over collections and the raw sync log files.

use std::fs;

use davsync_core::storage::Collection;
use davsync_decsync::Value;

use super::TempDirs;

/// Asserts that `collection` holds exactly `expected` hrefs.
///
/// # Panics
///
/// Panics if the hrefs differ.
pub fn assert_hrefs(collection: &impl Collection, expected: &[&str]) {
    let hrefs = collection.list().unwrap();
    assert_eq!(hrefs, expected, "hrefs of {}", collection.path());
}

/// `(key, value)` of every entry `app_id` appended at `path` of a
/// collection log, in file order.
pub fn log_entries(
    dirs: &TempDirs,
    sync_type: &str,
    id: &str,
    app_id: &str,
    path: &[&str],
) -> Vec<(Value, Value)> {
    let mut file = dirs
        .decsync_dir
        .join(sync_type)
        .join(id)
        .join("new-entries")
        .join(app_id);
    for segment in path {
        file.push(segment);
    }

    let Ok(content) = fs::read_to_string(&file) else {
        return Vec::new();
    };
    content
        .lines()
        .map(|line| {
            let (_, key, value): (String, Value, Value) = serde_json::from_str(line).unwrap();
            (key, value)
        })
        .collect()
}

/// Whether `app_id` has never appended to the collection log.
#[must_use]
pub fn own_log_is_empty(dirs: &TempDirs, sync_type: &str, id: &str, app_id: &str) -> bool {
    !dirs
        .decsync_dir
        .join(sync_type)
        .join(id)
        .join("new-entries")
        .join(app_id)
        .exists()
}
