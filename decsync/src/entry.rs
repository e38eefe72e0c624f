// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::cmp::Ordering;

use jiff::civil::DateTime;
use jiff::{Span, Timestamp};
use serde_json::Value;

/// A single logged fact: at `datetime`, `key` under some path was set to
/// `value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// UTC datetime, `YYYY-MM-DDTHH:MM:SS.mmm`; compares lexicographically.
    pub datetime: String,
    /// Key within the path, `null` for single-valued paths.
    pub key: Value,
    /// Value, `null` for a tombstone.
    pub value: Value,
}

impl Entry {
    /// Creates an entry stamped with the current time.
    #[must_use]
    pub fn now(key: Value, value: Value) -> Self {
        Self {
            datetime: current_datetime(),
            key,
            value,
        }
    }

    /// Like [`Entry::now`], but one millisecond after `previous` when the
    /// clock has not moved past it, so one writer's entries for a key are
    /// strictly ordered.
    pub(crate) fn now_after(key: Value, value: Value, previous: Option<&Self>) -> Self {
        let mut entry = Self::now(key, value);
        if let Some(previous) = previous.filter(|p| p.datetime >= entry.datetime) {
            if let Some(next) = next_datetime(&previous.datetime) {
                entry.datetime = next;
            }
        }
        entry
    }

    /// Whether this entry wins over `other` for the same path and key.
    ///
    /// The later datetime wins; equal datetimes fall back to the JSON text of
    /// the value so every peer picks the same winner.
    #[must_use]
    pub fn supersedes(&self, other: &Self) -> bool {
        match self.datetime.cmp(&other.datetime) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => self.value.to_string() > other.value.to_string(),
        }
    }

    pub(crate) fn to_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&(&self.datetime, &self.key, &self.value))
    }

    pub(crate) fn from_line(line: &str) -> Result<Self, serde_json::Error> {
        let (datetime, key, value): (String, Value, Value) = serde_json::from_str(line)?;
        Ok(Self {
            datetime,
            key,
            value,
        })
    }
}

fn current_datetime() -> String {
    let now = Timestamp::now();
    format!(
        "{}.{:03}",
        now.strftime("%Y-%m-%dT%H:%M:%S"),
        now.subsec_millisecond()
    )
}

fn next_datetime(datetime: &str) -> Option<String> {
    let dt: DateTime = datetime.parse().ok()?;
    let next = dt.checked_add(Span::new().milliseconds(1)).ok()?;
    Some(format!(
        "{}.{:03}",
        next.strftime("%Y-%m-%dT%H:%M:%S"),
        next.millisecond()
    ))
}
