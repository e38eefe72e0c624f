// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::entry::Entry;
use crate::error::DecsyncError;
use crate::layout::{
    append_entry, encode_segment, join, list_dirs, parse_entries, read_entries, validate_path,
    walk_files, write_atomic, write_entries,
};

/// Callback invoked for every applied entry whose path starts with the
/// listener's prefix. It receives the caller's context, the path with the
/// prefix stripped, and the entry.
pub type Listener<C, E> = fn(&mut C, &[String], &Entry) -> Result<(), E>;

/// The sync log of one collection, seen from one application instance.
///
/// `C` is the context handed to listeners and `E` the error they return.
pub struct Decsync<C, E = DecsyncError> {
    dir: PathBuf,
    own_app_id: String,
    listeners: Vec<(Vec<String>, Listener<C, E>)>,
    _context: PhantomData<fn(&mut C)>,
}

impl<C, E> fmt::Debug for Decsync<C, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decsync")
            .field("dir", &self.dir)
            .field("own_app_id", &self.own_app_id)
            .field(
                "listeners",
                &self.listeners.iter().map(|(p, _)| p).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl<C, E: From<DecsyncError>> Decsync<C, E> {
    /// Opens the log of `collection` of `sync_type` under `decsync_dir`.
    ///
    /// Nothing is created on disk until the first entry is written.
    pub fn new(
        decsync_dir: &Path,
        sync_type: &str,
        collection: &str,
        own_app_id: impl Into<String>,
    ) -> Self {
        Self {
            dir: decsync_dir
                .join(encode_segment(sync_type))
                .join(encode_segment(collection)),
            own_app_id: own_app_id.into(),
            listeners: Vec::new(),
            _context: PhantomData,
        }
    }

    /// Directory holding this collection's log.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Identity under which this instance writes.
    #[must_use]
    pub fn own_app_id(&self) -> &str {
        &self.own_app_id
    }

    /// Registers `listener` for every entry whose path starts with `prefix`.
    pub fn add_listener<S: AsRef<str>>(&mut self, prefix: &[S], listener: Listener<C, E>) {
        let prefix = prefix.iter().map(|s| s.as_ref().to_string()).collect();
        self.listeners.push((prefix, listener));
    }

    /// Appends an entry for `path` and `key`, stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is empty or a file cannot be written.
    #[tracing::instrument(skip(self, value), fields(dir = %self.dir.display()))]
    pub fn set_entry<S: AsRef<str> + fmt::Debug>(
        &self,
        path: &[S],
        key: Value,
        value: Value,
    ) -> Result<(), DecsyncError> {
        let path = validate_path(path)?;
        let stored = read_entries(&join(&self.stored_entries_dir(), &path))?;
        let previous = stored.iter().find(|e| e.key == key);
        let entry = Entry::now_after(key, value, previous);

        append_entry(&join(&self.new_entries_dir(&self.own_app_id), &path), &entry)?;
        self.store_entry(&path, entry, false)?;
        Ok(())
    }

    /// Applies every entry other instances appended since the last call.
    ///
    /// Files are consumed in order; an entry reaches the listeners only when
    /// it supersedes what is stored for its path and key.
    ///
    /// # Errors
    ///
    /// Returns the first listener error or I/O failure. The read position of
    /// the file being processed is left unchanged, so the remaining entries
    /// are retried on the next call.
    #[tracing::instrument(skip(self, ctx), fields(dir = %self.dir.display()))]
    pub fn execute_all_new_entries(&self, ctx: &mut C) -> Result<(), E> {
        let new_entries = self.dir.join("new-entries");
        for app_id in list_dirs(&new_entries)? {
            if app_id == self.own_app_id {
                continue;
            }
            for path in walk_files(&new_entries.join(encode_segment(&app_id)))? {
                self.execute_new_file(&app_id, &path, ctx)?;
            }
        }
        Ok(())
    }

    /// Seeds this instance's stored entries with the newest entry per path
    /// and key across all instances, and marks everything as read.
    ///
    /// Used when a collection is materialized locally for the first time.
    ///
    /// # Errors
    ///
    /// Returns an error if a log file cannot be read or written.
    #[tracing::instrument(skip(self), fields(dir = %self.dir.display()))]
    pub fn init_stored_entries(&self) -> Result<(), DecsyncError> {
        let new_entries = self.dir.join("new-entries");
        for app_id in list_dirs(&new_entries)? {
            let app_dir = new_entries.join(encode_segment(&app_id));
            for path in walk_files(&app_dir)? {
                let file = join(&app_dir, &path);
                let content = fs::read(&file).map_err(DecsyncError::io(&file))?;
                let consumed = complete_lines(&content);
                let text = String::from_utf8_lossy(content.get(..consumed).unwrap_or_default());
                for entry in parse_entries(&file, &text) {
                    self.store_entry(&path, entry, true)?;
                }
                if app_id != self.own_app_id {
                    self.set_read_bytes(&app_id, &path, consumed as u64)?;
                }
            }
        }
        Ok(())
    }

    /// Replays this instance's stored entries under `prefix` through the
    /// listeners, in path order.
    ///
    /// # Errors
    ///
    /// Returns the first listener error or I/O failure.
    #[tracing::instrument(skip(self, ctx), fields(dir = %self.dir.display()))]
    pub fn execute_stored_entries_for_path<S: AsRef<str> + fmt::Debug>(
        &self,
        prefix: &[S],
        ctx: &mut C,
    ) -> Result<(), E> {
        let prefix: Vec<String> = prefix.iter().map(|s| s.as_ref().to_string()).collect();
        let base = join(&self.stored_entries_dir(), &prefix);
        let mut count = 0_usize;
        for rest in walk_files(&base)? {
            let path: Vec<String> = prefix.iter().chain(&rest).cloned().collect();
            for entry in read_entries(&join(&base, &rest))? {
                self.dispatch(&path, &entry, ctx)?;
                count += 1;
            }
        }
        tracing::debug!(count, "replayed stored entries");
        Ok(())
    }

    fn execute_new_file(&self, app_id: &str, path: &[String], ctx: &mut C) -> Result<(), E> {
        let file = join(&self.new_entries_dir(app_id), path);
        let read_bytes = self.read_bytes(app_id, path);
        let content = fs::read(&file).map_err(DecsyncError::io(&file))?;
        let unread = content
            .get(usize::try_from(read_bytes).unwrap_or(usize::MAX)..)
            .unwrap_or_default();
        let consumed = complete_lines(unread);
        if consumed == 0 {
            return Ok(());
        }

        let text = String::from_utf8_lossy(unread.get(..consumed).unwrap_or_default());
        let entries = parse_entries(&file, &text);
        tracing::debug!(app_id, ?path, count = entries.len(), "executing new entries");
        for entry in entries {
            self.execute_entry(path, entry, ctx)?;
        }

        self.set_read_bytes(app_id, path, read_bytes + consumed as u64)?;
        Ok(())
    }

    fn execute_entry(&self, path: &[String], entry: Entry, ctx: &mut C) -> Result<(), E> {
        let stored = read_entries(&join(&self.stored_entries_dir(), path))?;
        if let Some(current) = stored.iter().find(|e| e.key == entry.key) {
            if !entry.supersedes(current) {
                return Ok(());
            }
        }

        self.dispatch(path, &entry, ctx)?;
        self.store_entry(path, entry, false)?;
        Ok(())
    }

    fn dispatch(&self, path: &[String], entry: &Entry, ctx: &mut C) -> Result<(), E> {
        for (prefix, listener) in &self.listeners {
            if path.starts_with(prefix) {
                let rest = path.get(prefix.len()..).unwrap_or_default();
                listener(ctx, rest, entry)?;
            }
        }
        Ok(())
    }

    /// Stores `entry` as the current one for its key. With `keep_newer`, an
    /// already stored entry that `entry` does not supersede is kept.
    fn store_entry(
        &self,
        path: &[String],
        entry: Entry,
        keep_newer: bool,
    ) -> Result<(), DecsyncError> {
        let file = join(&self.stored_entries_dir(), path);
        let mut stored = read_entries(&file)?;
        match stored.iter_mut().find(|e| e.key == entry.key) {
            Some(current) if keep_newer && !entry.supersedes(current) => return Ok(()),
            Some(current) => *current = entry,
            None => stored.push(entry),
        }
        write_entries(&file, &stored)
    }

    fn read_bytes(&self, app_id: &str, path: &[String]) -> u64 {
        fs::read_to_string(self.read_bytes_file(app_id, path))
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(0)
    }

    fn set_read_bytes(&self, app_id: &str, path: &[String], bytes: u64) -> Result<(), DecsyncError> {
        write_atomic(&self.read_bytes_file(app_id, path), bytes.to_string().as_bytes())
    }

    fn read_bytes_file(&self, app_id: &str, path: &[String]) -> PathBuf {
        let dir = self
            .dir
            .join("read-bytes")
            .join(encode_segment(&self.own_app_id))
            .join(encode_segment(app_id));
        join(&dir, path)
    }

    fn new_entries_dir(&self, app_id: &str) -> PathBuf {
        self.dir.join("new-entries").join(encode_segment(app_id))
    }

    fn stored_entries_dir(&self) -> PathBuf {
        self.dir
            .join("stored-entries")
            .join(encode_segment(&self.own_app_id))
    }
}

/// Length of the prefix of `bytes` made of complete, newline-terminated
/// lines. A line still being written by another instance is left for later.
fn complete_lines(bytes: &[u8]) -> usize {
    bytes
        .iter()
        .rposition(|b| *b == b'\n')
        .map_or(0, |i| i + 1)
}
