// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! On-disk layout helpers: segment encoding, entry files and directory walks.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::entry::Entry;
use crate::error::DecsyncError;

/// Percent-encodes a path segment. A leading `.` is encoded too, so segments
/// never turn into hidden or relative names.
pub(crate) fn encode_segment(segment: &str) -> String {
    let encoded = urlencoding::encode(segment).into_owned();
    match encoded.strip_prefix('.') {
        Some(rest) => format!("%2E{rest}"),
        None => encoded,
    }
}

pub(crate) fn decode_segment(name: &str) -> Option<String> {
    urlencoding::decode(name).ok().map(|s| s.into_owned())
}

/// Joins encoded `path` segments onto `base`.
pub(crate) fn join<S: AsRef<str>>(base: &Path, path: &[S]) -> PathBuf {
    path.iter()
        .fold(base.to_path_buf(), |acc, seg| acc.join(encode_segment(seg.as_ref())))
}

pub(crate) fn validate_path<S: AsRef<str>>(path: &[S]) -> Result<Vec<String>, DecsyncError> {
    let path: Vec<String> = path.iter().map(|s| s.as_ref().to_string()).collect();
    if path.is_empty() || path.iter().any(String::is_empty) {
        return Err(DecsyncError::InvalidPath(path));
    }
    Ok(path)
}

/// Decoded names of the visible subdirectories of `dir`, sorted. A missing
/// directory has none.
pub(crate) fn list_dirs(dir: &Path) -> Result<Vec<String>, DecsyncError> {
    let reader = match fs::read_dir(dir) {
        Ok(reader) => reader,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(DecsyncError::io(dir)(e)),
    };

    let mut names = Vec::new();
    for entry in reader {
        let entry = entry.map_err(DecsyncError::io(dir))?;
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if name.starts_with('.') || !entry.path().is_dir() {
            continue;
        }
        if let Some(name) = decode_segment(&name) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

/// Decoded paths, relative to `base`, of every visible file under `base`,
/// sorted. If `base` is itself a file the single empty path is returned.
pub(crate) fn walk_files(base: &Path) -> Result<Vec<Vec<String>>, DecsyncError> {
    let mut files = Vec::new();
    if base.is_file() {
        files.push(Vec::new());
    } else if base.is_dir() {
        walk_into(base, &mut Vec::new(), &mut files)?;
    }
    files.sort();
    Ok(files)
}

fn walk_into(
    dir: &Path,
    prefix: &mut Vec<String>,
    files: &mut Vec<Vec<String>>,
) -> Result<(), DecsyncError> {
    for entry in fs::read_dir(dir).map_err(DecsyncError::io(dir))? {
        let entry = entry.map_err(DecsyncError::io(dir))?;
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if name.starts_with('.') {
            continue;
        }
        let Some(segment) = decode_segment(&name) else {
            continue;
        };

        let file_type = entry.file_type().map_err(DecsyncError::io(dir))?;
        if file_type.is_symlink() {
            tracing::debug!(path = %entry.path().display(), "skipping symlink in log");
            continue;
        }

        prefix.push(segment);
        if file_type.is_dir() {
            walk_into(&entry.path(), prefix, files)?;
        } else {
            files.push(prefix.clone());
        }
        prefix.pop();
    }
    Ok(())
}

/// Parses JSON-line entries. Malformed lines are skipped.
pub(crate) fn parse_entries(file: &Path, text: &str) -> Vec<Entry> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match Entry::from_line(line) {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::warn!(path = %file.display(), %err, "skipping malformed entry");
                None
            }
        })
        .collect()
}

/// Reads every entry of `file`; a missing file has none.
pub(crate) fn read_entries(file: &Path) -> Result<Vec<Entry>, DecsyncError> {
    match fs::read_to_string(file) {
        Ok(text) => Ok(parse_entries(file, &text)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(DecsyncError::io(file)(e)),
    }
}

pub(crate) fn append_entry(file: &Path, entry: &Entry) -> Result<(), DecsyncError> {
    ensure_parent(file)?;
    let line = entry.to_line()?;
    let mut f = OpenOptions::new()
        .create(true)
        .append(true)
        .open(file)
        .map_err(DecsyncError::io(file))?;
    writeln!(f, "{line}").map_err(DecsyncError::io(file))
}

/// Replaces the content of `file` with `entries`, atomically.
pub(crate) fn write_entries(file: &Path, entries: &[Entry]) -> Result<(), DecsyncError> {
    let mut text = String::new();
    for entry in entries {
        text.push_str(&entry.to_line()?);
        text.push('\n');
    }
    write_atomic(file, text.as_bytes())
}

pub(crate) fn write_atomic(file: &Path, contents: &[u8]) -> Result<(), DecsyncError> {
    let dir = ensure_parent(file)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(DecsyncError::io(dir))?;
    tmp.write_all(contents).map_err(DecsyncError::io(file))?;
    tmp.as_file().sync_all().map_err(DecsyncError::io(file))?;
    tmp.persist(file)
        .map_err(|e| DecsyncError::io(file)(e.error))?;
    Ok(())
}

fn ensure_parent(file: &Path) -> Result<&Path, DecsyncError> {
    let dir = file
        .parent()
        .ok_or_else(|| DecsyncError::io(file)(io::ErrorKind::InvalidInput.into()))?;
    fs::create_dir_all(dir).map_err(DecsyncError::io(dir))?;
    Ok(dir)
}
