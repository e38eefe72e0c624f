// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};

use bimap::BiBTreeMap;

use crate::io::{read_optional, write_atomic};
use crate::{Error, SyncType};

/// Name of the mapping file inside a collection directory.
pub const HREFS_FILE: &str = ".davsync-hrefs.json";

/// Bidirectional map between item uids and the hrefs they are stored under.
///
/// Uids without an entry map to `<uid><suffix>`, so only hrefs chosen by
/// clients need to be recorded. The map is persisted after every change.
#[derive(Debug)]
pub struct HrefMap {
    path: PathBuf,
    suffix: &'static str,
    map: BiBTreeMap<String, String>,
}

impl HrefMap {
    /// Loads the map stored in a collection directory.
    ///
    /// A missing or unreadable file yields an empty map.
    pub fn load(collection_dir: &Path, sync_type: SyncType) -> Self {
        let path = collection_dir.join(HREFS_FILE);
        let map = match read_optional(&path) {
            Ok(Some(content)) => match serde_json::from_str(&content) {
                Ok(map) => {
                    tracing::debug!(path = %path.display(), "loaded href map");
                    map
                }
                Err(err) => {
                    tracing::warn!(path = %path.display(), %err, "failed to parse href map, starting empty");
                    BiBTreeMap::new()
                }
            },
            Ok(None) => BiBTreeMap::new(),
            Err(err) => {
                tracing::warn!(%err, "failed to read href map, starting empty");
                BiBTreeMap::new()
            }
        };

        Self {
            path,
            suffix: sync_type.suffix(),
            map,
        }
    }

    /// Href of the item with `uid`.
    ///
    /// A uid whose default href is held by another uid gets `<uid>~<n>`
    /// instead. Without the suffix, that href is never another uid's default.
    pub fn get_href(&self, uid: &str) -> String {
        if let Some(href) = self.map.get_by_left(uid) {
            return href.clone();
        }

        let default = self.default_href(uid);
        if !self.map.contains_right(&default) {
            return default;
        }
        (1_u32..)
            .map(|n| format!("{uid}~{n}"))
            .find(|href| !self.map.contains_right(href))
            .unwrap_or(default)
    }

    /// Uid of the item stored under `href`.
    pub fn get_uid(&self, href: &str) -> String {
        match self.map.get_by_right(href) {
            Some(uid) => uid.clone(),
            None => href.strip_suffix(self.suffix).unwrap_or(href).to_string(),
        }
    }

    /// Records that `uid` is stored under `href` and persists the map.
    ///
    /// Returns `false` without touching the file when the pair is already
    /// implied.
    ///
    /// # Errors
    ///
    /// Returns an error if the map cannot be written.
    #[tracing::instrument(skip(self))]
    pub fn set_href(&mut self, uid: &str, href: &str) -> Result<bool, Error> {
        if self.is_implied(uid, href) {
            return Ok(false);
        }

        // Overwrites any pair sharing the uid or the href.
        self.map.insert(uid.to_string(), href.to_string());
        let content = serde_json::to_vec(&self.map)?;
        write_atomic(&self.path, &content)?;
        Ok(true)
    }

    /// Href for storing `uid`, recording it when it is not implied.
    ///
    /// # Errors
    ///
    /// Returns an error if the map cannot be written.
    pub fn claim_href(&mut self, uid: &str) -> Result<String, Error> {
        let href = self.get_href(uid);
        self.set_href(uid, &href)?;
        Ok(href)
    }

    fn default_href(&self, uid: &str) -> String {
        format!("{uid}{}", self.suffix)
    }

    /// Whether `uid` resolves to `href` without a recorded pair.
    fn is_implied(&self, uid: &str, href: &str) -> bool {
        match self.map.get_by_left(uid) {
            Some(mapped) => mapped == href,
            None => href == self.default_href(uid) && !self.map.contains_right(href),
        }
    }
}
