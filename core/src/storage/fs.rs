// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::{Collection, Collections, Props, Store, path_attributes};
use crate::io::{digest, read_optional, write_atomic};
use crate::{Depth, Error, Item};

const COLLECTION_ROOT: &str = "collection-root";
const PROPS_FILE: &str = ".props.json";
const SYNC_CACHE_DIR: &str = ".sync-cache";
const SYNC_TOKEN_PREFIX: &str = "sync-";

/// Collections stored as directories of item files below
/// `<storage_root>/collection-root/`.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(storage_root: impl AsRef<Path>) -> Self {
        Self {
            root: storage_root.as_ref().join(COLLECTION_ROOT),
        }
    }

    /// Directory holding the collection at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPath`] if a segment is hidden or walks upwards.
    pub fn collection_dir(&self, path: &str) -> Result<PathBuf, Error> {
        let attributes = path_attributes(path);
        if attributes.iter().any(|s| s.starts_with('.') || s.contains('\\')) {
            return Err(Error::InvalidPath(path.to_string()));
        }
        Ok(attributes.iter().fold(self.root.clone(), |dir, s| dir.join(s)))
    }

    fn open(&self, path: &str) -> Result<FsCollection, Error> {
        let dir = self.collection_dir(path)?;
        let props = match read_optional(&dir.join(PROPS_FILE))? {
            Some(content) => serde_json::from_str(&content)?,
            None => Props::new(),
        };
        Ok(FsCollection {
            path: path_attributes(path).join("/"),
            dir,
            props,
        })
    }
}

impl Store for FsStore {
    type Collection = FsCollection;

    #[tracing::instrument(skip(self))]
    fn discover(&self, path: &str, depth: Depth) -> Result<Collections<'_, FsCollection>, Error> {
        let dir = self.collection_dir(path)?;
        if !dir.is_dir() {
            return Ok(Box::new(std::iter::empty()));
        }

        let parent = self.open(path)?;
        let mut collections = Vec::new();
        if depth.is_recursive() {
            for name in list_names(&dir, |t| t.is_dir())? {
                let child = format!("{}/{name}", parent.path);
                collections.push(self.open(&child));
            }
        }
        Ok(Box::new(std::iter::once(Ok(parent)).chain(collections)))
    }

    #[tracing::instrument(skip(self, items), fields(items = items.len()))]
    fn create_collection(
        &self,
        path: &str,
        items: Vec<(String, Item)>,
        props: Option<Props>,
    ) -> Result<FsCollection, Error> {
        let dir = self.collection_dir(path)?;
        fs::create_dir_all(&dir).map_err(Error::io(&dir))?;

        let mut collection = self.open(path)?;
        if let Some(props) = props {
            collection.set_meta_all(props)?;
        }
        for (href, item) in items {
            collection.upload(&href, item)?;
        }
        tracing::debug!(path = %collection.path, "created collection");
        Ok(collection)
    }
}

/// A directory of item files with its properties in a hidden JSON file.
#[derive(Debug)]
pub struct FsCollection {
    path: String,
    dir: PathBuf,
    props: Props,
}

impl FsCollection {
    fn item_path(&self, href: &str) -> Result<PathBuf, Error> {
        if href.is_empty() || href.starts_with('.') || href.contains(['/', '\\']) {
            return Err(Error::InvalidHref(href.to_string()));
        }
        Ok(self.dir.join(href))
    }

    /// Etag of every item file by href.
    fn snapshot(&self) -> Result<BTreeMap<String, String>, Error> {
        let mut state = BTreeMap::new();
        for href in self.list()? {
            let path = self.dir.join(&href);
            let content = fs::read(&path).map_err(Error::io(&path))?;
            state.insert(href, format!("\"{}\"", digest([content])));
        }
        Ok(state)
    }

    fn state_digest(&self, state: &BTreeMap<String, String>) -> Result<String, Error> {
        let state = serde_json::to_vec(state)?;
        let props = serde_json::to_vec(&self.props)?;
        Ok(digest([state, props]))
    }
}

impl Collection for FsCollection {
    fn path(&self) -> &str {
        &self.path
    }

    fn filesystem_path(&self) -> &Path {
        &self.dir
    }

    fn get(&self, href: &str) -> Result<Option<Item>, Error> {
        match read_optional(&self.item_path(href)?)? {
            Some(text) => Ok(Some(Item::parse(&text)?)),
            None => Ok(None),
        }
    }

    fn list(&self) -> Result<Vec<String>, Error> {
        list_names(&self.dir, |t| t.is_file())
    }

    #[tracing::instrument(skip(self, item), fields(collection = %self.path))]
    fn upload(&mut self, href: &str, item: Item) -> Result<Item, Error> {
        write_atomic(&self.item_path(href)?, item.text().as_bytes())?;
        Ok(item)
    }

    #[tracing::instrument(skip(self), fields(collection = %self.path))]
    fn delete(&mut self, href: Option<&str>) -> Result<(), Error> {
        match href {
            Some(href) => {
                let path = self.item_path(href)?;
                fs::remove_file(&path).map_err(|e| match e.kind() {
                    io::ErrorKind::NotFound => Error::NotFound(href.to_string()),
                    _ => Error::io(&path)(e),
                })
            }
            None => fs::remove_dir_all(&self.dir).map_err(Error::io(&self.dir)),
        }
    }

    fn get_meta(&self, key: &str) -> Option<String> {
        self.props.get(key).cloned()
    }

    fn get_meta_all(&self) -> Props {
        self.props.clone()
    }

    fn set_meta_all(&mut self, props: Props) -> Result<(), Error> {
        write_atomic(&self.dir.join(PROPS_FILE), &serde_json::to_vec(&props)?)?;
        self.props = props;
        Ok(())
    }

    fn etag(&mut self) -> Result<String, Error> {
        let state = self.snapshot()?;
        Ok(format!("\"{}\"", self.state_digest(&state)?))
    }

    #[tracing::instrument(skip(self), fields(collection = %self.path))]
    fn sync(&mut self, old_token: Option<&str>) -> Result<(String, Vec<String>), Error> {
        let state = self.snapshot()?;
        let token = format!("{SYNC_TOKEN_PREFIX}{}", self.state_digest(&state)?);

        let cache = self.dir.join(SYNC_CACHE_DIR);
        let current = cache.join(format!("{token}.json"));
        if !current.exists() {
            write_atomic(&current, &serde_json::to_vec(&state)?)?;
        }

        let old = match old_token {
            Some(old_token) => {
                let valid = old_token
                    .strip_prefix(SYNC_TOKEN_PREFIX)
                    .is_some_and(|h| !h.is_empty() && h.chars().all(|c| c.is_ascii_hexdigit()));
                if !valid {
                    return Err(Error::InvalidSyncToken(old_token.to_string()));
                }
                match read_optional(&cache.join(format!("{old_token}.json")))? {
                    Some(content) => Some(serde_json::from_str::<BTreeMap<String, String>>(&content)?),
                    None => {
                        tracing::debug!(old_token, "unknown sync token, reporting everything");
                        None
                    }
                }
            }
            None => None,
        };

        let changed = match old {
            Some(old) => old
                .keys()
                .chain(state.keys())
                .filter(|href| old.get(*href) != state.get(*href))
                .cloned()
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
            None => state.into_keys().collect(),
        };
        Ok((token, changed))
    }
}

/// Sorted names of visible directory entries whose type passes `filter`.
fn list_names(dir: &Path, filter: impl Fn(&fs::FileType) -> bool) -> Result<Vec<String>, Error> {
    let reader = match fs::read_dir(dir) {
        Ok(reader) => reader,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(Error::io(dir)(e)),
    };

    let mut names = Vec::new();
    for entry in reader {
        let entry = entry.map_err(Error::io(dir))?;
        let file_type = entry.file_type().map_err(Error::io(&entry.path()))?;
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if !name.starts_with('.') && filter(&file_type) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}
