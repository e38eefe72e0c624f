// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Applies sync log entries of other writers to the local collection.

use davsync_decsync::{Decsync, Entry, Listener, Value};

use crate::hrefs::HrefMap;
use crate::storage::{CALENDAR_COLOR, Collection, DISPLAY_NAME};
use crate::{Error, Item, SyncType};

/// Info key tombstoning the collection.
pub(crate) const INFO_DELETED: &str = "deleted";
/// Info key carrying the display name.
pub(crate) const INFO_NAME: &str = "name";
/// Info key carrying the calendar color.
pub(crate) const INFO_COLOR: &str = "color";

/// Top-level channels of a collection log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Channel {
    /// Collection metadata, keyed by info key with an empty path.
    Info,
    /// Items, one path segment per uid with a null key.
    Resources,
}

impl Channel {
    pub(crate) const ALL: [Self; 2] = [Self::Info, Self::Resources];

    pub(crate) const fn name(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Resources => "resources",
        }
    }

    /// Path prefix of the channel in the log.
    pub(crate) const fn path(self) -> [&'static str; 1] {
        [self.name()]
    }

    fn listener<C: Collection>(self) -> Listener<Replica<C>, Error> {
        match self {
            Self::Info => apply_info::<C>,
            Self::Resources => apply_resource::<C>,
        }
    }

    /// Registers the handler of every channel.
    pub(crate) fn register_all<C: Collection>(log: &mut Decsync<Replica<C>, Error>) {
        for channel in Self::ALL {
            log.add_listener(&channel.path(), channel.listener::<C>());
        }
    }
}

/// Local side of a bound collection, mutated without publishing to the log.
#[derive(Debug)]
pub(crate) struct Replica<C> {
    pub(crate) local: C,
    pub(crate) hrefs: HrefMap,
    pub(crate) sync_type: SyncType,
    removed: bool,
}

impl<C: Collection> Replica<C> {
    pub(crate) fn new(local: C, sync_type: SyncType) -> Self {
        let hrefs = HrefMap::load(local.filesystem_path(), sync_type);
        Self {
            local,
            hrefs,
            sync_type,
            removed: false,
        }
    }

    /// Whether the collection was deleted.
    pub(crate) fn is_removed(&self) -> bool {
        self.removed
    }

    pub(crate) fn upload(&mut self, href: &str, item: Item) -> Result<Item, Error> {
        self.local.upload(href, item)
    }

    pub(crate) fn delete(&mut self, href: Option<&str>) -> Result<(), Error> {
        self.local.delete(href)?;
        if href.is_none() {
            self.removed = true;
        }
        Ok(())
    }

    /// Deletes the item at `href`, doing nothing if there is none.
    fn delete_if_exists(&mut self, href: &str) -> Result<(), Error> {
        if self.local.get(href)?.is_none() {
            tracing::debug!(href, "tombstone for absent item");
            return Ok(());
        }
        self.delete(Some(href))
    }

    /// Sets or, for a null value, removes one property.
    fn set_meta(&mut self, key: &str, prop: &str, value: &Value) -> Result<(), Error> {
        let value = match value {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            _ => {
                return Err(Error::InvalidInfoValue {
                    key: key.to_string(),
                    value: value.clone(),
                });
            }
        };

        let mut props = self.local.get_meta_all();
        let changed = match value {
            Some(value) => props.insert(prop.to_string(), value.clone()) != Some(value),
            None => props.remove(prop).is_some(),
        };
        if changed {
            self.local.set_meta_all(props)?;
        }
        Ok(())
    }
}

fn apply_info<C: Collection>(replica: &mut Replica<C>, _path: &[String], entry: &Entry) -> Result<(), Error> {
    if replica.removed {
        tracing::debug!(key = %entry.key, "collection already deleted, skipping info entry");
        return Ok(());
    }

    let key = entry
        .key
        .as_str()
        .ok_or_else(|| Error::UnknownInfoKey(entry.key.to_string()))?;
    match key {
        INFO_DELETED => {
            if entry.value == Value::Bool(true) {
                tracing::info!(path = replica.local.path(), "collection deleted by peer");
                replica.delete(None)?;
            }
            Ok(())
        }
        INFO_NAME => replica.set_meta(key, DISPLAY_NAME, &entry.value),
        INFO_COLOR => replica.set_meta(key, CALENDAR_COLOR, &entry.value),
        _ => Err(Error::UnknownInfoKey(key.to_string())),
    }
}

fn apply_resource<C: Collection>(replica: &mut Replica<C>, path: &[String], entry: &Entry) -> Result<(), Error> {
    let [uid] = path else {
        return Err(Error::InvalidResourcePath(path.to_vec()));
    };
    if replica.removed {
        return Ok(());
    }

    match &entry.value {
        Value::Null => {
            let href = replica.hrefs.get_href(uid);
            replica.delete_if_exists(&href)
        }
        Value::String(text) => {
            let item = Item::parse_sanitized(text, Some(uid), replica.sync_type.tag())?;
            let href = replica.hrefs.claim_href(uid)?;
            replica.upload(&href, item)?;
            Ok(())
        }
        value => Err(Error::InvalidResourceValue {
            uid: uid.clone(),
            value: value.clone(),
        }),
    }
}
