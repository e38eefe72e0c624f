// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};

use davsync_decsync::{Decsync, Value};
use davsync_vobject::ItemError;

use crate::inbound::{Channel, INFO_COLOR, INFO_DELETED, INFO_NAME, Replica};
use crate::storage::{CALENDAR_COLOR, Collection, DISPLAY_NAME, Props, path_attributes};
use crate::{Error, Item, Origin, SyncType};

/// Where and as whom collections talk to the sync log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// Root of the sync log.
    pub decsync_dir: PathBuf,
    /// Identity of this writer.
    pub app_id: String,
}

/// A local collection kept in sync with its log.
///
/// Collections directly below a principal, named `<sync_type>-<id>`, are
/// bound to the log of `id`. Local mutations are published after they are
/// applied; reads first apply whatever other writers appended. Other
/// collections pass everything through unchanged.
#[derive(Debug)]
pub struct DecsyncCollection<C> {
    state: State<C>,
}

#[derive(Debug)]
enum State<C> {
    Unbound(C),
    Bound(Box<Bound<C>>),
}

#[derive(Debug)]
struct Bound<C> {
    replica: Replica<C>,
    log: Decsync<Replica<C>, Error>,
}

impl<C: Collection> DecsyncCollection<C> {
    /// Wraps `local`, binding it to its log if its path names one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownSyncType`] if a collection below a principal
    /// is not prefixed with a known sync type.
    pub fn bind(local: C, settings: &LogSettings) -> Result<Self, Error> {
        let Some((sync_type, id)) = log_name(local.path())? else {
            return Ok(Self {
                state: State::Unbound(local),
            });
        };

        let mut log = Decsync::new(&settings.decsync_dir, sync_type.as_ref(), &id, settings.app_id.clone());
        Channel::register_all(&mut log);
        tracing::debug!(path = local.path(), %sync_type, %id, "bound collection to sync log");
        Ok(Self {
            state: State::Bound(Box::new(Bound {
                replica: Replica::new(local, sync_type),
                log,
            })),
        })
    }

    /// The wrapped collection.
    pub fn local(&self) -> &C {
        match &self.state {
            State::Unbound(local) => local,
            State::Bound(bound) => &bound.replica.local,
        }
    }

    /// Sync type of the bound log, `None` for an unbound collection.
    pub fn sync_type(&self) -> Option<SyncType> {
        match &self.state {
            State::Unbound(_) => None,
            State::Bound(bound) => Some(bound.replica.sync_type),
        }
    }

    /// Whether the collection was deleted, locally or by a peer.
    pub fn is_removed(&self) -> bool {
        match &self.state {
            State::Unbound(_) => false,
            State::Bound(bound) => bound.replica.is_removed(),
        }
    }

    /// Seeds the stored entries from every writer and replays them, info
    /// before resources.
    ///
    /// Used on a collection just materialized from the log.
    pub(crate) fn prime(&mut self) -> Result<(), Error> {
        let State::Bound(bound) = &mut self.state else {
            return Ok(());
        };
        let Bound { replica, log } = &mut **bound;
        log.init_stored_entries()?;
        for channel in Channel::ALL {
            log.execute_stored_entries_for_path(&channel.path(), replica)?;
        }
        Ok(())
    }

    /// Applies every entry other writers appended since the last pull.
    #[tracing::instrument(skip(self), fields(path = self.local().path()))]
    pub fn pull(&mut self) -> Result<(), Error> {
        match &mut self.state {
            State::Unbound(_) => Ok(()),
            State::Bound(bound) => {
                let Bound { replica, log } = &mut **bound;
                if replica.is_removed() {
                    return Ok(());
                }
                log.execute_all_new_entries(replica)
            }
        }
    }

    /// Stores `item` under `href`, publishing it unless it came from the log.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Item`] when a local item without uid is uploaded to
    /// a bound collection.
    pub fn upload_as(&mut self, origin: Origin, href: &str, item: Item) -> Result<Item, Error> {
        let bound = match (&mut self.state, origin) {
            (State::Unbound(local), _) => return local.upload(href, item),
            (State::Bound(bound), Origin::Remote) => return bound.replica.upload(href, item),
            (State::Bound(bound), Origin::Local) => bound,
        };

        let uid = item.uid().ok_or(ItemError::MissingUid)?.to_string();
        let item = bound.replica.upload(href, item)?;
        bound.replica.hrefs.set_href(&uid, href)?;
        bound.log.set_entry(
            &[Channel::Resources.name(), uid.as_str()],
            Value::Null,
            Value::String(item.text().to_string()),
        )?;
        Ok(item)
    }

    /// Deletes the item at `href`, or the whole collection for `None`,
    /// publishing the tombstone unless it came from the log.
    ///
    /// Deleting an href the uid no longer resolves to, such as the old name
    /// after a rename, publishes nothing.
    pub fn delete_as(&mut self, origin: Origin, href: Option<&str>) -> Result<(), Error> {
        let bound = match (&mut self.state, origin) {
            (State::Unbound(local), _) => return local.delete(href),
            (State::Bound(bound), Origin::Remote) => return bound.replica.delete(href),
            (State::Bound(bound), Origin::Local) => bound,
        };

        match href {
            Some(href) => {
                let uid = bound.replica.hrefs.get_uid(href);
                bound.replica.delete(Some(href))?;
                if bound.replica.hrefs.get_href(&uid) != href {
                    tracing::debug!(href, uid, "deleted stale copy, item lives elsewhere");
                    return Ok(());
                }
                bound.log.set_entry(
                    &[Channel::Resources.name(), uid.as_str()],
                    Value::Null,
                    Value::Null,
                )?;
            }
            None => {
                bound.replica.delete(None)?;
                tracing::info!(dir = %bound.log.dir().display(), "publishing collection deletion");
                bound
                    .log
                    .set_entry(&Channel::Info.path(), Value::from(INFO_DELETED), Value::Bool(true))?;
            }
        }
        Ok(())
    }

    /// Replaces all properties, publishing changed name and color unless the
    /// change came from the log.
    ///
    /// A property that is removed is published as null.
    pub fn set_meta_all_as(&mut self, origin: Origin, props: Props) -> Result<(), Error> {
        let bound = match (&mut self.state, origin) {
            (State::Unbound(local), _) => return local.set_meta_all(props),
            (State::Bound(bound), Origin::Remote) => return bound.replica.local.set_meta_all(props),
            (State::Bound(bound), Origin::Local) => bound,
        };

        let local = &bound.replica.local;
        let changes: Vec<(&str, Value)> = [(DISPLAY_NAME, INFO_NAME), (CALENDAR_COLOR, INFO_COLOR)]
            .into_iter()
            .filter_map(|(prop, key)| {
                let new = props.get(prop).cloned();
                (local.get_meta(prop) != new).then(|| (key, new.map_or(Value::Null, Value::String)))
            })
            .collect();

        bound.replica.local.set_meta_all(props)?;
        for (key, value) in changes {
            bound.log.set_entry(&Channel::Info.path(), Value::from(key), value)?;
        }
        Ok(())
    }

    fn pull_then<T>(&mut self, f: impl FnOnce(&mut C) -> Result<T, Error>) -> Result<T, Error> {
        self.pull()?;
        match &mut self.state {
            State::Unbound(local) => f(local),
            State::Bound(bound) => f(&mut bound.replica.local),
        }
    }
}

impl<C: Collection> Collection for DecsyncCollection<C> {
    fn path(&self) -> &str {
        self.local().path()
    }

    fn filesystem_path(&self) -> &Path {
        self.local().filesystem_path()
    }

    fn get(&self, href: &str) -> Result<Option<Item>, Error> {
        self.local().get(href)
    }

    fn list(&self) -> Result<Vec<String>, Error> {
        self.local().list()
    }

    fn upload(&mut self, href: &str, item: Item) -> Result<Item, Error> {
        self.upload_as(Origin::Local, href, item)
    }

    fn delete(&mut self, href: Option<&str>) -> Result<(), Error> {
        self.delete_as(Origin::Local, href)
    }

    fn get_meta(&self, key: &str) -> Option<String> {
        self.local().get_meta(key)
    }

    fn get_meta_all(&self) -> Props {
        self.local().get_meta_all()
    }

    fn set_meta_all(&mut self, props: Props) -> Result<(), Error> {
        self.set_meta_all_as(Origin::Local, props)
    }

    fn etag(&mut self) -> Result<String, Error> {
        self.pull_then(C::etag)
    }

    fn sync(&mut self, old_token: Option<&str>) -> Result<(String, Vec<String>), Error> {
        self.pull_then(|local| local.sync(old_token))
    }
}

/// Sync type and log id of the collection at `path`, if it has a log.
pub(crate) fn log_name(path: &str) -> Result<Option<(SyncType, String)>, Error> {
    let attributes = path_attributes(path);
    let [_, segment] = attributes.as_slice() else {
        return Ok(None);
    };
    match segment.split_once('-') {
        Some((sync_type, id)) if !id.is_empty() => Ok(Some((SyncType::parse(sync_type)?, id.to_string()))),
        _ => Err(Error::UnknownSyncType(segment.clone())),
    }
}
