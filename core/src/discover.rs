// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeSet;
use std::str::FromStr;
use std::vec;

use davsync_decsync::{Value, get_static_info, list_collections};
use davsync_vobject::CollectionTag;

use crate::collection::{DecsyncCollection, LogSettings, log_name};
use crate::inbound::INFO_DELETED;
use crate::storage::{
    Collection, Collections, Props, SUPPORTED_COMPONENTS, Store, TAG, path_attributes, sanitize_path,
};
use crate::{Depth, Error, Item, Origin, SyncType};

/// A store whose collections are bridged to the sync log.
///
/// Discovering a principal also materializes collections that only exist
/// in the log, so peers' address books and calendars appear locally.
#[derive(Debug, Clone)]
pub struct DecsyncStore<S> {
    inner: S,
    settings: LogSettings,
}

impl<S: Store> DecsyncStore<S> {
    /// Bridges `inner` to the logs under the directory in `settings`.
    ///
    /// Nothing is read or written until the first discovery.
    #[must_use]
    pub fn new(inner: S, settings: LogSettings) -> Self {
        Self { inner, settings }
    }

    /// The wrapped store. Changes made through it are not published.
    #[must_use]
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Log directory and writer identity used for every bound collection.
    #[must_use]
    pub fn settings(&self) -> &LogSettings {
        &self.settings
    }

    fn bind(&self, local: S::Collection) -> Result<DecsyncCollection<S::Collection>, Error> {
        DecsyncCollection::bind(local, &self.settings)
    }

    /// Creates the local collection for log `id` and replays its history.
    #[tracing::instrument(skip(self))]
    fn materialize(
        &self,
        path: &str,
        sync_type: SyncType,
    ) -> Result<DecsyncCollection<S::Collection>, Error> {
        let mut props = Props::from([(TAG.to_string(), sync_type.tag().to_string())]);
        if sync_type == SyncType::Calendars {
            props.insert(SUPPORTED_COMPONENTS.to_string(), "VEVENT".to_string());
        }

        let local = self.inner.create_collection(path, Vec::new(), Some(props))?;
        let mut collection = self.bind(local)?;
        collection.prime()?;
        tracing::info!(path, "materialized collection from sync log");
        Ok(collection)
    }
}

impl<S: Store> Store for DecsyncStore<S> {
    type Collection = DecsyncCollection<S::Collection>;

    #[tracing::instrument(skip(self))]
    fn discover(&self, path: &str, depth: Depth) -> Result<Collections<'_, Self::Collection>, Error> {
        let local: Vec<_> = self.inner.discover(path, depth)?.collect::<Result<_, _>>()?;
        let known: BTreeSet<String> = local.iter().map(|c| c.path().to_string()).collect();

        let principal = path_attributes(path);
        let mut remote = Vec::new();
        if depth.is_recursive() && principal.len() == 1 {
            for sync_type in SyncType::ALL {
                for id in list_collections(&self.settings.decsync_dir, sync_type.as_ref())? {
                    remote.push((sync_type, id));
                }
            }
        }

        Ok(Box::new(Discovery {
            store: self,
            principal: sanitize_path(path),
            known,
            local: local.into_iter(),
            remote: remote.into_iter(),
        }))
    }

    /// Creates a collection, naming it after the sync type of its tag when
    /// properties are given.
    ///
    /// Name and color from `props` and the given items are published.
    #[tracing::instrument(skip(self, items, props))]
    fn create_collection(
        &self,
        path: &str,
        items: Vec<(String, Item)>,
        props: Option<Props>,
    ) -> Result<Self::Collection, Error> {
        let Some(props) = props else {
            log_name(path)?;
            let local = self.inner.create_collection(path, items, None)?;
            return self.bind(local);
        };

        let tag = props.get(TAG).map(String::as_str).unwrap_or_default();
        let tag = CollectionTag::from_str(tag).map_err(|_| Error::UnknownTag(tag.to_string()))?;
        let sync_type = SyncType::from_tag(tag);

        let mut attributes = path_attributes(path);
        let last = attributes
            .last_mut()
            .ok_or_else(|| Error::InvalidPath(path.to_string()))?;
        *last = format!("{sync_type}-{last}");
        let path = attributes.join("/");

        let local = self.inner.create_collection(&path, Vec::new(), None)?;
        let mut collection = self.bind(local)?;
        collection.set_meta_all_as(Origin::Local, props)?;
        for (href, item) in items {
            collection.upload_as(Origin::Local, &href, item)?;
        }
        Ok(collection)
    }
}

/// Local collections first, then collections materialized from the log on
/// demand.
struct Discovery<'a, S: Store> {
    store: &'a DecsyncStore<S>,
    principal: String,
    known: BTreeSet<String>,
    local: vec::IntoIter<S::Collection>,
    remote: vec::IntoIter<(SyncType, String)>,
}

impl<S: Store> Iterator for Discovery<'_, S> {
    type Item = Result<DecsyncCollection<S::Collection>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(local) = self.local.next() {
            return Some(self.store.bind(local));
        }

        for (sync_type, id) in self.remote.by_ref() {
            let path = format!("{}/{sync_type}-{id}", self.principal);
            if self.known.contains(&path) {
                continue;
            }

            let dir = &self.store.settings.decsync_dir;
            match get_static_info(dir, sync_type.as_ref(), &id, INFO_DELETED) {
                Ok(Value::Bool(true)) => {
                    tracing::debug!(%sync_type, %id, "skipping deleted collection");
                    continue;
                }
                Ok(_) => {}
                Err(err) => return Some(Err(err.into())),
            }

            self.known.insert(path.clone());
            return Some(self.store.materialize(&path, sync_type));
        }
        None
    }
}
