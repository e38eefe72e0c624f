// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Local collection storage, the side of the bridge that clients talk to.

mod fs;

use std::collections::BTreeMap;
use std::path::Path;

use crate::{Depth, Error, Item};

pub use self::fs::{FsCollection, FsStore};

/// Collection properties keyed by their DAV property name.
pub type Props = BTreeMap<String, String>;

/// Property holding the collection tag, `VCALENDAR` or `VADDRESSBOOK`.
pub const TAG: &str = "tag";

/// Display name property.
pub const DISPLAY_NAME: &str = "D:displayname";

/// Calendar color property.
pub const CALENDAR_COLOR: &str = "ICAL:calendar-color";

/// Component kinds a calendar accepts.
pub const SUPPORTED_COMPONENTS: &str = "C:supported-calendar-component-set";

/// Collections yielded by [`Store::discover`].
pub type Collections<'a, C> = Box<dyn Iterator<Item = Result<C, Error>> + 'a>;

/// A tree of collections addressed by slash-separated paths.
pub trait Store {
    type Collection: Collection + 'static;

    /// Yields the collection at `path` and, unless `depth` is zero, its children.
    ///
    /// Nothing is yielded for a path without a collection.
    fn discover(&self, path: &str, depth: Depth) -> Result<Collections<'_, Self::Collection>, Error>;

    /// Creates the collection at `path` holding `items`, or replaces its
    /// properties if it already exists.
    fn create_collection(
        &self,
        path: &str,
        items: Vec<(String, Item)>,
        props: Option<Props>,
    ) -> Result<Self::Collection, Error>;
}

/// A collection of items addressed by href.
pub trait Collection {
    /// Sanitized path of the collection.
    fn path(&self) -> &str;

    /// Directory the collection is stored in.
    fn filesystem_path(&self) -> &Path;

    fn get(&self, href: &str) -> Result<Option<Item>, Error>;

    /// Hrefs of all items, sorted.
    fn list(&self) -> Result<Vec<String>, Error>;

    /// Stores `item` under `href`, replacing any previous item.
    fn upload(&mut self, href: &str, item: Item) -> Result<Item, Error>;

    /// Deletes the item at `href`, or the whole collection when `href` is `None`.
    fn delete(&mut self, href: Option<&str>) -> Result<(), Error>;

    fn get_meta(&self, key: &str) -> Option<String>;

    fn get_meta_all(&self) -> Props;

    /// Replaces all properties.
    fn set_meta_all(&mut self, props: Props) -> Result<(), Error>;

    /// Tag of the collection entity, changing whenever items or properties do.
    fn etag(&mut self) -> Result<String, Error>;

    /// New sync token and the hrefs changed since `old_token`.
    ///
    /// Every href is reported when the old token is absent or unknown.
    fn sync(&mut self, old_token: Option<&str>) -> Result<(String, Vec<String>), Error>;
}

/// Strips surrounding and duplicate slashes.
#[must_use]
pub fn sanitize_path(path: &str) -> String {
    path_attributes(path).join("/")
}

/// Non-empty segments of a path.
#[must_use]
pub fn path_attributes(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
