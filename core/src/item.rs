// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use davsync_vobject::{CollectionTag, Component, read_one, sanitize};

use crate::Error;
use crate::io::digest;

/// A calendar object or contact card stored in a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    component: Component,
    text: String,
}

impl Item {
    /// Parses exactly one top-level component.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if the text is not a single well-formed component.
    pub fn parse(text: &str) -> Result<Self, Error> {
        Ok(Self::from_component(read_one(text)?))
    }

    /// Parses an item and checks it against the collection it goes into.
    ///
    /// With `uid` set, the item's uid must match it; without, a missing uid is
    /// an error. Calendar objects are normalized so every sub-component shares
    /// one uid.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] or [`Error::Item`].
    pub fn parse_sanitized(text: &str, uid: Option<&str>, tag: CollectionTag) -> Result<Self, Error> {
        let mut component = read_one(text)?;
        sanitize(&mut component, uid, tag)?;
        Ok(Self::from_component(component))
    }

    #[must_use]
    pub fn from_component(component: Component) -> Self {
        let text = component.serialize();
        Self { component, text }
    }

    #[must_use]
    pub fn component(&self) -> &Component {
        &self.component
    }

    /// Uid of the item.
    #[must_use]
    pub fn uid(&self) -> Option<&str> {
        self.component.uid()
    }

    /// Serialized text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Quoted SHA-256 of the serialized text.
    #[must_use]
    pub fn etag(&self) -> String {
        format!("\"{}\"", digest([&self.text]))
    }
}
