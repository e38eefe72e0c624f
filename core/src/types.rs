// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::str::FromStr;

use davsync_vobject::CollectionTag;

use crate::Error;

/// Kind of data a collection synchronizes. Doubles as the top-level
/// directory of the sync log and as the prefix of local collection names.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum SyncType {
    /// Address books of vCards.
    Contacts,

    /// Calendars of iCalendar objects.
    Calendars,
}

impl SyncType {
    /// Every sync type, in discovery order.
    pub const ALL: [Self; 2] = [Self::Contacts, Self::Calendars];

    /// Parses a sync type, failing on anything unknown.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownSyncType`] for an unrecognized name.
    pub fn parse(name: &str) -> Result<Self, Error> {
        Self::from_str(name).map_err(|_| Error::UnknownSyncType(name.to_string()))
    }

    /// File suffix of item hrefs.
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Contacts => ".vcf",
            Self::Calendars => ".ics",
        }
    }

    /// Container tag of collections of this type.
    #[must_use]
    pub const fn tag(self) -> CollectionTag {
        match self {
            Self::Contacts => CollectionTag::VAddressBook,
            Self::Calendars => CollectionTag::VCalendar,
        }
    }

    /// Sync type of collections carrying `tag`.
    #[must_use]
    pub const fn from_tag(tag: CollectionTag) -> Self {
        match tag {
            CollectionTag::VAddressBook => Self::Contacts,
            CollectionTag::VCalendar => Self::Calendars,
        }
    }
}

/// How deep a discovery looks below the requested path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum Depth {
    /// Only the collection at the path.
    #[default]
    #[strum(serialize = "0")]
    #[cfg_attr(feature = "clap", value(name = "0"))]
    Zero,

    /// The collection and its direct children.
    #[strum(serialize = "1")]
    #[cfg_attr(feature = "clap", value(name = "1"))]
    One,

    /// Treated like [`Depth::One`]; collections do not nest further.
    #[strum(serialize = "infinity")]
    #[cfg_attr(feature = "clap", value(name = "infinity"))]
    Infinity,
}

impl Depth {
    /// Whether children are requested.
    #[must_use]
    pub const fn is_recursive(self) -> bool {
        !matches!(self, Self::Zero)
    }
}

/// Where a mutation comes from. Only [`Origin::Local`] mutations are
/// published to the sync log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Made by a local client of the store.
    Local,

    /// Replayed from an entry of the sync log.
    Remote,
}
