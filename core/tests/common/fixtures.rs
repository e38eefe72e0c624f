// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Test data factories for integration tests.

use davsync_core::storage::{CALENDAR_COLOR, DISPLAY_NAME, FsCollection, FsStore, Props, Store, TAG};
use davsync_core::{Config, DecsyncCollection, DecsyncStore, Depth, Item};

use super::TempDirs;

/// Bridged store of the peer `name`, writing to the log as `<name>-davsync`.
///
/// # Panics
///
/// Panics if the store cannot be opened.
#[must_use]
pub fn peer(dirs: &TempDirs, name: &str) -> DecsyncStore<FsStore> {
    let mut config = Config::new(dirs.storage_root(name));
    config.decsync_dir = Some(dirs.decsync_dir.clone());
    config.app_id = Some(format!("{name}-davsync"));
    davsync_core::open(config).unwrap()
}

/// Every collection discovered at depth one below `principal`.
pub fn discover_all(
    store: &DecsyncStore<FsStore>,
    principal: &str,
) -> Vec<DecsyncCollection<FsCollection>> {
    store
        .discover(principal, Depth::One)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap()
}

/// The collection at `path`.
///
/// # Panics
///
/// Panics if there is none.
pub fn collection(store: &DecsyncStore<FsStore>, path: &str) -> DecsyncCollection<FsCollection> {
    store
        .discover(path, Depth::Zero)
        .unwrap()
        .next()
        .unwrap_or_else(|| panic!("no collection at {path}"))
        .unwrap()
}

/// Properties of an address book named `name`.
#[must_use]
pub fn addressbook_props(name: &str) -> Props {
    Props::from([
        (TAG.to_string(), "VADDRESSBOOK".to_string()),
        (DISPLAY_NAME.to_string(), name.to_string()),
    ])
}

/// Properties of a calendar named `name` in `color`.
#[must_use]
pub fn calendar_props(name: &str, color: &str) -> Props {
    Props::from([
        (TAG.to_string(), "VCALENDAR".to_string()),
        (DISPLAY_NAME.to_string(), name.to_string()),
        (CALENDAR_COLOR.to_string(), color.to_string()),
    ])
}

/// A vCard for `uid` with formatted name `name`.
#[must_use]
pub fn vcard(uid: &str, name: &str) -> Item {
    Item::parse(&format!(
        "BEGIN:VCARD\r\nVERSION:3.0\r\nUID:{uid}\r\nFN:{name}\r\nEND:VCARD\r\n"
    ))
    .unwrap()
}

/// A calendar object holding one event.
#[must_use]
pub fn vevent(uid: &str, summary: &str) -> Item {
    Item::parse(&format!(
        "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//davsync//test//EN\r\n\
         BEGIN:VEVENT\r\nUID:{uid}\r\nDTSTAMP:20250125T120000Z\r\n\
         DTSTART:20250125T100000Z\r\nSUMMARY:{summary}\r\nEND:VEVENT\r\n\
         END:VCALENDAR\r\n"
    ))
    .unwrap()
}
