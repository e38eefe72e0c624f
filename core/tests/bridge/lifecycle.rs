// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Creating, discovering and deleting collections across peers.

use davsync_core::storage::{
    CALENDAR_COLOR, Collection, DISPLAY_NAME, Props, SUPPORTED_COMPONENTS, Store, TAG,
};
use davsync_core::{Depth, Error, SyncType};
use davsync_decsync::Value;

use crate::common::{
    addressbook_props, assert_hrefs, calendar_props, discover_all, log_entries, peer,
    setup_temp_dirs, vcard, vevent,
};

#[test]
fn create_collection_prefixes_sync_type() {
    // Arrange
    let dirs = setup_temp_dirs().unwrap();
    let a = peer(&dirs, "a");

    // Act
    let col = a
        .create_collection("/user/work/", vec![], Some(calendar_props("Work", "#ff0000")))
        .unwrap();

    // Assert
    assert_eq!(col.path(), "user/calendars-work");
    assert_eq!(col.sync_type(), Some(SyncType::Calendars));
    assert_eq!(col.get_meta(TAG).as_deref(), Some("VCALENDAR"));
    assert_eq!(
        log_entries(&dirs, "calendars", "work", "a-davsync", &["info"]),
        vec![
            (Value::from("name"), Value::from("Work")),
            (Value::from("color"), Value::from("#ff0000")),
        ]
    );
}

#[test]
fn create_collection_publishes_initial_items() {
    let dirs = setup_temp_dirs().unwrap();
    let (a, b) = (peer(&dirs, "a"), peer(&dirs, "b"));
    let items = vec![("abc.vcf".to_string(), vcard("abc", "Alice"))];

    a.create_collection("user/friends", items, Some(addressbook_props("Friends")))
        .unwrap();

    let [b_col] = discover_all(&b, "user").try_into().unwrap();
    assert_hrefs(&b_col, &["abc.vcf"]);
}

#[test]
fn create_collection_without_props_keeps_path() {
    let dirs = setup_temp_dirs().unwrap();
    let a = peer(&dirs, "a");

    let col = a.create_collection("user", vec![], None).unwrap();

    assert_eq!(col.path(), "user");
    assert_eq!(col.sync_type(), None);
}

#[test]
fn unknown_tag_is_fatal() {
    let dirs = setup_temp_dirs().unwrap();
    let a = peer(&dirs, "a");
    let props = Props::from([(TAG.to_string(), "VJOURNAL".to_string())]);

    let err = a.create_collection("user/notes", vec![], Some(props)).unwrap_err();

    assert!(matches!(err, Error::UnknownTag(ref tag) if tag == "VJOURNAL"));
    assert!(err.is_protocol_violation());
}

#[test]
fn discover_materializes_remote_collections() {
    // Arrange
    let dirs = setup_temp_dirs().unwrap();
    let (a, b) = (peer(&dirs, "a"), peer(&dirs, "b"));
    let mut friends = a
        .create_collection("user/friends", vec![], Some(addressbook_props("Friends")))
        .unwrap();
    friends.upload("abc.vcf", vcard("abc", "Alice")).unwrap();
    let mut work = a
        .create_collection("user/work", vec![], Some(calendar_props("Work", "#ff0000")))
        .unwrap();
    work.upload("e1.ics", vevent("e1", "Standup")).unwrap();

    // Act
    let found = discover_all(&b, "user");

    // Assert
    let paths: Vec<_> = found.iter().map(Collection::path).collect();
    assert_eq!(paths, ["user/contacts-friends", "user/calendars-work"]);

    let [b_friends, b_work] = found.try_into().unwrap();
    assert_hrefs(&b_friends, &["abc.vcf"]);
    assert_eq!(b_friends.get_meta(DISPLAY_NAME).as_deref(), Some("Friends"));
    assert_eq!(b_friends.get_meta(TAG).as_deref(), Some("VADDRESSBOOK"));

    assert_hrefs(&b_work, &["e1.ics"]);
    assert_eq!(b_work.get_meta(CALENDAR_COLOR).as_deref(), Some("#ff0000"));
    assert_eq!(b_work.get_meta(SUPPORTED_COMPONENTS).as_deref(), Some("VEVENT"));
}

#[test]
fn discover_yields_local_collections_first_and_once() {
    let dirs = setup_temp_dirs().unwrap();
    let (a, b) = (peer(&dirs, "a"), peer(&dirs, "b"));
    a.create_collection("user/friends", vec![], Some(addressbook_props("Friends")))
        .unwrap();
    b.create_collection("user", vec![], None).unwrap();
    b.create_collection("user/work", vec![], Some(calendar_props("Work", "#ff0000")))
        .unwrap();

    let first: Vec<_> = discover_all(&b, "user")
        .iter()
        .map(|c| c.path().to_string())
        .collect();
    let second: Vec<_> = discover_all(&b, "user")
        .iter()
        .map(|c| c.path().to_string())
        .collect();

    assert_eq!(first, ["user", "user/calendars-work", "user/contacts-friends"]);
    assert_eq!(second, ["user", "user/calendars-work", "user/contacts-friends"]);
}

#[test]
fn discover_without_recursion_materializes_nothing() {
    let dirs = setup_temp_dirs().unwrap();
    let (a, b) = (peer(&dirs, "a"), peer(&dirs, "b"));
    a.create_collection("user/friends", vec![], Some(addressbook_props("Friends")))
        .unwrap();

    assert_eq!(b.discover("user", Depth::Zero).unwrap().count(), 0);
    assert_eq!(b.discover("", Depth::One).unwrap().count(), 0);
    assert_eq!(discover_all(&b, "user").len(), 1);
}

#[test]
fn deleted_remote_collection_is_not_materialized() {
    // Arrange
    let dirs = setup_temp_dirs().unwrap();
    let (a, b) = (peer(&dirs, "a"), peer(&dirs, "b"));
    let mut col = a
        .create_collection("user/friends", vec![], Some(addressbook_props("Friends")))
        .unwrap();
    col.upload("abc.vcf", vcard("abc", "Alice")).unwrap();

    // Act
    col.delete(None).unwrap();

    // Assert
    assert!(!col.filesystem_path().exists());
    assert!(discover_all(&b, "user").is_empty());
    assert_eq!(
        log_entries(&dirs, "contacts", "friends", "a-davsync", &["info"]).last(),
        Some(&(Value::from("deleted"), Value::Bool(true)))
    );
}

#[test]
fn peer_deletion_removes_materialized_collection() {
    // Arrange
    let dirs = setup_temp_dirs().unwrap();
    let (a, b) = (peer(&dirs, "a"), peer(&dirs, "b"));
    let mut a_col = a
        .create_collection("user/friends", vec![], Some(addressbook_props("Friends")))
        .unwrap();
    let [mut b_col] = discover_all(&b, "user").try_into().unwrap();
    let b_dir = b_col.filesystem_path().to_path_buf();

    // Act
    a_col.delete(None).unwrap();
    b_col.etag().unwrap();

    // Assert
    assert!(b_col.is_removed());
    assert!(!b_dir.exists());
    let paths: Vec<_> = discover_all(&b, "user")
        .iter()
        .map(|c| c.path().to_string())
        .collect();
    assert_eq!(paths, ["user"], "only the principal is left");
}

#[test]
fn local_collection_with_unknown_prefix_fails_discovery() {
    let dirs = setup_temp_dirs().unwrap();
    let a = peer(&dirs, "a");
    a.inner().create_collection("user/notes-x", vec![], None).unwrap();

    let results: Vec<_> = a.discover("user", Depth::One).unwrap().collect();

    assert!(results.iter().any(|r| matches!(r, Err(Error::UnknownSyncType(_)))));
}
