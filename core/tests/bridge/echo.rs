// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Changes applied from the log are never published again.

use davsync_core::Origin;
use davsync_core::storage::{CALENDAR_COLOR, Collection, DISPLAY_NAME, Store};
use davsync_decsync::Value;

use crate::common::{
    addressbook_props, calendar_props, discover_all, log_entries, own_log_is_empty, peer,
    setup_temp_dirs, vcard, vevent,
};

#[test]
fn applying_remote_items_publishes_nothing() {
    // Arrange
    let dirs = setup_temp_dirs().unwrap();
    let (a, b) = (peer(&dirs, "a"), peer(&dirs, "b"));
    let mut a_col = a
        .create_collection("user/friends", vec![], Some(addressbook_props("Friends")))
        .unwrap();
    a_col.upload("abc.vcf", vcard("abc", "Alice")).unwrap();

    // Act
    let [mut b_col] = discover_all(&b, "user").try_into().unwrap();
    a_col.upload("def.vcf", vcard("def", "Bob")).unwrap();
    a_col.delete(Some("abc.vcf")).unwrap();
    b_col.etag().unwrap();

    // Assert
    assert_eq!(b_col.list().unwrap(), ["def.vcf"]);
    assert!(own_log_is_empty(&dirs, "contacts", "friends", "b-davsync"));
}

#[test]
fn applying_remote_metadata_publishes_nothing() {
    let dirs = setup_temp_dirs().unwrap();
    let (a, b) = (peer(&dirs, "a"), peer(&dirs, "b"));
    let mut a_col = a
        .create_collection("user/work", vec![], Some(calendar_props("Work", "#00ff00")))
        .unwrap();
    let [mut b_col] = discover_all(&b, "user").try_into().unwrap();

    let mut props = a_col.get_meta_all();
    props.insert(DISPLAY_NAME.to_string(), "Office".to_string());
    a_col.set_meta_all(props).unwrap();
    b_col.sync(None).unwrap();

    assert_eq!(b_col.get_meta(DISPLAY_NAME).as_deref(), Some("Office"));
    assert!(own_log_is_empty(&dirs, "calendars", "work", "b-davsync"));
}

#[test]
fn remote_origin_is_not_published() {
    let dirs = setup_temp_dirs().unwrap();
    let a = peer(&dirs, "a");
    let mut col = a
        .create_collection("user/work", vec![], Some(calendar_props("Work", "#00ff00")))
        .unwrap();

    col.upload_as(Origin::Remote, "e1.ics", vevent("e1", "Standup")).unwrap();
    col.delete_as(Origin::Remote, Some("e1.ics")).unwrap();

    assert!(log_entries(&dirs, "calendars", "work", "a-davsync", &["resources", "e1"]).is_empty());
}

#[test]
fn unchanged_metadata_is_not_republished() {
    // Arrange
    let dirs = setup_temp_dirs().unwrap();
    let a = peer(&dirs, "a");
    let mut col = a
        .create_collection("user/work", vec![], Some(calendar_props("Work", "#00ff00")))
        .unwrap();
    let info = || log_entries(&dirs, "calendars", "work", "a-davsync", &["info"]);
    assert_eq!(info().len(), 2);

    // Act
    col.set_meta_all(col.get_meta_all()).unwrap();
    let unchanged = info().len();
    let mut props = col.get_meta_all();
    props.insert(CALENDAR_COLOR.to_string(), "#0000ff".to_string());
    col.set_meta_all(props).unwrap();

    // Assert
    assert_eq!(unchanged, 2);
    let entries = info();
    assert_eq!(entries.len(), 3);
    assert_eq!(
        entries.last(),
        Some(&(Value::from("color"), Value::from("#0000ff")))
    );
}

#[test]
fn removed_metadata_is_published_as_null() {
    let dirs = setup_temp_dirs().unwrap();
    let a = peer(&dirs, "a");
    let mut col = a
        .create_collection("user/friends", vec![], Some(addressbook_props("Friends")))
        .unwrap();

    let mut props = col.get_meta_all();
    props.remove(DISPLAY_NAME);
    col.set_meta_all(props).unwrap();

    let entries = log_entries(&dirs, "contacts", "friends", "a-davsync", &["info"]);
    assert_eq!(entries.last(), Some(&(Value::from("name"), Value::Null)));
}
