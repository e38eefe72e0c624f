// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Items uploaded under client-chosen hrefs keep them across updates.

use std::fs;

use davsync_core::HREFS_FILE;
use davsync_core::storage::{Collection, Store};
use davsync_decsync::{Decsync, Value};

use crate::common::{
    addressbook_props, assert_hrefs, collection, discover_all, log_entries, peer, setup_temp_dirs,
    vcard,
};

#[test]
fn upload_with_custom_href_records_mapping() {
    // Arrange
    let dirs = setup_temp_dirs().unwrap();
    let a = peer(&dirs, "a");
    let mut col = a
        .create_collection("user/friends", vec![], Some(addressbook_props("Friends")))
        .unwrap();

    // Act
    let item = col.upload("custom.vcf", vcard("abc", "Alice")).unwrap();

    // Assert
    let mapping = fs::read_to_string(col.filesystem_path().join(HREFS_FILE)).unwrap();
    assert_eq!(mapping, r#"{"abc":"custom.vcf"}"#);

    let entries = log_entries(&dirs, "contacts", "friends", "a-davsync", &["resources", "abc"]);
    assert_eq!(
        entries,
        vec![(Value::Null, Value::String(item.text().to_string()))]
    );
}

#[test]
fn upload_under_default_href_writes_no_mapping() {
    let dirs = setup_temp_dirs().unwrap();
    let a = peer(&dirs, "a");
    let mut col = a
        .create_collection("user/friends", vec![], Some(addressbook_props("Friends")))
        .unwrap();

    col.upload("abc.vcf", vcard("abc", "Alice")).unwrap();

    assert!(!col.filesystem_path().join(HREFS_FILE).exists());
}

#[test]
fn remote_update_lands_at_mapped_href() {
    // Arrange
    let dirs = setup_temp_dirs().unwrap();
    let (a, b) = (peer(&dirs, "a"), peer(&dirs, "b"));
    let mut a_col = a
        .create_collection("user/friends", vec![], Some(addressbook_props("Friends")))
        .unwrap();
    a_col.upload("custom.vcf", vcard("abc", "Alice")).unwrap();

    let [mut b_col] = discover_all(&b, "user").try_into().unwrap();
    assert_hrefs(&b_col, &["abc.vcf"]);

    // Act
    b_col.upload("abc.vcf", vcard("abc", "Alicia")).unwrap();
    let mut a_col = collection(&a, "user/contacts-friends");
    a_col.etag().unwrap();

    // Assert
    assert_hrefs(&a_col, &["custom.vcf"]);
    let item = a_col.get("custom.vcf").unwrap().unwrap();
    assert_eq!(item.component().property("FN").unwrap().value, "Alicia");
}

#[test]
fn remote_delete_resolves_uid_through_mapping() {
    // Arrange
    let dirs = setup_temp_dirs().unwrap();
    let (a, b) = (peer(&dirs, "a"), peer(&dirs, "b"));
    let mut a_col = a
        .create_collection("user/friends", vec![], Some(addressbook_props("Friends")))
        .unwrap();
    a_col.upload("custom.vcf", vcard("abc", "Alice")).unwrap();
    let [mut b_col] = discover_all(&b, "user").try_into().unwrap();

    // Act
    a_col.delete(Some("custom.vcf")).unwrap();
    b_col.etag().unwrap();

    // Assert
    assert_hrefs(&a_col, &[]);
    assert_hrefs(&b_col, &[]);
    let entries = log_entries(&dirs, "contacts", "friends", "a-davsync", &["resources", "abc"]);
    assert_eq!(entries.last(), Some(&(Value::Null, Value::Null)));
}

#[test]
fn default_href_held_by_other_uid_is_not_shared() {
    // Arrange
    let dirs = setup_temp_dirs().unwrap();
    let a = peer(&dirs, "a");
    let mut col = a
        .create_collection("user/friends", vec![], Some(addressbook_props("Friends")))
        .unwrap();
    col.upload("a.vcf", vcard("b", "Bob")).unwrap();
    let other: Decsync<()> = Decsync::new(&dirs.decsync_dir, "contacts", "friends", "z-davsync");

    // Act
    other
        .set_entry(&["resources", "a"], Value::Null, Value::Null)
        .unwrap();
    col.etag().unwrap();

    // Assert
    assert_hrefs(&col, &["a.vcf"]);
    assert_eq!(col.get("a.vcf").unwrap().unwrap().uid(), Some("b"));

    // Act
    let card = vcard("a", "Alice");
    other
        .set_entry(
            &["resources", "a"],
            Value::Null,
            Value::String(card.text().to_string()),
        )
        .unwrap();
    col.etag().unwrap();

    // Assert
    assert_hrefs(&col, &["a.vcf", "a~1"]);
    assert_eq!(col.get("a.vcf").unwrap().unwrap().uid(), Some("b"));
    assert_eq!(col.get("a~1").unwrap().unwrap().uid(), Some("a"));
}

#[test]
fn remote_update_follows_local_rename() {
    // Arrange
    let dirs = setup_temp_dirs().unwrap();
    let (a, b) = (peer(&dirs, "a"), peer(&dirs, "b"));
    let mut a_col = a
        .create_collection("user/friends", vec![], Some(addressbook_props("Friends")))
        .unwrap();
    a_col.upload("abc.vcf", vcard("abc", "Alice")).unwrap();
    let [mut b_col] = discover_all(&b, "user").try_into().unwrap();

    // Act
    a_col.upload("custom.vcf", vcard("abc", "Alice")).unwrap();
    a_col.delete(Some("abc.vcf")).unwrap();
    b_col.etag().unwrap();

    // Assert
    assert_hrefs(&a_col, &["custom.vcf"]);
    assert_hrefs(&b_col, &["abc.vcf"]);
    let entries = log_entries(&dirs, "contacts", "friends", "a-davsync", &["resources", "abc"]);
    assert!(entries.iter().all(|(_, value)| !value.is_null()));

    // Act
    b_col.upload("abc.vcf", vcard("abc", "Alicia")).unwrap();
    a_col.etag().unwrap();

    // Assert
    assert_hrefs(&a_col, &["custom.vcf"]);
    let item = a_col.get("custom.vcf").unwrap().unwrap();
    assert_eq!(item.component().property("FN").unwrap().value, "Alicia");
}
