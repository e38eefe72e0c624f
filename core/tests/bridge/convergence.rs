// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Peers end up with the same items however they catch up with the log.

use davsync_core::storage::{Collection, Store};

use crate::common::{addressbook_props, assert_hrefs, discover_all, peer, setup_temp_dirs, vcard};

#[test]
fn replayed_history_matches_writer() {
    // Arrange
    let dirs = setup_temp_dirs().unwrap();
    let (a, b, c) = (peer(&dirs, "a"), peer(&dirs, "b"), peer(&dirs, "c"));
    let mut a_col = a
        .create_collection("user/friends", vec![], Some(addressbook_props("Friends")))
        .unwrap();

    // Act
    a_col.upload("u1.vcf", vcard("u1", "First")).unwrap();
    a_col.delete(Some("u1.vcf")).unwrap();
    a_col.upload("u1.vcf", vcard("u1", "Second")).unwrap();
    a_col.upload("u2.vcf", vcard("u2", "Gone")).unwrap();
    a_col.delete(Some("u2.vcf")).unwrap();

    let [mut b_col] = discover_all(&b, "user").try_into().unwrap();
    let [mut c_col] = discover_all(&c, "user").try_into().unwrap();

    // Assert
    assert_hrefs(&b_col, &["u1.vcf"]);
    assert_hrefs(&c_col, &["u1.vcf"]);
    let expected = a_col.get("u1.vcf").unwrap().unwrap();
    assert_eq!(b_col.get("u1.vcf").unwrap().unwrap(), expected);
    assert_eq!(c_col.get("u1.vcf").unwrap().unwrap(), expected);

    let etag = a_col.etag().unwrap();
    assert_eq!(b_col.etag().unwrap(), etag);
    assert_eq!(c_col.etag().unwrap(), etag);
}

#[test]
fn incremental_pull_matches_late_replay() {
    // Arrange
    let dirs = setup_temp_dirs().unwrap();
    let (a, b, c) = (peer(&dirs, "a"), peer(&dirs, "b"), peer(&dirs, "c"));
    let mut a_col = a
        .create_collection("user/friends", vec![], Some(addressbook_props("Friends")))
        .unwrap();
    let [mut early] = discover_all(&b, "user").try_into().unwrap();

    // Act
    for (uid, name) in [("u1", "Ann"), ("u2", "Ben"), ("u3", "Cid")] {
        a_col.upload(&format!("{uid}.vcf"), vcard(uid, name)).unwrap();
        early.sync(None).unwrap();
    }
    a_col.delete(Some("u2.vcf")).unwrap();
    a_col.upload("u1.vcf", vcard("u1", "Anna")).unwrap();
    let [mut late] = discover_all(&c, "user").try_into().unwrap();

    // Assert
    assert_eq!(early.etag().unwrap(), late.etag().unwrap());
    assert_hrefs(&early, &["u1.vcf", "u3.vcf"]);
}

#[test]
fn pulling_again_changes_nothing() {
    let dirs = setup_temp_dirs().unwrap();
    let (a, b) = (peer(&dirs, "a"), peer(&dirs, "b"));
    let mut a_col = a
        .create_collection("user/friends", vec![], Some(addressbook_props("Friends")))
        .unwrap();
    a_col.upload("u1.vcf", vcard("u1", "Ann")).unwrap();
    let [mut b_col] = discover_all(&b, "user").try_into().unwrap();

    let first = b_col.etag().unwrap();
    let second = b_col.etag().unwrap();

    assert_eq!(first, second);
}

#[test]
fn writers_converge_on_concurrent_edits() {
    // Arrange
    let dirs = setup_temp_dirs().unwrap();
    let (a, b) = (peer(&dirs, "a"), peer(&dirs, "b"));
    let mut a_col = a
        .create_collection("user/friends", vec![], Some(addressbook_props("Friends")))
        .unwrap();
    a_col.upload("u1.vcf", vcard("u1", "Ann")).unwrap();
    let [mut b_col] = discover_all(&b, "user").try_into().unwrap();

    // Act
    a_col.upload("u1.vcf", vcard("u1", "From A")).unwrap();
    b_col.upload("u1.vcf", vcard("u1", "From B")).unwrap();
    a_col.etag().unwrap();
    b_col.etag().unwrap();

    // Assert
    assert_eq!(
        a_col.get("u1.vcf").unwrap().unwrap(),
        b_col.get("u1.vcf").unwrap().unwrap()
    );
}
