// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use crate::component::{Component, Property};

/// Container type of a collection, as advertised by its `tag` property.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[strum(serialize_all = "UPPERCASE")]
pub enum CollectionTag {
    /// Calendar collection holding `VCALENDAR` objects.
    VCalendar,
    /// Address book collection holding `VCARD` objects.
    VAddressBook,
}

impl CollectionTag {
    /// Name of the top-level component items of this collection must have.
    #[must_use]
    pub const fn item_name(self) -> &'static str {
        match self {
            Self::VCalendar => "VCALENDAR",
            Self::VAddressBook => "VCARD",
        }
    }
}

/// Reasons an item is rejected for a collection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ItemError {
    /// The top-level component does not fit the collection tag.
    #[error("expected {expected} item, found {found}")]
    WrongComponent {
        /// Expected component name
        expected: &'static str,
        /// Component name found
        found: String,
    },

    /// A calendar item without any object component.
    #[error("calendar item has no components")]
    NoComponents,

    /// A calendar item mixing component kinds.
    #[error("calendar item mixes {0} and {1} components")]
    MixedComponents(String, String),

    /// An item without `UID` and no expected uid to fill in.
    #[error("item has no UID")]
    MissingUid,

    /// Components of one item disagree on the `UID`, or the `UID` differs from
    /// the expected one.
    #[error("UID mismatch: expected {expected}, found {found}")]
    UidMismatch {
        /// Expected uid
        expected: String,
        /// Uid found in the item
        found: String,
    },
}

/// Validates `item` for a collection tagged `tag` and fills in missing `UID`s.
///
/// Calendar items must carry object components (`VEVENT`, `VTODO` or
/// `VJOURNAL`) of a single kind that share a `UID`. When `uid` is given it
/// must equal the item's `UID`; components without one get it assigned.
///
/// # Errors
///
/// Returns an [`ItemError`] describing the first violation.
pub fn sanitize(item: &mut Component, uid: Option<&str>, tag: CollectionTag) -> Result<(), ItemError> {
    if item.name != tag.item_name() {
        return Err(ItemError::WrongComponent {
            expected: tag.item_name(),
            found: item.name.clone(),
        });
    }

    match tag {
        CollectionTag::VAddressBook => sanitize_uid(item, uid).map(|_| ()),
        CollectionTag::VCalendar => {
            let mut kind: Option<String> = None;
            let mut expected = uid.map(str::to_string);
            for object in item.children.iter().filter(|c| c.name != "VTIMEZONE") {
                let first = kind.get_or_insert_with(|| object.name.clone());
                if *first != object.name {
                    return Err(ItemError::MixedComponents(first.clone(), object.name.clone()));
                }
                if expected.is_none() {
                    expected = object.property("UID").map(|p| p.value.clone());
                }
            }
            if kind.is_none() {
                return Err(ItemError::NoComponents);
            }

            let expected = expected.ok_or(ItemError::MissingUid)?;
            for object in item.children.iter_mut().filter(|c| c.name != "VTIMEZONE") {
                sanitize_uid(object, Some(&expected))?;
            }
            Ok(())
        }
    }
}

fn sanitize_uid(component: &mut Component, uid: Option<&str>) -> Result<String, ItemError> {
    match (component.property("UID"), uid) {
        (Some(found), Some(expected)) if found.value != expected => Err(ItemError::UidMismatch {
            expected: expected.to_string(),
            found: found.value.clone(),
        }),
        (Some(found), _) => Ok(found.value.clone()),
        (None, Some(expected)) => {
            component.set_property(Property::new("UID", expected));
            Ok(expected.to_string())
        }
        (None, None) => Err(ItemError::MissingUid),
    }
}
