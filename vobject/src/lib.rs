// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Parse, serialize and validate vCard (RFC 6350) and iCalendar (RFC 5545) items.
//!
//! Both formats share the same content-line grammar, so a single untyped
//! component tree is enough to carry an item between a store and a sync log.

#![warn(
    trivial_casts,
    trivial_numeric_casts,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications,
    clippy::dbg_macro,
    clippy::indexing_slicing,
    clippy::pedantic
)]
#![allow(clippy::similar_names, clippy::single_match_else)]

mod component;
mod sanitize;
mod syntax;

pub use crate::component::{Component, Property};
pub use crate::sanitize::{CollectionTag, ItemError, sanitize};
pub use crate::syntax::{ParseError, parse, read_one};
