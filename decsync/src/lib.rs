// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! A multi-writer, append-only key-value sync log stored as plain files.
//!
//! Every application instance appends entries only to its own files; peers
//! replicate the directory by any means (Syncthing, rsync, a network share)
//! and each instance consumes the entries written by the others. Conflicts
//! between entries for the same path and key resolve to the latest
//! datetime.
//!
//! ```text
//! <root>/<sync type>/<collection>/
//!     new-entries/<app id>/<path...>               appended JSON lines
//!     stored-entries/<app id>/<path...>            latest entry per key
//!     read-bytes/<own app id>/<app id>/<path...>   consumed byte count
//! ```

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
#![allow(clippy::similar_names)]

mod decsync;
mod entry;
mod error;
mod layout;
mod static_info;

pub use crate::decsync::{Decsync, Listener};
pub use crate::entry::Entry;
pub use crate::error::DecsyncError;
pub use crate::static_info::{app_id, get_static_info, list_collections};
pub use serde_json::Value;
