// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Command-line front end of davsync.

mod arg;
mod cli;
mod cmd_collection;
mod cmd_generate_completion;
mod cmd_item;
mod config;

pub use crate::cli::{Cli, Commands, open_collection, run};
pub use crate::cmd_collection::{CmdCreate, CmdDiscover, CmdSetMeta, CmdSync};
pub use crate::cmd_generate_completion::{CmdGenerateCompletion, Shell};
pub use crate::cmd_item::{CmdDelete, CmdUpload};
pub use crate::config::parse_config;
