// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::{ArgMatches, Command};
use colored::Colorize;
use davsync_core::storage::{Collection, FsStore};
use davsync_core::{DecsyncStore, Item};

use crate::arg::{CommonArgs, ItemArgs};
use crate::cli::open_collection;

#[derive(Debug, Clone)]
pub struct CmdUpload {
    pub collection: String,
    pub file: PathBuf,
    pub href: Option<String>,
}

impl CmdUpload {
    pub const NAME: &str = "upload";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .alias("put")
            .about("Store an item in a collection and publish it")
            .arg(CommonArgs::collection())
            .arg(ItemArgs::file())
            .arg(ItemArgs::href(false))
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            collection: CommonArgs::get_collection(matches),
            file: ItemArgs::get_file(matches),
            href: ItemArgs::get_href(matches),
        }
    }

    pub fn run(self, store: &DecsyncStore<FsStore>) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "uploading item...");
        let mut collection = open_collection(store, &self.collection)?;
        let text = fs::read_to_string(&self.file)
            .map_err(|e| format!("Failed to read {}: {e}", self.file.display()))?;

        let item = match collection.sync_type() {
            Some(sync_type) => Item::parse_sanitized(&text, None, sync_type.tag())?,
            None => Item::parse(&text)?,
        };
        let href = match (self.href, collection.sync_type(), item.uid()) {
            (Some(href), _, _) => href,
            (None, Some(sync_type), Some(uid)) => format!("{uid}{}", sync_type.suffix()),
            _ => return Err("An href is required for this collection".into()),
        };

        let item = collection.upload(&href, item)?;
        println!("{}\t{}", href.bold(), item.etag().dimmed());
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct CmdDelete {
    pub collection: String,
    pub href: Option<String>,
}

impl CmdDelete {
    pub const NAME: &str = "delete";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .alias("rm")
            .about("Delete an item, or the whole collection when no href is given")
            .arg(CommonArgs::collection())
            .arg(ItemArgs::href(true).required(false))
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            collection: CommonArgs::get_collection(matches),
            href: ItemArgs::get_href(matches),
        }
    }

    pub fn run(self, store: &DecsyncStore<FsStore>) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "deleting...");
        let mut collection = open_collection(store, &self.collection)?;
        collection.delete(self.href.as_deref())?;
        Ok(())
    }
}
