// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;

use clap::{ArgMatches, Command, arg, builder::PossibleValuesParser};
use colored::Colorize;
use davsync_core::storage::{CALENDAR_COLOR, Collection, DISPLAY_NAME, FsStore, Props, Store, TAG};
use davsync_core::{DecsyncStore, Depth};

use crate::arg::{CommonArgs, DiscoverArgs};
use crate::cli::open_collection;

#[derive(Debug, Clone)]
pub struct CmdDiscover {
    pub path: String,
    pub depth: Depth,
}

impl CmdDiscover {
    pub const NAME: &str = "discover";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .alias("ls")
            .about("List collections, materializing those only found in the sync log")
            .arg(DiscoverArgs::path())
            .arg(DiscoverArgs::depth())
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            path: DiscoverArgs::get_path(matches),
            depth: DiscoverArgs::get_depth(matches),
        }
    }

    pub fn run(self, store: &DecsyncStore<FsStore>) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "discovering collections...");
        for collection in store.discover(&self.path, self.depth)? {
            let mut collection = collection?;
            let etag = collection.etag()?;
            let name = collection.get_meta(DISPLAY_NAME).unwrap_or_default();
            println!("{}\t{}\t{}", collection.path().bold(), name, etag.dimmed());
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct CmdCreate {
    pub path: String,
    pub tag: String,
    pub name: Option<String>,
    pub color: Option<String>,
}

impl CmdCreate {
    pub const NAME: &str = "create";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("Create a calendar or address book and publish it")
            .arg(arg!(path: <PATH> "Path of the new collection, e.g. user/family"))
            .arg(
                arg!(--tag <TAG> "Kind of collection")
                    .value_parser(PossibleValuesParser::new(["VCALENDAR", "VADDRESSBOOK"]))
                    .required(true),
            )
            .arg(CommonArgs::name())
            .arg(CommonArgs::color())
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            path: matches.get_one::<String>("path").cloned().unwrap_or_default(),
            tag: matches.get_one::<String>("tag").cloned().unwrap_or_default(),
            name: CommonArgs::get_name(matches),
            color: CommonArgs::get_color(matches),
        }
    }

    pub fn run(self, store: &DecsyncStore<FsStore>) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "creating collection...");
        let mut props = Props::from([(TAG.to_string(), self.tag)]);
        if let Some(name) = self.name {
            props.insert(DISPLAY_NAME.to_string(), name);
        }
        if let Some(color) = self.color {
            props.insert(CALENDAR_COLOR.to_string(), color);
        }

        let collection = store.create_collection(&self.path, Vec::new(), Some(props))?;
        println!("{}", collection.path());
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct CmdSetMeta {
    pub collection: String,
    pub name: Option<String>,
    pub color: Option<String>,
}

impl CmdSetMeta {
    pub const NAME: &str = "set-meta";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("Change the display name or color of a collection")
            .arg(CommonArgs::collection())
            .arg(CommonArgs::name())
            .arg(CommonArgs::color())
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            collection: CommonArgs::get_collection(matches),
            name: CommonArgs::get_name(matches),
            color: CommonArgs::get_color(matches),
        }
    }

    pub fn run(self, store: &DecsyncStore<FsStore>) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "updating collection metadata...");
        let mut collection = open_collection(store, &self.collection)?;
        let mut props = collection.get_meta_all();
        if let Some(name) = self.name {
            props.insert(DISPLAY_NAME.to_string(), name);
        }
        if let Some(color) = self.color {
            props.insert(CALENDAR_COLOR.to_string(), color);
        }
        collection.set_meta_all(props)?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct CmdSync {
    pub collection: String,
    pub token: Option<String>,
}

impl CmdSync {
    pub const NAME: &str = "sync";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("Apply new sync log entries and list the items changed since a token")
            .arg(CommonArgs::collection())
            .arg(arg!(--token <TOKEN> "Sync token of a previous run"))
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            collection: CommonArgs::get_collection(matches),
            token: matches.get_one::<String>("token").cloned(),
        }
    }

    pub fn run(self, store: &DecsyncStore<FsStore>) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "syncing collection...");
        let mut collection = open_collection(store, &self.collection)?;
        let (token, changed) = collection.sync(self.token.as_deref())?;
        println!("{}", token.bold());
        for href in changed {
            println!("{href}");
        }
        Ok(())
    }
}
