// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use clap::{Arg, ArgMatches, ValueHint, arg, value_parser};
use davsync_core::Depth;

#[derive(Debug, Clone, Copy)]
pub struct CommonArgs;

impl CommonArgs {
    pub fn verbose() -> Arg {
        arg!(-v --verbose "Log debug information to stderr").global(true)
    }

    pub fn get_verbose(matches: &ArgMatches) -> bool {
        matches.get_flag("verbose")
    }

    pub fn collection() -> Arg {
        arg!(collection: <COLLECTION> "Path of the collection, e.g. user/contacts-family")
    }

    pub fn get_collection(matches: &ArgMatches) -> String {
        matches
            .get_one::<String>("collection")
            .cloned()
            .unwrap_or_default()
    }

    pub fn name() -> Arg {
        arg!(--name <NAME> "Display name of the collection")
    }

    pub fn get_name(matches: &ArgMatches) -> Option<String> {
        matches.get_one::<String>("name").cloned()
    }

    pub fn color() -> Arg {
        arg!(--color <COLOR> "Calendar color, e.g. #ff0000")
    }

    pub fn get_color(matches: &ArgMatches) -> Option<String> {
        matches.get_one::<String>("color").cloned()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DiscoverArgs;

impl DiscoverArgs {
    pub fn path() -> Arg {
        arg!(path: [PATH] "Path to discover, a principal such as `user` to find remote collections")
    }

    pub fn get_path(matches: &ArgMatches) -> String {
        matches.get_one::<String>("path").cloned().unwrap_or_default()
    }

    pub fn depth() -> Arg {
        arg!(-d --depth <DEPTH> "How deep to look below the path")
            .value_parser(value_parser!(Depth))
            .default_value("1")
    }

    pub fn get_depth(matches: &ArgMatches) -> Depth {
        matches.get_one("depth").copied().unwrap_or(Depth::One)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ItemArgs;

impl ItemArgs {
    pub fn file() -> Arg {
        arg!(file: <FILE> "vCard or iCalendar file to upload")
            .value_parser(value_parser!(PathBuf))
            .value_hint(ValueHint::FilePath)
    }

    pub fn get_file(matches: &ArgMatches) -> PathBuf {
        matches.get_one::<PathBuf>("file").cloned().unwrap_or_default()
    }

    pub fn href(required: bool) -> Arg {
        match required {
            true => arg!(href: <HREF> "Href of the item"),
            false => arg!(--href <HREF> "Href of the item, `<uid>.vcf` or `<uid>.ics` by default"),
        }
    }

    pub fn get_href(matches: &ArgMatches) -> Option<String> {
        matches.get_one::<String>("href").cloned()
    }
}
