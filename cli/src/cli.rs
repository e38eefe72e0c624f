// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{error::Error, ffi::OsString, io, path::PathBuf, process::ExitCode};

use clap::{ArgMatches, Command, ValueHint, arg, builder::styling, crate_version, value_parser};
use colored::Colorize;
use davsync_core::storage::{FsCollection, FsStore, Store};
use davsync_core::{APP_NAME, DecsyncCollection, DecsyncStore, Depth};
use tracing_subscriber::EnvFilter;

use crate::arg::CommonArgs;
use crate::cmd_collection::{CmdCreate, CmdDiscover, CmdSetMeta, CmdSync};
use crate::cmd_generate_completion::CmdGenerateCompletion;
use crate::cmd_item::{CmdDelete, CmdUpload};
use crate::config::parse_config;

/// Run the davsync command-line interface.
pub fn run() -> ExitCode {
    let cli = match Cli::parse() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("{} {}", "Error:".red(), e);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(cli.verbose);
    match cli.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "Error:".red(), e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Command-line interface
#[derive(Debug)]
pub struct Cli {
    /// Path to the configuration file
    pub config: Option<PathBuf>,

    /// Log debug information
    pub verbose: bool,

    /// The command to execute
    pub command: Commands,
}

impl Cli {
    /// Create the command-line interface
    pub fn command() -> Command {
        const STYLES: styling::Styles = styling::Styles::styled()
            .header(styling::AnsiColor::Green.on_default().bold())
            .usage(styling::AnsiColor::Green.on_default().bold())
            .literal(styling::AnsiColor::Blue.on_default().bold())
            .placeholder(styling::AnsiColor::Cyan.on_default());

        Command::new(APP_NAME)
            .about("Keep CalDAV/CardDAV collections in sync through a DecSync directory.")
            .author("Zexin Yuan <aim@yzx9.xyz>")
            .version(crate_version!())
            .styles(STYLES)
            .subcommand_required(true)
            .arg_required_else_help(true)
            .arg(
                arg!(-c --config [CONFIG] "Path to the configuration file")
                    .long_help(
                        "\
Path to the configuration file. Defaults to $DAVSYNC_CONFIG, then \
$XDG_CONFIG_HOME/davsync/config.toml on Linux and MacOS, \
%APPDATA%/davsync/config.toml on Windows.",
                    )
                    .global(true)
                    .value_parser(value_parser!(PathBuf))
                    .value_hint(ValueHint::FilePath),
            )
            .arg(CommonArgs::verbose())
            .subcommand(CmdDiscover::command())
            .subcommand(CmdCreate::command())
            .subcommand(CmdSetMeta::command())
            .subcommand(CmdUpload::command())
            .subcommand(CmdDelete::command())
            .subcommand(CmdSync::command())
            .subcommand(CmdGenerateCompletion::command())
    }

    /// Parse the command-line arguments
    pub fn parse() -> Result<Self, Box<dyn Error>> {
        let commands = Self::command();
        let matches = commands.get_matches();
        Self::from(&matches)
    }

    /// Parse the specified arguments
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, Box<dyn Error>>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let commands = Self::command();
        let matches = commands.try_get_matches_from(args)?;
        Self::from(&matches)
    }

    /// Create a CLI instance from the `ArgMatches`
    pub fn from(matches: &ArgMatches) -> Result<Self, Box<dyn Error>> {
        use Commands::*;
        let command = match matches.subcommand() {
            Some((CmdDiscover::NAME, matches)) => Discover(CmdDiscover::from(matches)),
            Some((CmdCreate::NAME, matches)) => Create(CmdCreate::from(matches)),
            Some((CmdSetMeta::NAME, matches)) => SetMeta(CmdSetMeta::from(matches)),
            Some((CmdUpload::NAME, matches)) => Upload(CmdUpload::from(matches)),
            Some((CmdDelete::NAME, matches)) => Delete(CmdDelete::from(matches)),
            Some((CmdSync::NAME, matches)) => Sync(CmdSync::from(matches)),
            Some((CmdGenerateCompletion::NAME, matches)) => {
                GenerateCompletion(CmdGenerateCompletion::from(matches))
            }
            Some((name, _)) => return Err(format!("Unknown command: {name}").into()),
            None => return Err("No command given".into()),
        };

        Ok(Cli {
            config: matches.get_one("config").cloned(),
            verbose: CommonArgs::get_verbose(matches),
            command,
        })
    }

    /// Run the command
    pub fn run(self) -> Result<(), Box<dyn Error>> {
        self.command.run(self.config)
    }
}

/// The commands available in the CLI
#[derive(Debug, Clone)]
pub enum Commands {
    /// List collections
    Discover(CmdDiscover),

    /// Create a collection
    Create(CmdCreate),

    /// Change collection metadata
    SetMeta(CmdSetMeta),

    /// Upload an item
    Upload(CmdUpload),

    /// Delete an item or a collection
    Delete(CmdDelete),

    /// Pull the sync log and report changes
    Sync(CmdSync),

    /// Generate shell completion
    GenerateCompletion(CmdGenerateCompletion),
}

impl Commands {
    /// Run the command with the given configuration
    #[rustfmt::skip]
    pub fn run(self, config: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
        use Commands::*;
        match self {
            Discover(a) => Self::run_with(config, |x| a.run(x)),
            Create(a)   => Self::run_with(config, |x| a.run(x)),
            SetMeta(a)  => Self::run_with(config, |x| a.run(x)),
            Upload(a)   => Self::run_with(config, |x| a.run(x)),
            Delete(a)   => Self::run_with(config, |x| a.run(x)),
            Sync(a)     => Self::run_with(config, |x| a.run(x)),
            GenerateCompletion(a) => a.run(),
        }
    }

    fn run_with<F>(config: Option<PathBuf>, f: F) -> Result<(), Box<dyn Error>>
    where
        F: FnOnce(&DecsyncStore<FsStore>) -> Result<(), Box<dyn Error>>,
    {
        tracing::debug!("parsing configuration...");
        let config = parse_config(config)?;
        let store = davsync_core::open(config)?;
        f(&store)
    }
}

/// Open the bridged collection at `path`.
pub fn open_collection(
    store: &DecsyncStore<FsStore>,
    path: &str,
) -> Result<DecsyncCollection<FsCollection>, Box<dyn Error>> {
    match store.discover(path, Depth::Zero)?.next() {
        Some(collection) => Ok(collection?),
        None => Err(format!("No collection at {path}").into()),
    }
}
