//! # panama
//!
//! Fast workspace finder and switcher.
//!
//! ## Overview
//!
//! panama finds project workspaces (Git repositories and directories with a
//! package manifest) below a directory, ranks them, and prints the one you
//! pick. It is meant to be wrapped by a shell function:
//!
//! ```bash
//! # Jump to a workspace picked with the fuzzy finder
//! cd "$(panama)"
//!
//! # Best match for a query, no prompt
//! panama select --first -q api
//!
//! # Shell command instead of a bare path
//! eval "$(panama select -f cd)"
//!
//! # Every workspace, as JSON
//! panama list -f json
//!
//! # Monorepo root (nearest .panama.yaml or .git)
//! cd "$(panama root)"
//! ```
//!
//! Configuration lives in `.panama.yaml` (or `.yml`, `.toml`, `.json`),
//! looked up from the search path upward. `panama init` writes one.

mod select;

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use panamalib::{
    collect_workspaces, find_root, print_path, print_workspaces, CollectOptions, Config, Format,
    LoadedConfig, Workspace,
};
use tracing::debug;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

use crate::select::Item;

type FilterHandle = reload::Handle<EnvFilter, Registry>;

fn path_arg() -> Arg {
    Arg::new("path")
        .help("Directory to search (defaults to current directory)")
        .default_value(".")
}

fn format_arg(help: &'static str) -> Arg {
    Arg::new("format").short('f').long("format").help(help)
}

fn max_depth_arg() -> Arg {
    Arg::new("max-depth")
        .long("max-depth")
        .value_parser(clap::value_parser!(usize))
        .help("Maximum search depth (0 uses config default)")
}

fn no_cache_arg() -> Arg {
    Arg::new("no-cache")
        .long("no-cache")
        .action(ArgAction::SetTrue)
        .help("Disable caching")
}

fn config_arg() -> Arg {
    Arg::new("config")
        .long("config")
        .help("Path to configuration file")
}

fn select_args() -> Vec<Arg> {
    vec![
        path_arg(),
        Arg::new("query")
            .short('q')
            .long("query")
            .help("Initial search query"),
        Arg::new("first")
            .long("first")
            .action(ArgAction::SetTrue)
            .help("Select first result without interaction"),
        format_arg("Output format (path|cd|json)"),
        max_depth_arg(),
        no_cache_arg(),
        config_arg(),
    ]
}

/// Build the clap Command structure
fn build_command() -> Command {
    Command::new("panama")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Fast workspace finder and switcher")
        .long_about(
            "panama helps you quickly find and navigate to project workspaces.\n\
             It detects Git repositories and project directories with package files.",
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .global(true)
                .help("Increase log verbosity (-v debug, -vv trace)"),
        )
        .arg(
            Arg::new("silent")
                .long("silent")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Suppress non-essential output"),
        )
        .args(select_args())
        .subcommand(
            Command::new("select")
                .about("Select a workspace interactively (default command)")
                .args(select_args()),
        )
        .subcommand(
            Command::new("list")
                .about("List all available workspaces")
                .arg(path_arg())
                .arg(format_arg("Output format (path|json)"))
                .arg(max_depth_arg())
                .arg(no_cache_arg())
                .arg(config_arg()),
        )
        .subcommand(
            Command::new("init")
                .about("Create a .panama.yaml in the current directory")
                .arg(
                    Arg::new("force")
                        .long("force")
                        .action(ArgAction::SetTrue)
                        .help("Overwrite existing configuration file"),
                ),
        )
        .subcommand(
            Command::new("root")
                .about("Print the nearest parent directory containing panama config or .git")
                .arg(format_arg("Output format (path|cd|json)"))
                .arg(config_arg()),
        )
        .subcommand(Command::new("version").about("Show version information"))
}

/// Log filter for the given verbosity. `RUST_LOG` wins unless a flag is set.
fn log_filter(verbose: u8, silent: bool) -> EnvFilter {
    if !silent && verbose == 0 {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return filter;
        }
    }
    let level = if silent {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    };
    EnvFilter::new(format!("panama={level},panamalib={level}"))
}

/// Install the stderr subscriber. The handle lets a config file's
/// `silent` setting lower the level later.
fn init_tracing(verbose: u8, silent: bool) -> Option<FilterHandle> {
    let (filter, handle) = reload::Layer::new(log_filter(verbose, silent));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .with_level(true),
        )
        .try_init()
        .ok()
        .map(|_| handle)
}

/// Shared state for command handlers
struct CommandContext {
    log_handle: Option<FilterHandle>,
}

impl CommandContext {
    fn silence(&self) {
        if let Some(handle) = &self.log_handle {
            if let Err(err) = handle.modify(|filter| *filter = log_filter(0, true)) {
                debug!(%err, "failed to lower log level");
            }
        }
    }
}

fn absolute(path: &str) -> Result<PathBuf> {
    std::path::absolute(path).with_context(|| format!("failed to resolve path: {path}"))
}

fn parse_format(matches: &ArgMatches, fallback: Format) -> Result<Format> {
    match matches.get_one::<String>("format") {
        Some(token) => Ok(token.parse::<Format>()?),
        None => Ok(fallback),
    }
}

/// Load and validate config, returning it with the directory to search.
fn load_config(matches: &ArgMatches, ctx: &CommandContext) -> Result<(LoadedConfig, PathBuf)> {
    let path = matches
        .get_one::<String>("path")
        .map(|s| s.as_str())
        .unwrap_or(".");
    let root = absolute(path)?;

    let config_path = matches
        .get_one::<String>("config")
        .map(|p| absolute(p))
        .transpose()?;

    let loaded = panamalib::load(config_path.as_deref(), &root)?;
    loaded.config.validate()?;

    if loaded.config.silent {
        ctx.silence();
    }

    // A discovered config file anchors the search at its directory
    let search_root = loaded
        .config_dir()
        .map(Path::to_path_buf)
        .unwrap_or(root);
    debug!(root = %search_root.display(), source = ?loaded.source, "search root");

    Ok((loaded, search_root))
}

fn collect_options(matches: &ArgMatches, config: &Config) -> CollectOptions {
    let mut options =
        CollectOptions::new().no_cache(matches.get_flag("no-cache") || config.no_cache);
    if let Some(depth) = matches.get_one::<usize>("max-depth") {
        options = options.max_depth(*depth);
    }
    if let Some(query) = matches.try_get_one::<String>("query").ok().flatten() {
        options = options.query(query.clone());
    }
    options
}

fn collect(
    matches: &ArgMatches,
    ctx: &CommandContext,
) -> Result<(LoadedConfig, PathBuf, Vec<Workspace>)> {
    let (loaded, search_root) = load_config(matches, ctx)?;
    let options = collect_options(matches, &loaded.config);

    let workspaces = collect_workspaces(&search_root, &loaded.config, &options)
        .context("failed to collect workspaces")?;
    if workspaces.is_empty() {
        bail!("no workspaces found");
    }
    Ok((loaded, search_root, workspaces))
}

/// Handler for select command
fn select_handler(matches: &ArgMatches, ctx: &CommandContext) -> Result<()> {
    let (loaded, search_root, workspaces) = collect(matches, ctx)?;
    let config = &loaded.config;
    let format = parse_format(matches, config.format)?;

    let query = matches.get_one::<String>("query").map(|s| s.as_str());
    let mode = select::mode(
        config.ui,
        matches.get_flag("first"),
        select::is_terminal(),
    );
    debug!(?mode, count = workspaces.len(), "selecting");

    let items: Vec<Item> = workspaces
        .iter()
        .map(|ws| Item::from_workspace(ws, &search_root))
        .collect();
    let idx = select::select(&items, mode, query)?;

    print_path(&mut io::stdout().lock(), &workspaces[idx].path, format)?;
    Ok(())
}

/// Handler for list command
fn list_handler(matches: &ArgMatches, ctx: &CommandContext) -> Result<()> {
    let format = parse_format(matches, Format::Path)?;
    let (_, _, workspaces) = collect(matches, ctx)?;

    print_workspaces(&mut io::stdout().lock(), &workspaces, format)?;
    Ok(())
}

/// Handler for init command
fn init_handler(matches: &ArgMatches) -> Result<()> {
    let cwd = std::env::current_dir().context("failed to get current directory")?;
    let path = Config::init_file(&cwd, matches.get_flag("force"))?;
    println!("Configuration file created: {}", path.display());
    Ok(())
}

/// Handler for root command
fn root_handler(matches: &ArgMatches) -> Result<()> {
    let format = parse_format(matches, Format::Path)?;

    let root = match matches.get_one::<String>("config") {
        Some(config) => absolute(config)?
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| anyhow!("failed to resolve config directory"))?,
        None => {
            let cwd = std::env::current_dir().context("failed to get current directory")?;
            find_root(&cwd)
                .ok_or_else(|| anyhow!("no root workspace found in any parent directory"))?
        }
    };

    print_path(&mut io::stdout().lock(), &root, format)?;
    Ok(())
}

fn run(matches: &ArgMatches, ctx: &CommandContext) -> Result<()> {
    match matches.subcommand() {
        Some(("select", sub)) => select_handler(sub, ctx),
        Some(("list", sub)) => list_handler(sub, ctx),
        Some(("init", sub)) => init_handler(sub),
        Some(("root", sub)) => root_handler(sub),
        Some(("version", _)) => {
            println!("panama version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        // No subcommand: treat as select
        _ => select_handler(matches, ctx),
    }
}

fn main() -> ExitCode {
    let matches = build_command().get_matches();

    let ctx = CommandContext {
        log_handle: init_tracing(matches.get_count("verbose"), matches.get_flag("silent")),
    };

    match run(&matches, &ctx) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
