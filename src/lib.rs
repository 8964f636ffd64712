//! Almanac: advisory documents and capabilities for assistant hosts
//!
//! **Almanac ships a curated bundle of agent, prompt, skill, and instruction
//! documents into per-user storage, and exposes a small set of text-generating
//! capabilities to a host chat assistant.**
//!
//! # Core Principles
//!
//! - **Version-gated provisioning**: the bundle is materialized into storage
//!   only when its version changes, wipe-and-replace, never partially
//! - **Contained capabilities**: every capability runs under one wrapper that
//!   validates ambient context, contains errors, and records usage
//! - **Advisory telemetry**: local aggregate counts only, one boolean
//!   configuration flag away from silence
//! - **Host-injected everything**: active document, workspace root, and the
//!   persistent state store arrive as traits, so the core runs against fakes
//!
//! # Architecture
//!
//! On activation the controller compares the installed-version marker in the
//! persistent state store against the shipped bundle version and re-installs
//! the resource tree when they differ or storage is absent. It then registers
//! the closed capability set, each bound to a shared usage reporter, and
//! wires the two statistics commands.
//!
//! # Crate Structure
//!
//! - [`core`]: activation controller, synchronizer, state store, telemetry
//! - [`capabilities`]: the capability trait, registry, wrapper, and bodies

pub mod capabilities;
pub mod core;

use crate::core::activation::{self, ActivationConfig, ExtensionHandle};
use crate::core::assets::{self, Bundle};
use crate::core::config;
use crate::core::error::AlmanacError;
use crate::core::host::CliHost;
use crate::core::stats_cli::{self, StatsCommand};
use crate::core::store::SqliteStateStore;
use crate::core::telemetry::UsageReporter;

use capabilities::{CapabilityInput, CapabilityRegistry};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[clap(
    name = "almanac",
    version = env!("CARGO_PKG_VERSION"),
    about = "Advisory document bundle and assistant capabilities"
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct ActivateCli {
    /// Per-user storage root (defaults to ~/.almanac).
    #[clap(long)]
    storage: Option<PathBuf>,
    /// On-disk bundle tree overriding the embedded bundle.
    #[clap(long)]
    bundle: Option<PathBuf>,
    /// TOML configuration file.
    #[clap(long)]
    config: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
struct InvokeCli {
    /// Capability name (see `almanac capabilities`).
    name: String,
    /// File treated as the active editor document.
    #[clap(long)]
    doc: Option<PathBuf>,
    /// Directory treated as the open workspace root.
    #[clap(long)]
    workspace: Option<PathBuf>,
    /// Per-user storage root (defaults to ~/.almanac).
    #[clap(long)]
    storage: Option<PathBuf>,
    /// TOML configuration file.
    #[clap(long)]
    config: Option<PathBuf>,
    /// Free-form JSON arguments passed to the capability.
    #[clap(long)]
    args: Option<String>,
}

#[derive(clap::Args, Debug)]
struct StatsGroupCli {
    /// Per-user storage root (defaults to ~/.almanac).
    #[clap(long)]
    storage: Option<PathBuf>,
    /// TOML configuration file.
    #[clap(long)]
    config: Option<PathBuf>,
    #[clap(flatten)]
    stats: stats_cli::StatsCli,
}

#[derive(clap::Args, Debug)]
struct BundleCli {
    #[clap(subcommand)]
    command: BundleCommand,
}

#[derive(Subcommand, Debug)]
enum BundleCommand {
    /// List every document in the embedded bundle.
    List,
    /// Write the embedded bundle to a directory.
    Export {
        #[clap(long)]
        dir: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Synchronize resources into storage and report the capability set
    #[clap(name = "activate", visible_alias = "a")]
    Activate(ActivateCli),

    /// Invoke a capability and print its result envelope
    #[clap(name = "invoke")]
    Invoke(InvokeCli),

    /// List registered capabilities
    #[clap(name = "capabilities", visible_alias = "caps")]
    Capabilities,

    /// Usage statistics commands
    #[clap(name = "stats", visible_alias = "s")]
    Stats(StatsGroupCli),

    /// Inspect or export the shipped bundle
    #[clap(name = "bundle", visible_alias = "b")]
    Bundle(BundleCli),

    /// Show version information
    #[clap(name = "version")]
    Version,
}

fn default_storage_root() -> Result<PathBuf, AlmanacError> {
    let home = std::env::var("HOME")?;
    Ok(PathBuf::from(home).join(".almanac"))
}

fn resolve_storage(flag: Option<PathBuf>) -> Result<PathBuf, AlmanacError> {
    match flag {
        Some(dir) => Ok(dir),
        None => default_storage_root(),
    }
}

fn activate(
    storage: Option<PathBuf>,
    bundle: Option<PathBuf>,
    config_path: Option<PathBuf>,
    host: Arc<CliHost>,
) -> Result<ExtensionHandle, AlmanacError> {
    let storage_root = resolve_storage(storage)?;
    let config = config::load_config(config_path.as_deref())?;
    let store = Arc::new(SqliteStateStore::open(&storage_root)?);
    let activation_config = ActivationConfig {
        storage_root,
        bundle_root: bundle,
        telemetry_enabled: config.telemetry.enabled,
    };
    activation::start(&activation_config, host, store)
}

pub fn run() -> Result<(), AlmanacError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Activate(args) => {
            let host = Arc::new(CliHost {
                doc: None,
                workspace: None,
                assume_yes: false,
            });
            let handle = activate(args.storage, args.bundle, args.config, host)?;
            let report = handle.report();
            println!(
                "{} almanac {}",
                "▸".bright_cyan(),
                report.version.bright_white().bold()
            );
            if report.synced {
                println!(
                    "  {} resources synchronized (bundle v{})",
                    "●".bright_green(),
                    report.version
                );
            } else {
                println!("  {} resources up to date", "✓".bright_green());
            }
            println!(
                "  {} {} capabilities registered",
                "●".bright_green(),
                report.capabilities
            );
            handle.stop();
            Ok(())
        }
        Command::Invoke(args) => {
            let input = match &args.args {
                Some(raw) => CapabilityInput {
                    args: serde_json::from_str(raw).map_err(|e| {
                        AlmanacError::MalformedInput {
                            path: "--args".to_string(),
                            reason: e.to_string(),
                        }
                    })?,
                },
                None => CapabilityInput::default(),
            };
            let host = Arc::new(CliHost {
                doc: args.doc.clone(),
                workspace: args.workspace.clone(),
                assume_yes: false,
            });
            let handle = activate(args.storage, None, args.config, host)?;
            let envelope = handle.invoke(&args.name, &input);
            let rendered = serde_json::to_string_pretty(&envelope)
                .map_err(|e| AlmanacError::ValidationError(e.to_string()))?;
            println!("{}", rendered);
            Ok(())
        }
        Command::Capabilities => {
            let storage_root = default_storage_root()?;
            let registry = CapabilityRegistry::standard(&storage_root);
            println!("Registered capabilities:");
            for capability in registry.iter() {
                println!(
                    "- {} ({}): {}",
                    capability.name().bright_cyan(),
                    capability.display_name(),
                    capability.description()
                );
            }
            Ok(())
        }
        Command::Stats(args) => {
            let storage_root = resolve_storage(args.storage)?;
            let config = config::load_config(args.config.as_deref())?;
            let store = Arc::new(SqliteStateStore::open(&storage_root)?);
            let reporter = UsageReporter::new(store, config.telemetry.enabled);
            let assume_yes = matches!(&args.stats.command, StatsCommand::Reset { yes: true });
            let host = CliHost {
                doc: None,
                workspace: None,
                assume_yes,
            };
            stats_cli::run_stats_cli(args.stats, &reporter, &host)
        }
        Command::Bundle(args) => match args.command {
            BundleCommand::List => {
                println!("Bundled advisory documents (v{}):", assets::BUNDLE_VERSION);
                for path in assets::list_bundled_docs() {
                    println!("- {}", path);
                }
                Ok(())
            }
            BundleCommand::Export { dir } => {
                let bundle = Bundle::embedded();
                bundle.write_entries(&dir)?;
                println!(
                    "Exported {} document(s) to {}",
                    bundle.entries().len(),
                    dir.display()
                );
                Ok(())
            }
        },
        Command::Version => {
            println!("almanac {}", env!("CARGO_PKG_VERSION"));
            println!("bundle version {}", assets::BUNDLE_VERSION);
            Ok(())
        }
    }
}
