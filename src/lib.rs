//! Countersign: a local-first contract lifecycle platform.
//!
//! Design reusable **blueprints** (named field layouts), instantiate
//! **contracts** from them, fill in field values, and move each contract
//! through a fixed approval lifecycle:
//!
//! ```text
//! CREATED -> APPROVED -> SENT -> SIGNED -> LOCKED
//!    \                    \
//!     +-> REVOKED          +-> REVOKED
//! ```
//!
//! # Architecture
//!
//! - All state is local: one SQLite database under `.countersign/data/`,
//!   holding each collection as a whole-value key/value record.
//! - Each collection has exactly one owner (its store); every mutation
//!   funnels through that store's methods and persists synchronously.
//! - The lifecycle engine is a pure transition table. Stores consult it
//!   before applying a status change; the CLI queries it to list actions
//!   and never hardcodes the table.
//!
//! # Examples
//!
//! ```bash
//! # Initialize a workspace
//! countersign init
//!
//! # Save a blueprint
//! countersign blueprint add "NDA" --field "Signer:signature:40,80" --field "Agreed:checkbox"
//!
//! # Instantiate and drive a contract
//! countersign contract create "Acme NDA" --blueprint <ID>
//! countersign contract actions --id <ID>
//! countersign contract set-status --id <ID> --to approved
//! ```
//!
//! # Crate structure
//!
//! - [`core`]: entity model, lifecycle engine, durable-store access
//! - [`stores`]: blueprint and contract stores with their CLI surfaces

pub mod core;
pub mod stores;

use crate::core::{error, workspace::Workspace};
use crate::stores::{blueprint, contract};

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "countersign",
    version = env!("CARGO_PKG_VERSION"),
    about = "Blueprint-driven contract lifecycle management"
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct InitCli {
    /// Directory to initialize (defaults to current working directory).
    #[clap(short, long)]
    dir: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
struct SchemaCli {
    /// Optional: filter by subsystem name (blueprint | contract).
    #[clap(long)]
    subsystem: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the workspace (`.countersign/data/`) and durable store
    #[clap(name = "init", visible_alias = "i")]
    Init(InitCli),

    /// Design and manage reusable blueprints
    #[clap(name = "blueprint", visible_alias = "b")]
    Blueprint(blueprint::BlueprintCli),

    /// Instantiate contracts and drive their lifecycle
    #[clap(name = "contract", visible_alias = "c")]
    Contract(contract::ContractCli),

    /// Subsystem schemas and discovery
    #[clap(name = "schema")]
    Schema(SchemaCli),

    /// Show version information
    #[clap(name = "version")]
    Version,
}

pub fn run() -> Result<(), error::CountersignError> {
    let cli = Cli::parse();
    let current_dir = std::env::current_dir()?;

    match cli.command {
        Command::Version => {
            println!("v{}", env!("CARGO_PKG_VERSION"));
        }
        Command::Init(init_cli) => {
            let target_dir = match init_cli.dir {
                Some(d) => d,
                None => current_dir,
            };
            let target_dir =
                std::fs::canonicalize(&target_dir).map_err(error::CountersignError::IoError)?;

            let already = target_dir.join(core::workspace::WORKSPACE_DIR).exists();
            let workspace = Workspace::initialize(&target_dir)?;
            if already {
                println!(
                    "{} Workspace already initialized at {} (existing data kept)",
                    "✓".bright_green(),
                    workspace.root.display()
                );
            } else {
                println!(
                    "{} Workspace initialized at {}",
                    "●".bright_green(),
                    workspace.root.display()
                );
                println!(
                    "  {} Save a blueprint: {}",
                    "▸".bright_cyan(),
                    "countersign blueprint add".bright_white()
                );
                println!(
                    "  {} Create a contract: {}",
                    "▸".bright_cyan(),
                    "countersign contract create".bright_white()
                );
            }
        }
        Command::Schema(schema_cli) => {
            let mut schemas = std::collections::BTreeMap::new();
            schemas.insert("blueprint", blueprint::schema());
            schemas.insert("contract", contract::schema());

            let output = if let Some(sub) = schema_cli.subsystem {
                schemas
                    .get(sub.as_str())
                    .cloned()
                    .unwrap_or(serde_json::json!({ "error": "subsystem not found" }))
            } else {
                serde_json::json!({
                    "schema_version": "1.0.0",
                    "subsystems": schemas
                })
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Command::Blueprint(blueprint_cli) => {
            let workspace = Workspace::discover(&current_dir)?;
            blueprint::run_blueprint_cli(&workspace, blueprint_cli)?;
        }
        Command::Contract(contract_cli) => {
            let workspace = Workspace::discover(&current_dir)?;
            contract::run_contract_cli(&workspace, contract_cli)?;
        }
    }
    Ok(())
}
