//! CLI argument parsing for pve-lxc.
//!
//! Uses clap derive macros for declarative argument definitions.
//! Implementations live in the `commands` module.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// pve-lxc: create Proxmox VE LXC containers from a YAML description.
///
/// Credentials come from the environment (`PROXMOX_HOST`, `PROXMOX_USER`,
/// `PROXMOX_TOKEN_NAME`, `PROXMOX_TOKEN_SECRET`), optionally overlaid by an
/// env file. Every variable can also be referenced from the config as `${NAME}`.
#[derive(Parser, Debug)]
#[command(name = "pve-lxc")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Log debug output to stderr (`RUST_LOG` overrides).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a container and wait for the creation task to finish.
    ///
    /// Validates the config, allocates the next free vmid (unless --vmid is
    /// given), submits the creation request and polls the resulting task.
    Create(CreateArgs),

    /// Check a config file without contacting the cluster.
    Validate(ValidateArgs),
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Path to the container YAML file.
    pub config: PathBuf,

    /// Env file overlaid on the process environment.
    #[arg(long, value_name = "PATH")]
    pub env_file: Option<PathBuf>,

    /// Use this vmid instead of allocating one.
    #[arg(long, value_name = "N")]
    pub vmid: Option<u32>,

    /// Build and print the request without creating anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Print the final summary as JSON.
    #[arg(long)]
    pub json: bool,

    /// Seconds between task status polls.
    #[arg(long, value_name = "SECS", default_value_t = 2,
          value_parser = clap::value_parser!(u64).range(1..))]
    pub poll_interval: u64,

    /// Give up after this many status polls.
    #[arg(long, value_name = "N", default_value_t = 300,
          value_parser = clap::value_parser!(u32).range(1..))]
    pub max_attempts: u32,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the container YAML file.
    pub config: PathBuf,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
