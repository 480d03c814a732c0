//! pve-lxc: create Proxmox VE LXC containers from a YAML description.
//!
//! This is the main entry point for the `pve-lxc` CLI. It parses arguments,
//! sets up logging, dispatches to the command handler, and maps errors to
//! exit codes.

mod api;
mod cli;
mod commands;
mod config;
mod credentials;
mod error;
mod exit_codes;
mod poller;
mod provision;
mod request;

#[cfg(test)]
mod test_support;

use cli::Cli;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    init_logging(cli.verbose);

    match commands::dispatch(cli.command) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::from(err.exit_code() as u8)
        }
    }
}

/// Log to stderr so stdout stays clean for summaries and `--json`.
fn init_logging(verbose: bool) {
    let default = if verbose { "pve_lxc=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
