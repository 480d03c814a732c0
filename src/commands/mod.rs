//! Command implementations for pve-lxc.
//!
//! `dispatch` routes each parsed CLI command to its handler.

mod create;
mod validate;

use crate::cli::Command;
use crate::error::Result;

/// Dispatch a command to its implementation.
pub fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Create(args) => create::cmd_create(args),
        Command::Validate(args) => validate::cmd_validate(args),
    }
}
