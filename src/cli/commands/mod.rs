//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Validates command-specific arguments
//! 2. Runs the parser (or the config store)
//! 3. Formats and displays output
//!
//! Handlers never perform write-side VCS operations: every command here
//! is read-only with respect to both source and destination systems.

mod completion;
mod config_cmd;
mod graph;
mod verify;

pub use completion::completion;
pub use config_cmd::{get as config_get, list as config_list, set as config_set};
pub use graph::graph;
pub use verify::verify;

use anyhow::Result;

use crate::cli::args::{Command, ConfigAction};
use crate::cli::Context;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Verify { stream } => verify::verify(ctx, &stream),
        Command::Graph { stream, json } => graph::graph(ctx, &stream, json),
        Command::Config { action } => match action {
            ConfigAction::Get { key } => config_cmd::get(ctx, &key),
            ConfigAction::Set { key, value } => config_cmd::set(ctx, &key, &value),
            ConfigAction::List => config_cmd::list(ctx),
        },
        Command::Completion { shell } => completion::completion(shell),
    }
}
