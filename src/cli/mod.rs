//! cli
//!
//! Command-line interface layer.
//!
//! # Architecture
//!
//! - [`args`] - clap-derive argument definitions
//! - [`commands`] - one handler per subcommand
//!
//! Handlers parse streams through the [`crate::parser`] doorway and
//! format results through [`crate::ui::output`]; they never touch raw
//! stream bytes themselves.

pub mod args;
pub mod commands;

use crate::core::config::Config;
use crate::ui::output::Verbosity;

/// Resolved invocation context shared by all command handlers.
#[derive(Debug)]
pub struct Context {
    /// Loaded configuration.
    pub config: Config,
    /// Output verbosity from the global flags.
    pub verbosity: Verbosity,
}
