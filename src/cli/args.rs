//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--config <path>`: Load this config file instead of the defaults
//! - `--debug`: Enable debug output
//! - `--quiet` / `-q`: Minimal output

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// git2p4 - Ingest git fast-export streams for transfer into Perforce
#[derive(Parser, Debug)]
#[command(name = "git2p4")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Load this config file instead of the standard locations
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse a fast-export stream and report whether it is transferable
    #[command(
        name = "verify",
        long_about = "Parse a fast-export stream and report whether it is transferable.\n\n\
            The whole stream is ingested in a single pass. On success a summary of \
            commits, files, branches, and payload bytes is printed. On failure the \
            first error is reported with its line number and the run produces \
            nothing - a transfer never proceeds from a partially-parsed history.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Export a repository and check it before transferring
    git -C myrepo fast-export --all --export-marks=marks.txt > myrepo.fe
    git2p4 verify myrepo.fe

    # Quiet check in a migration script (exit code only)
    git2p4 -q verify myrepo.fe"
    )]
    Verify {
        /// Path to the fast-export stream file
        stream: PathBuf,
    },

    /// Print the reconstructed commit graph
    #[command(
        name = "graph",
        long_about = "Print the reconstructed commit graph.\n\n\
            Commits are listed in stream order with their marks, branches, parents, \
            and file changes. With --json the full graph is emitted as a single \
            machine-readable document for downstream tooling."
    )]
    Graph {
        /// Path to the fast-export stream file
        stream: PathBuf,

        /// Emit machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Get, set, or list configuration values
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Configuration subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print one configuration value
    Get {
        /// Key to read (default_branch, keep_notes, output.json)
        key: String,
    },
    /// Set one configuration value
    Set {
        /// Key to write (default_branch, keep_notes, output.json)
        key: String,
        /// New value
        value: String,
    },
    /// List all configuration values
    List,
}

/// Shells completions can be generated for.
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell")]
    PowerShell,
}
