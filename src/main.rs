//! git2p4 binary entry point.

use git2p4::cli::args::Cli;
use git2p4::cli::{commands, Context};
use git2p4::core::config::Config;
use git2p4::ui::output::{self, Verbosity};

fn main() {
    let cli = Cli::parse_args();
    let verbosity = Verbosity::from_flags(cli.quiet, cli.debug);

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            output::error(err);
            std::process::exit(1);
        }
    };

    let ctx = Context { config, verbosity };
    if let Err(err) = commands::dispatch(cli.command, &ctx) {
        output::error(format!("{err:#}"));
        std::process::exit(1);
    }
}
