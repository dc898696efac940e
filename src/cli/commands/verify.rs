//! verify command - Parse a stream and report whether it is transferable

use std::path::Path;

use anyhow::{Context as _, Result};

use crate::cli::Context;
use crate::parser::{FastExportParser, ParseOptions};
use crate::ui::output;

/// Parse the stream and print an ingestion summary.
///
/// Any parse failure propagates; the process exits non-zero without
/// printing a summary, so scripts can gate a transfer on this command.
pub fn verify(ctx: &Context, stream: &Path) -> Result<()> {
    let options = ParseOptions {
        keep_notes: ctx.config.keep_notes(),
    };

    output::debug(format!("parsing {}", stream.display()), ctx.verbosity);
    let graph = FastExportParser::new(options)
        .run(Some(stream))
        .with_context(|| format!("failed to ingest '{}'", stream.display()))?;

    output::print(
        format!(
            "ok: {} commits, {} files ({}) across {} branch heads",
            graph.commit_count(),
            graph.file_count(),
            output::format_bytes(graph.total_blob_bytes()),
            graph.heads().len(),
        ),
        ctx.verbosity,
    );

    let default_branch = ctx.config.default_branch();
    let mut heads: Vec<_> = graph.heads().iter().collect();
    heads.sort_by(|a, b| a.0.as_str().cmp(b.0.as_str()));
    for (refname, mark) in heads {
        let trunk = if refname.is_branch() && refname.shorthand() == default_branch {
            " (trunk)"
        } else {
            ""
        };
        output::print(
            format!("  {} -> :{}{}", refname, mark, trunk),
            ctx.verbosity,
        );
    }

    Ok(())
}
