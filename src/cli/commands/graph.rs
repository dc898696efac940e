//! graph command - Print the reconstructed commit graph

use std::path::Path;

use anyhow::{Context as _, Result};
use serde::Serialize;

use crate::cli::Context;
use crate::core::model::{Commit, ExportGraph, FileChange};
use crate::parser::{FastExportParser, ParseOptions};
use crate::ui::output;

/// Serializable view of one file change.
///
/// Payload bytes are summarized by size; the JSON document describes
/// the graph, it does not carry blob contents.
#[derive(Serialize)]
struct ChangeEntry {
    action: String,
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mark: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_bytes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<String>,
}

#[derive(Serialize)]
struct PersonEntry {
    name: String,
    email: String,
    when: i64,
    tz: String,
}

#[derive(Serialize)]
struct CommitEntry {
    mark: u64,
    r#ref: String,
    author: PersonEntry,
    committer: PersonEntry,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    from: Option<u64>,
    merges: Vec<u64>,
    changes: Vec<ChangeEntry>,
}

#[derive(Serialize)]
struct FileEntry {
    mark: u64,
    name: String,
    size: usize,
}

#[derive(Serialize)]
struct HeadEntry {
    r#ref: String,
    mark: u64,
}

#[derive(Serialize)]
struct GraphReport {
    commits: Vec<CommitEntry>,
    files: Vec<FileEntry>,
    heads: Vec<HeadEntry>,
}

/// Parse the stream and print the graph, human-readable or as JSON.
pub fn graph(ctx: &Context, stream: &Path, json: bool) -> Result<()> {
    let options = ParseOptions {
        keep_notes: ctx.config.keep_notes(),
    };
    let graph = FastExportParser::new(options)
        .run(Some(stream))
        .with_context(|| format!("failed to ingest '{}'", stream.display()))?;

    if json || ctx.config.json_default() {
        let report = build_report(&graph);
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for commit in graph.commits_in_order() {
        print_commit(ctx, commit);
    }
    Ok(())
}

fn print_commit(ctx: &Context, commit: &Commit) {
    let date = commit
        .committer
        .rfc3339()
        .unwrap_or_else(|| commit.committer.when.to_string());
    let parents: Vec<String> = commit.parents().map(|m| m.dataref()).collect();
    let parents = if parents.is_empty() {
        "root".to_string()
    } else {
        parents.join(" ")
    };

    output::print(
        format!(
            ":{} {} {} [{}] {}",
            commit.mark,
            commit.refname.shorthand(),
            date,
            parents,
            commit.summary(),
        ),
        ctx.verbosity,
    );
    for change in &commit.changes {
        output::print(format!("    {}", describe_change(change)), ctx.verbosity);
    }
}

fn describe_change(change: &FileChange) -> String {
    let mut text = format!("{} {}", change.action, change.path);
    if let Some(source) = &change.source {
        text = format!("{} {} -> {}", change.action, source, change.path);
    }
    if let Some(mark) = change.mark {
        text.push_str(&format!(" ({})", mark.dataref()));
    }
    if let Some(inline) = &change.inline {
        text.push_str(&format!(" (inline, {} bytes)", inline.len()));
    }
    text
}

fn build_report(graph: &ExportGraph) -> GraphReport {
    let commits = graph
        .commits_in_order()
        .map(|commit| CommitEntry {
            mark: commit.mark.get(),
            r#ref: commit.refname.to_string(),
            author: person_entry(&commit.author),
            committer: person_entry(&commit.committer),
            message: commit.message_lossy().into_owned(),
            from: commit.from.map(|m| m.get()),
            merges: commit.merges.iter().map(|m| m.get()).collect(),
            changes: commit
                .changes
                .iter()
                .map(|change| ChangeEntry {
                    action: change.action.to_string(),
                    path: change.path.clone(),
                    mode: change.mode.map(|m| m.as_octal().to_string()),
                    mark: change.mark.map(|m| m.get()),
                    inline_bytes: change.inline.as_ref().map(Vec::len),
                    source: change.source.clone(),
                })
                .collect(),
        })
        .collect();

    let mut files: Vec<FileEntry> = graph
        .files()
        .iter()
        .map(|(mark, record)| FileEntry {
            mark: mark.get(),
            name: record.name.clone(),
            size: record.blob.len(),
        })
        .collect();
    files.sort_by_key(|f| f.mark);

    let mut heads: Vec<HeadEntry> = graph
        .heads()
        .iter()
        .map(|(refname, mark)| HeadEntry {
            r#ref: refname.to_string(),
            mark: mark.get(),
        })
        .collect();
    heads.sort_by(|a, b| a.r#ref.cmp(&b.r#ref));

    GraphReport {
        commits,
        files,
        heads,
    }
}

fn person_entry(person: &crate::core::model::Person) -> PersonEntry {
    PersonEntry {
        name: person.name.clone(),
        email: person.email.clone(),
        when: person.when,
        tz: format!("{:+05}", person.tz),
    }
}
