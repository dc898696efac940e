//! parser
//!
//! Single doorway for fast-export stream ingestion.
//!
//! # Architecture
//!
//! This module is the **ONLY** consumer of raw stream bytes. It turns
//! an ordered sequence of textual directives interleaved with
//! length-prefixed binary payloads into validated, cross-referenced
//! records, in exactly one forward pass:
//!
//! - `reader` - buffered, binary-safe cursor (lines + exact-length reads)
//! - `directive` - line classification for the grammar
//! - `marks` - single-namespace mark table with kind checking
//! - `builder` - the `Idle <-> InCommit` graph-building state machine
//! - [`FastExportParser`] - the run orchestrator
//!
//! # Invariants
//!
//! - Byte and size accounting is exact: payloads are read at their
//!   declared length, never scanned for terminators.
//! - Marks are defined before they are referenced; a forward reference
//!   aborts the run.
//! - Ingestion is all-or-nothing: any parse failure aborts the whole
//!   run and no partial graph is returned, because a transfer built
//!   from a partially-correct history silently corrupts it.
//! - One run owns all of its state; concurrent runs on independent
//!   parsers are safe and independent.
//!
//! # Supported-input constraint
//!
//! The `files` aggregate is keyed by blob mark, which assumes the
//! producer associates each blob with a single path (true of
//! `git fast-export`, which emits a blob immediately before the commit
//! that uses it). When a blob mark is referenced by several modify
//! lines, the first reference claims the `files` entry; every commit's
//! own change list is complete regardless.
//!
//! # Example
//!
//! ```
//! use git2p4::parser::{FastExportParser, ParseOptions};
//!
//! let stream = "blob\nmark :1\ndata 3\nhi\n\n";
//! let graph = FastExportParser::new(ParseOptions::default())
//!     .with_input(stream)
//!     .run(None)
//!     .unwrap();
//! assert_eq!(graph.commit_count(), 0);
//! ```

mod builder;
mod directive;
mod error;
mod marks;
mod reader;

pub use error::ParseError;
pub use reader::ByteReader;

use std::path::Path;

use crate::core::model::ExportGraph;

use builder::GraphBuilder;

/// Knobs for a parse run.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Retain `N` (note) changes on their commits. Off by default:
    /// notes do not migrate to the destination system.
    pub keep_notes: bool,
}

/// Run orchestrator: one stream in, one [`ExportGraph`] out.
///
/// The source is either a file path passed to [`run`](Self::run) or an
/// in-memory buffer supplied with [`with_input`](Self::with_input)
/// (used by callers that already hold the stream, e.g. tests). An
/// in-memory buffer takes precedence over a path.
#[derive(Debug)]
pub struct FastExportParser {
    options: ParseOptions,
    input: Option<Vec<u8>>,
}

impl FastExportParser {
    /// Create a parser with the given options.
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options,
            input: None,
        }
    }

    /// Supply the stream as an in-memory buffer.
    pub fn with_input(mut self, input: impl Into<Vec<u8>>) -> Self {
        self.input = Some(input.into());
        self
    }

    /// Perform the single linear pass and return the aggregates.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::NoInputSource`] when neither an in-memory
    /// buffer nor a path was supplied, and any parse failure from the
    /// run itself. A failed run returns no partial graph.
    pub fn run(self, source: Option<&Path>) -> Result<ExportGraph, ParseError> {
        let mut reader = match (self.input, source) {
            (Some(bytes), _) => ByteReader::from_bytes(bytes),
            (None, Some(path)) => ByteReader::from_path(path)?,
            (None, None) => return Err(ParseError::NoInputSource),
        };
        let mut builder = GraphBuilder::new(&self.options);
        builder.ingest(&mut reader)?;
        Ok(builder.finish())
    }
}

/// Parse an in-memory stream with default options.
///
/// # Errors
///
/// Any [`ParseError`] from the run.
pub fn parse_bytes(input: impl Into<Vec<u8>>) -> Result<ExportGraph, ParseError> {
    FastExportParser::new(ParseOptions::default())
        .with_input(input)
        .run(None)
}

/// Parse a stream file with default options.
///
/// # Errors
///
/// Any [`ParseError`] from the run.
pub fn parse_file(path: &Path) -> Result<ExportGraph, ParseError> {
    FastExportParser::new(ParseOptions::default()).run(Some(path))
}
