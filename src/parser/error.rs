//! parser::error
//!
//! Parse failure taxonomy.
//!
//! Every stream-shaped variant carries the 1-based line number where the
//! failure was detected and, where useful, the offending text. A failure
//! aborts the whole run: a transfer built from a partially-correct
//! history is worse than one that fails loudly, so there is no
//! skip-and-continue mode.

use thiserror::Error;

use crate::core::types::Mark;

/// Errors from parsing a fast-export stream.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A `data <len>` header declared more bytes than the stream holds.
    #[error("line {line}: declared {wanted} bytes but only {available} remain")]
    TruncatedStream {
        /// Line of the `data` header
        line: u64,
        /// Bytes the header declared
        wanted: usize,
        /// Bytes actually available
        available: usize,
    },

    /// A line referenced a mark that no prior directive defined.
    ///
    /// Producers never forward-reference marks, so this indicates a
    /// producer bug or a corrupted stream.
    #[error("line {line}: reference to undefined mark :{mark}")]
    UndefinedMark {
        /// Line containing the reference
        line: u64,
        /// The mark that was not found
        mark: Mark,
    },

    /// The producer reused a mark number.
    #[error("line {line}: mark :{mark} already defined")]
    DuplicateMark {
        /// Line of the redefinition
        line: u64,
        /// The mark being redefined
        mark: Mark,
    },

    /// An unknown keyword appeared where a top-level directive was
    /// expected. The stream uses a grammar extension this parser does
    /// not support.
    #[error("line {line}: unrecognized directive '{directive}'")]
    UnrecognizedDirective {
        /// Line of the unknown keyword
        line: u64,
        /// The keyword that was not recognized
        directive: String,
    },

    /// An `author`/`committer` line did not match `Name <email> epoch tz`.
    #[error("line {line}: malformed author/committer line '{text}'")]
    MalformedPerson {
        /// Line of the identity
        line: u64,
        /// The full offending line
        text: String,
    },

    /// Neither a stream path nor in-memory input was supplied.
    #[error("no input source: neither a stream path nor in-memory input was supplied")]
    NoInputSource,

    /// A recognized directive had a malformed body.
    #[error("line {line}: {detail} in '{text}'")]
    MalformedDirective {
        /// Line of the directive
        line: u64,
        /// What was wrong
        detail: String,
        /// The full offending line
        text: String,
    },

    /// A mark resolved to the wrong kind of entity (e.g. a `from` line
    /// naming a blob).
    #[error("line {line}: mark :{mark} names a {found}, expected a {expected}")]
    MarkKindMismatch {
        /// Line containing the reference
        line: u64,
        /// The mark that resolved
        mark: Mark,
        /// The kind the directive requires
        expected: &'static str,
        /// The kind the mark table holds
        found: &'static str,
    },

    /// The underlying source could not be read.
    #[error("failed to read stream: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}
