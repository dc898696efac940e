//! core::model
//!
//! Record model for a parsed fast-export stream.
//!
//! # Records
//!
//! - [`Blob`] - A byte payload defined by a `blob` directive
//! - [`Person`] - An author/committer identity with epoch and offset
//! - [`FileChange`] - One path operation recorded inside a commit
//! - [`Commit`] - A fully-assembled commit with parents and changes
//! - [`FileRecord`] - A blob joined with the path that introduced it
//! - [`ExportGraph`] - The two output aggregates plus branch heads
//!
//! # Byte exactness
//!
//! Blob payloads and commit messages are kept as raw byte vectors of
//! exactly the declared length. They may contain embedded newlines and
//! NUL bytes. Lossy UTF-8 accessors exist for display only; the bytes
//! themselves are never normalized or trimmed.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::types::{FileMode, Mark, RefName, TypeError};

/// A blob payload defined by a `blob` directive.
///
/// Created once its `mark` and `data` block are fully consumed and
/// immutable thereafter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    /// The mark the producer assigned to this blob.
    pub mark: Mark,
    /// The exact bytes of the declared length.
    pub data: Vec<u8>,
}

impl Blob {
    /// Payload size in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The payload as UTF-8 text, lossy. Display only.
    pub fn data_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.data)
    }
}

/// An author or committer identity.
///
/// Parsed from the `Name <email> epoch tz` form. The epoch and offset
/// are preserved verbatim; the destination system applies its own clock
/// semantics downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Display name, possibly empty, possibly containing spaces.
    pub name: String,
    /// Email address without the surrounding angle brackets.
    pub email: String,
    /// Seconds since the Unix epoch.
    pub when: i64,
    /// Timezone as the literal signed decimal from the stream
    /// (`+0530` is stored as `530`, `-0730` as `-730`).
    pub tz: i32,
}

impl Person {
    /// Parse the text after the `author `/`committer ` keyword.
    ///
    /// The email is located by its angle brackets so names may contain
    /// spaces; the epoch and offset are the two fields after the
    /// closing bracket.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidPerson` when the brackets, epoch, or
    /// offset are missing or malformed.
    pub fn parse(text: &str) -> Result<Self, TypeError> {
        let lt = text
            .find('<')
            .ok_or_else(|| TypeError::InvalidPerson(format!("missing '<' in '{text}'")))?;
        let gt = text[lt..]
            .find('>')
            .map(|i| lt + i)
            .ok_or_else(|| TypeError::InvalidPerson(format!("missing '>' in '{text}'")))?;

        let name = text[..lt].trim().to_string();
        let email = text[lt + 1..gt].to_string();

        let mut rest = text[gt + 1..].split_whitespace();
        let when = rest
            .next()
            .ok_or_else(|| TypeError::InvalidPerson(format!("missing epoch in '{text}'")))?
            .parse::<i64>()
            .map_err(|_| TypeError::InvalidPerson(format!("bad epoch in '{text}'")))?;
        let tz_token = rest
            .next()
            .ok_or_else(|| TypeError::InvalidPerson(format!("missing timezone in '{text}'")))?;
        if !tz_token.starts_with('+') && !tz_token.starts_with('-') {
            return Err(TypeError::InvalidPerson(format!(
                "timezone must be signed in '{text}'"
            )));
        }
        let tz = tz_token
            .parse::<i32>()
            .map_err(|_| TypeError::InvalidPerson(format!("bad timezone in '{text}'")))?;
        if rest.next().is_some() {
            return Err(TypeError::InvalidPerson(format!(
                "trailing fields in '{text}'"
            )));
        }

        Ok(Self {
            name,
            email,
            when,
            tz,
        })
    }

    /// Render as RFC3339 in the person's own offset, for human output.
    ///
    /// Returns `None` when the epoch or offset is outside chrono's
    /// representable range.
    pub fn rfc3339(&self) -> Option<String> {
        let seconds_east = (self.tz / 100) * 3600 + (self.tz % 100) * 60;
        let offset = FixedOffset::east_opt(seconds_east)?;
        let utc = DateTime::from_timestamp(self.when, 0)?;
        Some(utc.with_timezone(&offset).to_rfc3339())
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "<{}> {} {:+05}", self.email, self.when, self.tz)
        } else {
            write!(
                f,
                "{} <{}> {} {:+05}",
                self.name, self.email, self.when, self.tz
            )
        }
    }
}

/// The kind of operation a file-change line records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileAction {
    /// `M` - create or update a path.
    Modify,
    /// `D` - remove a path.
    Delete,
    /// `C` - copy a path to a new destination.
    Copy,
    /// `R` - rename a path.
    Rename,
    /// `T` - change the type of a path.
    TypeChange,
    /// `N` - attach a note blob to a commit.
    Note,
}

impl fmt::Display for FileAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Modify => "modify",
            Self::Delete => "delete",
            Self::Copy => "copy",
            Self::Rename => "rename",
            Self::TypeChange => "typechange",
            Self::Note => "note",
        };
        write!(f, "{label}")
    }
}

/// One path operation recorded inside a commit.
///
/// Order is preserved exactly as the stream emitted it: later entries
/// for the same path override earlier ones within the same commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    /// What the operation does.
    pub action: FileAction,
    /// Destination path (or the annotated commit-ish for a note).
    pub path: String,
    /// File mode, present on modify lines.
    pub mode: Option<FileMode>,
    /// Referenced mark, present when the line used a `:<n>` dataref.
    /// A gitlink modify may name a commit mark; everything else names
    /// a blob.
    pub mark: Option<Mark>,
    /// Inline payload, present when the line used `inline` followed by
    /// its own `data` block.
    pub inline: Option<Vec<u8>>,
    /// Source path, present on copy and rename lines.
    pub source: Option<String>,
}

/// A fully-assembled commit.
///
/// Built up while its body is parsed, then sealed into the output map
/// when the next top-level directive (or end of stream) terminates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// The mark the producer assigned to this commit.
    pub mark: Mark,
    /// The branch ref this commit targets.
    pub refname: RefName,
    /// Author identity. When the stream omits the `author` line the
    /// committer identity is used, matching fast-import.
    pub author: Person,
    /// Committer identity.
    pub committer: Person,
    /// Exact message bytes of the declared length.
    pub message: Vec<u8>,
    /// First parent. Absent only for a ref's first commit after a
    /// `reset` (or the start of history).
    pub from: Option<Mark>,
    /// Additional parents, in stream order, for merge commits.
    pub merges: Vec<Mark>,
    /// File changes in stream order.
    pub changes: Vec<FileChange>,
}

impl Commit {
    /// The message as UTF-8 text, lossy. Display only.
    pub fn message_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.message)
    }

    /// First line of the message, for one-line listings.
    pub fn summary(&self) -> String {
        self.message_lossy()
            .lines()
            .next()
            .unwrap_or_default()
            .to_string()
    }

    /// All parent marks: `from` first, then merge parents in order.
    pub fn parents(&self) -> impl Iterator<Item = Mark> + '_ {
        self.from.into_iter().chain(self.merges.iter().copied())
    }

    /// Whether this commit has more than one parent.
    pub fn is_merge(&self) -> bool {
        !self.merges.is_empty()
    }
}

/// A blob joined with the path that introduced it.
///
/// One entry exists per blob mark that a modify line referenced; the
/// *first* referencing change claims the association (see the module
/// docs on `parser` for the one-path-per-blob constraint).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// The path the introducing modify line targeted.
    pub name: String,
    /// The blob payload.
    pub blob: Blob,
}

/// The reconstructed graph handed to the changelist emitter.
///
/// Holds the two aggregates the run produces - commits by mark and
/// introduced files by blob mark - plus the final branch-head table.
/// Stream order is preserved for commits.
#[derive(Debug, Default)]
pub struct ExportGraph {
    pub(crate) commits: HashMap<Mark, Commit>,
    pub(crate) order: Vec<Mark>,
    pub(crate) files: HashMap<Mark, FileRecord>,
    pub(crate) heads: HashMap<RefName, Mark>,
}

impl ExportGraph {
    /// The commit map, keyed by the marks assigned in the stream.
    pub fn commits(&self) -> &HashMap<Mark, Commit> {
        &self.commits
    }

    /// The file map, keyed by the blob mark each entry introduced.
    pub fn files(&self) -> &HashMap<Mark, FileRecord> {
        &self.files
    }

    /// The final ref-name to head-mark table.
    pub fn heads(&self) -> &HashMap<RefName, Mark> {
        &self.heads
    }

    /// Look up a commit by mark.
    pub fn commit(&self, mark: Mark) -> Option<&Commit> {
        self.commits.get(&mark)
    }

    /// Look up a file record by blob mark.
    pub fn file(&self, mark: Mark) -> Option<&FileRecord> {
        self.files.get(&mark)
    }

    /// The head mark recorded for a ref, if any.
    pub fn head_of(&self, refname: &RefName) -> Option<Mark> {
        self.heads.get(refname).copied()
    }

    /// Commits in the order the stream emitted them.
    pub fn commits_in_order(&self) -> impl Iterator<Item = &Commit> {
        self.order.iter().filter_map(|mark| self.commits.get(mark))
    }

    /// Number of commits parsed.
    pub fn commit_count(&self) -> usize {
        self.commits.len()
    }

    /// Number of file records parsed.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Total bytes held across all file-record blobs.
    pub fn total_blob_bytes(&self) -> u64 {
        self.files.values().map(|f| f.blob.len() as u64).sum()
    }
}
