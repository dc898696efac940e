//! parser::marks
//!
//! Process-scoped mark table.
//!
//! # Invariants
//!
//! - One namespace for blobs and commits: mark numbers are unique
//!   across the whole stream, not per kind, so the table stores a
//!   tagged-union value and catches reuse regardless of kind.
//! - Marks are defined before they are referenced. A resolve of an
//!   unknown mark is a hard parse error, never a deferred lookup.
//!
//! The table is owned by one run and dropped with it; independent runs
//! never share state.

use std::collections::HashMap;

use crate::core::model::Blob;
use crate::core::types::Mark;

use super::error::ParseError;

/// What a defined mark names.
#[derive(Debug)]
pub(crate) enum MarkEntry {
    /// A blob and its payload.
    Blob(Blob),
    /// A commit. The record itself lives in the output map; the entry
    /// exists for uniqueness and kind checks.
    Commit,
}

impl MarkEntry {
    fn kind(&self) -> &'static str {
        match self {
            Self::Blob(_) => "blob",
            Self::Commit => "commit",
        }
    }
}

/// Mapping from mark to the entity it names.
#[derive(Debug, Default)]
pub(crate) struct MarkTable {
    entries: HashMap<Mark, MarkEntry>,
}

impl MarkTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a blob definition.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateMark` if the mark is already defined, as any
    /// kind.
    pub fn define_blob(&mut self, blob: Blob, line: u64) -> Result<(), ParseError> {
        let mark = blob.mark;
        self.define(mark, MarkEntry::Blob(blob), line)
    }

    /// Record a commit definition.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateMark` if the mark is already defined, as any
    /// kind.
    pub fn define_commit(&mut self, mark: Mark, line: u64) -> Result<(), ParseError> {
        self.define(mark, MarkEntry::Commit, line)
    }

    fn define(&mut self, mark: Mark, entry: MarkEntry, line: u64) -> Result<(), ParseError> {
        if self.entries.contains_key(&mark) {
            return Err(ParseError::DuplicateMark { line, mark });
        }
        self.entries.insert(mark, entry);
        Ok(())
    }

    /// Resolve a referenced mark.
    ///
    /// # Errors
    ///
    /// Returns `UndefinedMark` if no prior directive defined it.
    pub fn resolve(&self, mark: Mark, line: u64) -> Result<&MarkEntry, ParseError> {
        self.entries
            .get(&mark)
            .ok_or(ParseError::UndefinedMark { line, mark })
    }

    /// Resolve a mark that must name a blob.
    ///
    /// # Errors
    ///
    /// Returns `UndefinedMark` if undefined, `MarkKindMismatch` if it
    /// names a commit.
    pub fn blob(&self, mark: Mark, line: u64) -> Result<&Blob, ParseError> {
        match self.resolve(mark, line)? {
            MarkEntry::Blob(blob) => Ok(blob),
            other => Err(ParseError::MarkKindMismatch {
                line,
                mark,
                expected: "blob",
                found: other.kind(),
            }),
        }
    }

    /// Resolve a mark that must name a commit.
    ///
    /// # Errors
    ///
    /// Returns `UndefinedMark` if undefined, `MarkKindMismatch` if it
    /// names a blob.
    pub fn commit(&self, mark: Mark, line: u64) -> Result<(), ParseError> {
        match self.resolve(mark, line)? {
            MarkEntry::Commit => Ok(()),
            other => Err(ParseError::MarkKindMismatch {
                line,
                mark,
                expected: "commit",
                found: other.kind(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mark(n: u64) -> Mark {
        Mark::new(n).unwrap()
    }

    fn blob(n: u64) -> Blob {
        Blob {
            mark: mark(n),
            data: b"payload".to_vec(),
        }
    }

    #[test]
    fn resolve_returns_defined_entries() {
        let mut table = MarkTable::new();
        table.define_blob(blob(1), 1).unwrap();
        table.define_commit(mark(2), 5).unwrap();

        assert_eq!(table.blob(mark(1), 9).unwrap().data, b"payload");
        table.commit(mark(2), 9).unwrap();
    }

    #[test]
    fn forward_references_are_rejected() {
        let table = MarkTable::new();
        match table.resolve(mark(3), 12) {
            Err(ParseError::UndefinedMark { line: 12, mark }) => assert_eq!(mark.get(), 3),
            other => panic!("expected UndefinedMark, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_marks_are_rejected_across_kinds() {
        let mut table = MarkTable::new();
        table.define_blob(blob(1), 1).unwrap();
        match table.define_commit(mark(1), 4) {
            Err(ParseError::DuplicateMark { line: 4, mark }) => assert_eq!(mark.get(), 1),
            other => panic!("expected DuplicateMark, got {other:?}"),
        }
    }

    #[test]
    fn kind_mismatches_name_both_kinds() {
        let mut table = MarkTable::new();
        table.define_blob(blob(1), 1).unwrap();
        table.define_commit(mark(2), 2).unwrap();

        match table.commit(mark(1), 8) {
            Err(ParseError::MarkKindMismatch {
                expected, found, ..
            }) => {
                assert_eq!(expected, "commit");
                assert_eq!(found, "blob");
            }
            other => panic!("expected MarkKindMismatch, got {other:?}"),
        }
        assert!(table.blob(mark(2), 8).is_err());
    }
}
