//! parser::builder
//!
//! Commit-graph builder state machine.
//!
//! # States
//!
//! `Idle -> InCommit -> Idle`, re-entrant per commit. The format has no
//! explicit end-of-commit marker: a commit body terminates at the first
//! line that matches none of its directives. That line is handed back
//! to the top-level loop as one buffered line of re-dispatch, which
//! keeps the termination rule in a single place instead of ad hoc flags
//! scattered through the parse loop.
//!
//! # Parentage
//!
//! A commit that omits `from` implicitly continues its ref: the branch
//! head table supplies the prior mark for that ref, set by every commit
//! and by `reset <ref> [from :<n>]`. `reset` without `from` clears the
//! entry, so the ref's next commit starts a new root.
//!
//! # Mark resolution
//!
//! References are resolved when the referencing line is parsed, never
//! later - producers define marks before use, so a miss is a corrupted
//! stream, not a forward reference to satisfy retroactively.

use std::collections::HashMap;

use crate::core::model::{Blob, Commit, ExportGraph, FileAction, FileChange, FileRecord, Person};
use crate::core::types::{FileMode, Mark, RefName};

use super::directive::{classify, Directive, FileChangeLine};
use super::error::ParseError;
use super::marks::{MarkEntry, MarkTable};
use super::reader::ByteReader;
use super::ParseOptions;

/// A commit being assembled while its body is parsed.
#[derive(Debug)]
struct PendingCommit {
    refname: RefName,
    opened_line: u64,
    mark: Option<Mark>,
    author: Option<Person>,
    committer: Option<Person>,
    message: Vec<u8>,
    from: Option<Mark>,
    merges: Vec<Mark>,
    changes: Vec<FileChange>,
}

impl PendingCommit {
    fn new(refname: RefName, opened_line: u64) -> Self {
        Self {
            refname,
            opened_line,
            mark: None,
            author: None,
            committer: None,
            message: Vec::new(),
            from: None,
            merges: Vec::new(),
            changes: Vec::new(),
        }
    }
}

/// Assembles the commit graph from a single forward pass.
#[derive(Debug)]
pub(crate) struct GraphBuilder {
    keep_notes: bool,
    marks: MarkTable,
    heads: HashMap<RefName, Mark>,
    commits: HashMap<Mark, Commit>,
    order: Vec<Mark>,
    files: HashMap<Mark, FileRecord>,
}

impl GraphBuilder {
    pub fn new(options: &ParseOptions) -> Self {
        Self {
            keep_notes: options.keep_notes,
            marks: MarkTable::new(),
            heads: HashMap::new(),
            commits: HashMap::new(),
            order: Vec::new(),
            files: HashMap::new(),
        }
    }

    /// Drive the reader to end of stream (or `done`), dispatching each
    /// directive.
    ///
    /// # Errors
    ///
    /// Any parse failure aborts immediately; no partial graph survives
    /// an error.
    pub fn ingest(&mut self, reader: &mut ByteReader) -> Result<(), ParseError> {
        let mut pending: Option<Vec<u8>> = None;
        loop {
            let line = match pending.take() {
                Some(line) => line,
                None => match reader.read_line()? {
                    Some(line) => line,
                    None => break,
                },
            };
            match classify(&line, reader.line_number())? {
                Directive::Blank => continue,
                Directive::Blob => self.read_blob(reader)?,
                Directive::Commit(refname) => pending = self.read_commit(reader, refname)?,
                Directive::Reset(refname) => pending = self.read_reset(reader, refname)?,
                Directive::Tag(_) => pending = self.skip_tag(reader)?,
                Directive::Checkpoint
                | Directive::Progress(_)
                | Directive::Feature(_)
                | Directive::StreamOption(_) => continue,
                Directive::Done => break,
                Directive::Unknown(directive) => {
                    return Err(ParseError::UnrecognizedDirective {
                        line: reader.line_number(),
                        directive,
                    })
                }
                // commit-body directives outside a commit body
                _ => {
                    return Err(ParseError::UnrecognizedDirective {
                        line: reader.line_number(),
                        directive: first_word(&line),
                    })
                }
            }
        }
        Ok(())
    }

    /// Hand over the finished aggregates.
    pub fn finish(self) -> ExportGraph {
        ExportGraph {
            commits: self.commits,
            order: self.order,
            files: self.files,
            heads: self.heads,
        }
    }

    /// `blob` / `mark :<n>` / `data <n>` / payload.
    fn read_blob(&mut self, reader: &mut ByteReader) -> Result<(), ParseError> {
        let mark_line = expect_line(reader, "blob requires 'mark :<n>'")?;
        let mark_no = reader.line_number();
        let mark = match classify(&mark_line, mark_no)? {
            Directive::Mark(mark) => mark,
            _ => {
                return Err(ParseError::MalformedDirective {
                    line: mark_no,
                    detail: "blob requires 'mark :<n>'".into(),
                    text: String::from_utf8_lossy(&mark_line).into_owned(),
                })
            }
        };

        let data_line = expect_line(reader, "blob requires a 'data <n>' block")?;
        let data_no = reader.line_number();
        let len = match classify(&data_line, data_no)? {
            Directive::Data(len) => len,
            _ => {
                return Err(ParseError::MalformedDirective {
                    line: data_no,
                    detail: "blob requires a 'data <n>' block".into(),
                    text: String::from_utf8_lossy(&data_line).into_owned(),
                })
            }
        };
        let data = reader.read_exact_len(len)?;

        self.marks.define_blob(Blob { mark, data }, mark_no)
    }

    /// Parse one commit body; returns the unconsumed terminating line
    /// for re-dispatch, or `None` when the body ran to end of stream or
    /// ended on its blank terminator.
    fn read_commit(
        &mut self,
        reader: &mut ByteReader,
        refname: RefName,
    ) -> Result<Option<Vec<u8>>, ParseError> {
        let mut pending = PendingCommit::new(refname, reader.line_number());
        loop {
            let Some(line) = reader.read_line()? else {
                self.close_commit(pending)?;
                return Ok(None);
            };
            let line_no = reader.line_number();
            match classify(&line, line_no)? {
                Directive::Mark(mark) => {
                    self.marks.define_commit(mark, line_no)?;
                    pending.mark = Some(mark);
                }
                Directive::Author(person) => pending.author = Some(person),
                Directive::Committer(person) => pending.committer = Some(person),
                Directive::Data(len) => pending.message = reader.read_exact_len(len)?,
                Directive::From(mark) => {
                    self.marks.commit(mark, line_no)?;
                    pending.from = Some(mark);
                }
                Directive::Merge(mark) => {
                    self.marks.commit(mark, line_no)?;
                    pending.merges.push(mark);
                }
                Directive::FileChange(change) => {
                    self.append_change(reader, &mut pending, change, line_no)?
                }
                _ => {
                    self.close_commit(pending)?;
                    return Ok(Some(line));
                }
            }
        }
    }

    /// Validate and record one file-change line.
    fn append_change(
        &mut self,
        reader: &mut ByteReader,
        pending: &mut PendingCommit,
        change: FileChangeLine,
        line_no: u64,
    ) -> Result<(), ParseError> {
        if let Some(mark) = change.mark {
            match change.action {
                FileAction::Modify => {
                    let entry = self.marks.resolve(mark, line_no)?;
                    // a gitlink legally names a commit; everything else
                    // must name a blob
                    if matches!(entry, MarkEntry::Commit)
                        && change.mode != Some(FileMode::Gitlink)
                    {
                        return Err(ParseError::MarkKindMismatch {
                            line: line_no,
                            mark,
                            expected: "blob",
                            found: "commit",
                        });
                    }
                }
                FileAction::Note => {
                    self.marks.blob(mark, line_no)?;
                }
                _ => {}
            }
        }

        let inline = if change.inline {
            let data_line = expect_line(reader, "inline change requires a 'data <n>' block")?;
            let data_no = reader.line_number();
            match classify(&data_line, data_no)? {
                Directive::Data(len) => Some(reader.read_exact_len(len)?),
                _ => {
                    return Err(ParseError::MalformedDirective {
                        line: data_no,
                        detail: "inline change requires a 'data <n>' block".into(),
                        text: String::from_utf8_lossy(&data_line).into_owned(),
                    })
                }
            }
        } else {
            None
        };

        // notes are validated (and their payload consumed) either way,
        // then dropped unless configured to migrate
        if change.action == FileAction::Note && !self.keep_notes {
            return Ok(());
        }

        pending.changes.push(FileChange {
            action: change.action,
            path: change.path,
            mode: change.mode,
            mark: change.mark,
            inline,
            source: change.source,
        });
        Ok(())
    }

    /// Seal a commit: resolve implicit parentage, advance the branch
    /// head, and populate the output aggregates.
    fn close_commit(&mut self, pending: PendingCommit) -> Result<(), ParseError> {
        let context = format!("commit {}", pending.refname);

        let mark = pending.mark.ok_or_else(|| ParseError::MalformedDirective {
            line: pending.opened_line,
            detail: "commit has no 'mark :<n>'".into(),
            text: context.clone(),
        })?;
        let committer = pending
            .committer
            .ok_or_else(|| ParseError::MalformedDirective {
                line: pending.opened_line,
                detail: "commit has no committer".into(),
                text: context,
            })?;
        let author = pending.author.unwrap_or_else(|| committer.clone());

        // implicit continuation: no `from` means the ref's prior head
        let from = pending
            .from
            .or_else(|| self.heads.get(&pending.refname).copied());

        for change in &pending.changes {
            if change.action != FileAction::Modify {
                continue;
            }
            let Some(blob_mark) = change.mark else {
                continue;
            };
            if self.files.contains_key(&blob_mark) {
                continue;
            }
            // kind was checked when the line was parsed; a commit mark
            // here is a gitlink, which introduces no file
            if let MarkEntry::Blob(blob) = self.marks.resolve(blob_mark, pending.opened_line)? {
                self.files.insert(
                    blob_mark,
                    FileRecord {
                        name: change.path.clone(),
                        blob: blob.clone(),
                    },
                );
            }
        }

        self.heads.insert(pending.refname.clone(), mark);
        self.commits.insert(
            mark,
            Commit {
                mark,
                refname: pending.refname,
                author,
                committer,
                message: pending.message,
                from,
                merges: pending.merges,
                changes: pending.changes,
            },
        );
        self.order.push(mark);
        Ok(())
    }

    /// `reset <ref>` with an optional `from :<n>` continuation line.
    fn read_reset(
        &mut self,
        reader: &mut ByteReader,
        refname: RefName,
    ) -> Result<Option<Vec<u8>>, ParseError> {
        let Some(line) = reader.read_line()? else {
            self.heads.remove(&refname);
            return Ok(None);
        };
        match classify(&line, reader.line_number())? {
            Directive::From(mark) => {
                self.marks.commit(mark, reader.line_number())?;
                self.heads.insert(refname, mark);
                Ok(None)
            }
            _ => {
                self.heads.remove(&refname);
                Ok(Some(line))
            }
        }
    }

    /// Consume a `tag` block structurally so its message bytes cannot
    /// be misread as directives. Tags are outside the transfer's data
    /// model and are discarded.
    fn skip_tag(&mut self, reader: &mut ByteReader) -> Result<Option<Vec<u8>>, ParseError> {
        loop {
            let Some(line) = reader.read_line()? else {
                return Ok(None);
            };
            match classify(&line, reader.line_number())? {
                Directive::From(_) | Directive::Merge(_) | Directive::Mark(_) | Directive::Tagger => {
                    continue
                }
                Directive::Data(len) => {
                    reader.read_exact_len(len)?;
                    return Ok(None);
                }
                Directive::Blank => continue,
                _ => return Ok(Some(line)),
            }
        }
    }
}

/// Read the next line, failing with directive context at end of stream.
fn expect_line(reader: &mut ByteReader, detail: &str) -> Result<Vec<u8>, ParseError> {
    reader
        .read_line()?
        .ok_or_else(|| ParseError::MalformedDirective {
            line: reader.line_number(),
            detail: detail.into(),
            text: "<end of stream>".into(),
        })
}

/// First whitespace-delimited word of a raw line, for error context.
fn first_word(line: &[u8]) -> String {
    let end = line.iter().position(|b| *b == b' ').unwrap_or(line.len());
    String::from_utf8_lossy(&line[..end]).into_owned()
}
