//! parser::directive
//!
//! Line classification for the fast-export grammar.
//!
//! # Contract
//!
//! [`classify`] takes one logical line and returns a typed
//! [`Directive`]. Classification is context-free: the builder decides
//! which directives are legal in its current state. Unknown keywords
//! classify as [`Directive::Unknown`] rather than failing here, because
//! inside a commit body an unmatched line *terminates* the body and is
//! re-dispatched; only the builder knows whether "unknown" is an error.
//!
//! Recognized top-level directives: `blob`, `commit <ref>`,
//! `reset <ref>`, `tag <name>`, `checkpoint`, `progress <msg>`,
//! `feature <name>`, `option <opt>`, `done`. Commit-body directives:
//! `mark :<n>`, `author`, `committer`, `data <n>`, `from :<n>`,
//! `merge :<n>`, and the file-change lines `M`/`D`/`C`/`R`/`T`/`N`.
//!
//! Paths may be C-style quoted when they contain special characters;
//! [`unquote_path`] reverses git's escaping (`\"`, `\\`, `\n`, `\t`,
//! `\r` and three-digit octal).

use crate::core::model::{FileAction, Person};
use crate::core::types::{FileMode, Mark, RefName};

use super::error::ParseError;

/// One classified line of the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Directive {
    /// Empty line. Skipped at top level; terminates a commit body.
    Blank,
    /// `blob`
    Blob,
    /// `commit <ref>`
    Commit(RefName),
    /// `reset <ref>`
    Reset(RefName),
    /// `tag <name>`
    Tag(String),
    /// `checkpoint`
    Checkpoint,
    /// `progress <msg>`
    Progress(String),
    /// `feature <name>`
    Feature(String),
    /// `option <opt>`
    StreamOption(String),
    /// `done`
    Done,
    /// `mark :<n>`
    Mark(Mark),
    /// `author <name> <<email>> <epoch> <tz>`
    Author(Person),
    /// `committer <name> <<email>> <epoch> <tz>`
    Committer(Person),
    /// `tagger ...` - only meaningful inside a tag body, which is
    /// skipped structurally, so the identity is not retained.
    Tagger,
    /// `data <n>` - `n` bytes of raw payload follow.
    Data(usize),
    /// `from :<n>`
    From(Mark),
    /// `merge :<n>`
    Merge(Mark),
    /// `M`/`D`/`C`/`R`/`T`/`N`
    FileChange(FileChangeLine),
    /// Any keyword the grammar does not define.
    Unknown(String),
}

/// A file-change line before mark resolution.
///
/// The builder resolves `mark` against the mark table and, for `inline`
/// lines, consumes the payload that follows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FileChangeLine {
    pub action: FileAction,
    pub mode: Option<FileMode>,
    pub mark: Option<Mark>,
    pub inline: bool,
    pub path: String,
    pub source: Option<String>,
}

/// Classify one logical line.
///
/// # Errors
///
/// Fails when a *recognized* keyword has a malformed body:
/// `MalformedPerson` for identity lines, `MalformedDirective` for
/// everything else (bad marks, bad modes, bad quoting, non-UTF-8
/// directive text, delimited `data` blocks).
pub(crate) fn classify(line: &[u8], line_no: u64) -> Result<Directive, ParseError> {
    if line.is_empty() {
        return Ok(Directive::Blank);
    }

    let text = std::str::from_utf8(line).map_err(|_| ParseError::MalformedDirective {
        line: line_no,
        detail: "directive line is not valid UTF-8".into(),
        text: String::from_utf8_lossy(line).into_owned(),
    })?;

    let (keyword, rest) = match text.split_once(' ') {
        Some((keyword, rest)) => (keyword, Some(rest)),
        None => (text, None),
    };

    let malformed = |detail: String| ParseError::MalformedDirective {
        line: line_no,
        detail,
        text: text.to_string(),
    };

    let require_rest = |what: &str| {
        rest.filter(|r| !r.is_empty())
            .ok_or_else(|| malformed(format!("{keyword} requires {what}")))
    };

    match keyword {
        "blob" => Ok(Directive::Blob),
        "commit" => {
            let refname = RefName::new(require_rest("a ref")?).map_err(|e| malformed(e.to_string()))?;
            Ok(Directive::Commit(refname))
        }
        "reset" => {
            let refname = RefName::new(require_rest("a ref")?).map_err(|e| malformed(e.to_string()))?;
            Ok(Directive::Reset(refname))
        }
        "tag" => Ok(Directive::Tag(require_rest("a name")?.to_string())),
        "checkpoint" => Ok(Directive::Checkpoint),
        "progress" => Ok(Directive::Progress(rest.unwrap_or_default().to_string())),
        "feature" => Ok(Directive::Feature(require_rest("a name")?.to_string())),
        "option" => Ok(Directive::StreamOption(require_rest("an option")?.to_string())),
        "done" => Ok(Directive::Done),
        "mark" => {
            let mark = Mark::parse_dataref(require_rest("a :<n> dataref")?)
                .map_err(|e| malformed(e.to_string()))?;
            Ok(Directive::Mark(mark))
        }
        "author" => Ok(Directive::Author(parse_person(rest, text, line_no)?)),
        "committer" => Ok(Directive::Committer(parse_person(rest, text, line_no)?)),
        "tagger" => Ok(Directive::Tagger),
        "data" => {
            let len_token = require_rest("a length")?;
            if len_token.starts_with("<<") {
                return Err(malformed("delimited data blocks are not supported".into()));
            }
            let len = len_token
                .parse::<usize>()
                .map_err(|_| malformed(format!("bad data length '{len_token}'")))?;
            Ok(Directive::Data(len))
        }
        "from" => {
            let mark = Mark::parse_dataref(require_rest("a :<n> dataref")?)
                .map_err(|e| malformed(e.to_string()))?;
            Ok(Directive::From(mark))
        }
        "merge" => {
            let mark = Mark::parse_dataref(require_rest("a :<n> dataref")?)
                .map_err(|e| malformed(e.to_string()))?;
            Ok(Directive::Merge(mark))
        }
        "M" | "D" | "C" | "R" | "T" | "N" => {
            let change = parse_file_change(keyword, require_rest("operands")?)
                .map_err(|detail| malformed(detail))?;
            Ok(Directive::FileChange(change))
        }
        other => Ok(Directive::Unknown(other.to_string())),
    }
}

/// Parse an identity line body, or fail as `MalformedPerson`.
fn parse_person(rest: Option<&str>, text: &str, line_no: u64) -> Result<Person, ParseError> {
    rest.and_then(|body| Person::parse(body).ok())
        .ok_or_else(|| ParseError::MalformedPerson {
            line: line_no,
            text: text.to_string(),
        })
}

/// Parse the operands of a file-change line.
fn parse_file_change(keyword: &str, rest: &str) -> Result<FileChangeLine, String> {
    match keyword {
        "M" => {
            let (mode_token, rest) = rest
                .split_once(' ')
                .ok_or_else(|| "M requires a mode and a dataref".to_string())?;
            let mode = FileMode::from_octal(mode_token).map_err(|e| e.to_string())?;
            let (dataref, path_token) = rest
                .split_once(' ')
                .ok_or_else(|| "M requires a path".to_string())?;
            let (mark, inline) = parse_dataref(dataref)?;
            Ok(FileChangeLine {
                action: FileAction::Modify,
                mode: Some(mode),
                mark,
                inline,
                path: unquote_path(path_token)?,
                source: None,
            })
        }
        "D" | "T" => Ok(FileChangeLine {
            action: if keyword == "D" {
                FileAction::Delete
            } else {
                FileAction::TypeChange
            },
            mode: None,
            mark: None,
            inline: false,
            path: unquote_path(rest)?,
            source: None,
        }),
        "C" | "R" => {
            let (source, dest_token) = split_leading_path(rest)?;
            Ok(FileChangeLine {
                action: if keyword == "C" {
                    FileAction::Copy
                } else {
                    FileAction::Rename
                },
                mode: None,
                mark: None,
                inline: false,
                path: unquote_path(dest_token)?,
                source: Some(source),
            })
        }
        "N" => {
            let (dataref, committish) = rest
                .split_once(' ')
                .ok_or_else(|| "N requires a commit-ish".to_string())?;
            let (mark, inline) = parse_dataref(dataref)?;
            Ok(FileChangeLine {
                action: FileAction::Note,
                mode: None,
                mark,
                inline,
                path: committish.to_string(),
                source: None,
            })
        }
        _ => unreachable!("caller only passes file-change keywords"),
    }
}

/// Parse a `:<n>` or `inline` dataref token.
fn parse_dataref(token: &str) -> Result<(Option<Mark>, bool), String> {
    if token == "inline" {
        Ok((None, true))
    } else {
        let mark = Mark::parse_dataref(token).map_err(|e| e.to_string())?;
        Ok((Some(mark), false))
    }
}

/// Unescape a possibly-quoted path.
///
/// An unquoted path is returned as-is; a path starting with `"` is
/// parsed per git's C-style quoting and must span the whole token.
pub(crate) fn unquote_path(token: &str) -> Result<String, String> {
    if !token.starts_with('"') {
        return Ok(token.to_string());
    }
    let (path, consumed) = scan_quoted(token)?;
    if consumed != token.len() {
        return Err(format!("trailing characters after closing quote in '{token}'"));
    }
    Ok(path)
}

/// Split a copy/rename operand list into its leading path and the rest.
///
/// The first path ends at the first space unless it is quoted, in which
/// case it ends at the closing quote.
fn split_leading_path(rest: &str) -> Result<(String, &str), String> {
    if rest.starts_with('"') {
        let (path, consumed) = scan_quoted(rest)?;
        let after = rest[consumed..]
            .strip_prefix(' ')
            .ok_or_else(|| "missing destination path".to_string())?;
        Ok((path, after))
    } else {
        let (source, dest) = rest
            .split_once(' ')
            .ok_or_else(|| "missing destination path".to_string())?;
        Ok((source.to_string(), dest))
    }
}

/// Parse a leading C-style quoted string.
///
/// Returns the unescaped path and the number of bytes consumed,
/// including both quotes.
fn scan_quoted(token: &str) -> Result<(String, usize), String> {
    debug_assert!(token.starts_with('"'));
    let bytes = token.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut i = 1;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => {
                let path = String::from_utf8(out)
                    .map_err(|_| format!("quoted path is not valid UTF-8 in '{token}'"))?;
                return Ok((path, i + 1));
            }
            b'\\' => {
                i += 1;
                let escape = *bytes
                    .get(i)
                    .ok_or_else(|| format!("dangling escape in '{token}'"))?;
                match escape {
                    b'"' => out.push(b'"'),
                    b'\\' => out.push(b'\\'),
                    b'n' => out.push(b'\n'),
                    b't' => out.push(b'\t'),
                    b'r' => out.push(b'\r'),
                    b'0'..=b'7' => {
                        let mut value: u32 = 0;
                        let mut digits = 0;
                        while digits < 3 {
                            match bytes.get(i) {
                                Some(d @ b'0'..=b'7') => {
                                    value = value * 8 + u32::from(d - b'0');
                                    digits += 1;
                                    i += 1;
                                }
                                _ => break,
                            }
                        }
                        i -= 1;
                        if value > 0xFF {
                            return Err(format!("octal escape out of range in '{token}'"));
                        }
                        out.push(value as u8);
                    }
                    other => {
                        return Err(format!(
                            "unsupported escape '\\{}' in '{token}'",
                            other as char
                        ))
                    }
                }
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    Err(format!("unterminated quoted path in '{token}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classified(line: &str) -> Directive {
        classify(line.as_bytes(), 1).unwrap()
    }

    #[test]
    fn classifies_top_level_directives() {
        assert_eq!(classified("blob"), Directive::Blob);
        assert_eq!(classified("checkpoint"), Directive::Checkpoint);
        assert_eq!(classified("done"), Directive::Done);
        assert_eq!(
            classified("commit refs/heads/main"),
            Directive::Commit(RefName::new("refs/heads/main").unwrap())
        );
        assert_eq!(
            classified("reset refs/heads/branch1"),
            Directive::Reset(RefName::new("refs/heads/branch1").unwrap())
        );
        assert_eq!(classified("tag v1.0"), Directive::Tag("v1.0".into()));
        assert_eq!(
            classified("progress exported 100 commits"),
            Directive::Progress("exported 100 commits".into())
        );
        assert_eq!(classified("feature done"), Directive::Feature("done".into()));
        assert_eq!(
            classified("option quiet"),
            Directive::StreamOption("quiet".into())
        );
    }

    #[test]
    fn classifies_commit_body_directives() {
        assert_eq!(classified("mark :5"), Directive::Mark(Mark::new(5).unwrap()));
        assert_eq!(classified("from :2"), Directive::From(Mark::new(2).unwrap()));
        assert_eq!(classified("merge :4"), Directive::Merge(Mark::new(4).unwrap()));
        assert_eq!(classified("data 137"), Directive::Data(137));
        assert_eq!(classified(""), Directive::Blank);
        match classified("author Robert Cowham <rcowham@perforce.com> 1644399073 +0000") {
            Directive::Author(p) => assert_eq!(p.email, "rcowham@perforce.com"),
            other => panic!("expected Author, got {other:?}"),
        }
    }

    #[test]
    fn unknown_keywords_classify_without_failing() {
        assert_eq!(
            classified("frobnicate all the things"),
            Directive::Unknown("frobnicate".into())
        );
    }

    #[test]
    fn delimited_data_blocks_are_rejected() {
        assert!(matches!(
            classify(b"data <<EOM", 3),
            Err(ParseError::MalformedDirective { line: 3, .. })
        ));
    }

    #[test]
    fn malformed_person_carries_full_line() {
        match classify(b"committer nobody 1 +0000", 7) {
            Err(ParseError::MalformedPerson { line, text }) => {
                assert_eq!(line, 7);
                assert_eq!(text, "committer nobody 1 +0000");
            }
            other => panic!("expected MalformedPerson, got {other:?}"),
        }
    }

    #[test]
    fn modify_line_with_mark() {
        match classified("M 100644 :1 test.txt") {
            Directive::FileChange(fc) => {
                assert_eq!(fc.action, FileAction::Modify);
                assert_eq!(fc.mode, Some(FileMode::Normal));
                assert_eq!(fc.mark, Some(Mark::new(1).unwrap()));
                assert!(!fc.inline);
                assert_eq!(fc.path, "test.txt");
            }
            other => panic!("expected FileChange, got {other:?}"),
        }
    }

    #[test]
    fn modify_line_inline() {
        match classified("M 100755 inline bin/run.sh") {
            Directive::FileChange(fc) => {
                assert_eq!(fc.mark, None);
                assert!(fc.inline);
                assert_eq!(fc.path, "bin/run.sh");
                assert_eq!(fc.mode, Some(FileMode::Executable));
            }
            other => panic!("expected FileChange, got {other:?}"),
        }
    }

    #[test]
    fn modify_path_may_contain_spaces() {
        match classified("M 100644 :3 dir with space/file name.txt") {
            Directive::FileChange(fc) => assert_eq!(fc.path, "dir with space/file name.txt"),
            other => panic!("expected FileChange, got {other:?}"),
        }
    }

    #[test]
    fn delete_and_typechange_lines() {
        match classified("D old/path.c") {
            Directive::FileChange(fc) => {
                assert_eq!(fc.action, FileAction::Delete);
                assert_eq!(fc.path, "old/path.c");
                assert_eq!(fc.mode, None);
            }
            other => panic!("expected FileChange, got {other:?}"),
        }
        match classified("T link.txt") {
            Directive::FileChange(fc) => assert_eq!(fc.action, FileAction::TypeChange),
            other => panic!("expected FileChange, got {other:?}"),
        }
    }

    #[test]
    fn rename_with_quoted_source() {
        match classified(r#"R "old\tname.txt" new name.txt"#) {
            Directive::FileChange(fc) => {
                assert_eq!(fc.action, FileAction::Rename);
                assert_eq!(fc.source.as_deref(), Some("old\tname.txt"));
                assert_eq!(fc.path, "new name.txt");
            }
            other => panic!("expected FileChange, got {other:?}"),
        }
    }

    #[test]
    fn copy_with_unquoted_operands() {
        match classified("C src.txt dst.txt") {
            Directive::FileChange(fc) => {
                assert_eq!(fc.action, FileAction::Copy);
                assert_eq!(fc.source.as_deref(), Some("src.txt"));
                assert_eq!(fc.path, "dst.txt");
            }
            other => panic!("expected FileChange, got {other:?}"),
        }
    }

    #[test]
    fn note_line_references_a_commit() {
        match classified("N :7 :2") {
            Directive::FileChange(fc) => {
                assert_eq!(fc.action, FileAction::Note);
                assert_eq!(fc.mark, Some(Mark::new(7).unwrap()));
                assert_eq!(fc.path, ":2");
            }
            other => panic!("expected FileChange, got {other:?}"),
        }
    }

    #[test]
    fn unquote_passes_plain_paths_through() {
        assert_eq!(unquote_path("a/plain path.txt").unwrap(), "a/plain path.txt");
    }

    #[test]
    fn unquote_handles_escapes_and_octal() {
        assert_eq!(unquote_path(r#""a\"b""#).unwrap(), "a\"b");
        assert_eq!(unquote_path(r#""a\\b""#).unwrap(), "a\\b");
        assert_eq!(unquote_path(r#""tab\there""#).unwrap(), "tab\there");
        assert_eq!(unquote_path(r#""nl\nhere""#).unwrap(), "nl\nhere");
        // "héllo" with é as UTF-8 octal escapes
        assert_eq!(unquote_path(r#""h\303\251llo""#).unwrap(), "héllo");
    }

    #[test]
    fn unquote_rejects_bad_quoting() {
        assert!(unquote_path(r#""unterminated"#).is_err());
        assert!(unquote_path(r#""bad\qescape""#).is_err());
        assert!(unquote_path(r#""trailing" junk"#).is_err());
        // lone continuation byte is not valid UTF-8
        assert!(unquote_path(r#""\303""#).is_err());
    }

    #[test]
    fn non_utf8_directive_lines_are_rejected() {
        assert!(matches!(
            classify(b"commit refs/heads/\xff\xfe", 2),
            Err(ParseError::MalformedDirective { line: 2, .. })
        ));
    }
}
