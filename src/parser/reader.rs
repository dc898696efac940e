//! parser::reader
//!
//! Buffered, binary-safe cursor over a stream source.
//!
//! # Contract
//!
//! - [`ByteReader::read_line`] returns one LF-terminated logical line
//!   with the terminator stripped, binary-safe up to the terminator.
//! - [`ByteReader::read_exact_len`] returns exactly `n` bytes regardless
//!   of embedded newlines, failing with
//!   [`ParseError::TruncatedStream`] if fewer remain.
//!
//! The source is either a named file or an in-memory buffer (used by
//! callers that already hold the stream, e.g. tests). No look-ahead
//! beyond one line is performed here; the builder holds its own single
//! line of buffered re-dispatch.
//!
//! Line accounting counts directive lines only: newlines embedded in a
//! `data` payload do not advance the counter, so reported line numbers
//! match what a reader sees when paging through the stream's directives.

use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Read};
use std::path::Path;

use super::error::ParseError;

/// Buffered binary-safe cursor over a fast-export stream.
pub struct ByteReader {
    inner: Box<dyn BufRead>,
    line: u64,
    offset: u64,
}

impl ByteReader {
    /// Open a stream file for reading.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Io` if the file cannot be opened.
    pub fn from_path(path: &Path) -> Result<Self, ParseError> {
        let file = File::open(path)?;
        Ok(Self {
            inner: Box::new(BufReader::new(file)),
            line: 0,
            offset: 0,
        })
    }

    /// Read from an in-memory buffer.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            inner: Box::new(Cursor::new(bytes)),
            line: 0,
            offset: 0,
        }
    }

    /// Read the next logical line, stripping the `\n` terminator.
    ///
    /// Returns `Ok(None)` at end of stream. A final line without a
    /// terminator is returned as-is.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Io` on a read failure.
    pub fn read_line(&mut self) -> Result<Option<Vec<u8>>, ParseError> {
        let mut buf = Vec::new();
        let read = self.inner.read_until(b'\n', &mut buf)?;
        if read == 0 {
            return Ok(None);
        }
        self.offset += read as u64;
        self.line += 1;
        if buf.last() == Some(&b'\n') {
            buf.pop();
        }
        Ok(Some(buf))
    }

    /// Read exactly `wanted` bytes, newlines and NULs included.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::TruncatedStream` if the stream ends before
    /// `wanted` bytes are available, and `ParseError::Io` on a read
    /// failure.
    pub fn read_exact_len(&mut self, wanted: usize) -> Result<Vec<u8>, ParseError> {
        let mut buf = Vec::with_capacity(wanted.min(1 << 20));
        self.inner
            .by_ref()
            .take(wanted as u64)
            .read_to_end(&mut buf)?;
        if buf.len() < wanted {
            return Err(ParseError::TruncatedStream {
                line: self.line,
                wanted,
                available: buf.len(),
            });
        }
        self.offset += wanted as u64;
        Ok(buf)
    }

    /// 1-based number of the most recently returned line.
    pub fn line_number(&self) -> u64 {
        self.line
    }

    /// Total bytes consumed so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }
}
