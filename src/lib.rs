//! git2p4 - Ingest git fast-export streams for transfer into Perforce
//!
//! git2p4 is a single-binary tool that reconstructs an in-memory commit
//! graph from a `git fast-export` stream so the history can be
//! re-emitted into Perforce. This crate holds the stream parser and
//! commit-graph builder; emitting changelists is the job of a
//! downstream consumer of the [`core::model::ExportGraph`] it returns.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to the parser)
//! - [`core`] - Domain types, record model, and configuration
//! - [`parser`] - Single doorway for stream ingestion
//! - [`ui`] - Output formatting utilities
//!
//! # Correctness Invariants
//!
//! git2p4 maintains the following invariants:
//!
//! 1. Byte and size accounting is exact: payloads are consumed at their
//!    declared length and never normalized
//! 2. Marks are defined before they are referenced, in one namespace
//!    across blobs and commits
//! 3. Ingestion is all-or-nothing: no partially-parsed history is ever
//!    handed to a transfer
//! 4. Parsed identities, refs, messages, and payloads round-trip
//!    verbatim from the stream

pub mod cli;
pub mod core;
pub mod parser;
pub mod ui;
