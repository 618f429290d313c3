//! Message-trace wire format for seqviz.
//!
//! This crate provides three small building blocks that are deliberately
//! independent of any protocol's semantics:
//!
//! - `parse`: the line-oriented trace format emitted by instrumented
//!   consensus runs (`ctconsensus -V` style), including timestamp handling.
//! - `io`: buffered file/stdin/stdout helpers for event sequences.
//! - `generator`: a deterministic toy consensus-trace generator for
//!   demos/tests.
//!
//! The intent is to keep the trace pipeline simple, testable, and easy to
//! replace with production sources later (a real protocol run or importer).
//!
//! We intentionally avoid broad re-exports so callers use stable paths like
//! `seqviz_trace::parse::parse_lines`.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]

/// Deterministic toy consensus-trace generator (for demos/tests).
pub mod generator;
/// Buffered read/write helpers for trace files and stdin/stdout.
pub mod io;
/// Trace line parsing and timestamp conversion.
pub mod parse;
