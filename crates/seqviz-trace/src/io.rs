// crates/seqviz-trace/src/io.rs

//! Buffered I/O helpers for trace files (format-level).
//!
//! These routines do not interpret protocol semantics; they only move lines
//! and [`Event`]s between disk/stdio and memory. Reading accepts a path or
//! falls back to stdin, matching how instrumented runs are usually piped.

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

use crate::parse::{format_event, parse_lines};
use anyhow::{Context, Result};
use seqviz_core::Event;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

/// Read raw lines from `path`, or from stdin when `path` is `None`.
pub fn read_lines(path: Option<&Path>) -> Result<Vec<String>> {
    match path {
        Some(p) => {
            let f = File::open(p).with_context(|| format!("open {}", p.display()))?;
            collect_lines(BufReader::new(f))
        }
        None => collect_lines(std::io::stdin().lock()),
    }
}

/// Read and parse a whole trace from `path` or stdin.
///
/// Lines that match no event shape are skipped, never an error.
pub fn read_events(path: Option<&Path>) -> Result<Vec<Event>> {
    let lines = read_lines(path)?;
    Ok(parse_lines(lines))
}

/// Write events as wire-format lines to `w`.
pub fn write_trace<W: Write>(mut w: W, events: &[Event]) -> Result<()> {
    for ev in events {
        let line = format_event(ev).context("format trace line")?;
        writeln!(w, "{line}").context("write trace line")?;
    }
    w.flush().context("flush trace writer")?;
    Ok(())
}

fn collect_lines<R: BufRead>(reader: R) -> Result<Vec<String>> {
    reader
        .lines()
        .collect::<std::io::Result<Vec<_>>>()
        .context("read trace lines")
}
