// crates/seqviz-trace/src/parse.rs

//! Trace line parsing and timestamp conversion.
//!
//! The wire format is one event per line, in three shapes:
//!
//! ```text
//! 2021-10-12 20:21:09.000000: 2 → 1 "PREPARE(1, blue, 0)"     send
//! 2021-10-12 20:21:09.020005: 1 ← 2 "PREPARE(1, blue, 0)"     receive, sender known
//! 2021-10-12 20:21:09.020005: 1 ← "PREPARE(1, blue, 0)"       receive, sender unknown
//! ```
//!
//! Timestamps carry six fractional digits (extra trailing digits are
//! tolerated and truncated) and are interpreted as UTC. Node ids may be
//! negative (the observer). The payload is the first double-quoted span.
//!
//! Malformed lines, blank lines, and `***` banner lines never produce an
//! event; they are skipped without error, since real captures interleave
//! diagnostics with the trace.

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

use anyhow::{anyhow, Context, Result};
use seqviz_core::{Event, NodeId, Timestamp};
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

/// Wall-clock stamp layout shared by parsing and formatting.
const STAMP: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:6]");

/// Parse one trace line into an [`Event`], or `None` if the line does not
/// match any of the three shapes.
#[must_use]
pub fn parse_line(line: &str) -> Option<Event> {
    let line = line.trim();
    if line.is_empty() || line.starts_with("***") {
        return None;
    }

    // The timestamp's own colons are digit-adjacent, so the first ": " is
    // the stamp/body separator.
    let (stamp, body) = line.split_once(": ")?;
    let ts = parse_timestamp(stamp)?;

    let body = body.trim_start();
    let (left_tok, body) = body.split_once(char::is_whitespace)?;
    let left: NodeId = left_tok.parse().ok()?;

    let body = body.trim_start();
    if let Some(body) = body.strip_prefix('→') {
        let (right_tok, body) = body.trim_start().split_once(char::is_whitespace)?;
        let dst: NodeId = right_tok.parse().ok()?;
        let text = quoted(body.trim_start())?;
        Some(Event::Send { ts, src: left, dst, text })
    } else if let Some(body) = body.strip_prefix('←') {
        let body = body.trim_start();
        if body.starts_with('"') {
            // Receiver-only form: the sender was not recorded.
            let text = quoted(body)?;
            Some(Event::RecvUnknown { ts, dst: left, text })
        } else {
            let (right_tok, body) = body.split_once(char::is_whitespace)?;
            let src: NodeId = right_tok.parse().ok()?;
            let text = quoted(body.trim_start())?;
            Some(Event::Recv { ts, dst: left, src, text })
        }
    } else {
        None
    }
}

/// Parse a sequence of lines, skipping everything non-matching.
pub fn parse_lines<I, S>(lines: I) -> Vec<Event>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .filter_map(|l| parse_line(l.as_ref()))
        .collect()
}

/// Format an [`Event`] back into its wire-format line.
///
/// Exact inverse of [`parse_line`] for well-formed payloads; used by the
/// trace generator and round-trip tests.
pub fn format_event(ev: &Event) -> Result<String> {
    match ev {
        Event::Send { ts, src, dst, text } => {
            Ok(format!("{}: {src} → {dst} \"{text}\"", format_timestamp(*ts)?))
        }
        Event::Recv { ts, dst, src, text } => {
            Ok(format!("{}: {dst} ← {src} \"{text}\"", format_timestamp(*ts)?))
        }
        Event::RecvUnknown { ts, dst, text } => {
            Ok(format!("{}: {dst} ← \"{text}\"", format_timestamp(*ts)?))
        }
    }
}

/// Extract the contents of the first double-quoted span.
fn quoted(s: &str) -> Option<String> {
    let (_, rest) = s.split_once('"')?;
    let (text, _) = rest.split_once('"')?;
    Some(text.to_owned())
}

/// Parse `YYYY-MM-DD HH:MM:SS.ffffff[extra]` as UTC microseconds.
fn parse_timestamp(stamp: &str) -> Option<Timestamp> {
    let (whole, frac) = stamp.split_once('.')?;
    // Exactly six fractional digits are significant; some writers append
    // more, which are ignored.
    let frac6 = frac.get(..6)?;
    if !frac6.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let canonical = format!("{whole}.{frac6}");
    let dt = PrimitiveDateTime::parse(&canonical, STAMP).ok()?;
    let nanos = dt.assume_utc().unix_timestamp_nanos();
    i64::try_from(nanos / 1_000).ok().map(Timestamp::from_micros)
}

/// Render a [`Timestamp`] in the wire format (UTC, six fractional digits).
fn format_timestamp(ts: Timestamp) -> Result<String> {
    let odt = OffsetDateTime::from_unix_timestamp_nanos(i128::from(ts.as_micros()) * 1_000)
        .map_err(|e| anyhow!("timestamp out of range: {e}"))?;
    odt.format(STAMP).context("format timestamp")
}
