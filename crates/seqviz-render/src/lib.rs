//! seqviz-render — sequence-diagram rendering for reconstructed traces.
//!
//! Consumes the core's output contract (messages, unmatched sends, the
//! participant set, and a [`seqviz_core::TimeScale`]) and emits a
//! self-contained HTML page with an embedded SVG diagram:
//!
//! - `style`: payload-text classification into colors and stroke widths.
//! - `svg`: diagram geometry — lifelines, time ticks, arrows and arrowheads,
//!   long-latency split arrows, dropped-send markers.
//! - `html`: the page shell (toolbar, legend, zoom, hover tooltips).
//!
//! The renderer never interprets protocol semantics beyond matching payload
//! text against a small color table; unknown payloads fall back to grey.

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

/// HTML page assembly around the SVG diagram.
pub mod html;
/// Payload classification: colors, stroke widths, value overlays.
pub mod style;
/// SVG diagram geometry and element generation.
pub mod svg;

pub use html::render_page;
