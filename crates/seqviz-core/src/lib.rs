//! seqviz-core — event model, message reconstruction, and temporal layout.
//!
//! This crate defines the **stable boundary** used across seqviz crates:
//! - canonical data types (`Event`, `Message`, `UnmatchedSend`, `Timestamp`),
//! - the reconstructor that pairs send/receive events into directed messages
//!   and surfaces sends that were never received, and
//! - the temporal layout engine (`TimeScale`) that turns an irregular set of
//!   timestamps into monotone vertical pixel offsets for a sequence diagram.
//!
//! The core is a pure batch computation: no I/O, no clocks, no global state.
//! Given the same event sequence it produces identical output on every run.
//!
//! ```
//! use seqviz_core::{pair_messages, Event, LayoutParams, TimeScale, Timestamp};
//!
//! let events = vec![
//!     Event::Send {
//!         ts: Timestamp::from_micros(0),
//!         src: 1,
//!         dst: 2,
//!         text: "PREPARE(1, red, 0)".to_owned(),
//!     },
//!     Event::Recv {
//!         ts: Timestamp::from_micros(20_000),
//!         dst: 2,
//!         src: 1,
//!         text: "PREPARE(1, red, 0)".to_owned(),
//!     },
//! ];
//! let recon = pair_messages(events);
//! assert_eq!(recon.messages.len(), 1);
//! let scale = TimeScale::build(&recon.messages, &recon.unmatched, &LayoutParams::default());
//! assert!(scale.height() > 0.0);
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
// Small, explicit allowlist to keep docs readable and APIs ergonomic.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::doc_markdown
)]

/// Non-linear time→pixel mapping with legibility constraints.
pub mod layout;
/// Send/receive pairing into messages and unmatched sends.
pub mod reconstruct;
/// Canonical core data types shared across the workspace.
pub mod types;

// ---- Re-exports for workspace compatibility ----
pub use layout::{LayoutParams, TimeScale};
pub use reconstruct::{pair_messages, Reconstruction};
pub use types::{participants, Event, Message, NodeId, Timestamp, UnmatchedSend};
