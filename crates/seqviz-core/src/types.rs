//! Canonical core types used across the seqviz workspace.
//!
//! These live in `seqviz-core` and are re-exported at the crate root so other
//! crates can import via `seqviz_core::Event`, `seqviz_core::Timestamp`, etc.
//!
//! The design aims to keep serialized forms conservative and portable (serde).

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Participant identifier as it appears in the trace.
///
/// Negative ids denote a distinguished non-participant observer rather than a
/// protocol node.
pub type NodeId = i32;

/// Absolute point in time, in **microseconds** since the Unix epoch.
///
/// The wire format carries exactly six fractional digits, so integer
/// microseconds represent every trace timestamp losslessly while keeping the
/// timeline exactly orderable and hashable (no float-key hazards).
#[derive(
    Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Construct from microseconds since the Unix epoch.
    #[inline]
    #[must_use]
    pub const fn from_micros(us: i64) -> Self {
        Self(us)
    }

    /// Microseconds since the Unix epoch.
    #[inline]
    #[must_use]
    pub const fn as_micros(self) -> i64 {
        self.0
    }

    /// Elapsed seconds from `earlier` to `self` (negative if `self` precedes).
    #[inline]
    #[must_use]
    pub fn seconds_since(self, earlier: Self) -> f64 {
        (self.0 - earlier.0) as f64 / 1e6
    }
}

/// One parsed trace line.
///
/// Events are immutable once parsed; the reconstructor consumes each event at
/// most once. Order of an event sequence is **log order**, which is not
/// necessarily time order.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    /// `src` transmitted `text` to `dst` at `ts`.
    Send {
        /// Send time.
        ts: Timestamp,
        /// Sending participant.
        src: NodeId,
        /// Destination participant.
        dst: NodeId,
        /// Opaque message payload.
        text: String,
    },
    /// `dst` received `text` from a known sender `src` at `ts`.
    Recv {
        /// Receive time.
        ts: Timestamp,
        /// Receiving participant.
        dst: NodeId,
        /// Sending participant, as reported by the receiver.
        src: NodeId,
        /// Opaque message payload.
        text: String,
    },
    /// `dst` received `text` at `ts`; the trace line did not name the sender.
    RecvUnknown {
        /// Receive time.
        ts: Timestamp,
        /// Receiving participant.
        dst: NodeId,
        /// Opaque message payload.
        text: String,
    },
}

impl Event {
    /// Timestamp of the event regardless of kind.
    #[inline]
    #[must_use]
    pub const fn ts(&self) -> Timestamp {
        match self {
            Self::Send { ts, .. } | Self::Recv { ts, .. } | Self::RecvUnknown { ts, .. } => *ts,
        }
    }
}

/// A successfully paired send/receive exchange.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// Time the sender transmitted.
    pub send_ts: Timestamp,
    /// Time the receiver observed the payload.
    pub recv_ts: Timestamp,
    /// Sending participant.
    pub src: NodeId,
    /// Destination participant.
    pub dst: NodeId,
    /// Opaque message payload.
    pub text: String,
}

impl Message {
    /// Wire latency in seconds (`recv_ts − send_ts`).
    #[inline]
    #[must_use]
    pub fn latency_s(&self) -> f64 {
        self.recv_ts.seconds_since(self.send_ts)
    }
}

/// A send with no corresponding receive by end of trace (dropped or lost).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnmatchedSend {
    /// Time the sender transmitted.
    pub send_ts: Timestamp,
    /// Sending participant.
    pub src: NodeId,
    /// Intended destination participant.
    pub dst: NodeId,
    /// Opaque message payload.
    pub text: String,
}

/// Every participant id appearing on any event (senders and receivers alike).
#[must_use]
pub fn participants(events: &[Event]) -> BTreeSet<NodeId> {
    let mut ids = BTreeSet::new();
    for ev in events {
        match ev {
            Event::Send { src, dst, .. } | Event::Recv { dst, src, .. } => {
                ids.insert(*src);
                ids.insert(*dst);
            }
            Event::RecvUnknown { dst, .. } => {
                ids.insert(*dst);
            }
        }
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_seconds_since() {
        let a = Timestamp::from_micros(1_500_000);
        let b = Timestamp::from_micros(250_000);
        assert!((a.seconds_since(b) - 1.25).abs() < 1e-12);
        assert!((b.seconds_since(a) + 1.25).abs() < 1e-12);
    }

    #[test]
    fn participants_cover_both_endpoints() {
        let events = vec![
            Event::Send {
                ts: Timestamp::from_micros(0),
                src: 1,
                dst: 2,
                text: "X".to_owned(),
            },
            Event::RecvUnknown {
                ts: Timestamp::from_micros(5),
                dst: -1,
                text: "X".to_owned(),
            },
        ];
        let ids: Vec<_> = participants(&events).into_iter().collect();
        assert_eq!(ids, vec![-1, 1, 2]);
    }
}
