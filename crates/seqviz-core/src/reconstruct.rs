// crates/seqviz-core/src/reconstruct.rs

//! Pair asymmetric send/receive events into directed messages.
//!
//! Sends are queued per `(src, dst, text)` key and consumed FIFO by matching
//! receives, so duplicate traffic on one key pairs strictly in send order. A
//! receive that names no sender claims the longest-waiting pending send among
//! all keys with matching `(dst, text)`. Receives with no pending send are
//! orphans and are dropped — real captures are routinely truncated, so an
//! orphan is not an error. Sends still pending when the trace ends come back
//! as [`UnmatchedSend`]s.
//!
//! Queues live in a `BTreeMap`, so reconstruction is fully deterministic: an
//! exact pending-timestamp tie between candidate senders resolves toward the
//! smallest `(src, dst, text)` key, and unmatched sends drain in key order.

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

use crate::types::{Event, Message, NodeId, Timestamp, UnmatchedSend};
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};

/// Pending-send queue key: one per distinct `(src, dst, payload)` triple.
type SendKey = (NodeId, NodeId, String);

/// Output of [`pair_messages`]: every send event is accounted for exactly
/// once, either as a [`Message`] or as an [`UnmatchedSend`].
#[derive(Clone, Debug, Default, Serialize)]
pub struct Reconstruction {
    /// Successfully paired exchanges, in receive (log) order.
    pub messages: Vec<Message>,
    /// Sends that never met a receive, in key order then send order.
    pub unmatched: Vec<UnmatchedSend>,
}

/// Reconstruct directed messages from an event sequence in log order.
///
/// Consumes the events; payload strings move into the output rather than
/// being copied.
#[must_use]
pub fn pair_messages(events: Vec<Event>) -> Reconstruction {
    let mut pending: BTreeMap<SendKey, VecDeque<Timestamp>> = BTreeMap::new();
    let mut messages = Vec::new();

    for ev in events {
        match ev {
            Event::Send { ts, src, dst, text } => {
                pending.entry((src, dst, text)).or_default().push_back(ts);
            }
            Event::Recv { ts, dst, src, text } => {
                let key = (src, dst, text);
                if let Some(send_ts) = pending.get_mut(&key).and_then(VecDeque::pop_front) {
                    let (src, dst, text) = key;
                    messages.push(Message { send_ts, recv_ts: ts, src, dst, text });
                }
                // No pending send for this key: orphan receive, dropped.
            }
            Event::RecvUnknown { ts, dst, text } => {
                // The longest-waiting pending send to this destination with
                // this payload wins; (timestamp, key) tuple order breaks
                // exact-timestamp ties toward the smallest key.
                let best = pending
                    .iter()
                    .filter(|((_, d, t), _)| *d == dst && *t == text)
                    .filter_map(|(key, q)| q.front().map(|ts| (*ts, key.clone())))
                    .min();
                if let Some((_, key)) = best {
                    if let Some(send_ts) = pending.get_mut(&key).and_then(VecDeque::pop_front) {
                        messages.push(Message {
                            send_ts,
                            recv_ts: ts,
                            src: key.0,
                            dst,
                            text,
                        });
                    }
                }
                // No candidate key with a pending send: orphan, dropped.
            }
        }
    }

    // Whatever is still queued was sent but never received.
    let mut unmatched = Vec::new();
    for ((src, dst, text), queue) in pending {
        for send_ts in queue {
            unmatched.push(UnmatchedSend { send_ts, src, dst, text: text.clone() });
        }
    }

    Reconstruction { messages, unmatched }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(us: i64) -> Timestamp {
        Timestamp::from_micros(us)
    }

    fn send(us: i64, src: NodeId, dst: NodeId, text: &str) -> Event {
        Event::Send { ts: ts(us), src, dst, text: text.to_owned() }
    }

    fn recv(us: i64, dst: NodeId, src: NodeId, text: &str) -> Event {
        Event::Recv { ts: ts(us), dst, src, text: text.to_owned() }
    }

    fn recv_unknown(us: i64, dst: NodeId, text: &str) -> Event {
        Event::RecvUnknown { ts: ts(us), dst, text: text.to_owned() }
    }

    #[test]
    fn pairs_single_exchange() {
        let recon = pair_messages(vec![
            send(0, 1, 2, "PREPARE(1, red, 0)"),
            recv(20_000, 2, 1, "PREPARE(1, red, 0)"),
        ]);
        assert_eq!(recon.messages.len(), 1);
        assert!(recon.unmatched.is_empty());
        let m = &recon.messages[0];
        assert_eq!(m.send_ts, ts(0));
        assert_eq!(m.recv_ts, ts(20_000));
        assert_eq!((m.src, m.dst), (1, 2));
    }

    #[test]
    fn orphan_receive_is_dropped() {
        let recon = pair_messages(vec![recv(5_000_000, 3, 9, "ACK(true)")]);
        assert!(recon.messages.is_empty());
        assert!(recon.unmatched.is_empty());
    }

    #[test]
    fn same_key_traffic_pairs_fifo() {
        let recon = pair_messages(vec![
            send(1_000, 1, 2, "X"),
            send(2_000, 1, 2, "X"),
            recv(3_000, 2, 1, "X"),
            recv(4_000, 2, 1, "X"),
        ]);
        assert_eq!(recon.messages.len(), 2);
        // First receive takes the earliest send; never crossed.
        assert_eq!(recon.messages[0].send_ts, ts(1_000));
        assert_eq!(recon.messages[0].recv_ts, ts(3_000));
        assert_eq!(recon.messages[1].send_ts, ts(2_000));
        assert_eq!(recon.messages[1].recv_ts, ts(4_000));
    }

    #[test]
    fn receive_logged_before_send_is_orphan() {
        // Log order governs matching: nothing is pending yet, so the receive
        // drops and the send surfaces as unmatched.
        let recon = pair_messages(vec![recv(2_000, 2, 1, "X"), send(1_000, 1, 2, "X")]);
        assert!(recon.messages.is_empty());
        assert_eq!(recon.unmatched.len(), 1);
        assert_eq!(recon.unmatched[0].send_ts, ts(1_000));
    }

    #[test]
    fn unknown_sender_takes_longest_waiting_candidate() {
        let recon = pair_messages(vec![
            send(1_000_000, 1, 2, "X"),
            send(1_500_000, 3, 2, "X"),
            recv_unknown(2_000_000, 2, "X"),
        ]);
        assert_eq!(recon.messages.len(), 1);
        assert_eq!(recon.messages[0].src, 1);
        assert_eq!(recon.messages[0].send_ts, ts(1_000_000));
        // The src=3 send stays pending and drains as unmatched.
        assert_eq!(recon.unmatched.len(), 1);
        assert_eq!(recon.unmatched[0].src, 3);
    }

    #[test]
    fn unknown_sender_ignores_other_destinations_and_payloads() {
        let recon = pair_messages(vec![
            send(1_000, 1, 5, "X"),
            send(2_000, 1, 2, "Y"),
            recv_unknown(3_000, 2, "X"),
        ]);
        assert!(recon.messages.is_empty());
        assert_eq!(recon.unmatched.len(), 2);
    }

    #[test]
    fn unknown_sender_timestamp_tie_breaks_to_smallest_key() {
        let recon = pair_messages(vec![
            send(1_000, 7, 2, "X"),
            send(1_000, 3, 2, "X"),
            recv_unknown(2_000, 2, "X"),
        ]);
        assert_eq!(recon.messages.len(), 1);
        assert_eq!(recon.messages[0].src, 3);
    }

    #[test]
    fn conservation_on_mixed_trace() {
        let events = vec![
            send(0, 1, 2, "A"),
            send(10, 2, 3, "B"),
            send(20, 1, 2, "A"),
            recv(30, 2, 1, "A"),
            recv_unknown(40, 3, "B"),
            recv(50, 2, 9, "NOPE"), // orphan
        ];
        let n_sends = 3;
        let recon = pair_messages(events);
        assert_eq!(recon.messages.len() + recon.unmatched.len(), n_sends);
    }
}
