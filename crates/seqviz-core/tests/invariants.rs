//! Invariants for message reconstruction and temporal layout.
//!
//! These tests treat:
//! - the **reconstructor** as authoritative for send conservation (every send
//!   becomes exactly one message or one unmatched send) and FIFO pairing, and
//! - the **time scale** as a pure mapping that must stay monotone, respect
//!   the minimum-arrow constraint, and clamp outside the observed range.

use proptest::prelude::*;
use seqviz_core::{pair_messages, Event, LayoutParams, TimeScale, Timestamp};

/// A hostile little event generator: few nodes, few payloads, timestamps in a
/// tight band so keys collide and bursts form, with all three event kinds.
fn arb_events() -> impl Strategy<Value = Vec<Event>> {
    let node = -1i32..4i32;
    let text = prop_oneof![Just("A"), Just("B"), Just("ACK(true)")];
    let ts = 0i64..50_000i64;
    let event = (0u8..3u8, ts, node.clone(), node, text).prop_map(|(kind, us, a, b, text)| {
        let ts = Timestamp::from_micros(us);
        let text = text.to_owned();
        match kind {
            0 => Event::Send { ts, src: a, dst: b, text },
            1 => Event::Recv { ts, dst: a, src: b, text },
            _ => Event::RecvUnknown { ts, dst: a, text },
        }
    });
    prop::collection::vec(event, 0..40)
}

fn count_sends(events: &[Event]) -> usize {
    events
        .iter()
        .filter(|ev| matches!(ev, Event::Send { .. }))
        .count()
}

proptest! {
    /// |messages| + |unmatched| == number of send events, for any sequence.
    #[test]
    fn sends_are_conserved(events in arb_events()) {
        let n_sends = count_sends(&events);
        let recon = pair_messages(events);
        prop_assert_eq!(recon.messages.len() + recon.unmatched.len(), n_sends);
    }

    /// Reconstruction is deterministic: same events, identical output.
    #[test]
    fn reconstruction_is_deterministic(events in arb_events()) {
        let a = pair_messages(events.clone());
        let b = pair_messages(events);
        prop_assert_eq!(a.messages, b.messages);
        prop_assert_eq!(a.unmatched, b.unmatched);
    }

    /// Offsets strictly increase across distinct timeline entries and never
    /// decrease for arbitrary probes.
    #[test]
    fn layout_is_monotone(events in arb_events(), probes in prop::collection::vec(-10_000i64..60_000i64, 0..20)) {
        let recon = pair_messages(events);
        let scale = TimeScale::build(&recon.messages, &recon.unmatched, &LayoutParams::default());

        for pair in scale.times().windows(2) {
            prop_assert!(scale.offset(pair[0]) < scale.offset(pair[1]));
        }

        let mut probes = probes;
        probes.sort_unstable();
        for pair in probes.windows(2) {
            let lo = scale.offset(Timestamp::from_micros(pair[0]));
            let hi = scale.offset(Timestamp::from_micros(pair[1]));
            prop_assert!(lo <= hi);
        }
    }

    /// Every forward-pointing message spans at least the minimum arrow height.
    #[test]
    fn arrows_meet_min_height(events in arb_events()) {
        let params = LayoutParams::default();
        let recon = pair_messages(events);
        let scale = TimeScale::build(&recon.messages, &recon.unmatched, &params);

        for m in &recon.messages {
            if m.send_ts < m.recv_ts {
                let span = scale.offset(m.recv_ts) - scale.offset(m.send_ts);
                prop_assert!(span >= params.min_arrow_px - 1e-6);
            }
        }
    }

    /// Probes at or beyond the timeline ends clamp to 0 / total height.
    #[test]
    fn offsets_clamp_at_the_ends(events in arb_events()) {
        let recon = pair_messages(events);
        let scale = TimeScale::build(&recon.messages, &recon.unmatched, &LayoutParams::default());

        if let (Some(first), Some(last)) = (scale.first(), scale.last()) {
            let before = Timestamp::from_micros(first.as_micros() - 1);
            let after = Timestamp::from_micros(last.as_micros() + 1);
            prop_assert_eq!(scale.offset(before), 0.0);
            prop_assert_eq!(scale.offset(first), 0.0);
            prop_assert_eq!(scale.offset(after), scale.height());
            prop_assert_eq!(scale.offset(last), scale.height());
        }
    }
}
