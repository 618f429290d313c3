// crates/seqviz-core/src/layout.rs

//! Non-linear time→pixel mapping for sequence-diagram layout.
//!
//! A diagram drawn to wall-clock scale is unreadable for real traces: idle
//! stretches dominate the page while bursts collapse into a smear. The
//! [`TimeScale`] therefore assigns vertical pixel offsets to the **timeline**
//! (the sorted distinct timestamps bounding every message and unmatched send)
//! in three passes:
//!
//! 1. base spacing per gap — proportional (`px_per_sec`) for short gaps, a
//!    fixed compressed width for gaps at or above `compress_threshold_s`;
//! 2. a per-gap scale-up so every message arrow spans at least
//!    `min_arrow_px`;
//! 3. a per-gap scale-up so any `max_recvs_per_band + 1` consecutive receives
//!    on one destination span at least `recv_band_px`.
//!
//! The two constraint passes each produce an independent per-gap multiplier
//! array over the *provisional* prefix sums; the arrays combine by
//! element-wise maximum and apply once. Gaps only ever scale **up**, so widely
//! separated events are never squeezed below their compressed baseline, and
//! offsets stay strictly increasing across distinct timeline entries.

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

use crate::types::{Message, NodeId, Timestamp, UnmatchedSend};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Tunable layout constants. [`Default`] gives the reference values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutParams {
    /// Proportional scale for short gaps.
    pub px_per_sec: f64,
    /// Real-time gaps at or above this many seconds collapse to a fixed size.
    pub compress_threshold_s: f64,
    /// Rendered size of a compressed gap.
    pub compressed_gap_px: f64,
    /// Minimum vertical span of any message arrow.
    pub min_arrow_px: f64,
    /// Maximum receives one destination may show per `recv_band_px` window.
    pub max_recvs_per_band: usize,
    /// Vertical window size for the receive-density limit.
    pub recv_band_px: f64,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            px_per_sec: 200.0,
            compress_threshold_s: 0.25,
            compressed_gap_px: 50.0,
            min_arrow_px: 20.0,
            max_recvs_per_band: 4,
            recv_band_px: 5.0,
        }
    }
}

/// Deterministic, monotone mapping from timestamps to vertical pixel offsets.
///
/// Built once per reconstruction; holds the sorted timeline and the final
/// pixel position of every entry. With zero or one distinct timestamps the
/// scale is degenerate: every offset is `0.0` and the height is `0.0`.
#[derive(Clone, Debug, Default)]
pub struct TimeScale {
    /// Sorted distinct timestamps (strictly increasing).
    times: Vec<Timestamp>,
    /// Final pixel position per timeline entry; same length as `times`.
    y: Vec<f64>,
}

impl TimeScale {
    /// Build the scale from a reconstruction's messages and unmatched sends.
    #[must_use]
    pub fn build(messages: &[Message], unmatched: &[UnmatchedSend], params: &LayoutParams) -> Self {
        let times = collect_timeline(messages, unmatched);
        let n = times.len();
        if n <= 1 {
            return Self { y: vec![0.0; n], times };
        }

        let index: HashMap<Timestamp, usize> =
            times.iter().enumerate().map(|(i, t)| (*t, i)).collect();

        // Base spacing per gap, then provisional positions for the
        // constraint passes.
        let mut spacings: Vec<f64> = times
            .windows(2)
            .map(|w| {
                let gap_s = w[1].seconds_since(w[0]);
                if gap_s >= params.compress_threshold_s {
                    params.compressed_gap_px
                } else {
                    gap_s * params.px_per_sec
                }
            })
            .collect();
        let provisional = prefix_sums(&spacings);

        // Each pass scans the same provisional positions, so the order the
        // passes run in cannot change the outcome.
        let arrow = min_arrow_scale(messages, &index, &provisional, params.min_arrow_px);
        let density = recv_density_scale(messages, &index, &provisional, params);

        for (i, spacing) in spacings.iter_mut().enumerate() {
            *spacing *= arrow[i].max(density[i]);
        }

        let y = prefix_sums(&spacings);
        Self { times, y }
    }

    /// Vertical offset for `ts`.
    ///
    /// Exact timeline entries map to their computed position; timestamps
    /// before the first or after the last clamp to `0.0` / [`Self::height`];
    /// anything in between interpolates linearly by its real-time fraction of
    /// the bracketing gap.
    #[must_use]
    pub fn offset(&self, ts: Timestamp) -> f64 {
        match self.times.binary_search(&ts) {
            Ok(i) => self.y[i],
            Err(0) => 0.0,
            Err(i) if i >= self.times.len() => self.height(),
            Err(i) => {
                let (t0, t1) = (self.times[i - 1], self.times[i]);
                let (y0, y1) = (self.y[i - 1], self.y[i]);
                let frac = ts.seconds_since(t0) / t1.seconds_since(t0);
                (y1 - y0).mul_add(frac, y0)
            }
        }
    }

    /// Total vertical extent (position of the last timeline entry).
    #[inline]
    #[must_use]
    pub fn height(&self) -> f64 {
        self.y.last().copied().unwrap_or(0.0)
    }

    /// The sorted distinct timestamps the scale was built from.
    #[inline]
    #[must_use]
    pub fn times(&self) -> &[Timestamp] {
        &self.times
    }

    /// First timeline entry, if any.
    #[inline]
    #[must_use]
    pub fn first(&self) -> Option<Timestamp> {
        self.times.first().copied()
    }

    /// Last timeline entry, if any.
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<Timestamp> {
        self.times.last().copied()
    }
}

/// Sorted distinct timestamps across all message boundaries and unmatched
/// sends.
fn collect_timeline(messages: &[Message], unmatched: &[UnmatchedSend]) -> Vec<Timestamp> {
    let mut set = BTreeSet::new();
    for m in messages {
        set.insert(m.send_ts);
        set.insert(m.recv_ts);
    }
    for u in unmatched {
        set.insert(u.send_ts);
    }
    set.into_iter().collect()
}

/// Cumulative positions from per-gap spacings (`out[0] = 0`).
fn prefix_sums(spacings: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(spacings.len() + 1);
    let mut acc = 0.0;
    out.push(acc);
    for s in spacings {
        acc += s;
        out.push(acc);
    }
    out
}

/// Per-gap multipliers enforcing the minimum arrow height.
///
/// Every message whose send precedes its receive on the timeline must span at
/// least `min_arrow_px`; a too-short span imposes its scale-up factor on every
/// gap strictly between the two indices.
fn min_arrow_scale(
    messages: &[Message],
    index: &HashMap<Timestamp, usize>,
    provisional: &[f64],
    min_arrow_px: f64,
) -> Vec<f64> {
    let mut scale = vec![1.0; provisional.len().saturating_sub(1)];
    for m in messages {
        let (Some(&si), Some(&ei)) = (index.get(&m.send_ts), index.get(&m.recv_ts)) else {
            continue;
        };
        if si >= ei {
            continue;
        }
        let span = provisional[ei] - provisional[si];
        if span > 0.0 && span < min_arrow_px {
            raise_gaps(&mut scale[si..ei], min_arrow_px / span);
        }
    }
    scale
}

/// Per-gap multipliers enforcing the receive-density limit.
///
/// For each destination, every window of `max_recvs_per_band + 1` consecutive
/// receives must span at least `recv_band_px`, so individual arrowheads stay
/// distinguishable through bursts.
fn recv_density_scale(
    messages: &[Message],
    index: &HashMap<Timestamp, usize>,
    provisional: &[f64],
    params: &LayoutParams,
) -> Vec<f64> {
    let mut scale = vec![1.0; provisional.len().saturating_sub(1)];

    let mut recvs_by_dst: BTreeMap<NodeId, Vec<Timestamp>> = BTreeMap::new();
    for m in messages {
        recvs_by_dst.entry(m.dst).or_default().push(m.recv_ts);
    }

    let window = params.max_recvs_per_band + 1;
    for times in recvs_by_dst.values_mut() {
        times.sort_unstable();
        for w in times.windows(window) {
            let (Some(&si), Some(&ei)) = (index.get(&w[0]), index.get(&w[window - 1])) else {
                continue;
            };
            if si >= ei {
                continue;
            }
            let span = provisional[ei] - provisional[si];
            if span > 0.0 && span < params.recv_band_px {
                raise_gaps(&mut scale[si..ei], params.recv_band_px / span);
            }
        }
    }
    scale
}

/// Raise every multiplier in `gaps` to at least `factor`.
fn raise_gaps(gaps: &mut [f64], factor: f64) {
    for g in gaps {
        if *g < factor {
            *g = factor;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(us: i64) -> Timestamp {
        Timestamp::from_micros(us)
    }

    fn msg(send_us: i64, recv_us: i64, src: NodeId, dst: NodeId) -> Message {
        Message {
            send_ts: ts(send_us),
            recv_ts: ts(recv_us),
            src,
            dst,
            text: "X".to_owned(),
        }
    }

    #[test]
    fn empty_input_is_flat() {
        let scale = TimeScale::build(&[], &[], &LayoutParams::default());
        assert_eq!(scale.height(), 0.0);
        assert_eq!(scale.offset(ts(123)), 0.0);
    }

    #[test]
    fn single_timestamp_is_flat() {
        let unmatched = vec![UnmatchedSend {
            send_ts: ts(1_000),
            src: 1,
            dst: 2,
            text: "X".to_owned(),
        }];
        let scale = TimeScale::build(&[], &unmatched, &LayoutParams::default());
        assert_eq!(scale.height(), 0.0);
        assert_eq!(scale.offset(ts(1_000)), 0.0);
    }

    #[test]
    fn short_gaps_are_proportional() {
        let params = LayoutParams::default();
        // 100 ms gap, well under the compress threshold and over min-arrow.
        let messages = vec![msg(0, 100_000, 1, 2)];
        let scale = TimeScale::build(&messages, &[], &params);
        assert!((scale.height() - 0.1 * params.px_per_sec).abs() < 1e-9);
    }

    #[test]
    fn long_gaps_compress_to_fixed_size() {
        let params = LayoutParams::default();
        // 10 s of idle between two exchanges collapses to compressed_gap_px.
        let messages = vec![msg(0, 200_000, 1, 2), msg(10_200_000, 10_400_000, 1, 2)];
        let scale = TimeScale::build(&messages, &[], &params);
        let idle = scale.offset(ts(10_200_000)) - scale.offset(ts(200_000));
        assert!((idle - params.compressed_gap_px).abs() < 1e-9);
    }

    #[test]
    fn arrows_meet_minimum_height() {
        let params = LayoutParams::default();
        // 1 ms of latency would be 0.2 px unscaled.
        let messages = vec![msg(0, 1_000, 1, 2)];
        let scale = TimeScale::build(&messages, &[], &params);
        let span = scale.offset(ts(1_000)) - scale.offset(ts(0));
        assert!(span >= params.min_arrow_px - 1e-9);
    }

    #[test]
    fn arrow_scaling_leaves_unrelated_gaps_alone() {
        let params = LayoutParams::default();
        let messages = vec![msg(0, 1_000, 1, 2), msg(100_000, 200_000, 1, 2)];
        let scale = TimeScale::build(&messages, &[], &params);
        // The second arrow's 100 ms span needs no scaling and keeps its
        // proportional size.
        let span = scale.offset(ts(200_000)) - scale.offset(ts(100_000));
        assert!((span - 0.1 * params.px_per_sec).abs() < 1e-9);
    }

    #[test]
    fn burst_of_receives_spreads_to_band_height() {
        let params = LayoutParams::default();
        // Five receives on node 2, 1 ms apart; sends far enough back that
        // min-arrow scaling cannot mask the density constraint.
        let messages: Vec<Message> = (0..5)
            .map(|i| msg(-500_000 + i, 1_000 * i, 1, 2))
            .collect();
        let scale = TimeScale::build(&messages, &[], &params);
        let band = scale.offset(ts(4_000)) - scale.offset(ts(0));
        assert!(band >= params.recv_band_px - 1e-9);
    }

    #[test]
    fn offsets_strictly_increase_over_timeline() {
        let params = LayoutParams::default();
        let messages = vec![
            msg(0, 1_000, 1, 2),
            msg(500, 2_500, 2, 3),
            msg(2_000_000, 2_600_000, 3, 1),
        ];
        let scale = TimeScale::build(&messages, &[], &params);
        for pair in scale.times().windows(2) {
            assert!(scale.offset(pair[0]) < scale.offset(pair[1]));
        }
    }

    #[test]
    fn clamping_is_idempotent() {
        let params = LayoutParams::default();
        let messages = vec![msg(0, 300_000, 1, 2)];
        let scale = TimeScale::build(&messages, &[], &params);
        assert_eq!(scale.offset(ts(-1_000_000)), 0.0);
        assert_eq!(scale.offset(ts(0)), 0.0);
        assert_eq!(scale.offset(ts(300_000)), scale.height());
        assert_eq!(scale.offset(ts(9_000_000)), scale.height());
    }

    #[test]
    fn interpolation_is_by_real_time_fraction() {
        let params = LayoutParams {
            compress_threshold_s: 10.0, // keep the single gap proportional
            ..LayoutParams::default()
        };
        let messages = vec![msg(0, 1_000_000, 1, 2)];
        let scale = TimeScale::build(&messages, &[], &params);
        let quarter = scale.offset(ts(250_000));
        assert!((quarter - scale.height() / 4.0).abs() < 1e-9);
    }
}
