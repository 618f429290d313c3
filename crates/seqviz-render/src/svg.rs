// crates/seqviz-render/src/svg.rs

//! SVG diagram geometry: lifelines, time ticks, message arrows, split
//! arrows for long latencies, and dropped-send markers.
//!
//! Participants render as vertical lifelines in id order. Each message is a
//! line from `(sender column, send offset)` to `(receiver column, receive
//! offset)` with an arrowhead at the receiving end. Messages whose latency
//! dwarfs the rest of the diagram would draw as near-vertical spaghetti, so
//! past a threshold they **split**: a sender-side segment with the slope the
//! arrow would have at a nominal height, an open circle at the break, and a
//! short fixed-slope receiver-side segment. Both halves share a `data-split`
//! id so the page script can highlight them together.

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

use crate::style;
use seqviz_core::{NodeId, Reconstruction, TimeScale, Timestamp};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

/// Column pitch between adjacent lifelines.
const COL_WIDTH: f64 = 160.0;
/// Margin left of the first column (leaves room for tick labels).
const LEFT_MARGIN: f64 = 100.0;
/// Margin right of the last column.
const RIGHT_MARGIN: f64 = 60.0;
/// Margin above the diagram (node labels live here).
const TOP_MARGIN: f64 = 60.0;
/// Margin below the last event.
const BOTTOM_MARGIN: f64 = 40.0;

/// Nominal vertical extent a split arrow pretends to span.
const SPLIT_ARROW_HEIGHT: f64 = 100.0;
/// Horizontal distance from the destination column to the break point.
const SPLIT_H_GAP: f64 = 50.0;
/// Radius of the open circles marking a break.
const SPLIT_CIRCLE_R: f64 = 3.0;
/// Receiver-side slope angle, degrees from horizontal.
const SPLIT_RECV_ANGLE_DEG: f64 = 30.0;
/// Minimum real latency before an arrow may split.
const SPLIT_MIN_LATENCY_S: f64 = 3.0;

/// Page/diagram background.
pub const BACKGROUND: &str = "#1a1a1a";

/// A rendered diagram body plus its pixel dimensions.
#[derive(Clone, Debug)]
pub struct SvgDiagram {
    /// Total SVG width.
    pub width: f64,
    /// Total SVG height.
    pub height: f64,
    /// Inner SVG elements (no surrounding `<svg>` tag).
    pub body: String,
}

/// Column positions for a fixed participant set.
struct Columns {
    index: BTreeMap<NodeId, usize>,
}

impl Columns {
    fn new(nodes: &BTreeSet<NodeId>) -> Self {
        let index = nodes.iter().enumerate().map(|(i, n)| (*n, i)).collect();
        Self { index }
    }

    /// X coordinate of a participant's lifeline (center of its column).
    fn x(&self, node: NodeId) -> f64 {
        let i = self.index.get(&node).copied().unwrap_or(0);
        (i as f64).mul_add(COL_WIDTH, LEFT_MARGIN) + COL_WIDTH / 2.0
    }
}

/// Human label for a participant column.
fn node_label(id: NodeId) -> String {
    if id >= 0 {
        format!("Server {id}")
    } else {
        "Observer".to_owned()
    }
}

/// Escape text for use inside a double-quoted HTML/SVG attribute.
#[must_use]
pub fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Build the full diagram body for a reconstruction.
#[must_use]
pub fn build_svg(recon: &Reconstruction, nodes: &BTreeSet<NodeId>, scale: &TimeScale) -> SvgDiagram {
    let cols = Columns::new(nodes);
    let width = (nodes.len() as f64).mul_add(COL_WIDTH, LEFT_MARGIN + RIGHT_MARGIN);
    let height = (TOP_MARGIN + scale.height() + BOTTOM_MARGIN).ceil();
    let y_of = |ts: Timestamp| TOP_MARGIN + scale.offset(ts);

    let mut body = String::new();

    // Node labels and lifelines.
    for &id in nodes {
        let x = cols.x(id);
        let _ = writeln!(
            body,
            r##"<text x="{x:.1}" y="20" text-anchor="middle" font-size="14" font-weight="bold" fill="#ddd">{}</text>"##,
            escape_attr(&node_label(id)),
        );
    }
    for &id in nodes {
        let x = cols.x(id);
        let _ = writeln!(
            body,
            r##"<line x1="{x:.1}" y1="{:.1}" x2="{x:.1}" y2="{:.1}" stroke="#444" stroke-width="1" />"##,
            TOP_MARGIN - 10.0,
            height - BOTTOM_MARGIN + 10.0,
        );
    }

    draw_ticks(&mut body, scale, width, y_of);

    // Message arrows.
    let mut split_counter = 0usize;
    for m in &recon.messages {
        let x1 = cols.x(m.src);
        let y1 = y_of(m.send_ts);
        let x2 = cols.x(m.dst);
        let y2 = y_of(m.recv_ts);
        let color = style::message_color(&m.text);
        let sw = style::stroke_width(&m.text);
        let is_decide = style::message_kind(&m.text) == "DECIDE";
        let tip = escape_attr(&format!(
            "{}  {}→{}  Δ{:.0}ms",
            m.text,
            m.src,
            m.dst,
            m.latency_s() * 1e3,
        ));

        let dy = y2 - y1;
        let dx = x2 - x1;
        let should_split =
            dy > 4.0 * SPLIT_ARROW_HEIGHT && m.latency_s() >= SPLIT_MIN_LATENCY_S && dx.abs() >= SPLIT_H_GAP;

        if should_split {
            let sid = Some(split_counter);
            split_counter += 1;

            // Sender side keeps the slope the arrow would have if it spanned
            // the nominal height; receiver side approaches at a fixed angle.
            let slope = SPLIT_ARROW_HEIGHT / dx;
            let x_break = x2 - SPLIT_H_GAP * dx.signum();
            let y_break_send = (x_break - x1).mul_add(slope, y1);
            let y_break_recv = SPLIT_H_GAP.mul_add(-SPLIT_RECV_ANGLE_DEG.to_radians().tan(), y2);

            draw_line(&mut body, x1, y1, x_break, y_break_send, color, sw, &m.text, &tip, sid);
            draw_circle(&mut body, x_break, y_break_send, color, &tip, sid);
            draw_circle(&mut body, x_break, y_break_recv, color, &tip, sid);
            draw_line(&mut body, x_break, y_break_recv, x2, y2, color, sw, &m.text, &tip, sid);
            draw_arrowhead(&mut body, x_break, y_break_recv, x2, y2, color, is_decide, &tip, sid);
        } else {
            draw_line(&mut body, x1, y1, x2, y2, color, sw, &m.text, &tip, None);
            draw_arrowhead(&mut body, x1, y1, x2, y2, color, is_decide, &tip, None);
        }
    }

    // Unmatched sends: a dashed stub toward the destination, ending in an ×.
    for u in &recon.unmatched {
        let x1 = cols.x(u.src);
        let y1 = y_of(u.send_ts);
        let x2 = cols.x(u.dst);
        let y2 = y1 + 15.0;
        let xmid = (x1 + x2) / 2.0;
        let ymid = (y1 + y2) / 2.0;
        let color = style::message_color(&u.text);
        let tip = escape_attr(&format!("{}  {}→{}  DROPPED", u.text, u.src, u.dst));
        let _ = writeln!(
            body,
            r#"<line x1="{x1:.1}" y1="{y1:.2}" x2="{xmid:.1}" y2="{ymid:.2}" stroke="{color}" stroke-width="1.5" stroke-dasharray="4,3" class="msg" data-tip="{tip}" />"#,
        );
        let sz = 3.0;
        let _ = writeln!(
            body,
            r#"<line x1="{:.1}" y1="{:.2}" x2="{:.1}" y2="{:.2}" stroke="{color}" stroke-width="2" />"#,
            xmid - sz,
            ymid - sz,
            xmid + sz,
            ymid + sz,
        );
        let _ = writeln!(
            body,
            r#"<line x1="{:.1}" y1="{:.2}" x2="{:.1}" y2="{:.2}" stroke="{color}" stroke-width="2" />"#,
            xmid + sz,
            ymid - sz,
            xmid - sz,
            ymid + sz,
        );
    }

    SvgDiagram { width, height, body }
}

/// Horizontal gridlines with `+Ns` labels at every whole second.
fn draw_ticks<F: Fn(Timestamp) -> f64>(body: &mut String, scale: &TimeScale, width: f64, y_of: F) {
    let (Some(first), Some(last)) = (scale.first(), scale.last()) else {
        return;
    };
    let t_min = first.as_micros();
    let t_max = last.as_micros();

    let mut sec = t_min.div_euclid(1_000_000);
    if sec * 1_000_000 < t_min {
        sec += 1;
    }
    while sec * 1_000_000 <= t_max + 500_000 {
        let ts = Timestamp::from_micros(sec * 1_000_000);
        let y = y_of(ts);
        let rel = ts.seconds_since(first);
        let _ = writeln!(
            body,
            r##"<line x1="0" y1="{y:.1}" x2="{width:.1}" y2="{y:.1}" stroke="#2a2a2a" stroke-width="0.5" />"##,
        );
        let _ = writeln!(
            body,
            r##"<text x="8" y="{:.1}" font-size="11" fill="#888">+{rel:.0}s</text>"##,
            y + 4.0,
        );
        sec += 1;
    }
}

/// `data-split` attribute for split-arrow grouping, or empty.
fn split_attr(split_id: Option<usize>) -> String {
    split_id.map_or_else(String::new, |sid| format!(r#" data-split="{sid}""#))
}

/// A message segment, plus the dotted value-color overlay where the payload
/// calls for one.
#[allow(clippy::too_many_arguments)]
fn draw_line(
    body: &mut String,
    xa: f64,
    ya: f64,
    xb: f64,
    yb: f64,
    color: &str,
    sw: f64,
    text: &str,
    tip: &str,
    split_id: Option<usize>,
) {
    let extra = split_attr(split_id);
    let _ = writeln!(
        body,
        r#"<line x1="{xa:.1}" y1="{ya:.2}" x2="{xb:.1}" y2="{yb:.2}" stroke="{color}" stroke-width="{sw}" class="msg" data-tip="{tip}"{extra} />"#,
    );
    if let Some(overlay) = style::overlay_color(text) {
        let _ = writeln!(
            body,
            r#"<line x1="{xa:.1}" y1="{ya:.2}" x2="{xb:.1}" y2="{yb:.2}" stroke="{overlay}" stroke-width="4" stroke-dasharray="3,18" class="msg" data-tip="{tip}"{extra} />"#,
        );
    }
}

/// Arrowhead at `(xb, yb)`, pointing away from `(xa, ya)`; decisions get a
/// larger head.
#[allow(clippy::too_many_arguments)]
fn draw_arrowhead(
    body: &mut String,
    xa: f64,
    ya: f64,
    xb: f64,
    yb: f64,
    color: &str,
    is_decide: bool,
    tip: &str,
    split_id: Option<usize>,
) {
    let dx = xb - xa;
    let dy = yb - ya;
    let length = dx.hypot(dy);
    if length <= 0.0 {
        return;
    }
    let (ux, uy) = (dx / length, dy / length);
    let (px, py) = (-uy, ux);
    let (ah, aw) = if is_decide { (11.0, 5.0) } else { (8.0, 3.5) };
    let ax = px.mul_add(aw, ux.mul_add(-ah, xb));
    let ay = py.mul_add(aw, uy.mul_add(-ah, yb));
    let bx = px.mul_add(-aw, ux.mul_add(-ah, xb));
    let by = py.mul_add(-aw, uy.mul_add(-ah, yb));
    let extra = split_attr(split_id);
    let _ = writeln!(
        body,
        r#"<polygon points="{xb:.1},{yb:.2} {ax:.1},{ay:.2} {bx:.1},{by:.2}" fill="{color}" class="msg" data-tip="{tip}"{extra} />"#,
    );
}

/// Open circle marking a split-arrow break point.
fn draw_circle(body: &mut String, cx: f64, cy: f64, color: &str, tip: &str, split_id: Option<usize>) {
    let extra = split_attr(split_id);
    let _ = writeln!(
        body,
        r#"<circle cx="{cx:.1}" cy="{cy:.2}" r="{SPLIT_CIRCLE_R}" fill="{BACKGROUND}" stroke="{color}" stroke-width="1.5" class="msg" data-tip="{tip}"{extra} />"#,
    );
}
