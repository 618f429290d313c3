// crates/seqviz-render/src/style.rs

//! Payload-text classification into colors and stroke widths.
//!
//! Payloads are opaque to the core; here they get a best-effort visual
//! identity based on their leading identifier (the part before `(`) and the
//! consensus value they mention. Anything unrecognized renders grey.

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

/// Neutral color for unclassified payloads and negative ACKs.
pub const GREY: &str = "#888888";

/// Bright colors for the consensus values a payload may carry.
const VALUE_COLORS: &[(&str, &str)] = &[("red", "#ff4444"), ("blue", "#4488ff")];

/// Leading identifier of a payload: `PREPARE(1, red, 0)` → `PREPARE`.
#[must_use]
pub fn message_kind(text: &str) -> &str {
    text.find('(').map_or(text, |i| &text[..i])
}

/// Bright color for the consensus value mentioned in the payload, if any.
#[must_use]
pub fn value_color(text: &str) -> Option<&'static str> {
    VALUE_COLORS
        .iter()
        .find(|(value, _)| text.contains(value))
        .map(|(_, color)| *color)
}

/// Stroke color for a payload's arrow.
#[must_use]
pub fn message_color(text: &str) -> &'static str {
    match message_kind(text) {
        "PREPARE" => "#aa55dd",
        "PROPOSE" => "#e8a838",
        "ACK" => {
            if text.contains("true") {
                "#50b050"
            } else {
                GREY
            }
        }
        "DECIDE" => value_color(text).unwrap_or("#d94a4a"),
        _ => GREY,
    }
}

/// Stroke width for a payload's arrow; decisions draw heavier.
#[must_use]
pub fn stroke_width(text: &str) -> f64 {
    if message_kind(text) == "DECIDE" {
        3.0
    } else {
        1.5
    }
}

/// Dotted value-color overlay, drawn on PREPARE/PROPOSE arrows so the value
/// being negotiated stays visible at a glance.
#[must_use]
pub fn overlay_color(text: &str) -> Option<&'static str> {
    matches!(message_kind(text), "PREPARE" | "PROPOSE")
        .then(|| value_color(text))
        .flatten()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_stops_at_paren() {
        assert_eq!(message_kind("PREPARE(1, red, 0)"), "PREPARE");
        assert_eq!(message_kind("PING"), "PING");
    }

    #[test]
    fn ack_color_tracks_verdict() {
        assert_eq!(message_color("ACK(true)"), "#50b050");
        assert_eq!(message_color("ACK(false)"), GREY);
    }

    #[test]
    fn decide_takes_its_value_color() {
        assert_eq!(message_color("DECIDE(red)"), "#ff4444");
        assert_eq!(message_color("DECIDE(blue)"), "#4488ff");
        assert_eq!(message_color("DECIDE(?)"), "#d94a4a");
    }

    #[test]
    fn overlay_only_for_negotiation_phases() {
        assert_eq!(overlay_color("PREPARE(1, blue, 0)"), Some("#4488ff"));
        assert_eq!(overlay_color("PROPOSE(2, red)"), Some("#ff4444"));
        assert_eq!(overlay_color("DECIDE(red)"), None);
        assert_eq!(overlay_color("PREPARE(1, 0)"), None);
    }

    #[test]
    fn unknown_payloads_fall_back_to_grey() {
        assert_eq!(message_color("HELLO(world)"), GREY);
        assert!((stroke_width("HELLO(world)") - 1.5).abs() < f64::EPSILON);
        assert!((stroke_width("DECIDE(red)") - 3.0).abs() < f64::EPSILON);
    }
}
