// crates/seqviz-render/src/html.rs

//! Self-contained HTML page around the SVG diagram.
//!
//! The page is a single artifact with inline CSS and script: a toolbar with
//! message counts, a zoom slider, a color legend, a scrollable diagram
//! container, and a hover tooltip that also highlights both halves of a
//! split arrow together. No external assets, so the file travels well.

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

use crate::svg::{build_svg, BACKGROUND};
use seqviz_core::{LayoutParams, NodeId, Reconstruction, TimeScale};
use std::collections::BTreeSet;
use std::fmt::Write as _;

/// Render the complete HTML page for a reconstruction.
///
/// An empty reconstruction (no messages, no unmatched sends) produces a
/// minimal placeholder page rather than an empty diagram.
#[must_use]
pub fn render_page(
    recon: &Reconstruction,
    nodes: &BTreeSet<NodeId>,
    params: &LayoutParams,
) -> String {
    if recon.messages.is_empty() && recon.unmatched.is_empty() {
        return "<html><body>No messages.</body></html>".to_owned();
    }

    let scale = TimeScale::build(&recon.messages, &recon.unmatched, params);
    let svg = build_svg(recon, nodes, &scale);

    let mut page = String::with_capacity(svg.body.len() + HEAD.len() + SCRIPT.len() + 4096);
    page.push_str(HEAD);

    let _ = write!(
        page,
        r#"<div id="toolbar">
    <div class="stats">{} messages, {} dropped</div>
    <label>Zoom: <input type="range" id="zoom" min="0.1" max="5" step="0.1" value="1">
    <span id="zoom-val">1.0x</span></label>
"#,
        recon.messages.len(),
        recon.unmatched.len(),
    );
    page.push_str(LEGEND);
    page.push_str("</div>\n");

    let _ = write!(
        page,
        r#"<div id="container">
    <svg id="diagram" xmlns="http://www.w3.org/2000/svg"
         width="{w:.0}" height="{h:.0}"
         viewBox="0 0 {w:.0} {h:.0}"
         style="transform-origin: top left;">
        <rect width="100%" height="100%" fill="{BACKGROUND}" />
{body}    </svg>
</div>
<div id="tooltip"></div>
"#,
        w = svg.width,
        h = svg.height,
        body = svg.body,
    );

    let _ = write!(
        page,
        "<script>\nconst baseW = {:.0};\nconst baseH = {:.0};\n",
        svg.width, svg.height,
    );
    page.push_str(SCRIPT);
    page.push_str("</script>\n</body>\n</html>\n");
    page
}

/// Document head: metadata and the full inline stylesheet.
const HEAD: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Message Sequence Diagram</title>
<style>
* { margin: 0; padding: 0; box-sizing: border-box; }
body {
    background: #1a1a1a;
    color: #ddd;
    font-family: "Helvetica Neue", Arial, sans-serif;
    overflow: hidden;
    height: 100vh;
    display: flex;
    flex-direction: column;
}
#toolbar {
    background: #252525;
    padding: 8px 16px;
    display: flex;
    align-items: center;
    gap: 16px;
    border-bottom: 1px solid #333;
    flex-shrink: 0;
    flex-wrap: wrap;
}
#toolbar .stats {
    font-size: 13px;
    color: #aaa;
}
#toolbar label {
    font-size: 13px;
    color: #ccc;
}
#toolbar input[type=range] {
    width: 120px;
    vertical-align: middle;
}
.legend {
    display: flex;
    gap: 14px;
    font-size: 13px;
}
.legend span {
    display: flex;
    align-items: center;
    gap: 4px;
}
.legend .swatch {
    display: inline-block;
    width: 20px;
    height: 3px;
    border-radius: 1px;
}
#container {
    flex: 1;
    overflow: auto;
    position: relative;
}
#tooltip {
    display: none;
    position: fixed;
    background: #333;
    color: #eee;
    padding: 5px 10px;
    border-radius: 4px;
    font-size: 13px;
    font-family: monospace;
    pointer-events: none;
    z-index: 100;
    white-space: nowrap;
    box-shadow: 0 2px 8px rgba(0,0,0,0.5);
}
svg .msg {
    cursor: pointer;
    transition: opacity 0.1s;
}
svg .msg:hover, svg .msg.split-hl {
    opacity: 1 !important;
    stroke-width: 3 !important;
    filter: brightness(1.3);
}
</style>
</head>
<body>
"##;

/// Color legend shown in the toolbar.
const LEGEND: &str = r##"    <div class="legend">
        <span><span class="swatch" style="background:#aa55dd"></span> PREPARE</span>
        <span><span class="swatch" style="background:#e8a838"></span> PROPOSE</span>
        <span><span class="swatch" style="background:#50b050"></span> ACK(true)</span>
        <span><span class="swatch" style="background:#888"></span> ACK(false)</span>
        <span><span class="swatch" style="background:#ff4444; height:5px"></span> DECIDE(red)</span>
        <span><span class="swatch" style="background:#4488ff; height:5px"></span> DECIDE(blue)</span>
        <span style="margin-left:8px; color:#888">dotted overlay = value color</span>
    </div>
"##;

/// Zoom, tooltip, and split-arrow highlight behavior. `baseW`/`baseH` are
/// injected by [`render_page`] just before this block.
const SCRIPT: &str = r#"const svg = document.getElementById('diagram');
const tooltip = document.getElementById('tooltip');
const container = document.getElementById('container');
const zoomSlider = document.getElementById('zoom');
const zoomVal = document.getElementById('zoom-val');

zoomSlider.addEventListener('input', () => {
    const z = parseFloat(zoomSlider.value);
    zoomVal.textContent = z.toFixed(1) + 'x';
    svg.style.transform = `scale(${z})`;
    svg.style.width = (baseW * z) + 'px';
    svg.style.height = (baseH * z) + 'px';
});

let curSplit = null;
function clearSplit() {
    if (curSplit !== null) {
        svg.querySelectorAll('[data-split="'+curSplit+'"]').forEach(
            n => n.classList.remove('split-hl'));
        curSplit = null;
    }
}
svg.addEventListener('mousemove', (e) => {
    const el = e.target;
    if (el.classList.contains('msg') && el.dataset.tip) {
        tooltip.textContent = el.dataset.tip;
        tooltip.style.display = 'block';
        tooltip.style.left = (e.clientX + 12) + 'px';
        tooltip.style.top = (e.clientY - 28) + 'px';
        const sid = el.dataset.split;
        if (sid !== undefined && sid !== curSplit) {
            clearSplit();
            svg.querySelectorAll('[data-split="'+sid+'"]').forEach(
                n => n.classList.add('split-hl'));
            curSplit = sid;
        } else if (sid === undefined) {
            clearSplit();
        }
    } else {
        tooltip.style.display = 'none';
        clearSplit();
    }
});
svg.addEventListener('mouseleave', () => {
    tooltip.style.display = 'none';
    clearSplit();
});
"#;
