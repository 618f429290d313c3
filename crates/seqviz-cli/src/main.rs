// crates/seqviz-cli/src/main.rs

#![forbid(unsafe_code)]
#![deny(
    rust_2018_idioms,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo
)]

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use seqviz_core::{pair_messages, participants, LayoutParams, NodeId, Reconstruction};
use seqviz_render::render_page;
use seqviz_trace::{generator::generate_trace, io as trace_io};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "seqviz",
    about = "Consensus message-trace sequence diagrams",
    long_about = "Consensus message-trace sequence diagrams.\n\nRead a send/receive trace (as produced by instrumented consensus runs), pair sends with receives, and render an HTML sequence diagram with a non-linear time axis.",
    version = env!("CARGO_PKG_VERSION"),
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Render a trace as a self-contained HTML sequence diagram.
    /// Reads TRACE if given, otherwise stdin; writes HTML to --out or stdout.
    Render {
        /// Input trace file (defaults to stdin)
        trace: Option<PathBuf>,

        /// Output HTML path (defaults to stdout)
        #[arg(long)]
        out: Option<PathBuf>,

        #[command(flatten)]
        layout: LayoutOpts,
    },

    /// Generate a synthetic consensus trace in the wire format.
    Simulate {
        /// Number of participants (>1)
        #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(2..))]
        nodes: u32,

        /// Number of PREPARE/ACK/DECIDE rounds (>0)
        #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..))]
        rounds: u32,

        /// Fraction of sends that are dropped in flight, in [0, 1]
        #[arg(long, default_value_t = 0.1)]
        drop_rate: f64,

        /// RNG seed (same seed, same trace)
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Output trace path (defaults to stdout)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Reconstruct a trace and write messages/unmatched/participants as JSON
    /// for other frontends.
    ExportJson {
        /// Input trace file (defaults to stdin)
        trace: Option<PathBuf>,

        /// Output JSON path (defaults to stdout)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

/// Layout knobs forwarded to the temporal layout engine.
#[derive(Args, Debug)]
struct LayoutOpts {
    /// Proportional scale for short real-time gaps
    #[arg(long, default_value_t = 200.0)]
    px_per_sec: f64,

    /// Gaps at or above this many seconds collapse to a fixed size
    #[arg(long, default_value_t = 0.25)]
    compress_threshold: f64,

    /// Rendered size of a compressed gap, in pixels
    #[arg(long, default_value_t = 50.0)]
    compressed_gap_px: f64,

    /// Minimum vertical span of any message arrow, in pixels
    #[arg(long, default_value_t = 20.0)]
    min_arrow_px: f64,

    /// Max receives per destination within one receive band
    #[arg(long, default_value_t = 4)]
    max_recvs_per_band: usize,

    /// Vertical size of the receive-density band, in pixels
    #[arg(long, default_value_t = 5.0)]
    recv_band_px: f64,
}

impl From<LayoutOpts> for LayoutParams {
    fn from(o: LayoutOpts) -> Self {
        Self {
            px_per_sec: o.px_per_sec,
            compress_threshold_s: o.compress_threshold,
            compressed_gap_px: o.compressed_gap_px,
            min_arrow_px: o.min_arrow_px,
            max_recvs_per_band: o.max_recvs_per_band,
            recv_band_px: o.recv_band_px,
        }
    }
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Render { trace, out, layout } => render(trace, out, layout.into()),

        Cmd::Simulate { nodes, rounds, drop_rate, seed, out } => {
            simulate(nodes, rounds, drop_rate, seed, out)
        }

        Cmd::ExportJson { trace, out } => export_json(trace, out),
    }
}

/// Initialize tracing with an env-driven filter (default INFO).
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

/// Ensure the parent directory for a file exists.
fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating parent directory {}", dir.display()))?;
        }
    }
    Ok(())
}

/// Write `content` to `out`, or to stdout when `out` is `None`.
fn write_artifact(out: Option<&Path>, content: &str) -> Result<()> {
    match out {
        Some(path) => {
            ensure_parent_dir(path)?;
            let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
            let mut w = BufWriter::new(f);
            w.write_all(content.as_bytes())
                .with_context(|| format!("write {}", path.display()))?;
            w.flush()?;
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content.as_bytes()).context("write to stdout")?;
            stdout.flush()?;
        }
    }
    Ok(())
}

/// Read a trace, pair it, and surface the one fatal condition: no events.
fn reconstruct(trace: Option<&Path>) -> Result<(Reconstruction, BTreeSet<NodeId>, usize)> {
    let events = trace_io::read_events(trace).context("reading trace")?;
    if events.is_empty() {
        bail!("no events parsed from the input trace");
    }
    let nodes = participants(&events);
    let n_events = events.len();
    let recon = pair_messages(events);
    Ok((recon, nodes, n_events))
}

fn render(trace: Option<PathBuf>, out: Option<PathBuf>, params: LayoutParams) -> Result<()> {
    let (recon, nodes, n_events) = reconstruct(trace.as_deref())?;
    info!(
        events = n_events,
        messages = recon.messages.len(),
        dropped = recon.unmatched.len(),
        "reconstructed trace"
    );

    let page = render_page(&recon, &nodes, &params);
    write_artifact(out.as_deref(), &page)?;

    eprintln!(
        "Parsed {n_events} events → {} messages, {} dropped",
        recon.messages.len(),
        recon.unmatched.len()
    );
    Ok(())
}

fn simulate(nodes: u32, rounds: u32, drop_rate: f64, seed: u64, out: Option<PathBuf>) -> Result<()> {
    if !(0.0..=1.0).contains(&drop_rate) {
        bail!("--drop-rate must be within [0, 1], got {drop_rate}");
    }

    info!(nodes, rounds, drop_rate, seed, "generating synthetic trace");
    let events = generate_trace(nodes, rounds, drop_rate, seed);

    match out.as_deref() {
        Some(path) => {
            ensure_parent_dir(path)?;
            let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
            trace_io::write_trace(BufWriter::new(f), &events)?;
        }
        None => trace_io::write_trace(std::io::stdout().lock(), &events)?,
    }

    eprintln!(
        "Simulated {} events over {rounds} rounds ({nodes} nodes, seed {seed})",
        events.len()
    );
    Ok(())
}

/// Stable JSON contract for other frontends.
#[derive(Serialize)]
struct ExportDoc<'a> {
    participants: &'a BTreeSet<NodeId>,
    #[serde(flatten)]
    reconstruction: &'a Reconstruction,
}

fn export_json(trace: Option<PathBuf>, out: Option<PathBuf>) -> Result<()> {
    let (recon, nodes, n_events) = reconstruct(trace.as_deref())?;
    info!(events = n_events, "exporting reconstruction to JSON");

    let doc = ExportDoc { participants: &nodes, reconstruction: &recon };
    let json = serde_json::to_string_pretty(&doc).context("serialize reconstruction")?;
    write_artifact(out.as_deref(), &json)?;

    eprintln!(
        "Exported {} messages, {} unmatched sends",
        recon.messages.len(),
        recon.unmatched.len()
    );
    Ok(())
}
