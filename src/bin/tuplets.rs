//! Run the n-tuplet finder over one input batch.
//!
//! Usage:
//!   tuplets log.in log.out                  Default 4-layer detector
//!   tuplets log.in log.out --layers 6       Deeper detector
//!   tuplets log.in log.out --threads 1      Single worker
//!   tuplets log.in log.out --snapshot ev.rkyv
//!                                           Also save the parsed event for fast re-runs
//!   tuplets ev.rkyv log.out                 Run from a snapshot
//!
//! Log verbosity follows RUST_LOG (default: info).

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tuplets::{find_tuplets, DispatchContext, Event, FinderConfig};

#[derive(Parser)]
#[command(name = "tuplets")]
#[command(about = "Find particle-track n-tuplets from hit doublets")]
struct Args {
    /// Input batch: text format, or an rkyv event snapshot (*.rkyv)
    input: PathBuf,

    /// Output file, one tuplet per line
    output: PathBuf,

    /// Number of detector layers
    #[arg(short, long, default_value_t = 4)]
    layers: usize,

    /// Capacity of each bucket and adjacency list
    #[arg(short, long, default_value_t = 64)]
    bucket_size: usize,

    /// Upper bound on stored tuplets (default: worst-case fan-out)
    #[arg(long)]
    max_tuplets: Option<usize>,

    /// Worker threads (default: one per core)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Save the parsed event as an rkyv snapshot
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let input = args.input.to_string_lossy().to_string();
    let event = if args.input.extension().is_some_and(|e| e == "rkyv") {
        Event::load_from_file(&input)
    } else {
        tuplets::io::load_event_from_file(&args.input, args.layers)
    }
    .with_context(|| format!("failed to load {input}"))?;

    if let Some(path) = &args.snapshot {
        event.save_to_file(&path.to_string_lossy())?;
    }

    let config = FinderConfig {
        num_layers: args.layers,
        max_bucket_size: args.bucket_size,
        max_tuplet_count: args.max_tuplets,
        ..Default::default()
    };
    let ctx = DispatchContext::new(args.threads)?;
    let result = find_tuplets(&ctx, &event, &config)?;

    tuplets::io::save_tuplets_to_file(&args.output, &result.tuplets)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    Ok(())
}
