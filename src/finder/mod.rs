//! Bucketed doublet-connection n-tuplet finder.
//!
//! The finder turns an [`Event`] (hits per layer plus doublets per level) into
//! track candidates with one hit per layer. It runs three data-parallel stages,
//! each finishing completely before the next starts:
//!
//! 1. **Bucketing**: for every level, group doublets by their outer point into
//!    fixed-capacity buckets.
//! 2. **Connection**: for every doublet on level L ≥ 1, test each doublet in
//!    the bucket of its inner point (level L − 1) for a plausible helix through
//!    the three hits, and record the compatible ones in a bounded adjacency list.
//! 3. **Growth**: seed three-layer chains on the outermost levels and extend
//!    them inwards one layer per step, ping-ponging between two chain buffers.
//!
//! All intermediate storage is allocated up front with fixed capacity. Entries
//! that do not fit are dropped and counted in [`OverflowCounts`].

pub mod arena;
pub mod buckets;
pub mod connect;
pub mod dispatch;
pub mod geometry;
pub mod grow;

use std::time::Instant;

use tracing::{debug, info, warn};

pub use dispatch::DispatchContext;

use crate::error::{FinderError, InputError};
use crate::Event;

use buckets::build_buckets;
use connect::{connect_doublets, ConnectInput};
use grow::TupletGrower;

// ── Configuration ───────────────────────────────────────────────────────────

/// Parameters fixed for a whole run.
#[derive(Debug, Clone)]
pub struct FinderConfig {
    /// Number of detector layers; every tuplet has this many hits. Must be ≥ 3.
    pub num_layers: usize,
    /// Capacity of each bucket and of each adjacency list. Default 64.
    pub max_bucket_size: usize,
    /// Upper bound on the chain buffers. `None` sizes them for the worst case,
    /// `doublets(last level) × max_bucket_size^(num_layers − 2)`.
    pub max_tuplet_count: Option<usize>,
    /// Largest single fixed-capacity structure (bucket arena, adjacency arena
    /// or chain buffer) a run may allocate, in bytes. Runs needing more fail
    /// with [`FinderError::InvalidConfig`] before allocating. Default 2 GiB.
    pub max_buffer_bytes: usize,
}

/// Largest accepted `max_bucket_size`.
pub const MAX_BUCKET_SIZE: usize = 1 << 16;

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            num_layers: 4,
            max_bucket_size: 64,
            max_tuplet_count: None,
            max_buffer_bytes: 2 << 30,
        }
    }
}

impl FinderConfig {
    pub fn validate(&self) -> Result<(), FinderError> {
        if self.num_layers < 3 {
            return Err(FinderError::InvalidConfig(format!(
                "num_layers must be at least 3, got {}",
                self.num_layers
            )));
        }
        if self.max_bucket_size == 0 || self.max_bucket_size > MAX_BUCKET_SIZE {
            return Err(FinderError::InvalidConfig(format!(
                "max_bucket_size must be in 1..={}, got {}",
                MAX_BUCKET_SIZE, self.max_bucket_size
            )));
        }
        if self.max_tuplet_count == Some(0) {
            return Err(FinderError::InvalidConfig(
                "max_tuplet_count must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Fail unless `elements` 32-bit entries of `what` fit in `max_buffer_bytes`.
    /// `None` stands for a count that overflowed.
    fn check_buffer(&self, what: &str, elements: Option<usize>) -> Result<(), FinderError> {
        match elements.and_then(|n| n.checked_mul(std::mem::size_of::<u32>())) {
            Some(bytes) if bytes <= self.max_buffer_bytes => Ok(()),
            bytes => Err(FinderError::InvalidConfig(format!(
                "{} needs {} bytes, over max_buffer_bytes = {}; lower max_bucket_size or set max_tuplet_count",
                what,
                bytes.map_or_else(|| "more than usize::MAX".to_string(), |b| b.to_string()),
                self.max_buffer_bytes
            ))),
        }
    }

    /// Chain-buffer capacity for an event whose last level has
    /// `last_level_doublets` doublets.
    pub fn tuplet_capacity(&self, last_level_doublets: usize) -> usize {
        let fan_out = (0..self.num_layers.saturating_sub(2))
            .fold(1usize, |acc, _| acc.saturating_mul(self.max_bucket_size));
        let worst_case = last_level_doublets.saturating_mul(fan_out);
        match self.max_tuplet_count {
            Some(max) => worst_case.min(max),
            None => worst_case,
        }
    }
}

// ── Results ─────────────────────────────────────────────────────────────────

/// Entries dropped because a fixed-capacity structure was full.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverflowCounts {
    /// Doublets that did not fit in their endpoint's bucket.
    pub bucket: u64,
    /// Compatible predecessors that did not fit in an adjacency list.
    pub adjacency: u64,
    /// Chains that did not fit in a chain generation.
    pub chains: u64,
}

impl OverflowCounts {
    pub fn total(&self) -> u64 {
        self.bucket + self.adjacency + self.chains
    }

    /// `true` if every candidate was kept, i.e. the result set is complete.
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Timings and sizes of a run.
#[derive(Debug, Clone, Default)]
pub struct FinderStats {
    pub bucket_time_ms: f32,
    pub connect_time_ms: f32,
    pub grow_time_ms: f32,
    pub total_time_ms: f32,
    /// Bucket entries per level.
    pub bucket_entries: Vec<usize>,
    /// Adjacency links per level, starting at level 1.
    pub connections: Vec<usize>,
    /// Chains after seeding.
    pub seeds: usize,
    /// Chains after each growth step.
    pub chains_per_step: Vec<usize>,
    /// Capacity of each chain generation.
    pub tuplet_capacity: usize,
}

/// Outcome of a run.
#[derive(Debug, Clone)]
pub struct FinderResult {
    /// Track candidates, one point id per layer in layer order, sorted
    /// lexicographically.
    pub tuplets: Vec<Vec<u32>>,
    pub stats: FinderStats,
    pub overflow: OverflowCounts,
}

// ── Entry point ─────────────────────────────────────────────────────────────

fn elapsed_ms(t: Instant) -> f32 {
    t.elapsed().as_secs_f32() * 1000.0
}

/// Find all n-tuplets of `event`.
///
/// The event must have `config.num_layers` layers. Work is spread according to
/// `ctx`; the returned tuplet set does not depend on the dispatch backend as
/// long as nothing overflowed.
pub fn find_tuplets(
    ctx: &DispatchContext,
    event: &Event,
    config: &FinderConfig,
) -> Result<FinderResult, FinderError> {
    config.validate()?;
    if event.num_layers() != config.num_layers {
        return Err(InputError::LayerCount {
            expected: config.num_layers,
            found: event.num_layers(),
        }
        .into());
    }
    event.validate()?;

    let t0 = Instant::now();
    let num_levels = event.num_levels();
    let mut stats = FinderStats::default();
    let mut overflow = OverflowCounts::default();

    // ── Stage 1: buckets ──
    let t = Instant::now();
    let buckets = (0..num_levels)
        .map(|level| {
            let num_outer_points = event.layers[level + 1].len();
            config.check_buffer(
                "bucket arena",
                num_outer_points.checked_mul(config.max_bucket_size),
            )?;
            build_buckets(
                ctx,
                &event.levels[level],
                num_outer_points,
                config.max_bucket_size,
            )
        })
        .collect::<Result<Vec<_>, _>>()?;
    stats.bucket_time_ms = elapsed_ms(t);
    stats.bucket_entries = buckets.iter().map(|b| b.total_entries()).collect();
    overflow.bucket = buckets.iter().map(|b| b.dropped()).sum();

    // ── Stage 2: connections ──
    let t = Instant::now();
    let adjacency = (1..num_levels)
        .map(|level| {
            config.check_buffer(
                "adjacency arena",
                event.levels[level].len().checked_mul(config.max_bucket_size),
            )?;
            let input = ConnectInput {
                below: &event.levels[level - 1],
                doublets: &event.levels[level],
                buckets: &buckets[level - 1],
                layers: [
                    &event.layers[level - 1],
                    &event.layers[level],
                    &event.layers[level + 1],
                ],
                cuts: &event.cuts,
            };
            connect_doublets(ctx, &input, config.max_bucket_size)
        })
        .collect::<Result<Vec<_>, _>>()?;
    stats.connect_time_ms = elapsed_ms(t);
    stats.connections = adjacency.iter().map(|a| a.total_entries()).collect();
    overflow.adjacency = adjacency.iter().map(|a| a.dropped()).sum();
    drop(buckets);

    // ── Stage 3: growth ──
    let t = Instant::now();
    let capacity = config.tuplet_capacity(event.levels[num_levels - 1].len());
    config.check_buffer("chain buffer", capacity.checked_mul(config.num_layers + 1))?;
    stats.tuplet_capacity = capacity;

    let mut grower = TupletGrower::new(&event.levels, &adjacency, capacity)?;
    stats.seeds = grower.seed(ctx);
    for step in 1..=grower.num_growth_steps() {
        let chains = grower.grow(ctx, step);
        stats.chains_per_step.push(chains);
    }
    overflow.chains = grower.dropped();
    let mut tuplets = grower.into_tuplets();
    tuplets.sort_unstable();
    stats.grow_time_ms = elapsed_ms(t);
    stats.total_time_ms = elapsed_ms(t0);

    debug!(
        "Stage times: buckets {:.2} ms, connect {:.2} ms, grow {:.2} ms",
        stats.bucket_time_ms, stats.connect_time_ms, stats.grow_time_ms
    );
    info!(
        "Found {} tuplets from {} doublets in {:.2} ms",
        tuplets.len(),
        event.num_doublets(),
        stats.total_time_ms
    );
    if !overflow.is_empty() {
        warn!(
            "Capacity overflow dropped candidates: {} bucket, {} adjacency, {} chain entries",
            overflow.bucket, overflow.adjacency, overflow.chains
        );
    }

    Ok(FinderResult {
        tuplets,
        stats,
        overflow,
    })
}
