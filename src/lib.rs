//! # tuplets
//!
//! A parallel **n-tuplet finder** for particle-track pattern recognition.
//!
//! Given the hits recorded on a sequence of detector layers and the "doublets"
//! (candidate segments) linking hits on adjacent layers, `tuplets` finds every
//! chain of doublets that crosses all layers along a physically plausible
//! helix. Each such chain, one hit per layer, is a track candidate.
//!
//! ## Example
//!
//! ```no_run
//! use tuplets::{find_tuplets, DispatchContext, FinderConfig};
//!
//! let event = tuplets::io::load_event_from_file("log.in", 4).unwrap();
//! let ctx = DispatchContext::new(None).unwrap();
//! let result = find_tuplets(&ctx, &event, &FinderConfig::default()).unwrap();
//!
//! println!("{} tuplets in {:.1} ms", result.tuplets.len(), result.stats.total_time_ms);
//! if !result.overflow.is_empty() {
//!     println!("capacity overflow: {:?}", result.overflow);
//! }
//! tuplets::io::save_tuplets_to_file("log.out", &result.tuplets).unwrap();
//! ```
//!
//! ## Algorithm overview
//!
//! 1. **Bucketing**: doublets of each level are grouped by outer hit into
//!    fixed-capacity buckets, with lock-free bounded appends.
//! 2. **Connection**: every doublet is tested against the doublets ending at
//!    its inner hit. Three hits are compatible when they align in r-z, turn by
//!    a bounded angle, curve no more than a track of `pt_min` would, and point
//!    back to the luminous region.
//! 3. **Growth**: three-layer seeds are extended inwards one layer per step,
//!    alternating between two fixed-size chain buffers.
//!
//! Every stage runs one unit of work per doublet or chain on a
//! [`DispatchContext`]. Capacities are fixed before the run; anything that does
//! not fit is dropped and reported in [`OverflowCounts`].

mod cuts;
mod doublet;
pub mod error;
mod event;
pub mod finder;
pub mod io;
mod point;

pub use cuts::*;
pub use doublet::*;
pub use error::{FinderError, InputError};
pub use event::*;
pub use finder::{
    find_tuplets, DispatchContext, FinderConfig, FinderResult, FinderStats, OverflowCounts,
};
pub use point::*;

// Commonly used types
pub type Vector3 = nalgebra::Vector3<f32>;
