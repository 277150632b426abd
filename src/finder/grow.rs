//! Tuplet growth: turn connected doublets into full-depth chains.
//!
//! Chains are grown from the outermost layer inwards. Seeding emits one chain
//! per connected doublet pair on the two outermost levels, covering the last
//! three layers. Every growth step then prepends one point, following the
//! adjacency list of the chain's innermost ("anchor") doublet. After
//! `num_layers - 3` steps all surviving chains cover every layer.
//!
//! Chains live in two [`ChainBuffer`]s: the `current` generation is read while
//! the `next` one is written, then the two swap roles.

use std::sync::atomic::{AtomicU32, AtomicU64, AtomicUsize, Ordering};

use tracing::debug;

use super::arena::atomic_slots;
use super::connect::Adjacency;
use super::DispatchContext;
use crate::error::FinderError;
use crate::DoubletLevel;

/// Marker for layers a chain has not reached yet.
const UNSET: u32 = u32::MAX;

/// Flat, fixed-capacity store of chain records.
///
/// A record is `1 + num_layers` ids: the anchor doublet index followed by one
/// point id per layer. Writers reserve a record with a bounded atomic
/// increment of the live count and then fill it in.
pub struct ChainBuffer {
    stride: usize,
    capacity: usize,
    len: AtomicUsize,
    records: Vec<AtomicU32>,
    dropped: AtomicU64,
}

impl ChainBuffer {
    pub fn new(num_layers: usize, capacity: usize) -> Result<Self, FinderError> {
        let stride = num_layers + 1;
        Ok(Self {
            stride,
            capacity,
            len: AtomicUsize::new(0),
            records: atomic_slots("chain buffer", capacity.checked_mul(stride), UNSET)?,
            dropped: AtomicU64::new(0),
        })
    }

    /// Number of live chains.
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Chains rejected because the buffer was full, over the buffer's lifetime.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Append a record (`anchor` followed by the per-layer point ids).
    /// Returns `false` and counts the drop if the buffer is full.
    pub fn push(&self, record: &[u32]) -> bool {
        debug_assert_eq!(record.len(), self.stride);
        let capacity = self.capacity;
        let reserved = self.len.fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
            if n < capacity {
                Some(n + 1)
            } else {
                None
            }
        });
        match reserved {
            Ok(slot) => {
                let start = slot * self.stride;
                for (dst, &v) in self.records[start..start + self.stride].iter().zip(record) {
                    dst.store(v, Ordering::Relaxed);
                }
                true
            }
            Err(_) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    /// Copy record `i` into `out`.
    pub fn load_into(&self, i: usize, out: &mut [u32]) {
        let start = i * self.stride;
        for (dst, src) in out.iter_mut().zip(&self.records[start..start + self.stride]) {
            *dst = src.load(Ordering::Relaxed);
        }
    }

    /// Point ids of every live chain, in layer order.
    pub fn chains(&self) -> Vec<Vec<u32>> {
        let mut record = vec![UNSET; self.stride];
        (0..self.len())
            .map(|i| {
                self.load_into(i, &mut record);
                record[1..].to_vec()
            })
            .collect()
    }

    /// Forget all live chains so the buffer can be refilled.
    pub fn reset(&mut self) {
        *self.len.get_mut() = 0;
    }
}

/// The two chain generations of the level-synchronous traversal.
pub struct Generations {
    /// Chains produced by the previous step, read by the next one.
    pub current: ChainBuffer,
    /// Chains being produced by the running step.
    pub next: ChainBuffer,
}

impl Generations {
    pub fn new(num_layers: usize, capacity: usize) -> Result<Self, FinderError> {
        Ok(Self {
            current: ChainBuffer::new(num_layers, capacity)?,
            next: ChainBuffer::new(num_layers, capacity)?,
        })
    }

    /// Make the freshly written generation current and empty the other one.
    pub fn swap_generations(&mut self) {
        std::mem::swap(&mut self.current, &mut self.next);
        self.next.reset();
    }

    /// Total chains dropped by either buffer.
    pub fn dropped(&self) -> u64 {
        self.current.dropped() + self.next.dropped()
    }
}

/// Grows chains over a fully connected event.
pub struct TupletGrower<'a> {
    levels: &'a [DoubletLevel],
    /// `adjacency[l - 1]` holds the adjacency lists of level `l`.
    adjacency: &'a [Adjacency],
    generations: Generations,
}

impl<'a> TupletGrower<'a> {
    /// `levels` must hold at least two levels and `adjacency` one entry per
    /// level from 1 upwards.
    pub fn new(
        levels: &'a [DoubletLevel],
        adjacency: &'a [Adjacency],
        capacity: usize,
    ) -> Result<Self, FinderError> {
        debug_assert!(levels.len() >= 2);
        debug_assert_eq!(adjacency.len(), levels.len() - 1);
        Ok(Self {
            levels,
            adjacency,
            generations: Generations::new(levels.len() + 1, capacity)?,
        })
    }

    fn num_layers(&self) -> usize {
        self.levels.len() + 1
    }

    fn adjacency_of(&self, level: usize) -> &'a Adjacency {
        &self.adjacency[level - 1]
    }

    /// Number of growth steps needed after seeding.
    pub fn num_growth_steps(&self) -> usize {
        self.num_layers() - 3
    }

    /// Fill the current generation with three-layer chains built from connected
    /// doublet pairs on the two outermost levels. Returns the number of seeds.
    pub fn seed(&mut self, ctx: &DispatchContext) -> usize {
        let num_layers = self.num_layers();
        let last = self.levels.len() - 1;
        let outer_level = &self.levels[last];
        let inner_level = &self.levels[last - 1];
        let adjacency = self.adjacency_of(last);
        let current = &self.generations.current;

        ctx.parallel_for(outer_level.len(), |i| {
            let preds = adjacency.get(i);
            if preds.is_empty() {
                return;
            }
            let mut record = vec![UNSET; num_layers + 1];
            record[num_layers] = outer_level.outer(i);
            record[num_layers - 1] = outer_level.inner(i);
            for &pred in preds {
                record[0] = pred;
                record[num_layers - 2] = inner_level.inner(pred as usize);
                current.push(&record);
            }
        });

        let seeds = current.len();
        debug!("Seeded {} chains ({} dropped)", seeds, current.dropped());
        seeds
    }

    /// Run growth step `step` (1-based): extend every current chain by one
    /// layer inwards into the next generation, then swap generations.
    /// Returns the number of chains in the new current generation.
    pub fn grow(&mut self, ctx: &DispatchContext, step: usize) -> usize {
        let num_layers = self.num_layers();
        let anchor_level = num_layers - 2 - step;
        let below = &self.levels[anchor_level - 1];
        let adjacency = self.adjacency_of(anchor_level);
        let Generations { current, next } = &self.generations;

        ctx.parallel_for(current.len(), |i| {
            let mut record = vec![UNSET; num_layers + 1];
            current.load_into(i, &mut record);
            let anchor = record[0] as usize;
            for &pred in adjacency.get(anchor) {
                record[0] = pred;
                // Layer `anchor_level - 1` sits at record index `anchor_level`.
                record[anchor_level] = below.inner(pred as usize);
                next.push(&record);
            }
        });

        self.generations.swap_generations();
        let chains = self.generations.current.len();
        debug!(
            "Growth step {}: {} chains ({} dropped so far)",
            step,
            chains,
            self.generations.dropped()
        );
        chains
    }

    /// Chains dropped because a generation was full.
    pub fn dropped(&self) -> u64 {
        self.generations.dropped()
    }

    /// Copy out the chains of the current generation.
    pub fn into_tuplets(self) -> Vec<Vec<u32>> {
        self.generations.current.chains()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finder::arena::BoundedLists;

    fn adjacency(lists: &[&[u32]]) -> Adjacency {
        let arena = BoundedLists::new(lists.len(), 8).unwrap();
        for (key, values) in lists.iter().enumerate() {
            for &v in values.iter() {
                arena.push(key, v);
            }
        }
        arena.freeze()
    }

    #[test]
    fn chain_buffer_is_bounded() {
        let buffer = ChainBuffer::new(3, 2).unwrap();
        assert!(buffer.push(&[0, 1, 2, 3]));
        assert!(buffer.push(&[1, 4, 5, 6]));
        assert!(!buffer.push(&[2, 7, 8, 9]));
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.dropped(), 1);
        assert_eq!(buffer.chains(), vec![vec![1, 2, 3], vec![4, 5, 6]]);
    }

    #[test]
    fn swap_resets_next_generation() {
        let mut generations = Generations::new(3, 4).unwrap();
        generations.next.push(&[0, 1, 2, 3]);
        generations.current.push(&[9, 9, 9, 9]);
        generations.swap_generations();
        assert_eq!(generations.current.chains(), vec![vec![1, 2, 3]]);
        assert!(generations.next.is_empty());
    }

    #[test]
    fn grows_fan_out_into_full_chains() {
        // 4 layers. Level-2 doublet 0 links to level-1 doublets 0 and 1;
        // level-1 doublet 1 links to level-0 doublets 1 and 2.
        let levels = vec![
            DoubletLevel::from_pairs(&[(10, 20), (11, 21), (10, 21)]),
            DoubletLevel::from_pairs(&[(20, 30), (21, 30)]),
            DoubletLevel::from_pairs(&[(30, 40)]),
        ];
        let adjacency = vec![adjacency(&[&[0], &[1, 2]]), adjacency(&[&[0, 1]])];
        let ctx = DispatchContext::sequential();
        let mut grower = TupletGrower::new(&levels, &adjacency, 16).unwrap();
        assert_eq!(grower.seed(&ctx), 2);
        assert_eq!(grower.num_growth_steps(), 1);
        assert_eq!(grower.grow(&ctx, 1), 3);

        let mut tuplets = grower.into_tuplets();
        tuplets.sort();
        assert_eq!(
            tuplets,
            vec![vec![10, 20, 30, 40], vec![10, 21, 30, 40], vec![11, 21, 30, 40]]
        );
    }

    #[test]
    fn full_generation_drops_excess_chains() {
        let levels = vec![
            DoubletLevel::from_pairs(&[(10, 20), (11, 21), (10, 21)]),
            DoubletLevel::from_pairs(&[(20, 30), (21, 30)]),
            DoubletLevel::from_pairs(&[(30, 40)]),
        ];
        let adjacency = vec![adjacency(&[&[0], &[1, 2]]), adjacency(&[&[0, 1]])];
        let ctx = DispatchContext::sequential();
        let mut grower = TupletGrower::new(&levels, &adjacency, 2).unwrap();
        grower.seed(&ctx);
        assert_eq!(grower.grow(&ctx, 1), 2);
        assert_eq!(grower.dropped(), 1);
    }
}
