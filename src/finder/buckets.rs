//! Bucket building: group each level's doublets by their outer point.
//!
//! The bucket of point `p` on layer `L + 1` lists the level-`L` doublets that
//! end at `p`. The connector uses it to find every possible predecessor of a
//! level-`L + 1` doublet starting at `p`.

use tracing::debug;

use super::arena::{BoundedLists, ListTable};
use super::DispatchContext;
use crate::error::FinderError;
use crate::DoubletLevel;

/// Frozen buckets of one level, keyed by outer point id.
pub type Buckets = ListTable;

/// Build the buckets of one level. One unit of work per doublet.
///
/// `num_outer_points` is the number of points on the outer layer of the level.
/// Each bucket keeps at most `max_bucket_size` doublets; the rest are dropped
/// and reported through [`ListTable::dropped`].
pub fn build_buckets(
    ctx: &DispatchContext,
    doublets: &DoubletLevel,
    num_outer_points: usize,
    max_bucket_size: usize,
) -> Result<Buckets, FinderError> {
    let lists = BoundedLists::new(num_outer_points, max_bucket_size)?;
    let outer = doublets.outer_ids();
    ctx.parallel_for(outer.len(), |i| {
        lists.push(outer[i] as usize, i as u32);
    });
    let buckets = lists.freeze();
    debug!(
        "Bucketed {} doublets over {} points ({} dropped)",
        buckets.total_entries(),
        num_outer_points,
        buckets.dropped()
    );
    Ok(buckets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buckets_group_by_outer_point() {
        let ctx = DispatchContext::sequential();
        let level = DoubletLevel::from_pairs(&[(0, 2), (1, 0), (2, 2), (3, 1), (4, 2)]);
        let buckets = build_buckets(&ctx, &level, 4, 8).unwrap();
        assert_eq!(buckets.get(0), &[1]);
        assert_eq!(buckets.get(1), &[3]);
        assert_eq!(buckets.get(2), &[0, 2, 4]);
        assert!(buckets.get(3).is_empty());
        assert_eq!(buckets.dropped(), 0);
    }

    #[test]
    fn overflowing_bucket_keeps_insertion_order_prefix() {
        let ctx = DispatchContext::sequential();
        // Ten doublets end at point 1, one at point 0 and one at point 2.
        let mut pairs = vec![(0u32, 0u32)];
        pairs.extend((0..10).map(|i| (i, 1)));
        pairs.push((0, 2));
        let level = DoubletLevel::from_pairs(&pairs);

        let buckets = build_buckets(&ctx, &level, 3, 4).unwrap();
        assert_eq!(buckets.get(1), &[1, 2, 3, 4]);
        assert_eq!(buckets.get(0), &[0]);
        assert_eq!(buckets.get(2), &[11]);
        assert_eq!(buckets.dropped(), 6);
    }
}
