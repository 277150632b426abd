//! Doublet connection: find, for every doublet, the level-below doublets it can
//! be chained to.
//!
//! For a level-`L` doublet starting at point `p`, the candidate predecessors are
//! the level-`L - 1` doublets in the bucket of `p`. A candidate is accepted when
//! the triplet (predecessor inner point, doublet inner point, doublet outer
//! point) passes [`is_compatible_triplet`]. Accepted predecessors go into the
//! doublet's bounded adjacency list.

use tracing::debug;

use super::arena::{BoundedLists, ListTable};
use super::buckets::Buckets;
use super::geometry::is_compatible_triplet;
use super::DispatchContext;
use crate::error::FinderError;
use crate::{Cuts, DoubletLevel, Layer};

/// Frozen adjacency lists of one level: for each doublet, the indices of
/// compatible doublets on the level below.
pub type Adjacency = ListTable;

/// Everything the connector reads for one level `L >= 1`.
pub struct ConnectInput<'a> {
    /// Doublets of level `L - 1`.
    pub below: &'a DoubletLevel,
    /// Doublets of level `L`.
    pub doublets: &'a DoubletLevel,
    /// Buckets of level `L - 1`, keyed by outer point (a point of layer `L`).
    pub buckets: &'a Buckets,
    /// Layers `L - 1`, `L` and `L + 1`.
    pub layers: [&'a Layer; 3],
    pub cuts: &'a Cuts,
}

/// Connect the doublets of one level to their predecessors. One unit of work
/// per doublet; each adjacency list keeps at most `max_connections` entries.
pub fn connect_doublets(
    ctx: &DispatchContext,
    input: &ConnectInput<'_>,
    max_connections: usize,
) -> Result<Adjacency, FinderError> {
    let lists = BoundedLists::new(input.doublets.len(), max_connections)?;
    let [inner_layer, middle_layer, outer_layer] = input.layers;

    ctx.parallel_for(input.doublets.len(), |i| {
        let d = input.doublets.get(i);
        let p2 = middle_layer.point(d.inner);
        let p3 = outer_layer.point(d.outer);
        for &pred in input.buckets.get(d.inner as usize) {
            let p1 = inner_layer.point(input.below.inner(pred as usize));
            if is_compatible_triplet(&p1, &p2, &p3, input.cuts) {
                lists.push(i, pred);
            }
        }
    });

    let adjacency = lists.freeze();
    debug!(
        "Connected {} doublets with {} links ({} dropped)",
        input.doublets.len(),
        adjacency.total_entries(),
        adjacency.dropped()
    );
    Ok(adjacency)
}
