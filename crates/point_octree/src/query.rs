//! Radius- and count-bounded nearest-neighbor queries.
//!
//! Traversal is iterative: a work stack of `(node, min_dist_sq)` pairs,
//! children pushed far-to-near so the nearest octant is expanded first and
//! tightens the candidate heap early. A node is expanded only if its
//! closest point is within the radius and could still beat the worst
//! candidate of a full heap.
//!
//! # Usage
//!
//! ```ignore
//! let mut scratch = QueryScratch::new();
//! let mut out = Vec::new();
//! for probe in probes {
//!     tree.nearest_neighbors_into(probe, 0.5, 8, &mut scratch, &mut out);
//!     // out is sorted by distance, ties by index
//! }
//! ```

use glam::DVec3;
use rayon::prelude::*;

use crate::candidates::{Candidate, CandidateHeap};
use crate::node::{octant_of, NodeId, NodeKind};
use crate::octree::{PointIndex, PointOctree};

/// One query result.
#[derive(Debug, PartialEq)]
pub struct Neighbor<'a, T> {
  /// Index assigned when the point was inserted.
  pub index: PointIndex,
  /// Euclidean distance to the query point.
  pub distance: f64,
  /// Payload stored with the point.
  pub payload: &'a T,
}

impl<T> Clone for Neighbor<'_, T> {
  fn clone(&self) -> Self {
    *self
  }
}

impl<T> Copy for Neighbor<'_, T> {}

/// Reusable per-thread query buffers.
///
/// Passing the same scratch to every query keeps the hot path free of
/// allocations once the buffers have grown to the largest query.
#[derive(Debug, Default)]
pub struct QueryScratch {
  heap: CandidateHeap,
  stack: Vec<(NodeId, f64)>,
  sorted: Vec<Candidate>,
}

impl QueryScratch {
  /// Create empty scratch buffers.
  pub fn new() -> Self {
    Self::default()
  }
}

impl<T> PointOctree<T> {
  /// Up to `max_count` stored points within `max_distance` of `query`,
  /// nearest first.
  ///
  /// Ties are ordered by ascending index. Points exactly `max_distance`
  /// away are included. A negative or NaN `max_distance`, a non-finite
  /// query point, or `max_count == 0` gives an empty result.
  pub fn nearest_neighbors(
    &self,
    query: impl Into<DVec3>,
    max_distance: f64,
    max_count: usize,
  ) -> Vec<Neighbor<'_, T>> {
    let mut scratch = QueryScratch::new();
    let mut out = Vec::new();
    self.nearest_neighbors_into(query, max_distance, max_count, &mut scratch, &mut out);
    out
  }

  /// Same as [`nearest_neighbors`](Self::nearest_neighbors), writing into
  /// `out` (cleared first) and reusing `scratch`.
  pub fn nearest_neighbors_into<'a>(
    &'a self,
    query: impl Into<DVec3>,
    max_distance: f64,
    max_count: usize,
    scratch: &mut QueryScratch,
    out: &mut Vec<Neighbor<'a, T>>,
  ) {
    out.clear();
    let query = query.into();

    // `!(x >= 0.0)` also catches NaN.
    if max_count == 0 || !(max_distance >= 0.0) || !query.is_finite() {
      return;
    }
    let Some(root) = self.root_id() else {
      return;
    };

    let max_dist_sq = max_distance * max_distance;
    self.collect_candidates(root, query, max_dist_sq, max_count.min(self.len()), scratch);

    scratch.heap.drain_sorted_into(&mut scratch.sorted);
    let payloads = self.payloads();
    out.extend(scratch.sorted.iter().map(|candidate| {
      let index = candidate.index as usize;
      Neighbor {
        index,
        distance: candidate.dist_sq.sqrt(),
        payload: &payloads[index],
      }
    }));
  }

  /// Closest stored point, if any.
  pub fn nearest(&self, query: impl Into<DVec3>) -> Option<Neighbor<'_, T>> {
    self.nearest_neighbors(query, f64::INFINITY, 1).into_iter().next()
  }

  /// Every stored point within `radius` of `query`, nearest first.
  pub fn within_radius(&self, query: impl Into<DVec3>, radius: f64) -> Vec<Neighbor<'_, T>> {
    self.nearest_neighbors(query, radius, usize::MAX)
  }

  /// Run one query per entry of `queries` in parallel.
  ///
  /// Results are in the same order as `queries`. Each rayon worker keeps
  /// its own [`QueryScratch`].
  #[cfg_attr(
    feature = "tracing",
    tracing::instrument(skip_all, name = "octree::par_nearest_neighbors")
  )]
  pub fn par_nearest_neighbors(
    &self,
    queries: &[DVec3],
    max_distance: f64,
    max_count: usize,
  ) -> Vec<Vec<Neighbor<'_, T>>>
  where
    T: Sync,
  {
    queries
      .par_iter()
      .map_init(QueryScratch::new, |scratch, &query| {
        let mut out = Vec::new();
        self.nearest_neighbors_into(query, max_distance, max_count, scratch, &mut out);
        out
      })
      .collect()
  }

  /// Branch-and-bound traversal filling `scratch.heap` with the best
  /// `capacity` candidates within `max_dist_sq`.
  fn collect_candidates(
    &self,
    root: NodeId,
    query: DVec3,
    max_dist_sq: f64,
    capacity: usize,
    scratch: &mut QueryScratch,
  ) {
    let QueryScratch { heap, stack, .. } = scratch;
    heap.reset(capacity);
    stack.clear();

    let positions = self.positions();
    let root_dist_sq = self.node(root).bounds.distance_squared_to_point(query);
    if root_dist_sq <= max_dist_sq {
      stack.push((root, root_dist_sq));
    }

    while let Some((id, min_dist_sq)) = stack.pop() {
      // The heap may have tightened since this node was pushed.
      if !heap.admits(min_dist_sq) {
        continue;
      }

      let node = self.node(id);
      match &node.kind {
        NodeKind::Leaf(entries) => {
          for &entry in entries {
            let dist_sq = positions[entry as usize].distance_squared(query);
            if dist_sq <= max_dist_sq {
              heap.offer(Candidate {
                dist_sq,
                index: entry,
              });
            }
          }
        }
        NodeKind::Branch(children) => {
          let near = octant_of(node.split, query);
          // XOR mask 7 is the diagonally opposite octant, 0 the nearest;
          // pushing high masks first leaves the nearest on top.
          for mask in (0..8).rev() {
            let child = children[near ^ mask];
            let child_dist_sq = self.node(child).bounds.distance_squared_to_point(query);
            if child_dist_sq <= max_dist_sq && heap.admits(child_dist_sq) {
              stack.push((child, child_dist_sq));
            }
          }
        }
      }
    }
  }
}

#[cfg(test)]
#[path = "query_test.rs"]
mod query_test;
