//! Test utilities: seeded point clouds, a brute-force reference search and
//! a structural checker.

use glam::DVec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::node::NodeKind;
use crate::octree::{PointIndex, PointOctree};

// =============================================================================
// Fixtures
// =============================================================================

/// `count` points uniformly distributed in the cube `[-extent, extent]³`.
pub fn random_points(seed: u64, count: usize, extent: f64) -> Vec<DVec3> {
  let mut rng = StdRng::seed_from_u64(seed);
  (0..count)
    .map(|_| {
      DVec3::new(
        rng.random_range(-extent..=extent),
        rng.random_range(-extent..=extent),
        rng.random_range(-extent..=extent),
      )
    })
    .collect()
}

/// Points snapped to a grid of `step`, so many share exact distances.
pub fn lattice_points(seed: u64, count: usize, cells: i32, step: f64) -> Vec<DVec3> {
  let mut rng = StdRng::seed_from_u64(seed);
  (0..count)
    .map(|_| {
      DVec3::new(
        rng.random_range(-cells..=cells) as f64 * step,
        rng.random_range(-cells..=cells) as f64 * step,
        rng.random_range(-cells..=cells) as f64 * step,
      )
    })
    .collect()
}

/// Build a tree whose payload is the insertion order.
pub fn build_tree(points: &[DVec3]) -> PointOctree<usize> {
  let mut tree = PointOctree::new();
  for (i, &p) in points.iter().enumerate() {
    let index = tree.add_point(p, i).expect("fixture points are finite");
    assert_eq!(index, i);
  }
  tree
}

// =============================================================================
// Reference search
// =============================================================================

/// O(N) scan: points with squared distance <= `max_distance²`, sorted by
/// `(dist_sq, index)`, truncated to `max_count`.
pub fn brute_force(
  points: &[DVec3],
  query: DVec3,
  max_distance: f64,
  max_count: usize,
) -> Vec<(PointIndex, f64)> {
  let max_dist_sq = max_distance * max_distance;
  let mut hits: Vec<(f64, PointIndex)> = points
    .iter()
    .enumerate()
    .map(|(i, p)| (p.distance_squared(query), i))
    .filter(|(d, _)| *d <= max_dist_sq)
    .collect();
  hits.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
  hits.truncate(max_count);
  hits.into_iter().map(|(d, i)| (i, d.sqrt())).collect()
}

// =============================================================================
// Structural checks
// =============================================================================

/// Assert the tree's structural invariants:
/// - every index `0..len` is stored in exactly one leaf
/// - every stored point lies inside the bounds of its leaf
/// - children lie inside their parent
/// - levels increase by one from parent to child
/// - leaves over capacity only occur at or below the depth limit
pub fn assert_invariants<T>(tree: &PointOctree<T>) {
  let Some(root) = tree.root_id() else {
    assert!(tree.is_empty(), "non-empty tree without root");
    return;
  };
  let capacity = tree.config().leaf_capacity;
  let max_level = tree.config().max_depth as i32;
  let mut seen = vec![0u32; tree.len()];

  let mut stack = vec![root];
  while let Some(id) = stack.pop() {
    let node = tree.node(id);
    match &node.kind {
      NodeKind::Leaf(entries) => {
        if entries.len() > capacity {
          assert!(
            node.level >= max_level,
            "leaf at level {} holds {} > {} points",
            node.level,
            entries.len(),
            capacity
          );
        }
        for &entry in entries {
          let p = tree.positions()[entry as usize];
          assert!(
            node.bounds.contains_point(p),
            "point {} at {} outside leaf {:?}",
            entry,
            p,
            node.bounds
          );
          seen[entry as usize] += 1;
        }
      }
      NodeKind::Branch(children) => {
        for &child in children {
          let child_node = tree.node(child);
          assert!(node.bounds.contains_point(child_node.bounds.min));
          assert!(node.bounds.contains_point(child_node.bounds.max));
          assert_eq!(child_node.level, node.level + 1);
          stack.push(child);
        }
      }
    }
  }

  for (index, count) in seen.iter().enumerate() {
    assert_eq!(*count, 1, "point {} stored {} times", index, count);
  }
}
