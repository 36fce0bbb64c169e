//! Structural statistics for a built tree.

use crate::node::NodeKind;
use crate::octree::PointOctree;

/// Shape of the tree at one point in time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OctreeStats {
  /// Nodes in the arena.
  pub node_count: usize,
  /// Nodes storing points directly.
  pub leaf_count: usize,
  /// Nodes with eight children.
  pub internal_count: usize,
  /// Depth of the deepest node (root = 0).
  pub max_depth: u32,
  /// Largest number of points in a single leaf.
  pub max_leaf_len: usize,
  /// Leaves holding more than `leaf_capacity` points.
  ///
  /// Only leaves at the configured depth limit end up here. The limit is
  /// measured from the first root, so after root growth such leaves report
  /// a larger [`max_depth`](Self::max_depth) than the configured one.
  pub overfull_leaves: usize,
}

impl OctreeStats {
  /// Fraction of nodes that are leaves.
  #[inline]
  pub fn leaf_ratio(&self) -> f64 {
    if self.node_count == 0 {
      0.0
    } else {
      self.leaf_count as f64 / self.node_count as f64
    }
  }
}

impl<T> PointOctree<T> {
  /// Walk the tree and collect [`OctreeStats`].
  pub fn stats(&self) -> OctreeStats {
    let mut stats = OctreeStats {
      node_count: self.node_count(),
      ..Default::default()
    };
    let Some(root) = self.root_id() else {
      return stats;
    };
    let capacity = self.config().leaf_capacity;

    let mut stack = vec![(root, 0u32)];
    while let Some((id, depth)) = stack.pop() {
      stats.max_depth = stats.max_depth.max(depth);
      match &self.node(id).kind {
        NodeKind::Leaf(entries) => {
          stats.leaf_count += 1;
          stats.max_leaf_len = stats.max_leaf_len.max(entries.len());
          if entries.len() > capacity {
            stats.overfull_leaves += 1;
          }
        }
        NodeKind::Branch(children) => {
          stats.internal_count += 1;
          stack.extend(children.iter().map(|&child| (child, depth + 1)));
        }
      }
    }

    stats
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::OctreeConfig;

  #[test]
  fn test_empty_tree_stats() {
    let tree: PointOctree<()> = PointOctree::new();
    assert_eq!(tree.stats(), OctreeStats::default());
    assert_eq!(tree.stats().leaf_ratio(), 0.0);
  }

  #[test]
  fn test_single_leaf_root() {
    let mut tree = PointOctree::new();
    tree.add_point((0.0, 0.0, 0.0), ()).unwrap();

    let stats = tree.stats();
    assert_eq!(stats.node_count, 1);
    assert_eq!(stats.leaf_count, 1);
    assert_eq!(stats.internal_count, 0);
    assert_eq!(stats.max_depth, 0);
    assert_eq!(stats.max_leaf_len, 1);
    assert_eq!(stats.leaf_ratio(), 1.0);
  }

  /// Every node is either a leaf or a branch, and branches have 8 children.
  #[test]
  fn test_counts_add_up() {
    let config = OctreeConfig {
      leaf_capacity: 2,
      ..Default::default()
    };
    let mut tree = PointOctree::with_config(config);
    for i in 0..50 {
      let t = i as f64 * 0.37;
      tree.add_point((t.sin(), t.cos(), t * 0.1), i).unwrap();
    }

    let stats = tree.stats();
    assert_eq!(stats.leaf_count + stats.internal_count, stats.node_count);
    assert_eq!(stats.leaf_count, stats.internal_count * 7 + 1);
    assert!(stats.max_depth > 0);
    assert!(stats.max_leaf_len <= 2);
    assert_eq!(stats.overfull_leaves, 0);
  }
}
