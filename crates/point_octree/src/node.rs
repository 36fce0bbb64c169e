//! Arena node - one cell of the point octree.
//!
//! Nodes live in a `Vec` owned by the tree and refer to their children by
//! [`NodeId`]. A node is either a leaf holding point indices or a branch
//! holding exactly eight children; the enum makes any mixed state
//! unrepresentable.

use glam::DVec3;
use smallvec::SmallVec;

use crate::bounds::DAabb3;

/// Index of a node inside the tree's arena.
pub type NodeId = u32;

/// Point indices stored directly in a leaf.
pub type LeafEntries = SmallVec<[u32; 16]>;

/// Leaf or branch payload of a node.
#[derive(Clone, Debug)]
pub enum NodeKind {
  /// Stores point indices (into the tree's position table).
  Leaf(LeafEntries),
  /// Eight children, ordered by octant.
  Branch([NodeId; 8]),
}

/// Octree node.
///
/// `split` is the point the eight children meet at. For leaves it is only
/// meaningful once the leaf is split; it is kept separately from
/// `bounds.center()` so that a grown root can place its old root exactly on
/// an octant boundary.
///
/// `level` counts halvings from the first root: that root is level 0, its
/// children level 1, and every root grown above it one level lower. A
/// node's level never changes, so the depth limit stays tied to cell size
/// however often the root grows.
#[derive(Clone, Debug)]
pub struct Node {
  /// Region covered by this node (inclusive on every face).
  pub bounds: DAabb3,
  /// Meeting point of the children.
  pub split: DVec3,
  /// Subdivision level relative to the first root (negative above it).
  pub level: i32,
  /// Leaf entries or child ids.
  pub kind: NodeKind,
}

impl Node {
  /// Create an empty leaf covering `bounds` at `level`.
  pub fn leaf(bounds: DAabb3, level: i32) -> Self {
    Self {
      bounds,
      split: bounds.center(),
      level,
      kind: NodeKind::Leaf(LeafEntries::new()),
    }
  }

  /// Check if this node stores points directly.
  #[inline]
  pub fn is_leaf(&self) -> bool {
    matches!(self.kind, NodeKind::Leaf(_))
  }
}

/// Octant containing `point` relative to `split`.
///
/// Octant: 0-7 where bits represent +X, +Y, +Z offsets:
/// - bit 0: X offset (0 or 1)
/// - bit 1: Y offset (0 or 1)
/// - bit 2: Z offset (0 or 1)
///
/// A coordinate equal to the split value falls in the upper half.
#[inline]
pub fn octant_of(split: DVec3, point: DVec3) -> usize {
  (point.x >= split.x) as usize
    | ((point.y >= split.y) as usize) << 1
    | ((point.z >= split.z) as usize) << 2
}

/// Bounds of child `octant` of a node covering `bounds` and split at `split`.
///
/// Children share faces with the parent and with each other exactly, so the
/// eight child regions tile the parent without gaps.
#[inline]
pub fn child_bounds(bounds: &DAabb3, split: DVec3, octant: usize) -> DAabb3 {
  let pick = |bit: usize, lo: f64, mid: f64, hi: f64| {
    if octant & bit == 0 {
      (lo, mid)
    } else {
      (mid, hi)
    }
  };
  let (min_x, max_x) = pick(1, bounds.min.x, split.x, bounds.max.x);
  let (min_y, max_y) = pick(2, bounds.min.y, split.y, bounds.max.y);
  let (min_z, max_z) = pick(4, bounds.min.z, split.z, bounds.max.z);
  DAabb3 {
    min: DVec3::new(min_x, min_y, min_z),
    max: DVec3::new(max_x, max_y, max_z),
  }
}

/// One root-doubling step toward a point outside the current root.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RootGrowth {
  /// Bounds of the new root (twice the size on every axis).
  pub bounds: DAabb3,
  /// Split point of the new root; a corner of the old root.
  pub split: DVec3,
  /// Octant of the new root the old root occupies.
  pub old_root_octant: usize,
}

/// Double `bounds` toward `point`.
///
/// On each axis the box grows toward the negative side if the point lies
/// below it, otherwise toward the positive side. The old box becomes one
/// octant of the result.
pub fn grow_toward(bounds: &DAabb3, point: DVec3) -> RootGrowth {
  let size = bounds.size();
  let mut min = bounds.min;
  let mut max = bounds.max;
  let mut split = bounds.max;
  let mut old_root_octant = 0;

  for axis in 0..3 {
    if point[axis] < bounds.min[axis] {
      min[axis] = bounds.min[axis] - size[axis];
      split[axis] = bounds.min[axis];
      old_root_octant |= 1 << axis;
    } else {
      max[axis] = bounds.max[axis] + size[axis];
    }
  }

  RootGrowth {
    bounds: DAabb3 { min, max },
    split,
    old_root_octant,
  }
}

#[cfg(test)]
#[path = "node_test.rs"]
mod node_test;
