//! PointOctree - incrementally built octree over 3D points with payloads.
//!
//! # Layout
//!
//! - `nodes`: arena of [`Node`]s; children are referenced by [`NodeId`].
//! - `positions` / `payloads`: per-point tables indexed by [`PointIndex`].
//!   Leaves store indices into these tables, never the data itself.
//!
//! # Growth
//!
//! The root is created around the first point. A point outside the root
//! doubles the root toward it (repeatedly if needed); the old root becomes
//! one octant of the new one. Leaves split into eight children when an
//! insert would push them past `leaf_capacity`, unless they already sit at
//! level `max_depth`. Levels count from the first root, so growing the root
//! does not move existing cells closer to the limit.

use glam::DVec3;

use crate::bounds::DAabb3;
use crate::config::OctreeConfig;
use crate::error::InsertError;
use crate::node::{child_bounds, grow_toward, octant_of, LeafEntries, Node, NodeId, NodeKind};

/// Lower bound on the first root's half extent relative to the magnitude of
/// the first point. Narrower roots collapse to zero width far from the origin.
const MIN_RELATIVE_HALF_EXTENT: f64 = 1024.0 * f64::EPSILON;

/// Sequential identifier assigned to each inserted point (0-based).
pub type PointIndex = usize;

/// Octree point index.
///
/// Payloads are owned by the tree as values of type `T`; the tree never
/// inspects them. To keep ownership with the caller, store a reference,
/// an id, or an `Arc` as `T`.
#[derive(Clone, Debug)]
pub struct PointOctree<T> {
  config: OctreeConfig,
  root: Option<NodeId>,
  nodes: Vec<Node>,
  positions: Vec<DVec3>,
  payloads: Vec<T>,
}

impl<T> PointOctree<T> {
  /// Create an empty tree with the default configuration.
  pub fn new() -> Self {
    Self::with_config(OctreeConfig::DEFAULT)
  }

  /// Create an empty tree. Out-of-range config fields are clamped.
  pub fn with_config(config: OctreeConfig) -> Self {
    Self {
      config: config.sanitized(),
      root: None,
      nodes: Vec::new(),
      positions: Vec::new(),
      payloads: Vec::new(),
    }
  }

  /// Active configuration.
  #[inline]
  pub fn config(&self) -> &OctreeConfig {
    &self.config
  }

  /// Number of stored points.
  #[inline]
  pub fn len(&self) -> usize {
    self.positions.len()
  }

  /// Check if no point is stored.
  #[inline]
  pub fn is_empty(&self) -> bool {
    self.positions.is_empty()
  }

  /// Remove every point and node. The configuration is kept.
  pub fn clear(&mut self) {
    self.root = None;
    self.nodes.clear();
    self.positions.clear();
    self.payloads.clear();
  }

  /// Reserve room for `additional` more points.
  pub fn reserve(&mut self, additional: usize) {
    self.positions.reserve(additional);
    self.payloads.reserve(additional);
  }

  /// Region covered by the root, `None` before the first insert.
  pub fn bounds(&self) -> Option<DAabb3> {
    self.root.map(|root| self.node(root).bounds)
  }

  /// Position of point `index`.
  pub fn position(&self, index: PointIndex) -> Option<DVec3> {
    self.positions.get(index).copied()
  }

  /// Payload of point `index`.
  pub fn payload(&self, index: PointIndex) -> Option<&T> {
    self.payloads.get(index)
  }

  /// Mutable payload of point `index`. Positions cannot be changed.
  pub fn payload_mut(&mut self, index: PointIndex) -> Option<&mut T> {
    self.payloads.get_mut(index)
  }

  /// Position and payload of point `index`.
  pub fn get(&self, index: PointIndex) -> Option<(DVec3, &T)> {
    Some((self.position(index)?, self.payload(index)?))
  }

  /// Iterate over `(index, position, payload)` in insertion order.
  pub fn iter(&self) -> impl Iterator<Item = (PointIndex, DVec3, &T)> + '_ {
    self
      .positions
      .iter()
      .zip(&self.payloads)
      .enumerate()
      .map(|(index, (position, payload))| (index, *position, payload))
  }

  /// Insert a point and return its index.
  ///
  /// Indices are handed out sequentially from 0 and stay valid until
  /// [`clear`](Self::clear). A rejected insert changes nothing.
  pub fn add_point(
    &mut self,
    position: impl Into<DVec3>,
    payload: T,
  ) -> Result<PointIndex, InsertError> {
    let position = position.into();
    if !position.is_finite() {
      #[cfg(feature = "tracing")]
      tracing::debug!(%position, "rejected non-finite point");
      return Err(InsertError::NonFinitePosition { position });
    }
    let index = u32::try_from(self.positions.len()).map_err(|_| InsertError::IndexOverflow)?;

    let root = match self.root {
      Some(root) => self.grow_root_to_contain(root, position)?,
      None => {
        let half = self
          .config
          .initial_half_extent
          .max(position.abs().max_element() * MIN_RELATIVE_HALF_EXTENT);
        let bounds = DAabb3::from_center_half_extents(position, DVec3::splat(half));
        if !bounds.is_finite() {
          return Err(InsertError::OutOfRange { position });
        }
        self.push_node(Node::leaf(bounds, 0))
      }
    };
    self.root = Some(root);

    self.positions.push(position);
    self.payloads.push(payload);
    self.insert_entry(root, index, position);

    Ok(index as PointIndex)
  }

  // ---------------------------------------------------------------------
  // Arena access (shared with query / stats)
  // ---------------------------------------------------------------------

  #[inline]
  pub(crate) fn root_id(&self) -> Option<NodeId> {
    self.root
  }

  #[inline]
  pub(crate) fn node(&self, id: NodeId) -> &Node {
    &self.nodes[id as usize]
  }

  #[inline]
  pub(crate) fn node_count(&self) -> usize {
    self.nodes.len()
  }

  #[inline]
  pub(crate) fn positions(&self) -> &[DVec3] {
    &self.positions
  }

  #[inline]
  pub(crate) fn payloads(&self) -> &[T] {
    &self.payloads
  }

  fn push_node(&mut self, node: Node) -> NodeId {
    let id = self.nodes.len() as NodeId;
    self.nodes.push(node);
    id
  }

  // ---------------------------------------------------------------------
  // Insertion
  // ---------------------------------------------------------------------

  /// Double the root until it contains `position`; returns the new root.
  ///
  /// The growth is planned on bounds alone first so that an overflow is
  /// detected before any node is created.
  fn grow_root_to_contain(
    &mut self,
    root: NodeId,
    position: DVec3,
  ) -> Result<NodeId, InsertError> {
    let mut bounds = self.node(root).bounds;
    let mut steps = 0usize;
    while !bounds.contains_point(position) {
      bounds = grow_toward(&bounds, position).bounds;
      if !bounds.is_finite() {
        #[cfg(feature = "tracing")]
        tracing::debug!(%position, "rejected point beyond representable root growth");
        return Err(InsertError::OutOfRange { position });
      }
      steps += 1;
    }

    let mut root = root;
    for _ in 0..steps {
      let old_root = self.node(root);
      let level = old_root.level;
      let growth = grow_toward(&old_root.bounds, position);

      let mut children = [0 as NodeId; 8];
      for (octant, child) in children.iter_mut().enumerate() {
        *child = if octant == growth.old_root_octant {
          root
        } else {
          let bounds = child_bounds(&growth.bounds, growth.split, octant);
          self.push_node(Node::leaf(bounds, level))
        };
      }

      root = self.push_node(Node {
        bounds: growth.bounds,
        split: growth.split,
        level: level - 1,
        kind: NodeKind::Branch(children),
      });
    }

    #[cfg(feature = "tracing")]
    {
      if steps > 0 {
        tracing::debug!(steps, root = ?bounds, "grew root");
      }
    }

    Ok(root)
  }

  /// Descend from `root` and store `index` in the leaf containing
  /// `position`, splitting full leaves on the way.
  fn insert_entry(&mut self, root: NodeId, index: u32, position: DVec3) {
    let capacity = self.config.leaf_capacity;
    let max_level = self.config.max_depth as i32;

    let mut id = root;
    loop {
      let node = self.node(id);
      let must_split = match &node.kind {
        NodeKind::Branch(children) => {
          id = children[octant_of(node.split, position)];
          continue;
        }
        NodeKind::Leaf(entries) => entries.len() >= capacity && node.level < max_level,
      };

      if must_split {
        // Same node is revisited as a branch.
        self.split_leaf(id);
        continue;
      }

      let node = &mut self.nodes[id as usize];
      if let NodeKind::Leaf(entries) = &mut node.kind {
        entries.push(index);
        #[cfg(feature = "tracing")]
        {
          if entries.len() == capacity + 1 {
            tracing::trace!(level = node.level, "leaf at max depth exceeds capacity");
          }
        }
      }
      return;
    }
  }

  /// Turn leaf `id` into a branch with eight leaf children and move its
  /// entries into them.
  fn split_leaf(&mut self, id: NodeId) {
    let node = &mut self.nodes[id as usize];
    let entries = match &mut node.kind {
      NodeKind::Leaf(entries) => std::mem::take(entries),
      NodeKind::Branch(_) => return,
    };
    let bounds = node.bounds;
    let level = node.level + 1;
    let split = bounds.center();
    node.split = split;

    let mut buckets: [LeafEntries; 8] = Default::default();
    for entry in entries {
      buckets[octant_of(split, self.positions[entry as usize])].push(entry);
    }

    let mut children = [0 as NodeId; 8];
    for (octant, (child, bucket)) in children.iter_mut().zip(buckets).enumerate() {
      let mut leaf = Node::leaf(child_bounds(&bounds, split, octant), level);
      leaf.kind = NodeKind::Leaf(bucket);
      *child = self.push_node(leaf);
    }

    self.nodes[id as usize].kind = NodeKind::Branch(children);

    #[cfg(feature = "tracing")]
    tracing::trace!(node = id, "split leaf");
  }
}

impl<T> Default for PointOctree<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<P: Into<DVec3>, T> Extend<(P, T)> for PointOctree<T> {
  /// Insert every item. Any point [`add_point`](PointOctree::add_point)
  /// rejects (non-finite, out of range, index overflow) is skipped.
  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "octree::extend"))]
  fn extend<I: IntoIterator<Item = (P, T)>>(&mut self, iter: I) {
    let iter = iter.into_iter();
    self.reserve(iter.size_hint().0);
    for (position, payload) in iter {
      if let Err(_err) = self.add_point(position, payload) {
        #[cfg(feature = "tracing")]
        tracing::debug!(error = %_err, "extend skipped rejected point");
      }
    }
  }
}

impl<P: Into<DVec3>, T> FromIterator<(P, T)> for PointOctree<T> {
  fn from_iter<I: IntoIterator<Item = (P, T)>>(iter: I) -> Self {
    let mut tree = Self::new();
    tree.extend(iter);
    tree
  }
}

#[cfg(test)]
#[path = "octree_test.rs"]
mod octree_test;
