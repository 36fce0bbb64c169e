//! OctreeConfig - tunables for leaf capacity, subdivision depth and the
//! initial root region.

/// Hard ceiling for [`OctreeConfig::max_depth`].
///
/// Each level halves the cell size, so past this point children are
/// narrower than anything the input coordinates can resolve.
pub const MAX_DEPTH_LIMIT: u32 = 32;

/// Configuration for leaf splitting and root initialization.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OctreeConfig {
  /// Points a leaf holds before it is split into eight children.
  pub leaf_capacity: usize,

  /// Deepest level a leaf may be split at.
  ///
  /// Level 0 is the root created for the first point; roots grown above it
  /// have negative levels, so growth never uses up depth.
  ///
  /// Leaves at this depth keep accepting points past `leaf_capacity` and
  /// are scanned linearly, which bounds subdivision for coincident input.
  pub max_depth: u32,

  /// Half edge length of the root cube created around the first point.
  pub initial_half_extent: f64,
}

impl OctreeConfig {
  /// Default configuration.
  pub const DEFAULT: Self = Self {
    leaf_capacity: 16,
    max_depth: 20,
    initial_half_extent: 1.0,
  };

  /// Check if every field is inside its accepted range.
  pub fn is_valid(&self) -> bool {
    self.leaf_capacity > 0
      && self.max_depth <= MAX_DEPTH_LIMIT
      && self.initial_half_extent.is_finite()
      && self.initial_half_extent > 0.0
  }

  /// Clamp out-of-range fields.
  ///
  /// Capacity is raised to 1, depth lowered to [`MAX_DEPTH_LIMIT`], and an
  /// unusable half extent is replaced by the default one.
  pub fn sanitized(self) -> Self {
    let half = self.initial_half_extent;
    let initial_half_extent = if half.is_finite() && half > 0.0 {
      half
    } else {
      Self::DEFAULT.initial_half_extent
    };
    Self {
      leaf_capacity: self.leaf_capacity.max(1),
      max_depth: self.max_depth.min(MAX_DEPTH_LIMIT),
      initial_half_extent,
    }
  }
}

impl Default for OctreeConfig {
  fn default() -> Self {
    Self::DEFAULT
  }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
