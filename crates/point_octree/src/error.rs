//! Insert rejection reasons.

use glam::DVec3;

/// Why [`PointOctree::add_point`](crate::PointOctree::add_point) rejected a
/// point. A rejected insert leaves the tree untouched.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum InsertError {
  /// A coordinate is NaN or infinite.
  #[error("non-finite position: {position}")]
  NonFinitePosition {
    /// Offending position.
    position: DVec3,
  },

  /// Growing the root to reach this point would overflow `f64` extents.
  #[error("position out of representable range: {position}")]
  OutOfRange {
    /// Offending position.
    position: DVec3,
  },

  /// Every `u32` point index has been handed out.
  #[error("point index space exhausted")]
  IndexOverflow,
}
