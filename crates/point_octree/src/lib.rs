//! point_octree - octree point index for nearest-neighbor geometry queries
//!
//! Points are inserted one at a time with a caller-chosen payload and get a
//! sequential index. Queries return the stored points within a radius of a
//! probe, capped at a count, nearest first.
//!
//! # Features
//!
//! - **Incremental build**: the root grows toward outliers, leaves split
//!   when full; no up-front bounds or capacity needed
//! - **Bounded k-NN**: branch-and-bound search with a fixed-capacity
//!   candidate heap, deterministic tie-breaking by insertion index
//! - **Degeneracy guard**: leaves stop splitting at a configurable depth, so
//!   coincident points cannot drive unbounded subdivision
//! - **Parallel queries**: a built tree is `Sync`; batch queries run on
//!   rayon's pool
//!
//! # Concurrency
//!
//! Build first, then query. `add_point` and `clear` take `&mut self`, so the
//! borrow checker already keeps them apart from in-flight queries.
//!
//! # Example
//!
//! ```ignore
//! use point_octree::PointOctree;
//!
//! let mut tree = PointOctree::new();
//! tree.add_point((0.0, 0.0, 0.0), "a")?;
//! tree.add_point((1.0, 0.0, 0.0), "b")?;
//!
//! for hit in tree.nearest_neighbors((0.0, 0.0, 0.0), 1.0, 2) {
//!     println!("{} {} {}", hit.index, hit.distance, hit.payload);
//! }
//! ```

pub mod bounds;
pub mod candidates;
pub mod config;
pub mod error;
pub mod node;
pub mod octree;
pub mod query;
pub mod stats;

#[cfg(test)]
mod test_utils;

// Re-exports
pub use bounds::DAabb3;
pub use config::{OctreeConfig, MAX_DEPTH_LIMIT};
pub use error::InsertError;
pub use octree::{PointIndex, PointOctree};
pub use query::{Neighbor, QueryScratch};
pub use stats::OctreeStats;

pub use glam::DVec3;
