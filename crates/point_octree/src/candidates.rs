//! Bounded max-heap of k-NN candidates.
//!
//! The heap top is the current worst candidate, so deciding whether a new
//! point (or a whole node) can still improve the result is an O(1) peek.
//! Storage is reused across queries; once it has grown to the largest `k`
//! seen, queries no longer allocate.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A point under consideration, keyed by `(dist_sq, index)`.
///
/// Ordering by index after distance makes equal-distance results come out
/// in insertion order regardless of traversal order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
  /// Squared distance to the query point.
  pub dist_sq: f64,
  /// Point index.
  pub index: u32,
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
  #[inline]
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for Candidate {
  #[inline]
  fn cmp(&self, other: &Self) -> Ordering {
    self
      .dist_sq
      .total_cmp(&other.dist_sq)
      .then(self.index.cmp(&other.index))
  }
}

/// Fixed-capacity max-heap holding the best `capacity` candidates seen.
#[derive(Debug, Default)]
pub struct CandidateHeap {
  heap: BinaryHeap<Candidate>,
  capacity: usize,
}

impl CandidateHeap {
  /// Create an empty heap with capacity 0.
  pub fn new() -> Self {
    Self::default()
  }

  /// Empty the heap and set a new capacity, keeping the allocation.
  pub fn reset(&mut self, capacity: usize) {
    self.heap.clear();
    self.heap.reserve(capacity);
    self.capacity = capacity;
  }

  /// Maximum number of candidates kept.
  #[inline]
  pub fn capacity(&self) -> usize {
    self.capacity
  }

  /// Number of candidates held.
  #[inline]
  pub fn len(&self) -> usize {
    self.heap.len()
  }

  /// Check if no candidate is held.
  #[inline]
  pub fn is_empty(&self) -> bool {
    self.heap.is_empty()
  }

  /// Check if the heap holds `capacity` candidates.
  #[inline]
  pub fn is_full(&self) -> bool {
    self.heap.len() >= self.capacity
  }

  /// Current worst candidate, if any.
  #[inline]
  pub fn worst(&self) -> Option<&Candidate> {
    self.heap.peek()
  }

  /// Check if a region whose closest point is `min_dist_sq` away could
  /// still hold a candidate that makes it into the heap.
  ///
  /// Equality admits: a tied point with a lower index beats the worst.
  #[inline]
  pub fn admits(&self, min_dist_sq: f64) -> bool {
    if self.capacity == 0 {
      return false;
    }
    if !self.is_full() {
      return true;
    }
    self.heap.peek().is_some_and(|worst| min_dist_sq <= worst.dist_sq)
  }

  /// Offer a candidate. Returns true if it was kept.
  ///
  /// When full, the candidate replaces the worst one only if it orders
  /// strictly before it.
  #[inline]
  pub fn offer(&mut self, candidate: Candidate) -> bool {
    if self.capacity == 0 {
      return false;
    }
    if self.heap.len() < self.capacity {
      self.heap.push(candidate);
      return true;
    }
    let Some(mut worst) = self.heap.peek_mut() else {
      return false;
    };
    if candidate < *worst {
      // The guard sifts the replaced top down when dropped.
      *worst = candidate;
      true
    } else {
      false
    }
  }

  /// Move all candidates into `out`, nearest first. Leaves the heap empty.
  pub fn drain_sorted_into(&mut self, out: &mut Vec<Candidate>) {
    out.clear();
    out.extend(self.heap.drain());
    out.sort_unstable();
  }
}

#[cfg(test)]
#[path = "candidates_test.rs"]
mod candidates_test;
