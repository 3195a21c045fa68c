//! Top-K Selection
//!
//! Bounded min-heap over `(score, vocabulary position)` candidates.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A scored row of the embedding matrix
#[derive(Debug, Clone, Copy)]
pub(crate) struct Candidate {
    pub score: f32,
    pub position: usize,
}

impl Candidate {
    pub fn new(score: f32, position: usize) -> Self {
        // Fold -0.0 into 0.0 so equal scores reach the position tie-break
        let score = if score == 0.0 { 0.0 } else { score };
        Self { score, position }
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    /// "Greater" means worse: lower score, then later vocabulary position.
    /// The heap top is therefore the candidate to evict first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| self.position.cmp(&other.position))
    }
}

/// Keeps the `k` best candidates seen so far
#[derive(Debug)]
pub(crate) struct TopK {
    k: usize,
    heap: BinaryHeap<Candidate>,
}

impl TopK {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            heap: BinaryHeap::with_capacity(k.saturating_add(1).min(4096)),
        }
    }

    /// Offer a candidate, evicting the worst one when over capacity
    #[inline]
    pub fn push(&mut self, candidate: Candidate) {
        if self.k == 0 {
            return;
        }
        if self.heap.len() < self.k {
            self.heap.push(candidate);
            return;
        }
        if let Some(worst) = self.heap.peek() {
            if candidate < *worst {
                self.heap.pop();
                self.heap.push(candidate);
            }
        }
    }

    /// Fold another partial result into this one
    pub fn merge(&mut self, other: TopK) {
        for candidate in other.heap {
            self.push(candidate);
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Best first: descending score, ascending position on ties
    pub fn into_sorted_vec(self) -> Vec<Candidate> {
        self.heap.into_sorted_vec()
    }
}
