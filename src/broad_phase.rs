//! Broad Phase — Candidate Pair Generation
//!
//! Reduces O(n^2) body interactions to a small candidate set by pairing
//! bodies that share a sector (or sit in adjacent sectors) and whose swept
//! AABBs overlap. Pair insertion is idempotent: a pair that co-occupies two
//! sectors, or is seen both within a sector and across a boundary, is tested
//! exactly once downstream.

use std::collections::HashSet;

use crate::body::MotionType;
use crate::pool::{BodyId, BodyPool};
use crate::sector::SectorGrid;

// ============================================================================
// BodyPair
// ============================================================================

/// Canonical unordered body pair: `a.index() < b.index()` always holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BodyPair {
    /// Lower-indexed body.
    pub a: BodyId,
    /// Higher-indexed body.
    pub b: BodyId,
}

impl BodyPair {
    /// Build a canonical pair, swapping the operands if needed.
    #[must_use]
    pub fn new(x: BodyId, y: BodyId) -> Self {
        if x.index() < y.index() {
            Self { a: x, b: y }
        } else {
            Self { a: y, b: x }
        }
    }

    /// Combined 64-bit key for O(1) membership testing.
    #[inline]
    #[must_use]
    pub fn key(&self) -> u64 {
        (u64::from(self.a.index()) << 32) | u64::from(self.b.index())
    }
}

// ============================================================================
// PairSet
// ============================================================================

/// Deduplicated pair set with deterministic (insertion-ordered) iteration.
#[derive(Default)]
pub struct PairSet {
    pairs: Vec<BodyPair>,
    keys: HashSet<u64>,
}

impl PairSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove all pairs, retaining allocations.
    pub fn clear(&mut self) {
        self.pairs.clear();
        self.keys.clear();
    }

    /// Insert a pair. Returns `false` if it was already present.
    pub fn insert(&mut self, pair: BodyPair) -> bool {
        if self.keys.insert(pair.key()) {
            self.pairs.push(pair);
            true
        } else {
            false
        }
    }

    /// Membership test.
    #[inline]
    #[must_use]
    pub fn contains(&self, pair: &BodyPair) -> bool {
        self.keys.contains(&pair.key())
    }

    /// Pairs in insertion order.
    #[inline]
    #[must_use]
    pub fn pairs(&self) -> &[BodyPair] {
        &self.pairs
    }

    /// Number of pairs.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// True when no pairs are stored.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

// ============================================================================
// Pair generation
// ============================================================================

/// Rebuild the pair set from sector contents.
///
/// Pairs are drawn from bodies co-resident in a sector plus bodies in
/// adjacent sectors (only higher-indexed neighbors are scanned so each
/// sector pairing is enumerated once; the set dedupes the rest). A pair
/// qualifies when at least one side is dynamic and the swept AABBs overlap.
pub fn collect_pairs(grid: &SectorGrid, pool: &BodyPool, pairs: &mut PairSet) {
    pairs.clear();

    for index in 0..grid.len() {
        let sector = grid.sector(index);

        for i in 0..sector.bodies.len() {
            for j in (i + 1)..sector.bodies.len() {
                consider(pool, pairs, sector.bodies[i], sector.bodies[j]);
            }
        }

        for neighbor in grid.adjacent_indices(index) {
            if neighbor <= index {
                continue;
            }
            let other = grid.sector(neighbor);
            for &a in &sector.bodies {
                for &b in &other.bodies {
                    consider(pool, pairs, a, b);
                }
            }
        }
    }
}

/// Filter one candidate and insert it if it qualifies.
fn consider(pool: &BodyPool, pairs: &mut PairSet, x: BodyId, y: BodyId) {
    // The same body can sit in both sectors of a boundary scan.
    if x.index() == y.index() {
        return;
    }
    let (Some(a), Some(b)) = (pool.get(x), pool.get(y)) else {
        return;
    };
    // Two non-dynamic bodies have no possible collision response.
    if a.motion_type != MotionType::Dynamic && b.motion_type != MotionType::Dynamic {
        return;
    }
    if !a.body_aabb.intersects(&b.body_aabb) {
        return;
    }
    pairs.insert(BodyPair::new(x, y));
}

// ============================================================================
// Tests
// ============================================================================
