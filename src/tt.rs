//! Transposition table for caching search results.
//!
//! Uses Zobrist fingerprints to store and retrieve bounded evaluations so
//! that positions reached through transposed move orders are searched once.
//!
//! The table is fixed-size. Distinct positions that share a fingerprint can
//! overwrite or be mistaken for each other; with 64-bit keys this is rare
//! enough to be accepted as an approximation rather than a correctness
//! failure.

use std::mem;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundType {
    Exact,      // Score is the exact value
    LowerBound, // Score is at least this value (failed high - score >= beta)
    UpperBound, // Score is at most this value (failed low - score <= alpha)
}

impl BoundType {
    /// The same bound seen from the other player's side (scores negated).
    #[must_use]
    pub fn flip(self) -> Self {
        match self {
            BoundType::Exact => BoundType::Exact,
            BoundType::LowerBound => BoundType::UpperBound,
            BoundType::UpperBound => BoundType::LowerBound,
        }
    }

    /// Classify a search result against the window it was searched with.
    #[must_use]
    pub fn classify(score: i32, alpha: i32, beta: i32) -> Self {
        if score <= alpha {
            BoundType::UpperBound
        } else if score >= beta {
            BoundType::LowerBound
        } else {
            BoundType::Exact
        }
    }
}

/// A cached evaluation. Scores are stored from player 1's perspective.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TTEntry {
    pub key: u64,
    pub depth: i32,
    pub score: i32,
    pub bound_type: BoundType,
}

impl TTEntry {
    /// The cached score if it settles a search of `(alpha, beta)`.
    #[must_use]
    pub fn cutoff(&self, alpha: i32, beta: i32) -> Option<i32> {
        match self.bound_type {
            BoundType::Exact => Some(self.score),
            BoundType::LowerBound if self.score >= beta => Some(self.score),
            BoundType::UpperBound if self.score <= alpha => Some(self.score),
            _ => None,
        }
    }
}

/// Number of slots per bucket for collision resolution
const BUCKET_SIZE: usize = 4;

#[derive(Clone, Copy, Default)]
struct TTBucket {
    slots: [Option<TTEntry>; BUCKET_SIZE],
}

/// Fixed-capacity transposition table with depth-preferred replacement.
pub struct TranspositionTable {
    buckets: Vec<TTBucket>,
    mask: usize,
    hits: u64,
    misses: u64,
}

impl TranspositionTable {
    /// Create a new transposition table with the given size in megabytes.
    #[must_use]
    pub fn new(size_mb: usize) -> Self {
        let bucket_size = mem::size_of::<TTBucket>();
        let mut num_buckets = (size_mb * 1024 * 1024) / bucket_size;

        // Ensure num_buckets is a power of 2 for efficient indexing
        num_buckets = num_buckets.next_power_of_two() / 2;
        if num_buckets == 0 {
            num_buckets = 1024;
        }

        TranspositionTable {
            buckets: vec![TTBucket::default(); num_buckets],
            mask: num_buckets - 1,
            hits: 0,
            misses: 0,
        }
    }

    fn index(&self, hash: u64) -> usize {
        (hash as usize) & self.mask
    }

    /// Total number of entry slots.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buckets.len() * BUCKET_SIZE
    }

    /// Probe for an entry stored under `hash` at exactly `depth`.
    ///
    /// Entries searched to a different depth are treated as misses.
    pub fn probe(&mut self, hash: u64, depth: i32) -> Option<TTEntry> {
        let bucket = &self.buckets[self.index(hash)];
        let found = bucket
            .slots
            .iter()
            .flatten()
            .find(|entry| entry.key == hash && entry.depth == depth)
            .copied();
        if found.is_some() {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        found
    }

    /// Store an entry in the table.
    ///
    /// Uses a replacement strategy that prefers:
    /// 1. Slots holding the same position at the same depth (update)
    /// 2. Empty slots
    /// 3. The slot with the shallowest depth
    pub fn store(&mut self, hash: u64, depth: i32, score: i32, bound_type: BoundType) {
        let entry = TTEntry {
            key: hash,
            depth,
            score,
            bound_type,
        };
        let idx = self.index(hash);
        let slots = &mut self.buckets[idx].slots;

        if let Some(slot) = slots
            .iter_mut()
            .find(|slot| matches!(slot, Some(e) if e.key == hash && e.depth == depth))
        {
            *slot = Some(entry);
            return;
        }

        if let Some(slot) = slots.iter_mut().find(|slot| slot.is_none()) {
            *slot = Some(entry);
            return;
        }

        let mut replace_idx = 0;
        let mut shallowest = i32::MAX;
        for (i, slot) in slots.iter().enumerate() {
            if let Some(existing) = slot {
                if existing.depth < shallowest {
                    shallowest = existing.depth;
                    replace_idx = i;
                }
            }
        }
        slots[replace_idx] = Some(entry);
    }

    /// (hits, misses) since the last clear.
    #[must_use]
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }

    /// Returns hash table fullness in per mille (0-1000).
    #[must_use]
    pub fn hashfull_per_mille(&self) -> u32 {
        // Sample first 1000 buckets for efficiency
        let sample_size = self.buckets.len().min(1000);
        let occupied = self
            .buckets
            .iter()
            .take(sample_size)
            .flat_map(|bucket| bucket.slots.iter())
            .filter(|slot| slot.is_some())
            .count();

        let total_slots = sample_size * BUCKET_SIZE;
        ((occupied as u64 * 1000) / total_slots as u64) as u32
    }

    /// Clear all entries from the table.
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            *bucket = TTBucket::default();
        }
        self.hits = 0;
        self.misses = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_and_lookup() {
        let mut tt = TranspositionTable::new(1);
        let hash = 0x123456789ABCDEF0;

        tt.store(hash, 3, 500, BoundType::Exact);

        let entry = tt.probe(hash, 3).expect("should find entry");
        assert_eq!(entry.depth, 3);
        assert_eq!(entry.score, 500);
        assert_eq!(entry.bound_type, BoundType::Exact);
        assert_eq!(tt.stats(), (1, 0));
    }

    #[test]
    fn test_depth_mismatch_is_a_miss() {
        let mut tt = TranspositionTable::new(1);
        let hash = 0x0F0F_0F0F_0F0F_0F0F;

        tt.store(hash, 2, 40, BoundType::Exact);
        assert!(tt.probe(hash, 3).is_none());
        assert!(tt.probe(hash, 1).is_none());
        assert!(tt.probe(hash, 2).is_some());
    }

    #[test]
    fn test_no_false_positives() {
        let mut tt = TranspositionTable::new(1);
        let hash1 = 0x123456789ABCDEF0;
        let hash2 = 0xFEDCBA9876543210;

        tt.store(hash1, 4, 500, BoundType::Exact);

        assert!(tt.probe(hash2, 4).is_none());
    }

    #[test]
    fn test_full_bucket_replaces_shallowest() {
        let mut tt = TranspositionTable::new(1);
        let stride = (tt.mask as u64) + 1;
        let base = 7u64;

        // Five keys that all land in the same bucket
        for i in 0..4u64 {
            tt.store(base + i * stride, 10 + i as i32, 1, BoundType::Exact);
        }
        tt.store(base + 4 * stride, 20, 2, BoundType::Exact);

        assert!(tt.probe(base, 10).is_none(), "shallowest entry should be evicted");
        assert!(tt.probe(base + stride, 11).is_some());
        assert!(tt.probe(base + 4 * stride, 20).is_some());
    }

    #[test]
    fn test_cutoff_respects_bounds() {
        let exact = TTEntry { key: 1, depth: 1, score: 5, bound_type: BoundType::Exact };
        assert_eq!(exact.cutoff(-100, 100), Some(5));

        let lower = TTEntry { bound_type: BoundType::LowerBound, ..exact };
        assert_eq!(lower.cutoff(-100, 5), Some(5));
        assert_eq!(lower.cutoff(-100, 6), None);

        let upper = TTEntry { bound_type: BoundType::UpperBound, ..exact };
        assert_eq!(upper.cutoff(5, 100), Some(5));
        assert_eq!(upper.cutoff(4, 100), None);
    }

    #[test]
    fn test_classify_and_flip() {
        assert_eq!(BoundType::classify(-10, -10, 10), BoundType::UpperBound);
        assert_eq!(BoundType::classify(10, -10, 10), BoundType::LowerBound);
        assert_eq!(BoundType::classify(0, -10, 10), BoundType::Exact);
        assert_eq!(BoundType::LowerBound.flip(), BoundType::UpperBound);
        assert_eq!(BoundType::Exact.flip(), BoundType::Exact);
    }

    #[test]
    fn test_clear() {
        let mut tt = TranspositionTable::new(1);
        for key in 0..1000u64 {
            tt.store(key, 1, 1, BoundType::Exact);
        }
        assert_eq!(tt.hashfull_per_mille(), 250);
        tt.clear();
        assert!(tt.probe(99, 1).is_none());
        assert_eq!(tt.hashfull_per_mille(), 0);
    }
}
