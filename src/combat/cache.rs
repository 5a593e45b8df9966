//! Tolerance-bucketed cache of combat values
//!
//! Entries are keyed by the (type a, type b) pair and hold the two average
//! defenses they were computed for. A lookup accepts any entry whose defenses
//! are both within `COMBAT_CACHE_TOLERANCE` of the query, preferring the
//! closest one.

use ahash::AHashMap;
use ordered_float::OrderedFloat;
use std::collections::BTreeSet;

use crate::core::config::CombatCachePolicy;

/// Max distance per defense value for a cached entry to be reused
pub const COMBAT_CACHE_TOLERANCE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct CacheEntry {
    a_defense: OrderedFloat<f64>,
    b_defense: OrderedFloat<f64>,
    value: OrderedFloat<f64>,
}

impl CacheEntry {
    fn distance(&self, a_defense: f64, b_defense: f64) -> Option<f64> {
        let da = (self.a_defense.0 - a_defense).abs();
        let db = (self.b_defense.0 - b_defense).abs();
        (da < COMBAT_CACHE_TOLERANCE && db < COMBAT_CACHE_TOLERANCE).then_some(da + db)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CombatCache {
    policy: CombatCachePolicy,
    entries: AHashMap<(String, String), BTreeSet<CacheEntry>>,
    hits: u64,
    misses: u64,
}

impl CombatCache {
    pub fn new(policy: CombatCachePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn policy(&self) -> CombatCachePolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: CombatCachePolicy) {
        self.policy = policy;
    }

    /// Called at the start of every recruitment pass
    pub fn begin_pass(&mut self) {
        if self.policy == CombatCachePolicy::PerPass {
            self.clear();
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of cached values over all type pairs
    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn lookup(&mut self, a: &str, b: &str, a_defense: f64, b_defense: f64) -> Option<f64> {
        let best = self
            .entries
            .get(&(a.to_string(), b.to_string()))
            .and_then(|bucket| {
                bucket
                    .iter()
                    .filter_map(|e| e.distance(a_defense, b_defense).map(|d| (d, e.value.0)))
                    .fold(None, |best: Option<(f64, f64)>, candidate| match best {
                        Some(b) if b.0 <= candidate.0 => Some(b),
                        _ => Some(candidate),
                    })
            })
            .map(|(_, value)| value);

        if best.is_some() {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        best
    }

    pub fn insert(&mut self, a: &str, b: &str, a_defense: f64, b_defense: f64, value: f64) {
        let entry = CacheEntry {
            a_defense: OrderedFloat(a_defense),
            b_defense: OrderedFloat(b_defense),
            value: OrderedFloat(value),
        };
        let bucket = self.entries.entry((a.to_string(), b.to_string())).or_default();

        if let CombatCachePolicy::BoundedPerPair(bound) = self.policy {
            while bucket.len() >= bound.max(1) {
                // evict whatever lies farthest from the new entry
                let farthest = bucket.iter().copied().max_by_key(|e| {
                    OrderedFloat((e.a_defense.0 - a_defense).abs() + (e.b_defense.0 - b_defense).abs())
                });
                match farthest {
                    Some(e) => {
                        bucket.remove(&e);
                    }
                    None => break,
                }
            }
        }
        bucket.insert(entry);
    }
}
