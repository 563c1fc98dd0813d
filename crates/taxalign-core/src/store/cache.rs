//! Typed memo caches for store lookups

use crate::record::TaxonRecord;
use serde::Serialize;
use std::collections::HashMap;
use std::hash::Hash;

/// Outcome of a cache probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<V> {
    /// Computed earlier; the value may itself be empty or `None`
    Cached(V),
    NotComputed,
}

/// A memo table that counts hits and misses
#[derive(Debug)]
pub struct MemoCache<K, V> {
    entries: HashMap<K, V>,
    hits: u64,
    misses: u64,
}

impl<K: Eq + Hash, V: Clone> MemoCache<K, V> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    pub fn get(&mut self, key: &K) -> Lookup<V> {
        match self.entries.get(key) {
            Some(value) => {
                self.hits += 1;
                Lookup::Cached(value.clone())
            },
            None => {
                self.misses += 1;
                Lookup::NotComputed
            },
        }
    }

    pub fn insert(&mut self, key: K, value: V) {
        self.entries.insert(key, value);
    }

    /// Insert unless the key already has a value
    pub fn insert_if_absent(&mut self, key: K, value: V) {
        self.entries.entry(key).or_insert(value);
    }

    /// Probe without touching the counters
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheCounters {
        CacheCounters {
            entries: self.entries.len(),
            hits: self.hits,
            misses: self.misses,
        }
    }
}

impl<K: Eq + Hash, V: Clone> Default for MemoCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Name lookups are keyed by the trimmed input, case preserved
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NameKey(String);

impl NameKey {
    pub fn new(name: &str) -> Self {
        Self(name.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Component lookups are keyed by trimmed, lower-cased parts
///
/// Keeping the parts separate means ("ab", "c") and ("a", "bc") never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComponentKey {
    genus: String,
    species: String,
    infra_epithet: Option<String>,
}

impl ComponentKey {
    pub fn new(genus: &str, species: &str, infra_epithet: Option<&str>) -> Self {
        Self {
            genus: genus.trim().to_lowercase(),
            species: species.trim().to_lowercase(),
            infra_epithet: infra_epithet.map(|i| i.trim().to_lowercase()),
        }
    }
}

/// Identifier lookups use the trimmed id verbatim
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdKey(String);

impl IdKey {
    pub fn new(id: &str) -> Self {
        Self(id.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A cached root-first chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineageEntry {
    pub chain: Vec<TaxonRecord>,
    /// The walk that produced `chain` stopped at a repeated id. Its prefixes
    /// are not lineages of their own.
    pub cyclic: bool,
}

/// Size and effectiveness of a single cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheCounters {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Per-cache counters of one store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub by_name: CacheCounters,
    pub by_components: CacheCounters,
    pub by_id: CacheCounters,
    pub lineage: CacheCounters,
}

impl CacheStats {
    pub fn total_hits(&self) -> u64 {
        self.by_name.hits + self.by_components.hits + self.by_id.hits + self.lineage.hits
    }

    pub fn total_misses(&self) -> u64 {
        self.by_name.misses + self.by_components.misses + self.by_id.misses + self.lineage.misses
    }
}
