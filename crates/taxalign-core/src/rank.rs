//! Canonical taxonomic rank order
//!
//! Ranks are free text in every source ("Species", " subspecies ", "ORDER").
//! Comparisons go through [`key`], ordering through [`position`].

use std::cmp::Ordering;

/// Recognized ranks, least specific first
pub const CANONICAL_RANKS: [&str; 19] = [
    "domain",
    "kingdom",
    "phylum",
    "division",
    "class",
    "order",
    "suborder",
    "infraorder",
    "superfamily",
    "family",
    "subfamily",
    "tribe",
    "subtribe",
    "genus",
    "subgenus",
    "species",
    "subspecies",
    "variety",
    "form",
];

/// Substrings that mark a rank label as below species
const INFRA_RANK_MARKERS: [&str; 3] = ["subspecies", "variety", "form"];

/// Trim surrounding whitespace, keeping the original case
pub fn normalize(rank: &str) -> String {
    rank.trim().to_string()
}

/// Case-insensitive comparison key for a rank label
pub fn key(rank: &str) -> String {
    rank.trim().to_lowercase()
}

/// Position of `rank` in [`CANONICAL_RANKS`]
///
/// Unrecognized ranks land after every canonical position, at
/// `CANONICAL_RANKS.len() + fnv1a(key)`, so the result is a total order that
/// never collides with a canonical slot.
pub fn position(rank: &str) -> usize {
    let key = key(rank);
    match CANONICAL_RANKS.iter().position(|r| *r == key) {
        Some(index) => index,
        None => CANONICAL_RANKS.len().saturating_add(fnv1a(key.as_bytes()) as usize),
    }
}

/// Order two rank labels by canonical position, then by key
pub fn compare(a: &str, b: &str) -> Ordering {
    position(a)
        .cmp(&position(b))
        .then_with(|| key(a).cmp(&key(b)))
}

pub fn is_canonical(rank: &str) -> bool {
    let key = key(rank);
    CANONICAL_RANKS.contains(&key.as_str())
}

/// True when the label names an infraspecific rank (subspecies, variety, form)
pub fn is_infra_rank(rank: &str) -> bool {
    let key = key(rank);
    INFRA_RANK_MARKERS.iter().any(|marker| key.contains(marker))
}

// 32-bit FNV-1a; stable across platforms and releases, unlike `DefaultHasher`.
fn fnv1a(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0x811c_9dc5_u32, |hash, byte| {
        (hash ^ u32::from(*byte)).wrapping_mul(0x0100_0193)
    })
}
