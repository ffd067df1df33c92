//! Pair identity and distance records.

use std::fmt;

use crate::airport::Airport;

/// Order two UIDs lexicographically.
pub fn order_uids<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Canonical identity of an unordered airport pair: `"{min}_{max}"`.
///
/// `PairKey::new(a, b) == PairKey::new(b, a)` for all UIDs. UIDs may
/// themselves contain `_`, so two different pairs can in principle share a
/// key; existence checks therefore match on the UID columns, not the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey(String);

impl PairKey {
    pub fn new(a: &str, b: &str) -> Self {
        let (first, second) = order_uids(a, b);
        Self(format!("{}_{}", first, second))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PairKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A cached distance between two airports, with `uid1 <= uid2`.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceRecord {
    pub pair_id: PairKey,
    pub uid1: String,
    pub uid2: String,
    pub distance_km: f64,
}

impl DistanceRecord {
    /// Build a record, putting the UIDs in canonical order.
    pub fn new(a: &str, b: &str, distance_km: f64) -> Self {
        let (uid1, uid2) = order_uids(a, b);
        Self {
            pair_id: PairKey::new(uid1, uid2),
            uid1: uid1.to_string(),
            uid2: uid2.to_string(),
            distance_km,
        }
    }

    /// Compute the record for two airports. `None` if either has no UID.
    pub fn between(a: &Airport, b: &Airport) -> Option<Self> {
        let uid_a = a.uid()?;
        let uid_b = b.uid()?;
        Some(Self::new(&uid_a, &uid_b, a.distance_to(b)))
    }
}
