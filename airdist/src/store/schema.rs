//! Persisted schema.

use std::path::PathBuf;

/// Table of cached airports, keyed by UID.
pub const ENTITIES_TABLE: &str = "entities";

/// Table of pairwise distances, keyed by pair id.
pub const DISTANCES_TABLE: &str = "pair_distances";

/// Built-in schema. Both UID columns of `pair_distances` are indexed so
/// that "all pairs touching X" is two index lookups.
pub const DEFAULT_SCHEMA: &str = "\
CREATE TABLE IF NOT EXISTS entities (
    uid            TEXT PRIMARY KEY,
    name           TEXT NOT NULL,
    country        TEXT NOT NULL,
    region         TEXT NOT NULL,
    municipality   TEXT NOT NULL,
    latitude       REAL NOT NULL,
    longitude      REAL NOT NULL,
    class          TEXT NOT NULL,
    primary_code   TEXT NOT NULL,
    secondary_code TEXT
);

CREATE TABLE IF NOT EXISTS pair_distances (
    pair_id     TEXT PRIMARY KEY,
    entity1_uid TEXT NOT NULL,
    entity2_uid TEXT NOT NULL,
    distance_km REAL NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_pair_distances_entity1 ON pair_distances (entity1_uid);
CREATE INDEX IF NOT EXISTS idx_pair_distances_entity2 ON pair_distances (entity2_uid);
";

/// Which schema script initialises the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Schema {
    #[default]
    Builtin,
    /// A user-supplied script, read at initialisation.
    Script(PathBuf),
}

impl Schema {
    pub fn from_option(script: Option<PathBuf>) -> Self {
        script.map_or(Schema::Builtin, Schema::Script)
    }
}
