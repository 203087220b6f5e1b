//! SQLite schema and migration bootstrap.

use rusqlite::Connection;

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS patterns (
    id          TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    language    TEXT NOT NULL,
    code        TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    test_code   TEXT,
    fingerprint TEXT NOT NULL,
    coherency   TEXT NOT NULL,
    usage       TEXT NOT NULL,
    bugs        TEXT NOT NULL,
    provenance  TEXT,
    lineage_parent TEXT,
    version     INTEGER NOT NULL,
    retired     INTEGER NOT NULL DEFAULT 0,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_patterns_name ON patterns(name);
CREATE UNIQUE INDEX IF NOT EXISTS idx_patterns_fingerprint ON patterns(fingerprint);
CREATE INDEX IF NOT EXISTS idx_patterns_language ON patterns(language);

CREATE TABLE IF NOT EXISTS pattern_tags (
    pattern_id TEXT NOT NULL REFERENCES patterns(id) ON DELETE CASCADE,
    tag        TEXT NOT NULL,
    PRIMARY KEY (pattern_id, tag)
);

CREATE INDEX IF NOT EXISTS idx_pattern_tags_tag ON pattern_tags(tag);

CREATE TABLE IF NOT EXISTS pattern_versions (
    pattern_id   TEXT NOT NULL REFERENCES patterns(id) ON DELETE CASCADE,
    version      INTEGER NOT NULL,
    code         TEXT NOT NULL,
    coherency    TEXT NOT NULL,
    recorded_at  TEXT NOT NULL,
    PRIMARY KEY (pattern_id, version)
);
";

pub fn bootstrap(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.execute_batch(SCHEMA)
}
