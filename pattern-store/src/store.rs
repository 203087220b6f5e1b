//! SQLite-backed pattern store.
//!
//! Grounded on the teacher's `rag-store` facade: a single public struct
//! wrapping the backend connection, with one focused method per operation
//! and `tracing` calls at the public boundary. Unlike `rag-store` (a
//! read-mostly vector index), the pattern store is the system of record for
//! mutable patterns, so every write goes through a transaction and an
//! explicit version counter (SPEC_FULL.md §3, §7 Testable Property 4).

use chrono::Utc;
use coherency_scorer::CoherencyRecord;
use rusqlite::{Connection, OptionalExtension, params};
use std::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::StoreConfig;
use crate::errors::{Result, StoreError};
use crate::record::{BugReport, Pattern, PatternFilter, PatternSnapshot, Provenance, UsageStats};
use crate::schema;

pub struct PatternStore {
    conn: Mutex<Connection>,
    version_history_depth: u32,
}

impl PatternStore {
    pub fn open(cfg: &StoreConfig) -> Result<Self> {
        info!(path = %cfg.db_path.display(), "PatternStore::open");
        let conn = Connection::open(&cfg.db_path)?;
        schema::bootstrap(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            version_history_depth: cfg.version_history_depth,
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::bootstrap(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            version_history_depth: 10,
        })
    }

    /// Inserts a brand-new pattern. Fails with `DuplicateName` if the name
    /// or fingerprint is already taken (both are unique indexes).
    pub fn put(&self, pattern: &Pattern) -> Result<()> {
        debug!(id = %pattern.id, name = %pattern.name, "PatternStore::put");
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        insert_pattern_row(&tx, pattern).map_err(|e| map_unique_violation(e, &pattern.name))?;
        replace_tags(&tx, &pattern.id, &pattern.tags)?;
        tx.commit()?;
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<Pattern> {
        let conn = self.conn.lock().unwrap();
        load_pattern(&conn, id)?.ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    pub fn get_by_name(&self, name: &str) -> Result<Pattern> {
        let conn = self.conn.lock().unwrap();
        let id: Option<String> = conn
            .query_row("SELECT id FROM patterns WHERE name = ?1", params![name], |r| r.get(0))
            .optional()?;
        match id {
            Some(id) => load_pattern(&conn, &id)?.ok_or_else(|| StoreError::NotFound(name.to_string())),
            None => Err(StoreError::NotFound(name.to_string())),
        }
    }

    pub fn get_by_fingerprint(&self, fingerprint: &str) -> Result<Option<Pattern>> {
        let conn = self.conn.lock().unwrap();
        let id: Option<String> = conn
            .query_row(
                "SELECT id FROM patterns WHERE fingerprint = ?1",
                params![fingerprint],
                |r| r.get(0),
            )
            .optional()?;
        match id {
            Some(id) => load_pattern(&conn, &id),
            None => Ok(None),
        }
    }

    /// Lexicographically-ordered scan (by id) through patterns matching
    /// `filter`, so repeated queries over a stable store are deterministic.
    pub fn iter(&self, filter: &PatternFilter) -> Result<Vec<Pattern>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT id FROM patterns WHERE retired = 0 ORDER BY id ASC")?;
        let ids: Vec<String> = stmt
            .query_map([], |r| r.get(0))?
            .collect::<rusqlite::Result<_>>()?;
        drop(stmt);
        let mut out = Vec::new();
        for id in ids {
            if let Some(p) = load_pattern(&conn, &id)? {
                if filter.matches(&p) {
                    out.push(p);
                }
            }
        }
        Ok(out)
    }

    /// Most-recently-updated patterns first, bounded by `limit`. Used by
    /// the deduplicator to draw its bounded near-duplicate sample.
    pub fn recent(&self, limit: usize) -> Result<Vec<Pattern>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT id FROM patterns WHERE retired = 0 ORDER BY updated_at DESC LIMIT ?1")?;
        let ids: Vec<String> = stmt
            .query_map(params![limit as i64], |r| r.get(0))?
            .collect::<rusqlite::Result<_>>()?;
        drop(stmt);
        let mut out = Vec::new();
        for id in ids {
            if let Some(p) = load_pattern(&conn, &id)? {
                out.push(p);
            }
        }
        Ok(out)
    }

    /// Reserved for rollback only: never hard-deletes the row. Removes the
    /// current content and atomically restores the most recent snapshot
    /// kept in the version-history ring, so a pattern is never destroyed
    /// even through this call. Fails with `NoPriorVersion` if there is no
    /// snapshot left to restore to.
    pub fn delete(&self, id: &str) -> Result<Pattern> {
        warn!(id = %id, "PatternStore::delete");
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let current = load_pattern(&tx, id)?.ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let latest_version: Option<u32> = tx.query_row(
            "SELECT MAX(version) FROM pattern_versions WHERE pattern_id = ?1",
            params![id],
            |r| r.get(0),
        )?;
        let snapshot_version =
            latest_version.ok_or_else(|| StoreError::NoPriorVersion(id.to_string()))?;
        let snapshot = load_snapshot(&tx, id, snapshot_version)?
            .ok_or_else(|| StoreError::NoPriorVersion(id.to_string()))?;

        tx.execute(
            "DELETE FROM pattern_versions WHERE pattern_id = ?1 AND version = ?2",
            params![id, snapshot_version],
        )?;
        let now = Utc::now();
        tx.execute(
            "UPDATE patterns SET code = ?1, coherency = ?2, version = ?3, updated_at = ?4 WHERE id = ?5",
            params![
                snapshot.code,
                serde_json::to_string(&snapshot.coherency)?,
                snapshot_version,
                now.to_rfc3339(),
                id,
            ],
        )?;
        tx.commit()?;

        let mut restored = current;
        restored.code = snapshot.code;
        restored.coherency = snapshot.coherency;
        restored.version = snapshot_version;
        restored.updated_at = now;
        Ok(restored)
    }

    /// Optimistic-concurrency update: `expected_version` must match the
    /// stored version or the call fails with `StaleVersion` and no write
    /// occurs. On success the prior code/coherency is archived into the
    /// version-history ring, trimmed to `version_history_depth` entries.
    pub fn update(
        &self,
        id: &str,
        expected_version: u32,
        new_code: String,
        new_coherency: CoherencyRecord,
    ) -> Result<Pattern> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let current = load_pattern(&tx, id)?.ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if current.version != expected_version {
            return Err(StoreError::StaleVersion {
                expected: expected_version,
                actual: current.version,
            });
        }

        let now = Utc::now();
        let next_version = current.version + 1;
        tx.execute(
            "INSERT INTO pattern_versions (pattern_id, version, code, coherency, recorded_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                id,
                current.version,
                current.code,
                serde_json::to_string(&current.coherency)?,
                current.updated_at.to_rfc3339(),
            ],
        )?;
        trim_version_history(&tx, id, self.version_history_depth)?;

        tx.execute(
            "UPDATE patterns SET code = ?1, coherency = ?2, version = ?3, updated_at = ?4 WHERE id = ?5",
            params![
                new_code,
                serde_json::to_string(&new_coherency)?,
                next_version,
                now.to_rfc3339(),
                id,
            ],
        )?;
        tx.commit()?;

        let mut updated = current;
        updated.version = next_version;
        updated.updated_at = now;
        Ok(updated)
    }

    /// Restores a pattern's code/coherency to a prior version kept in the
    /// history ring, recording the restoration as a new version (never
    /// mutating history in place, so the ring stays an audit trail).
    pub fn rollback(&self, id: &str, to_version: u32) -> Result<Pattern> {
        info!(id = %id, to_version, "PatternStore::rollback");
        let snapshot = {
            let conn = self.conn.lock().unwrap();
            load_snapshot(&conn, id, to_version)?
                .ok_or_else(|| StoreError::NotFound(format!("{id}@v{to_version}")))?
        };
        let current = self.get(id)?;
        self.update(id, current.version, snapshot.code, snapshot.coherency)
    }

    pub fn version_history(&self, id: &str) -> Result<Vec<PatternSnapshot>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT version, code, coherency, recorded_at FROM pattern_versions
             WHERE pattern_id = ?1 ORDER BY version DESC",
        )?;
        let rows = stmt
            .query_map(params![id], |r| {
                let coherency_json: String = r.get(2)?;
                let recorded_at: String = r.get(3)?;
                Ok((r.get::<_, u32>(0)?, r.get::<_, String>(1)?, coherency_json, recorded_at))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter()
            .map(|(version, code, coherency_json, recorded_at)| {
                Ok(PatternSnapshot {
                    version,
                    code,
                    coherency: serde_json::from_str(&coherency_json)?,
                    recorded_at: recorded_at
                        .parse()
                        .map_err(|e: chrono::ParseError| StoreError::Config(e.to_string()))?,
                })
            })
            .collect()
    }

    pub fn record_usage(&self, id: &str, succeeded: bool) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let mut usage = load_usage(&conn, id)?.ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        usage.times_applied += 1;
        if succeeded {
            usage.times_succeeded += 1;
        }
        conn.execute(
            "UPDATE patterns SET usage = ?1 WHERE id = ?2",
            params![serde_json::to_string(&usage)?, id],
        )?;
        Ok(())
    }

    pub fn record_bug(&self, id: &str, description: String) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let mut bugs = load_bugs(&conn, id)?.ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        bugs.push(BugReport {
            reported_at: Utc::now(),
            description,
        });
        conn.execute(
            "UPDATE patterns SET bugs = ?1 WHERE id = ?2",
            params![serde_json::to_string(&bugs)?, id],
        )?;
        Ok(())
    }

    /// Replaces a pattern's tag set. Tags are metadata, not versioned
    /// content, so this does not bump `version` or archive a history entry.
    pub fn retag(&self, id: &str, tags: &[String]) -> Result<Pattern> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        if load_pattern(&tx, id)?.is_none() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        replace_tags(&tx, id, tags)?;
        let now = Utc::now();
        tx.execute(
            "UPDATE patterns SET updated_at = ?1 WHERE id = ?2",
            params![now.to_rfc3339(), id],
        )?;
        tx.commit()?;
        load_pattern(&conn, id)?.ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Flags a pattern retired: excluded from `iter`/`recent` from this
    /// point on, but never deleted (old versions stay rollback-able).
    pub fn retire(&self, id: &str) -> Result<()> {
        warn!(id = %id, "PatternStore::retire");
        let conn = self.conn.lock().unwrap();
        let affected = conn.execute("UPDATE patterns SET retired = 1 WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

fn insert_pattern_row(conn: &Connection, p: &Pattern) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO patterns
            (id, name, language, code, description, test_code, fingerprint, coherency, usage, bugs, provenance, lineage_parent, version, retired, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
        params![
            p.id,
            p.name,
            p.language,
            p.code,
            p.description,
            p.test_code,
            p.fingerprint,
            serde_json::to_string(&p.coherency).unwrap(),
            serde_json::to_string(&p.usage).unwrap(),
            serde_json::to_string(&p.bugs).unwrap(),
            p.provenance.as_ref().map(|prov| serde_json::to_string(prov).unwrap()),
            p.lineage_parent,
            p.version,
            p.retired as i32,
            p.created_at.to_rfc3339(),
            p.updated_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

fn replace_tags(conn: &Connection, id: &str, tags: &[String]) -> rusqlite::Result<()> {
    conn.execute("DELETE FROM pattern_tags WHERE pattern_id = ?1", params![id])?;
    for tag in tags {
        conn.execute(
            "INSERT OR IGNORE INTO pattern_tags (pattern_id, tag) VALUES (?1, ?2)",
            params![id, tag],
        )?;
    }
    Ok(())
}

#[allow(clippy::type_complexity)]
fn load_pattern(conn: &Connection, id: &str) -> Result<Option<Pattern>> {
    let row = conn
        .query_row(
            "SELECT id, name, language, code, description, test_code, fingerprint, coherency, usage, bugs, provenance, lineage_parent, version, retired, created_at, updated_at
             FROM patterns WHERE id = ?1",
            params![id],
            |r| {
                Ok((
                    r.get::<_, String>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, String>(2)?,
                    r.get::<_, String>(3)?,
                    r.get::<_, String>(4)?,
                    r.get::<_, Option<String>>(5)?,
                    r.get::<_, String>(6)?,
                    r.get::<_, String>(7)?,
                    r.get::<_, String>(8)?,
                    r.get::<_, String>(9)?,
                    r.get::<_, Option<String>>(10)?,
                    r.get::<_, Option<String>>(11)?,
                    r.get::<_, u32>(12)?,
                    r.get::<_, i32>(13)?,
                    r.get::<_, String>(14)?,
                    r.get::<_, String>(15)?,
                ))
            },
        )
        .optional()?;

    let Some((
        id,
        name,
        language,
        code,
        description,
        test_code,
        fingerprint,
        coherency,
        usage,
        bugs,
        provenance,
        lineage_parent,
        version,
        retired,
        created_at,
        updated_at,
    )) = row
    else {
        return Ok(None);
    };

    let mut stmt = conn.prepare("SELECT tag FROM pattern_tags WHERE pattern_id = ?1 ORDER BY tag ASC")?;
    let tags = stmt
        .query_map(params![id], |r| r.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(Some(Pattern {
        id,
        name,
        language,
        tags,
        code,
        description,
        test_code,
        fingerprint,
        coherency: serde_json::from_str(&coherency)?,
        usage: serde_json::from_str(&usage)?,
        bugs: serde_json::from_str(&bugs)?,
        provenance: provenance
            .map(|p| serde_json::from_str::<Provenance>(&p))
            .transpose()?,
        lineage_parent,
        version,
        retired: retired != 0,
        created_at: created_at
            .parse()
            .map_err(|e: chrono::ParseError| StoreError::Config(e.to_string()))?,
        updated_at: updated_at
            .parse()
            .map_err(|e: chrono::ParseError| StoreError::Config(e.to_string()))?,
    }))
}

fn load_usage(conn: &Connection, id: &str) -> Result<Option<UsageStats>> {
    let usage: Option<String> = conn
        .query_row("SELECT usage FROM patterns WHERE id = ?1", params![id], |r| r.get(0))
        .optional()?;
    usage.map(|u| serde_json::from_str(&u).map_err(StoreError::from)).transpose()
}

fn load_bugs(conn: &Connection, id: &str) -> Result<Option<Vec<BugReport>>> {
    let bugs: Option<String> = conn
        .query_row("SELECT bugs FROM patterns WHERE id = ?1", params![id], |r| r.get(0))
        .optional()?;
    bugs.map(|b| serde_json::from_str(&b).map_err(StoreError::from)).transpose()
}

fn load_snapshot(conn: &Connection, id: &str, version: u32) -> Result<Option<PatternSnapshot>> {
    conn.query_row(
        "SELECT version, code, coherency, recorded_at FROM pattern_versions
         WHERE pattern_id = ?1 AND version = ?2",
        params![id, version],
        |r| {
            let coherency_json: String = r.get(2)?;
            let recorded_at: String = r.get(3)?;
            Ok((r.get::<_, u32>(0)?, r.get::<_, String>(1)?, coherency_json, recorded_at))
        },
    )
    .optional()?
    .map(|(version, code, coherency_json, recorded_at)| {
        Ok(PatternSnapshot {
            version,
            code,
            coherency: serde_json::from_str(&coherency_json)?,
            recorded_at: recorded_at
                .parse()
                .map_err(|e: chrono::ParseError| StoreError::Config(e.to_string()))?,
        })
    })
    .transpose()
}

fn trim_version_history(conn: &Connection, id: &str, depth: u32) -> rusqlite::Result<()> {
    conn.execute(
        "DELETE FROM pattern_versions WHERE pattern_id = ?1 AND version NOT IN (
             SELECT version FROM pattern_versions WHERE pattern_id = ?1 ORDER BY version DESC LIMIT ?2
         )",
        params![id, depth],
    )?;
    Ok(())
}

fn map_unique_violation(err: rusqlite::Error, name: &str) -> StoreError {
    if let rusqlite::Error::SqliteFailure(e, _) = &err {
        if e.code == rusqlite::ErrorCode::ConstraintViolation {
            return StoreError::DuplicateName(name.to_string());
        }
    }
    StoreError::from(err)
}
