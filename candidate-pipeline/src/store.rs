//! SQLite-backed store for in-flight candidates, separate from the
//! [`pattern_store::PatternStore`] (which only ever holds `Proven`
//! patterns). Grounded on the same rusqlite idiom as `pattern-store`.

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use std::sync::Mutex;
use tracing::debug;

use crate::errors::{PipelineError, Result};
use crate::record::{CandidateRecord, CandidateState};

pub struct CandidateStore {
    conn: Mutex<Connection>,
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS candidates (
    id               TEXT PRIMARY KEY,
    state            TEXT NOT NULL,
    generation_method TEXT NOT NULL,
    test_status      TEXT NOT NULL,
    code             TEXT NOT NULL,
    language         TEXT NOT NULL,
    description      TEXT NOT NULL DEFAULT '',
    tags             TEXT NOT NULL DEFAULT '[]',
    fingerprint      TEXT NOT NULL,
    coherency        TEXT NOT NULL,
    attempt_count    INTEGER NOT NULL,
    pattern_id       TEXT,
    created_at       TEXT NOT NULL,
    updated_at       TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_candidates_state ON candidates(state);
CREATE UNIQUE INDEX IF NOT EXISTS idx_candidates_fingerprint ON candidates(fingerprint);
";

impl CandidateStore {
    pub fn open(path: &std::path::Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Idempotent on identical content: a candidate with a fingerprint
    /// already on file is returned unchanged rather than reinserted, so a
    /// rejected candidate is never reattempted (SPEC_FULL.md §4.F failure
    /// semantics).
    pub fn put_if_new(&self, record: &CandidateRecord) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let exists: Option<String> = conn
            .query_row(
                "SELECT id FROM candidates WHERE fingerprint = ?1",
                params![record.fingerprint],
                |r| r.get(0),
            )
            .optional()?;
        if exists.is_some() {
            debug!(fingerprint = %record.fingerprint, "candidate_store::put_if_new skipped, fingerprint exists");
            return Ok(false);
        }
        insert(&conn, record)?;
        Ok(true)
    }

    pub fn get(&self, id: &str) -> Result<CandidateRecord> {
        let conn = self.conn.lock().unwrap();
        load(&conn, id)?.ok_or_else(|| PipelineError::NotFound(id.to_string()))
    }

    pub fn save(&self, record: &CandidateRecord) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE candidates SET state = ?1, generation_method = ?2, test_status = ?3, code = ?4,
             coherency = ?5, attempt_count = ?6, pattern_id = ?7, updated_at = ?8 WHERE id = ?9",
            params![
                serde_json::to_string(&record.state)?,
                serde_json::to_string(&record.generation_method)?,
                serde_json::to_string(&record.test_status)?,
                record.code,
                serde_json::to_string(&record.coherency)?,
                record.attempt_count,
                record.pattern_id,
                record.updated_at.to_rfc3339(),
                record.id,
            ],
        )?;
        Ok(())
    }

    /// Candidates eligible for the auto-promote sweep: `Candidate` state
    /// with `testStatus` in {synthesized, pending}, ordered by id for
    /// determinism, bounded by `limit`.
    pub fn list_promotable(&self, limit: usize) -> Result<Vec<CandidateRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id FROM candidates WHERE state = ?1 ORDER BY id ASC",
        )?;
        let ids: Vec<String> = stmt
            .query_map(params![serde_json::to_string(&CandidateState::Candidate)?], |r| r.get(0))?
            .collect::<rusqlite::Result<_>>()?;
        drop(stmt);
        let mut out = Vec::new();
        for id in ids {
            if out.len() >= limit {
                break;
            }
            if let Some(r) = load(&conn, &id)? {
                if matches!(
                    r.test_status,
                    crate::record::TestStatus::Synthesized | crate::record::TestStatus::Pending
                ) {
                    out.push(r);
                }
            }
        }
        Ok(out)
    }
}

fn insert(conn: &Connection, r: &CandidateRecord) -> Result<()> {
    conn.execute(
        "INSERT INTO candidates (id, state, generation_method, test_status, code, language, description, tags,
         fingerprint, coherency, attempt_count, pattern_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            r.id,
            serde_json::to_string(&r.state)?,
            serde_json::to_string(&r.generation_method)?,
            serde_json::to_string(&r.test_status)?,
            r.code,
            r.language,
            r.description,
            serde_json::to_string(&r.tags)?,
            r.fingerprint,
            serde_json::to_string(&r.coherency)?,
            r.attempt_count,
            r.pattern_id,
            r.created_at.to_rfc3339(),
            r.updated_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

fn load(conn: &Connection, id: &str) -> Result<Option<CandidateRecord>> {
    conn.query_row(
        "SELECT id, state, generation_method, test_status, code, language, description, tags, fingerprint,
         coherency, attempt_count, pattern_id, created_at, updated_at FROM candidates WHERE id = ?1",
        params![id],
        |r| {
            Ok((
                r.get::<_, String>(0)?,
                r.get::<_, String>(1)?,
                r.get::<_, String>(2)?,
                r.get::<_, String>(3)?,
                r.get::<_, String>(4)?,
                r.get::<_, String>(5)?,
                r.get::<_, String>(6)?,
                r.get::<_, String>(7)?,
                r.get::<_, String>(8)?,
                r.get::<_, String>(9)?,
                r.get::<_, u32>(10)?,
                r.get::<_, Option<String>>(11)?,
                r.get::<_, String>(12)?,
                r.get::<_, String>(13)?,
            ))
        },
    )
    .optional()?
    .map(
        |(id, state, generation_method, test_status, code, language, description, tags, fingerprint, coherency, attempt_count, pattern_id, created_at, updated_at)| {
            Ok(CandidateRecord {
                id,
                state: serde_json::from_str(&state)?,
                generation_method: serde_json::from_str(&generation_method)?,
                test_status: serde_json::from_str(&test_status)?,
                code,
                language,
                description,
                tags: serde_json::from_str(&tags)?,
                fingerprint,
                coherency: serde_json::from_str(&coherency)?,
                attempt_count,
                pattern_id,
                created_at: created_at
                    .parse()
                    .map_err(|e: chrono::ParseError| PipelineError::NotFound(e.to_string()))?,
                updated_at: updated_at
                    .parse()
                    .map_err(|e: chrono::ParseError| PipelineError::NotFound(e.to_string()))?,
            })
        },
    )
    .transpose()
}
