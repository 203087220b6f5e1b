//! Embedded relational store for patterns (SPEC_FULL.md §3, §6 Pattern
//! Store). Backed by rusqlite (bundled SQLite), with one row per pattern,
//! a side table for tags, and a version-history ring used for rollback.

mod config;
mod errors;
mod record;
mod schema;
mod store;

pub use config::StoreConfig;
pub use errors::{Result, StoreError};
pub use record::{BugReport, Pattern, PatternFilter, PatternSnapshot, Provenance, UsageStats};
pub use store::PatternStore;
