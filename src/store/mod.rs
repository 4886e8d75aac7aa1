//! The local entry store: one durable key-value table for every record kind.
//!
//! [`EntryStore`] exposes the four primitive operations (`get`, `set`, `delete`,
//! `keys`) over raw JSON values, plus typed helpers built on them. Listing is a
//! full-namespace scan filtered by key prefix; there is no secondary index.

pub mod preferences;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::records::keys::timestamp_key;
use crate::records::{Keyed, Record, RecordKind};

pub use preferences::Preferences;

/// Shared handle to the journal database.
///
/// Cloning is cheap; all clones share one connection. Every operation holds the
/// lock for a single statement, so concurrent `set`s on one key are last-write-wins.
#[derive(Clone)]
pub struct EntryStore {
    db: Arc<Mutex<Connection>>,
}

impl EntryStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
        }
    }

    /// Open (or create) the store at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(crate::db::open_database(path)?))
    }

    /// A throwaway in-memory store.
    pub fn in_memory() -> Result<Self> {
        Ok(Self::new(crate::db::open_memory_database()?))
    }

    /// Preferences live in the same database, in their own table.
    pub fn preferences(&self) -> Preferences {
        Preferences::new(Arc::clone(&self.db))
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.db
            .lock()
            .map_err(|e| anyhow::anyhow!("db lock poisoned: {e}"))
    }

    // ── Primitive operations ─────────────────────────────────────────────────

    /// Last written value for `key`, or `None` if absent.
    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        let conn = self.conn()?;
        let raw: Option<String> = conn
            .query_row(
                "SELECT value FROM entries WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        raw.map(|text| {
            serde_json::from_str::<Value>(&text)
                .with_context(|| format!("stored value for {key} is not JSON"))
        })
        .transpose()
    }

    /// Replace the whole value for `key`, creating it if absent.
    pub fn set(&self, key: &str, value: &Value) -> Result<()> {
        let text = serde_json::to_string(value)?;
        let now = Utc::now().to_rfc3339();
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO entries (key, value, updated_at) VALUES (?1, ?2, ?3) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, text, now],
        )?;
        tracing::debug!(key, bytes = text.len(), "entry written");
        Ok(())
    }

    /// Remove `key`. Deleting an absent key is not an error.
    pub fn delete(&self, key: &str) -> Result<()> {
        let conn = self.conn()?;
        let rows = conn.execute("DELETE FROM entries WHERE key = ?1", params![key])?;
        tracing::debug!(key, removed = rows > 0, "entry deleted");
        Ok(())
    }

    /// Every key currently stored, in no particular order.
    pub fn keys(&self) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT key FROM entries")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(keys)
    }

    // ── Typed helpers ────────────────────────────────────────────────────────

    /// Load and decode a single record.
    pub fn load(&self, key: &str) -> Result<Option<Record>> {
        match self.get(key)? {
            Some(value) => Ok(Some(Record::decode(key, value)?)),
            None => Ok(None),
        }
    }

    /// Encode and write a record under `key`.
    pub fn save(&self, key: &str, record: &Record) -> Result<()> {
        anyhow::ensure!(
            record.kind().owns(key),
            "refusing to store a {} record under {key}",
            record.kind()
        );
        self.set(key, &record.encode()?)
    }

    /// Scan the whole namespace and decode every record of the given kinds.
    ///
    /// Records that fail to load or decode are logged and skipped.
    pub fn scan(&self, kinds: &[RecordKind]) -> Result<Vec<Keyed<Record>>> {
        let keys: Vec<String> = self
            .keys()?
            .into_iter()
            .filter(|key| RecordKind::of_key(key).is_some_and(|kind| kinds.contains(&kind)))
            .collect();

        let mut records = Vec::with_capacity(keys.len());
        for key in keys {
            let value = match self.get(&key) {
                Ok(Some(value)) => value,
                // Deleted between keys() and get()
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "failed to read entry, skipping");
                    continue;
                }
            };
            match Record::decode(&key, value) {
                Ok(record) => records.push(Keyed { key, value: record }),
                Err(e) => tracing::warn!(key = %key, error = %e, "failed to decode entry, skipping"),
            }
        }
        Ok(records)
    }

    /// A fresh `<prefix><millis>` key for `kind`, bumping the millisecond until unused.
    pub fn unique_key(&self, kind: RecordKind, now: DateTime<Utc>) -> Result<String> {
        let conn = self.conn()?;
        let mut millis = now.timestamp_millis();
        loop {
            let key = timestamp_key(kind, millis);
            let taken: bool = conn.query_row(
                "SELECT COUNT(*) > 0 FROM entries WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )?;
            if !taken {
                return Ok(key);
            }
            millis += 1;
        }
    }

    /// Number of stored entries per kind.
    pub fn count_by_kind(&self) -> Result<Vec<(RecordKind, usize)>> {
        let keys = self.keys()?;
        Ok(RecordKind::ALL
            .into_iter()
            .map(|kind| (kind, keys.iter().filter(|k| kind.owns(k)).count()))
            .collect())
    }

    /// Run a closure against the raw connection (health checks, exports).
    pub fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self.conn()?;
        f(&conn)
    }
}
