//! Device-local preferences kept outside the entry namespace: the theme and the
//! daily prompt cache.

use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct Preferences {
    db: Arc<Mutex<Connection>>,
}

impl Preferences {
    pub(crate) fn new(db: Arc<Mutex<Connection>>) -> Self {
        Self { db }
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let conn = self
            .db
            .lock()
            .map_err(|e| anyhow::anyhow!("db lock poisoned: {e}"))?;
        let raw: Option<String> = conn
            .query_row(
                "SELECT value FROM preferences WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        drop(conn);

        Ok(raw.map(|text| serde_json::from_str(&text)).transpose()?)
    }

    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let text = serde_json::to_string(value)?;
        let conn = self
            .db
            .lock()
            .map_err(|e| anyhow::anyhow!("db lock poisoned: {e}"))?;
        conn.execute(
            "INSERT OR REPLACE INTO preferences (key, value) VALUES (?1, ?2)",
            params![key, text],
        )?;
        Ok(())
    }
}
