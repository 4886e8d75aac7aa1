use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

use super::open_store;
use crate::config::TtylConfig;
use crate::records::{Keyed, Record, RecordKind};

/// Export format: every decodable record, keyed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportData {
    exported_at: DateTime<Utc>,
    entries: Vec<Keyed<Record>>,
}

/// Export all records as pretty JSON to `output`, or stdout when absent.
pub fn export(config: &TtylConfig, output: Option<&Path>) -> Result<()> {
    let store = open_store(config)?;
    let mut entries = store.scan(&RecordKind::ALL)?;
    entries.sort_by(|a, b| a.key.cmp(&b.key));

    let data = ExportData {
        exported_at: Utc::now(),
        entries,
    };
    let json = serde_json::to_string_pretty(&data)?;

    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("Exported {} entries to {}", data.entries.len(), path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
