//! Daily text entries: one `journal-YYYY-MM-DD` record per calendar day.
//!
//! Content and summary are written by different debounced tasks, so each writer
//! re-reads the record and carries the *other* field forward from what is stored
//! rather than from a cached copy.

pub mod editor;

use anyhow::Result;
use chrono::{NaiveDate, Utc};

use crate::ai::helpers::generate_summary;
use crate::ai::Generator;
use crate::records::keys::journal_key;
use crate::records::{JournalEntry, Record};
use crate::store::EntryStore;

pub use editor::{EditorSession, EditorTimings};

/// The entry for `date`, if one exists. Legacy bare-string values come back with
/// `summary: None`.
pub fn load_entry(store: &EntryStore, date: NaiveDate) -> Result<Option<JournalEntry>> {
    match store.load(&journal_key(date))? {
        Some(Record::Journal(entry)) => Ok(Some(entry)),
        Some(other) => anyhow::bail!("expected a journal record, found {}", other.kind()),
        None => Ok(None),
    }
}

/// Write `content`, keeping whatever summary is currently stored.
pub fn save_content(store: &EntryStore, date: NaiveDate, content: &str) -> Result<JournalEntry> {
    let summary = load_entry(store, date)?.and_then(|e| e.summary);
    let entry = JournalEntry {
        content: content.to_string(),
        summary,
        updated_at: Some(Utc::now()),
    };
    store.save(&journal_key(date), &Record::Journal(entry.clone()))?;
    Ok(entry)
}

/// Write `summary`, keeping whatever content is currently stored.
///
/// Returns `None` without writing if the entry no longer exists (deleted while the
/// summary was being generated).
pub fn save_summary(
    store: &EntryStore,
    date: NaiveDate,
    summary: &str,
) -> Result<Option<JournalEntry>> {
    let Some(current) = load_entry(store, date)? else {
        tracing::debug!(%date, "entry gone before summary landed, dropping it");
        return Ok(None);
    };
    let entry = JournalEntry {
        content: current.content,
        summary: Some(summary.to_string()),
        updated_at: Some(Utc::now()),
    };
    store.save(&journal_key(date), &Record::Journal(entry.clone()))?;
    Ok(Some(entry))
}

/// Generate and store a fresh summary for the stored content of `date`.
///
/// Always regenerates, replacing any existing summary.
pub async fn summarize(
    store: &EntryStore,
    generator: &dyn Generator,
    date: NaiveDate,
) -> Result<Option<String>> {
    let Some(entry) = load_entry(store, date)? else {
        return Ok(None);
    };
    let Some(summary) = generate_summary(generator, &entry.content).await else {
        return Ok(None);
    };
    save_summary(store, date, &summary)?;
    Ok(Some(summary))
}

/// Remove the entry for `date`. Callers confirm with the user first.
pub fn delete_entry(store: &EntryStore, date: NaiveDate) -> Result<()> {
    store.delete(&journal_key(date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn legacy_string_loads_with_null_summary() {
        let store = EntryStore::in_memory().unwrap();
        store.set("journal-2024-01-01", &json!("dear diary")).unwrap();

        let entry = load_entry(&store, day()).unwrap().unwrap();
        assert_eq!(entry.content, "dear diary");
        assert_eq!(entry.summary, None);
    }

    #[test]
    fn content_save_keeps_stored_summary() {
        let store = EntryStore::in_memory().unwrap();
        save_content(&store, day(), "first draft").unwrap();
        save_summary(&store, day(), "quiet start").unwrap();
        save_content(&store, day(), "second draft").unwrap();

        let entry = load_entry(&store, day()).unwrap().unwrap();
        assert_eq!(entry.content, "second draft");
        assert_eq!(entry.summary.as_deref(), Some("quiet start"));
    }

    #[test]
    fn summary_save_upgrades_legacy_entry() {
        let store = EntryStore::in_memory().unwrap();
        store.set("journal-2024-01-01", &json!("old text")).unwrap();
        save_summary(&store, day(), "old days").unwrap();

        let value = store.get("journal-2024-01-01").unwrap().unwrap();
        assert_eq!(value["content"], "old text");
        assert_eq!(value["summary"], "old days");
    }

    #[test]
    fn summary_for_deleted_entry_is_dropped() {
        let store = EntryStore::in_memory().unwrap();
        assert!(save_summary(&store, day(), "ghost").unwrap().is_none());
        assert!(store.keys().unwrap().is_empty());
    }
}
