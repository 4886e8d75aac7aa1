//! The home listing: journal entries, voice notes and capsules, newest first.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::records::{journal_date, Record, RecordKind};
use crate::store::EntryStore;

const PREVIEW_CHARS: usize = 100;
const VOICE_FALLBACK: &str = "Voice Note";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardItem {
    pub key: String,
    pub kind: RecordKind,
    /// `createdAt` for voice notes and capsules; midnight UTC of the key's day for journals.
    pub date: DateTime<Utc>,
    pub preview: String,
    pub is_summary: bool,
    pub locked: bool,
}

fn truncate_preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

fn item(key: String, record: Record) -> Option<DashboardItem> {
    let kind = record.kind();
    let (date, preview, is_summary, locked) = match record {
        Record::Journal(entry) => {
            let date = journal_date(&key).ok()?.and_time(chrono::NaiveTime::MIN).and_utc();
            match entry.summary.filter(|s| !s.trim().is_empty()) {
                Some(summary) => (date, summary, true, false),
                None => (date, truncate_preview(&entry.content), false, false),
            }
        }
        Record::Voice(note) => {
            let preview = if note.summary.trim().is_empty() {
                VOICE_FALLBACK.to_string()
            } else {
                note.summary
            };
            (note.created_at, preview, true, false)
        }
        Record::Capsule(capsule) => (
            capsule.created_at,
            capsule.summary,
            true,
            capsule.status == crate::records::CapsuleStatus::Locked,
        ),
        Record::Book(_) | Record::Folder(_) => return None,
    };
    Some(DashboardItem {
        key,
        kind,
        date,
        preview,
        is_summary,
        locked,
    })
}

/// All dashboard items sorted by date descending, key as tie-break.
pub fn list(store: &EntryStore) -> Result<Vec<DashboardItem>> {
    let mut items: Vec<_> = store
        .scan(&[RecordKind::Journal, RecordKind::Voice, RecordKind::Capsule])?
        .into_iter()
        .filter_map(|r| item(r.key, r.value))
        .collect();
    items.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.key.cmp(&b.key)));
    Ok(items)
}

/// Replace the summary of a journal entry or voice note. Blank names are ignored and
/// return `false`; legacy journal strings are upgraded to the object form.
pub fn rename(store: &EntryStore, key: &str, name: &str) -> Result<bool> {
    let name = name.trim();
    if name.is_empty() {
        return Ok(false);
    }
    let record = match store.load(key)? {
        Some(Record::Journal(mut entry)) => {
            entry.summary = Some(name.to_string());
            Record::Journal(entry)
        }
        Some(Record::Voice(mut note)) => {
            note.summary = name.to_string();
            Record::Voice(note)
        }
        Some(other) => anyhow::bail!("{} entries cannot be renamed", other.kind()),
        None => anyhow::bail!("no entry at {key}"),
    };
    store.save(key, &record)?;
    Ok(true)
}

/// Delete any dashboard entry. Callers confirm first.
pub fn delete(store: &EntryStore, key: &str) -> Result<()> {
    store.delete(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn previews_follow_summary_then_content() {
        let store = EntryStore::in_memory().unwrap();
        let long = "x".repeat(150);
        store.set("journal-2024-01-02", &json!(long)).unwrap();
        store
            .set("journal-2024-01-03", &json!({"content": "short", "summary": "quiet morning"}))
            .unwrap();
        store.set("journal-2024-01-01", &json!({"content": "tiny"})).unwrap();

        let items = list(&store).unwrap();
        let keys: Vec<_> = items.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(keys, ["journal-2024-01-03", "journal-2024-01-02", "journal-2024-01-01"]);

        assert_eq!(items[0].preview, "quiet morning");
        assert!(items[0].is_summary);
        assert_eq!(items[1].preview, format!("{}...", "x".repeat(100)));
        assert!(!items[1].is_summary);
        assert_eq!(items[2].preview, "tiny");
    }

    #[test]
    fn mixed_kinds_order_by_effective_date() {
        let store = EntryStore::in_memory().unwrap();
        store.set("journal-2024-01-03", &json!({"content": "midnight of the third"})).unwrap();
        store.set("journal-2024-01-02", &json!({"content": "midnight of the second"})).unwrap();
        store
            .set(
                "voice-2024-01-02T23-00-00-000Z",
                &json!({
                    "audio": {"data": "AAE=", "mimeType": "audio/webm"},
                    "summary": "late walk",
                    "createdAt": "2024-01-02T23:00:00Z"
                }),
            )
            .unwrap();
        // The key suffix would sort first by itself; createdAt decides.
        store
            .set(
                "time-capsule-1",
                &json!({
                    "subtype": "freeform", "content": "hello", "createdAt": "2024-01-03T09:00:00Z",
                    "unlockDate": "2999-01-01T00:00:00Z", "status": "locked",
                    "summary": "Time Capsule (Freeform)"
                }),
            )
            .unwrap();

        let items = list(&store).unwrap();
        let keys: Vec<_> = items.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(
            keys,
            [
                "time-capsule-1",
                "journal-2024-01-03",
                "voice-2024-01-02T23-00-00-000Z",
                "journal-2024-01-02",
            ]
        );
        assert!(items[0].locked);
        assert_eq!(items[0].kind, RecordKind::Capsule);
    }

    #[test]
    fn voice_without_summary_uses_fallback() {
        let store = EntryStore::in_memory().unwrap();
        store
            .set(
                "voice-2024-01-05T10-00-00-000Z",
                &json!({
                    "audio": {"data": "AAE=", "mimeType": "audio/webm"},
                    "summary": "",
                    "createdAt": "2024-01-05T10:00:00Z"
                }),
            )
            .unwrap();
        let items = list(&store).unwrap();
        assert_eq!(items[0].preview, "Voice Note");
        assert_eq!(items[0].kind, RecordKind::Voice);
    }

    #[test]
    fn rename_upgrades_legacy_strings_and_ignores_blank() {
        let store = EntryStore::in_memory().unwrap();
        store.set("journal-2024-01-02", &json!("old text")).unwrap();

        assert!(!rename(&store, "journal-2024-01-02", "   ").unwrap());
        assert_eq!(store.get("journal-2024-01-02").unwrap(), Some(json!("old text")));

        assert!(rename(&store, "journal-2024-01-02", "new name").unwrap());
        let stored = store.get("journal-2024-01-02").unwrap().unwrap();
        assert_eq!(stored["content"], "old text");
        assert_eq!(stored["summary"], "new name");
    }

    #[test]
    fn books_do_not_appear() {
        let store = EntryStore::in_memory().unwrap();
        store
            .set("book-1", &json!({"title": "Dune", "author": "Herbert"}))
            .unwrap();
        assert!(list(&store).unwrap().is_empty());
    }
}
