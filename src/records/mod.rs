//! The tagged record model at the storage boundary.
//!
//! Every value in the entry store is one of five kinds, told apart only by the key
//! prefix. [`Record::decode`] is the single place that inspects a prefix and turns a
//! raw JSON value into the right variant; views never look at prefixes themselves.

pub mod keys;
pub mod types;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use types::{
    AudioBlob, Book, CapsuleContent, CapsuleStatus, CapsuleSubtype, Folder, GuidedAnswer,
    JournalEntry, Keyed, Takeaway, TimeCapsule, VoiceNote,
};

/// The five record kinds sharing the entry namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Journal,
    Voice,
    Capsule,
    Book,
    Folder,
}

impl RecordKind {
    pub const ALL: [RecordKind; 5] = [
        Self::Journal,
        Self::Voice,
        Self::Capsule,
        Self::Book,
        Self::Folder,
    ];

    /// Key prefix that tags this kind.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Journal => "journal-",
            Self::Voice => "voice-",
            Self::Capsule => "time-capsule-",
            Self::Book => "book-",
            Self::Folder => "folder-",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Journal => "journal",
            Self::Voice => "voice",
            Self::Capsule => "capsule",
            Self::Book => "book",
            Self::Folder => "folder",
        }
    }

    /// Classify a key by its prefix. `None` for keys outside the namespace.
    pub fn of_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| key.starts_with(kind.prefix()))
    }

    /// Does `key` carry this kind's prefix?
    pub fn owns(&self, key: &str) -> bool {
        key.starts_with(self.prefix())
    }

    /// The part of `key` after this kind's prefix.
    pub fn suffix<'a>(&self, key: &'a str) -> Option<&'a str> {
        key.strip_prefix(self.prefix())
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown record kind: {s}"))
    }
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("key {0:?} does not carry a known record prefix")]
    UnknownKind(String),

    #[error("journal key {0:?} is not a YYYY-MM-DD date")]
    BadJournalDate(String),

    #[error("record {key:?} is malformed: {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A decoded store value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
    Journal(JournalEntry),
    Voice(VoiceNote),
    Capsule(TimeCapsule),
    Book(Book),
    Folder(Folder),
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::Journal(_) => RecordKind::Journal,
            Self::Voice(_) => RecordKind::Voice,
            Self::Capsule(_) => RecordKind::Capsule,
            Self::Book(_) => RecordKind::Book,
            Self::Folder(_) => RecordKind::Folder,
        }
    }

    /// Decode `value` stored under `key`, evaluating capsule status against the wall clock.
    pub fn decode(key: &str, value: Value) -> Result<Self, RecordError> {
        Self::decode_at(key, value, Utc::now())
    }

    /// Decode `value` stored under `key`, evaluating capsule status at `now`.
    pub fn decode_at(key: &str, value: Value, now: DateTime<Utc>) -> Result<Self, RecordError> {
        let kind = RecordKind::of_key(key).ok_or_else(|| RecordError::UnknownKind(key.into()))?;
        let malformed = |source| RecordError::Malformed {
            key: key.to_string(),
            source,
        };

        let record = match kind {
            RecordKind::Journal => {
                journal_date(key)?;
                match value {
                    Value::String(content) => Self::Journal(JournalEntry::from_legacy(content)),
                    other => Self::Journal(serde_json::from_value(other).map_err(malformed)?),
                }
            }
            RecordKind::Voice => Self::Voice(serde_json::from_value(value).map_err(malformed)?),
            RecordKind::Capsule => {
                let mut capsule: TimeCapsule = serde_json::from_value(value).map_err(malformed)?;
                // Never trust the persisted status.
                capsule.status = CapsuleStatus::at(capsule.unlock_date, now);
                Self::Capsule(capsule)
            }
            RecordKind::Book => Self::Book(serde_json::from_value(value).map_err(malformed)?),
            RecordKind::Folder => Self::Folder(serde_json::from_value(value).map_err(malformed)?),
        };
        Ok(record)
    }

    /// Encode the record body (without the kind tag) for the store.
    pub fn encode(&self) -> Result<Value, RecordError> {
        let value = match self {
            Self::Journal(r) => serde_json::to_value(r)?,
            Self::Voice(r) => serde_json::to_value(r)?,
            Self::Capsule(r) => serde_json::to_value(r)?,
            Self::Book(r) => serde_json::to_value(r)?,
            Self::Folder(r) => serde_json::to_value(r)?,
        };
        Ok(value)
    }
}

/// Parse the calendar date out of a `journal-YYYY-MM-DD` key.
pub fn journal_date(key: &str) -> Result<NaiveDate, RecordError> {
    RecordKind::Journal
        .suffix(key)
        .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
        .ok_or_else(|| RecordError::BadJournalDate(key.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn each_key_matches_exactly_one_prefix() {
        let keys = [
            "journal-2024-01-01",
            "voice-2024-01-01T10-00-00-000Z",
            "time-capsule-1704103200000",
            "book-1704103200000",
            "folder-1704103200000",
        ];
        for key in keys {
            let matching: Vec<_> = RecordKind::ALL
                .into_iter()
                .filter(|kind| kind.owns(key))
                .collect();
            assert_eq!(matching.len(), 1, "{key} matched {matching:?}");
        }
        assert_eq!(RecordKind::of_key("lofi_daily_prompts_2024-01-01"), None);
    }

    #[test]
    fn legacy_string_journal_decodes_with_null_summary() {
        let record = Record::decode("journal-2024-01-01", json!("a bare string")).unwrap();
        match record {
            Record::Journal(entry) => {
                assert_eq!(entry.content, "a bare string");
                assert_eq!(entry.summary, None);
            }
            other => panic!("expected journal, got {other:?}"),
        }
    }

    #[test]
    fn journal_key_must_be_a_date() {
        let err = Record::decode("journal-today", json!({"content": "x"})).unwrap_err();
        assert!(matches!(err, RecordError::BadJournalDate(_)));
    }

    #[test]
    fn unknown_prefix_is_rejected() {
        let err = Record::decode("theme", json!("modern")).unwrap_err();
        assert!(matches!(err, RecordError::UnknownKind(_)));
    }

    #[test]
    fn capsule_status_is_recomputed_on_decode() {
        let unlock = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let stored = json!({
            "subtype": "freeform",
            "content": "hello future",
            "createdAt": "2024-01-01T00:00:00Z",
            "unlockDate": "2024-06-01T00:00:00Z",
            "status": "locked",
            "summary": "Time Capsule (Freeform)"
        });

        let after = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
        let Record::Capsule(capsule) =
            Record::decode_at("time-capsule-1704067200000", stored.clone(), after).unwrap()
        else {
            panic!("expected capsule");
        };
        assert_eq!(capsule.status, CapsuleStatus::Unlocked);
        assert_eq!(capsule.unlock_date, unlock);

        let before = Utc.with_ymd_and_hms(2024, 5, 31, 23, 59, 59).unwrap();
        let Record::Capsule(capsule) =
            Record::decode_at("time-capsule-1704067200000", stored, before).unwrap()
        else {
            panic!("expected capsule");
        };
        assert_eq!(capsule.status, CapsuleStatus::Locked);
    }

    #[test]
    fn malformed_value_reports_key() {
        let err = Record::decode("folder-1", json!({"nom": "x"})).unwrap_err();
        assert!(err.to_string().contains("folder-1"));
    }
}
