//! Typed record definitions for every kind stored in the entry namespace.
//!
//! Field names serialize as camelCase and timestamps as RFC 3339, matching the
//! JSON the browser client reads and writes.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A text journal entry, one per calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    #[serde(default)]
    pub content: String,
    /// Short AI-generated phrase shown on the dashboard instead of the content.
    #[serde(default)]
    pub summary: Option<String>,
    /// Absent on legacy entries that were stored as a bare string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl JournalEntry {
    /// Legacy journal values were bare strings holding only the content.
    pub fn from_legacy(content: String) -> Self {
        Self {
            content,
            summary: None,
            updated_at: None,
        }
    }
}

/// Raw audio plus its MIME type. Serialized as base64 so it fits in a JSON value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioBlob {
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceNote {
    pub audio: AudioBlob,
    pub summary: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapsuleSubtype {
    Freeform,
    Guided,
}

/// Informational only. Recomputed from `unlock_date` every time a capsule is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapsuleStatus {
    Locked,
    Unlocked,
}

impl CapsuleStatus {
    pub fn at(unlock_date: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if now >= unlock_date {
            Self::Unlocked
        } else {
            Self::Locked
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuidedAnswer {
    pub question: String,
    pub answer: String,
}

/// Freeform capsules hold one text block; guided ones an ordered list of answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CapsuleContent {
    Freeform(String),
    Guided(Vec<GuidedAnswer>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeCapsule {
    pub subtype: CapsuleSubtype,
    pub content: CapsuleContent,
    pub created_at: DateTime<Utc>,
    pub unlock_date: DateTime<Utc>,
    pub status: CapsuleStatus,
    pub summary: String,
}

impl TimeCapsule {
    pub fn is_unlockable(&self, now: DateTime<Utc>) -> bool {
        now >= self.unlock_date
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Takeaway {
    pub id: i64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub title: String,
    pub author: String,
    #[serde(default, with = "lenient_date")]
    pub started_date: Option<NaiveDate>,
    #[serde(default, with = "lenient_date")]
    pub finished_date: Option<NaiveDate>,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub current_page: u32,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub takeaways: Vec<Takeaway>,
    /// Weak reference to a `folder-` key.
    #[serde(default)]
    pub folder_id: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Book {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            started_date: None,
            finished_date: None,
            cover_url: None,
            total_pages: 0,
            current_page: 0,
            notes: String::new(),
            takeaways: Vec::new(),
            folder_id: None,
            category: None,
            created_at: None,
        }
    }

    /// The date used by the `recent` bookshelf sort.
    pub fn recent_date(&self) -> Option<NaiveDate> {
        self.finished_date.or(self.started_date)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A decoded value together with the store key it lives under.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Keyed<T> {
    pub key: String,
    #[serde(flatten)]
    pub value: T,
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

/// Dates written by the browser are `YYYY-MM-DD`, an empty string for "not set",
/// or occasionally a full ISO timestamp. Only the calendar date is kept.
mod lenient_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        date: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => serializer.serialize_str(&d.format("%Y-%m-%d").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        let Some(raw) = raw else { return Ok(None) };
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        let day = raw.get(..10).unwrap_or(raw);
        NaiveDate::parse_from_str(day, "%Y-%m-%d")
            .map(Some)
            .map_err(serde::de::Error::custom)
    }
}
