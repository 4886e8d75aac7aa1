//! Key construction for each record kind.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

use super::RecordKind;

/// `journal-YYYY-MM-DD`
pub fn journal_key(date: NaiveDate) -> String {
    format!("{}{}", RecordKind::Journal.prefix(), date.format("%Y-%m-%d"))
}

/// `voice-` followed by the creation timestamp with `:` and `.` replaced by `-`,
/// e.g. `voice-2024-03-01T09-30-12-345Z`.
pub fn voice_key(created_at: DateTime<Utc>) -> String {
    let stamp = created_at
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("{}{stamp}", RecordKind::Voice.prefix())
}

/// `<prefix><epoch millis>` for capsules, books, and folders.
pub fn timestamp_key(kind: RecordKind, millis: i64) -> String {
    format!("{}{millis}", kind.prefix())
}
