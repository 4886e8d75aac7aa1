//! Saving finished recordings as voice notes.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};

use crate::ai::helpers::{generate_audio_title, DEFAULT_VOICE_TITLE};
use crate::ai::Generator;
use crate::records::keys::voice_key;
use crate::records::{AudioBlob, Keyed, Record, VoiceNote};
use crate::store::EntryStore;

/// Title the recording and store it under a timestamp-derived `voice-` key.
///
/// Titling failures fall back to [`DEFAULT_VOICE_TITLE`]; an empty recording is
/// refused.
pub async fn save_voice_note(
    store: &EntryStore,
    generator: &dyn Generator,
    audio: AudioBlob,
    now: DateTime<Utc>,
) -> Result<Keyed<VoiceNote>> {
    anyhow::ensure!(!audio.data.is_empty(), "recording is empty");

    let summary = generate_audio_title(generator, &audio.data, &audio.mime_type)
        .await
        .unwrap_or_else(|| DEFAULT_VOICE_TITLE.to_string());

    let mut created_at = now;
    while store.get(&voice_key(created_at))?.is_some() {
        created_at += Duration::milliseconds(1);
    }
    let key = voice_key(created_at);

    let note = VoiceNote {
        audio,
        summary,
        created_at,
    };
    store.save(&key, &Record::Voice(note.clone()))?;
    tracing::info!(key = %key, title = %note.summary, bytes = note.audio.data.len(), "voice note saved");
    Ok(Keyed { key, value: note })
}
