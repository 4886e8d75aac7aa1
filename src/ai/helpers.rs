//! Journal features built on a [`Generator`].
//!
//! Every helper swallows failures: errors are logged and turned into `None` (or the
//! caller's fallback) so views never need an AI-specific error branch.

use serde::Deserialize;
use std::future::Future;
use tokio_util::sync::CancellationToken;

use super::{strip_code_fences, AiError, GenerateRequest, Generator, InlineData};

/// Entries shorter than this are never summarized.
pub const MIN_SUMMARY_CHARS: usize = 10;

/// Title used when a voice note can't be titled.
pub const DEFAULT_VOICE_TITLE: &str = "voice note";

/// Race `fut` against `token`; a cancelled token wins with [`AiError::Cancelled`].
pub async fn cancellable<T>(
    token: &CancellationToken,
    fut: impl Future<Output = Result<T, AiError>>,
) -> Result<T, AiError> {
    tokio::select! {
        _ = token.cancelled() => Err(AiError::Cancelled),
        result = fut => result,
    }
}

fn summary_prompt(text: &str) -> String {
    format!(
        "Summarize the following journal entry into a single, short, evocative phrase (3-6 words).\n\
         Style: lowercase, no period at end, cryptic but meaningful.\n\
         Example: \"long walk in the rain\" or \"coffee and quiet thoughts\".\n\n\
         Entry: \"{text}\""
    )
}

const AUDIO_TITLE_PROMPT: &str = "Listen to this voice note and give it a short, aesthetic title (3-5 words).\n\
     Style: lowercase, no punctuation.\n\
     Example: \"rainy day thoughts\" or \"idea for a book\".";

const COVER_SCAN_PROMPT: &str = "Extract the exact book title and author from this image. \
     Return a raw JSON object with keys 'title' and 'author'. Do not include markdown formatting \
     or ANY other text. If no book is found, return {\"title\": \"\", \"author\": \"\"}.";

fn category_prompt(title: &str, author: &str) -> String {
    format!(
        "Give a single broad bookshelf category (1-3 words, e.g. \"Fiction\", \"Science\", \
         \"Self Help\") for the book \"{title}\" by {author}. Reply with the category only."
    )
}

/// Trim whitespace, wrapping quotes, and trailing punctuation from a one-line reply.
fn clean_phrase(raw: &str) -> Option<String> {
    let line = strip_code_fences(raw).lines().next().unwrap_or_default();
    let cleaned = line
        .trim()
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '`')
        .trim_end_matches(['.', '!'])
        .trim();
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}

/// Short lowercase phrase summarizing a journal entry. `None` for short text or on failure.
pub async fn generate_summary(generator: &dyn Generator, text: &str) -> Option<String> {
    if text.trim().chars().count() < MIN_SUMMARY_CHARS {
        return None;
    }

    match generator.generate(&GenerateRequest::text(summary_prompt(text))).await {
        Ok(reply) => clean_phrase(&reply).map(|s| s.to_lowercase()),
        Err(e) => {
            tracing::warn!(error = %e, "summary generation failed");
            None
        }
    }
}

/// Short lowercase title for a voice recording. `None` on failure; callers fall back
/// to [`DEFAULT_VOICE_TITLE`].
pub async fn generate_audio_title(
    generator: &dyn Generator,
    audio: &[u8],
    mime_type: &str,
) -> Option<String> {
    if audio.is_empty() {
        return None;
    }

    let request = GenerateRequest::text(AUDIO_TITLE_PROMPT)
        .with_audio(InlineData::from_bytes(audio, mime_type));

    match generator.generate(&request).await {
        Ok(reply) => clean_phrase(&reply).map(|s| s.to_lowercase()),
        Err(e) => {
            tracing::warn!(error = %e, "audio title generation failed");
            None
        }
    }
}

/// Single category label used to file a book into a folder.
pub async fn suggest_book_category(
    generator: &dyn Generator,
    title: &str,
    author: &str,
) -> Option<String> {
    match generator
        .generate(&GenerateRequest::text(category_prompt(title, author)))
        .await
    {
        Ok(reply) => clean_phrase(&reply),
        Err(e) => {
            tracing::warn!(error = %e, title, "category suggestion failed");
            None
        }
    }
}

/// Title and author read off a photographed cover.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScannedBook {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
}

/// Identify a book from a JPEG of its cover. `None` when nothing was recognised.
pub async fn scan_book_cover(generator: &dyn Generator, jpeg: &[u8]) -> Option<ScannedBook> {
    let request =
        GenerateRequest::text(COVER_SCAN_PROMPT).with_image(InlineData::from_bytes(jpeg, "image/jpeg"));

    let reply = match generator.generate(&request).await {
        Ok(reply) => reply,
        Err(e) => {
            tracing::warn!(error = %e, "cover scan failed");
            return None;
        }
    };

    match serde_json::from_str::<ScannedBook>(strip_code_fences(&reply)) {
        Ok(book) if !book.title.trim().is_empty() || !book.author.trim().is_empty() => Some(ScannedBook {
            title: book.title.trim().to_string(),
            author: book.author.trim().to_string(),
        }),
        Ok(_) => None,
        Err(e) => {
            tracing::warn!(error = %e, "cover scan reply was not JSON");
            None
        }
    }
}
