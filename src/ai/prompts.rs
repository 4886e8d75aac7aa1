//! Two "grounded" journaling prompts per calendar day, cached in preferences.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{strip_code_fences, GenerateRequest, Generator};
use crate::store::Preferences;

const CACHE_KEY_PREFIX: &str = "daily_prompts_";

const DAILY_PROMPTS_PROMPT: &str = "Generate 2 distinct 'Grounded' journal prompts for today.\n\
     Both should be simple, check-in style, or gratitude-focused. Avoid random/wildcard hypothetical questions.\n\
     Keep them under 20 words. Tone: warm, vintage, lo-fi, relaxed.\n\
     Output strictly as a JSON object with keys 'option1' and 'option2'. Do not include markdown formatting like ```json.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyPrompts {
    pub option1: String,
    pub option2: String,
}

impl DailyPrompts {
    fn new(option1: &str, option2: &str) -> Self {
        Self {
            option1: option1.into(),
            option2: option2.into(),
        }
    }

    /// Used when the reply parsed but didn't carry both prompts.
    pub fn incomplete_fallback() -> Self {
        Self::new(
            "What is one small thing you are grateful for today?",
            "How is your heart feeling right this moment?",
        )
    }

    /// Used when the request or parse failed outright.
    pub fn failure_fallback() -> Self {
        Self::new(
            "How are you feeling right now, really?",
            "What is bringing you peace today?",
        )
    }
}

#[derive(Deserialize)]
struct RawPrompts {
    option1: Option<String>,
    option2: Option<String>,
}

pub fn cache_key(day: NaiveDate) -> String {
    format!("{CACHE_KEY_PREFIX}{}", day.format("%Y-%m-%d"))
}

/// Today's prompts: cached copy if present, otherwise freshly generated.
///
/// Never fails. Only a complete generated pair is cached, so a fallback day retries
/// on the next call.
pub async fn daily_prompts(
    generator: &dyn Generator,
    prefs: &Preferences,
    today: NaiveDate,
) -> DailyPrompts {
    let key = cache_key(today);

    match prefs.get::<DailyPrompts>(&key) {
        Ok(Some(cached)) => return cached,
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, "failed to read cached prompts"),
    }

    tracing::info!(day = %today, "fetching new daily journal prompts");
    let reply = match generator.generate(&GenerateRequest::text(DAILY_PROMPTS_PROMPT)).await {
        Ok(reply) => reply,
        Err(e) => {
            tracing::warn!(error = %e, "failed to generate daily prompts");
            return DailyPrompts::failure_fallback();
        }
    };

    let raw: RawPrompts = match serde_json::from_str(strip_code_fences(&reply)) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(error = %e, "daily prompts reply was not JSON");
            return DailyPrompts::failure_fallback();
        }
    };

    let non_empty = |s: Option<String>| s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    let (Some(option1), Some(option2)) = (non_empty(raw.option1), non_empty(raw.option2)) else {
        return DailyPrompts::incomplete_fallback();
    };

    let prompts = DailyPrompts { option1, option2 };
    if let Err(e) = prefs.set(&key, &prompts) {
        tracing::warn!(error = %e, "failed to cache prompts");
    }
    prompts
}
