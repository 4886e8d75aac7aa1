//! Time capsules: sealing, unlock scheduling and gated viewing.
//!
//! A capsule moves `composing -> locked -> unlockable -> viewing`. Only the sealed
//! record is ever stored; `status` is projected from `unlock_date` on every read.

pub mod viewer;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rand::Rng;
use thiserror::Error;

use crate::records::{
    CapsuleContent, CapsuleStatus, CapsuleSubtype, GuidedAnswer, Keyed, Record, RecordKind,
    TimeCapsule,
};
use crate::store::EntryStore;

pub use viewer::{view, CapsuleView};

/// The fixed prompts of a guided capsule, in order.
pub const GUIDED_QUESTIONS: [&str; 5] = [
    "What is your biggest concern right now?",
    "What are you most excited about?",
    "Where do you see yourself when this unlocks?",
    "One piece of advice for your future self:",
    "Who are the most important people in your life right now?",
];

pub const RANDOM_MIN_DAYS: i64 = 90;
pub const RANDOM_MAX_DAYS: i64 = 365;
pub const PRESET_DAYS: i64 = 180;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CapsuleError {
    #[error("this capsule is locked until {}", unlock_date.format("%B %-d, %Y"))]
    Locked { unlock_date: DateTime<Utc> },

    #[error("answer every question before revealing ({missing} unanswered)")]
    Unanswered { missing: usize },

    #[error("a capsule needs some content before it can be sealed")]
    Empty,

    #[error("no question at position {0}")]
    NoSuchQuestion(usize),
}

/// How the unlock date is chosen when sealing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScheduleMode {
    /// A chosen calendar date, unlocking at 00:00 UTC.
    Fixed(NaiveDate),
    /// A uniformly random moment 90 to 365 days out.
    Random,
    #[default]
    Preset,
}

/// Unlock instant for `mode`, computed once at sealing time.
pub fn compute_unlock_date(
    mode: ScheduleMode,
    now: DateTime<Utc>,
    rng: &mut impl Rng,
) -> DateTime<Utc> {
    match mode {
        ScheduleMode::Fixed(date) => date.and_time(chrono::NaiveTime::MIN).and_utc(),
        ScheduleMode::Random => {
            let min_ms = RANDOM_MIN_DAYS * 86_400_000;
            let max_ms = RANDOM_MAX_DAYS * 86_400_000;
            now + Duration::milliseconds(rng.gen_range(min_ms..=max_ms))
        }
        ScheduleMode::Preset => now + Duration::days(PRESET_DAYS),
    }
}

/// What the user composed before sealing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Draft {
    Freeform(String),
    /// Answers for [`GUIDED_QUESTIONS`], by position. Missing trailing answers count
    /// as blank.
    Guided(Vec<String>),
}

impl Draft {
    fn into_content(self) -> Result<(CapsuleSubtype, CapsuleContent), CapsuleError> {
        match self {
            Draft::Freeform(text) => {
                if text.trim().is_empty() {
                    return Err(CapsuleError::Empty);
                }
                Ok((CapsuleSubtype::Freeform, CapsuleContent::Freeform(text)))
            }
            Draft::Guided(answers) => {
                if answers.iter().all(|a| a.trim().is_empty()) {
                    return Err(CapsuleError::Empty);
                }
                let pairs = GUIDED_QUESTIONS
                    .iter()
                    .enumerate()
                    .map(|(i, q)| GuidedAnswer {
                        question: q.to_string(),
                        answer: answers.get(i).cloned().unwrap_or_default(),
                    })
                    .collect();
                Ok((CapsuleSubtype::Guided, CapsuleContent::Guided(pairs)))
            }
        }
    }
}

pub fn summary_for(subtype: CapsuleSubtype) -> &'static str {
    match subtype {
        CapsuleSubtype::Freeform => "Time Capsule (Freeform)",
        CapsuleSubtype::Guided => "Time Capsule (Guided)",
    }
}

/// Build the sealed capsule without storing it.
pub fn build(
    draft: Draft,
    mode: ScheduleMode,
    now: DateTime<Utc>,
    rng: &mut impl Rng,
) -> Result<TimeCapsule, CapsuleError> {
    let (subtype, content) = draft.into_content()?;
    let unlock_date = compute_unlock_date(mode, now, rng);
    Ok(TimeCapsule {
        subtype,
        content,
        created_at: now,
        unlock_date,
        status: CapsuleStatus::at(unlock_date, now),
        summary: summary_for(subtype).to_string(),
    })
}

/// Seal `draft` and write it under a fresh `time-capsule-<millis>` key.
pub fn seal(
    store: &EntryStore,
    draft: Draft,
    mode: ScheduleMode,
    now: DateTime<Utc>,
    rng: &mut impl Rng,
) -> anyhow::Result<Keyed<TimeCapsule>> {
    let capsule = build(draft, mode, now, rng)?;
    let key = store.unique_key(RecordKind::Capsule, now)?;
    store.save(&key, &Record::Capsule(capsule.clone()))?;
    tracing::info!(key = %key, unlock_date = %capsule.unlock_date, "capsule sealed");
    Ok(Keyed {
        key,
        value: capsule,
    })
}

/// Load one capsule by key.
pub fn load(store: &EntryStore, key: &str) -> anyhow::Result<Option<TimeCapsule>> {
    match store.load(key)? {
        Some(Record::Capsule(capsule)) => Ok(Some(capsule)),
        Some(other) => anyhow::bail!("{key} is a {} record, not a capsule", other.kind()),
        None => Ok(None),
    }
}
