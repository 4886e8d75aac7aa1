//! Opening a sealed capsule.
//!
//! Locked capsules are refused outright. Guided capsules make the reader answer every
//! original question again before the old answers are shown side by side with the new.
//! New answers live only in the [`GuidedReveal`]; nothing here writes to the store.

use chrono::{DateTime, Utc};

use super::CapsuleError;
use crate::records::{CapsuleContent, GuidedAnswer, TimeCapsule};

#[derive(Debug)]
pub enum CapsuleView {
    Freeform(String),
    Guided(GuidedReveal),
}

/// Open `capsule` at `now`.
pub fn view(capsule: &TimeCapsule, now: DateTime<Utc>) -> Result<CapsuleView, CapsuleError> {
    if !capsule.is_unlockable(now) {
        return Err(CapsuleError::Locked {
            unlock_date: capsule.unlock_date,
        });
    }
    Ok(match &capsule.content {
        CapsuleContent::Freeform(text) => CapsuleView::Freeform(text.clone()),
        CapsuleContent::Guided(original) => CapsuleView::Guided(GuidedReveal::new(original.clone())),
    })
}

/// One question with what was written then and what the reader wrote now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThenAndNow {
    pub question: String,
    pub then: String,
    pub now: String,
}

#[derive(Debug)]
pub struct GuidedReveal {
    original: Vec<GuidedAnswer>,
    answers: Vec<String>,
}

impl GuidedReveal {
    fn new(original: Vec<GuidedAnswer>) -> Self {
        let answers = vec![String::new(); original.len()];
        Self { original, answers }
    }

    pub fn questions(&self) -> impl Iterator<Item = &str> {
        self.original.iter().map(|a| a.question.as_str())
    }

    pub fn len(&self) -> usize {
        self.original.len()
    }

    pub fn is_empty(&self) -> bool {
        self.original.is_empty()
    }

    pub fn answer(&mut self, index: usize, text: impl Into<String>) -> Result<(), CapsuleError> {
        let slot = self
            .answers
            .get_mut(index)
            .ok_or(CapsuleError::NoSuchQuestion(index))?;
        *slot = text.into();
        Ok(())
    }

    fn missing(&self) -> usize {
        self.answers.iter().filter(|a| a.trim().is_empty()).count()
    }

    pub fn can_reveal(&self) -> bool {
        self.missing() == 0
    }

    pub fn reveal(&self) -> Result<Vec<ThenAndNow>, CapsuleError> {
        let missing = self.missing();
        if missing > 0 {
            return Err(CapsuleError::Unanswered { missing });
        }
        Ok(self
            .original
            .iter()
            .zip(&self.answers)
            .map(|(orig, now)| ThenAndNow {
                question: orig.question.clone(),
                then: orig.answer.clone(),
                now: now.clone(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capsule::{build, Draft, ScheduleMode};
    use chrono::{Duration, TimeZone};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sealed(draft: Draft) -> TimeCapsule {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        build(draft, ScheduleMode::Preset, created, &mut StdRng::seed_from_u64(0)).unwrap()
    }

    #[test]
    fn locked_capsule_reports_unlock_date() {
        let capsule = sealed(Draft::Freeform("secret".into()));
        let early = capsule.unlock_date - Duration::seconds(1);
        match view(&capsule, early) {
            Err(CapsuleError::Locked { unlock_date }) => {
                assert_eq!(unlock_date, capsule.unlock_date);
            }
            other => panic!("expected locked, got {other:?}"),
        }
        let message = view(&capsule, early).unwrap_err().to_string();
        assert!(message.contains("June 29, 2024"), "{message}");
    }

    #[test]
    fn freeform_reveals_immediately_once_unlockable() {
        let capsule = sealed(Draft::Freeform("secret".into()));
        match view(&capsule, capsule.unlock_date).unwrap() {
            CapsuleView::Freeform(text) => assert_eq!(text, "secret"),
            other => panic!("expected freeform, got {other:?}"),
        }
    }

    #[test]
    fn guided_reveal_needs_every_answer() {
        let capsule = sealed(Draft::Guided(vec!["money".into(), "travel".into()]));
        let CapsuleView::Guided(mut reveal) = view(&capsule, capsule.unlock_date).unwrap() else {
            panic!("expected guided");
        };
        assert_eq!(reveal.len(), 5);

        for i in 0..4 {
            reveal.answer(i, format!("now {i}")).unwrap();
        }
        assert!(!reveal.can_reveal());
        assert_eq!(reveal.reveal().unwrap_err(), CapsuleError::Unanswered { missing: 1 });

        reveal.answer(4, "   ").unwrap();
        assert!(!reveal.can_reveal());

        reveal.answer(4, "my sister").unwrap();
        let pairs = reveal.reveal().unwrap();
        assert_eq!(pairs[0].then, "money");
        assert_eq!(pairs[0].now, "now 0");
        assert_eq!(pairs[4].then, "");
        assert_eq!(pairs[4].now, "my sister");
    }

    #[test]
    fn answering_out_of_range_fails() {
        let capsule = sealed(Draft::Guided(vec!["x".into()]));
        let CapsuleView::Guided(mut reveal) = view(&capsule, capsule.unlock_date).unwrap() else {
            panic!("expected guided");
        };
        assert_eq!(reveal.answer(9, "y"), Err(CapsuleError::NoSuchQuestion(9)));
    }
}
