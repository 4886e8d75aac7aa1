use anyhow::Result;
use chrono::Utc;

use super::{entries::parse_date, open_store, prompt_line, text_or_stdin};
use crate::capsule::{self, CapsuleView, Draft, ScheduleMode, GUIDED_QUESTIONS};
use crate::config::TtylConfig;

/// Compose and seal a capsule. Guided capsules ask the five questions on stdin.
pub fn seal(
    config: &TtylConfig,
    guided: bool,
    text: Option<String>,
    unlock_on: Option<&str>,
    random: bool,
) -> Result<()> {
    let mode = match (unlock_on, random) {
        (Some(date), _) => ScheduleMode::Fixed(parse_date(Some(date))?),
        (None, true) => ScheduleMode::Random,
        (None, false) => ScheduleMode::Preset,
    };

    let draft = if guided {
        let mut answers = Vec::with_capacity(GUIDED_QUESTIONS.len());
        for question in GUIDED_QUESTIONS {
            answers.push(prompt_line(question)?);
        }
        Draft::Guided(answers)
    } else {
        Draft::Freeform(text_or_stdin(text)?)
    };

    let store = open_store(config)?;
    let sealed = capsule::seal(&store, draft, mode, Utc::now(), &mut rand::thread_rng())?;
    match mode {
        ScheduleMode::Random => println!("Sealed {}. It will open when it is ready.", sealed.key),
        _ => println!(
            "Sealed {}. Opens {}.",
            sealed.key,
            sealed.value.unlock_date.format("%B %-d, %Y")
        ),
    }
    Ok(())
}

/// Open a capsule. Locked capsules are refused; guided ones are re-answered first.
pub fn open(config: &TtylConfig, key: &str) -> Result<()> {
    let store = open_store(config)?;
    let Some(sealed) = capsule::load(&store, key)? else {
        println!("No capsule at {key}");
        return Ok(());
    };

    match capsule::view(&sealed, Utc::now()) {
        Err(e) => println!("{e}"),
        Ok(CapsuleView::Freeform(text)) => {
            println!("Written {}\n", sealed.created_at.format("%B %-d, %Y"));
            println!("{text}");
        }
        Ok(CapsuleView::Guided(mut reveal)) => {
            println!("Answer again before you look back.\n");
            let questions: Vec<String> = reveal.questions().map(str::to_string).collect();
            for (i, question) in questions.iter().enumerate() {
                loop {
                    let answer = prompt_line(question)?;
                    if !answer.is_empty() {
                        reveal.answer(i, answer)?;
                        break;
                    }
                }
            }
            for pair in reveal.reveal()? {
                println!("\n{}", pair.question);
                println!("  then: {}", pair.then);
                println!("  now:  {}", pair.now);
            }
        }
    }
    Ok(())
}
