//! Journal and dashboard commands: `write`, `list`, `rename`, `delete`.

use anyhow::{Context, Result};
use chrono::NaiveDate;

use super::{confirm, generator, open_store, text_or_stdin, today, with_spinner};
use crate::config::TtylConfig;
use crate::dashboard;
use crate::journal::{self, EditorSession, EditorTimings};
use crate::records::RecordKind;

pub fn parse_date(raw: Option<&str>) -> Result<NaiveDate> {
    match raw {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .with_context(|| format!("invalid date {raw:?}, expected YYYY-MM-DD")),
        None => Ok(today()),
    }
}

/// Write (or overwrite) the entry for a day, then let the editor's leave hook
/// produce the summary.
pub async fn write(
    config: &TtylConfig,
    date: Option<&str>,
    text: Option<String>,
    append: bool,
    summarize: bool,
) -> Result<()> {
    let date = parse_date(date)?;
    let store = open_store(config)?;
    let text = text_or_stdin(text)?;

    let mut session = EditorSession::open(
        store.clone(),
        generator(config)?,
        date,
        EditorTimings::from(&config.journal),
    );
    let content = if append && !session.content().is_empty() {
        format!("{}\n\n{}", session.content().trim_end(), text.trim())
    } else {
        text.trim().to_string()
    };
    session.edit(content);

    if summarize {
        let summary = with_spinner("summarizing...", session.summarize_now()).await?;
        session.close();
        match summary {
            Some(summary) => println!("Saved {date}: \"{summary}\""),
            None => println!("Saved {date} (no summary)"),
        }
    } else {
        with_spinner("saving...", session.leave()).await?;
        println!("Saved {date}");
    }
    Ok(())
}

/// Print one day's entry.
pub fn show(config: &TtylConfig, date: Option<&str>) -> Result<()> {
    let date = parse_date(date)?;
    let store = open_store(config)?;
    match journal::load_entry(&store, date)? {
        Some(entry) => {
            if let Some(summary) = &entry.summary {
                println!("# {summary}\n");
            }
            println!("{}", entry.content);
        }
        None => println!("No entry for {date}"),
    }
    Ok(())
}

pub fn list(config: &TtylConfig, limit: Option<usize>) -> Result<()> {
    let store = open_store(config)?;
    let items = dashboard::list(&store)?;
    if items.is_empty() {
        println!("No entries yet.");
        return Ok(());
    }

    for item in items.iter().take(limit.unwrap_or(usize::MAX)) {
        let marker = match item.kind {
            RecordKind::Voice => "voice",
            RecordKind::Capsule if item.locked => "locked",
            RecordKind::Capsule => "capsule",
            _ => "text",
        };
        println!(
            "{:<12} {:<8} {}  ({})",
            item.date.format("%a %b %-d"),
            marker,
            item.preview,
            item.key
        );
    }
    Ok(())
}

pub fn rename(config: &TtylConfig, key: &str, name: &str) -> Result<()> {
    let store = open_store(config)?;
    if dashboard::rename(&store, key, name)? {
        println!("Renamed {key} to \"{}\"", name.trim());
    } else {
        println!("Name is blank, nothing changed.");
    }
    Ok(())
}

pub fn delete(config: &TtylConfig, key: &str, yes: bool) -> Result<()> {
    let store = open_store(config)?;
    if store.get(key)?.is_none() {
        println!("No entry at {key}");
        return Ok(());
    }
    if !confirm(&format!("Delete {key}?"), yes)? {
        println!("Cancelled.");
        return Ok(());
    }
    dashboard::delete(&store, key)?;
    println!("Deleted {key}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;

    #[test]
    fn default_date_is_the_local_day() {
        let before = Local::now().date_naive();
        let parsed = parse_date(None).unwrap();
        let after = Local::now().date_naive();
        assert!(parsed == before || parsed == after);
    }

    #[test]
    fn explicit_dates_must_be_real() {
        assert_eq!(
            parse_date(Some("2024-02-29")).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert!(parse_date(Some("2023-02-29")).is_err());
        assert!(parse_date(Some("yesterday")).is_err());
    }
}
