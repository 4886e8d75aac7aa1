//! `books` subcommands: the terminal bookshelf.

use anyhow::{Context, Result};
use chrono::Utc;
use std::path::Path;
use std::time::Duration;

use super::{confirm, entries::parse_date, generator, open_store, today, with_spinner};
use crate::ai::helpers::scan_book_cover;
use crate::books::lookup::BookLookup;
use crate::books::{self, BookSort};
use crate::config::TtylConfig;
use crate::records::Book;
use crate::store::EntryStore;

/// Resolve a folder argument given either as a `folder-` key or by name.
fn resolve_folder(store: &EntryStore, folder: &str) -> Result<String> {
    if folder.starts_with(crate::records::RecordKind::Folder.prefix()) {
        return Ok(folder.to_string());
    }
    books::find_folder(store, folder)?
        .map(|f| f.key)
        .with_context(|| format!("no folder named {folder:?}"))
}

pub fn list(config: &TtylConfig, sort: BookSort, folder: Option<&str>) -> Result<()> {
    let store = open_store(config)?;
    let folder_key = folder.map(|f| resolve_folder(&store, f)).transpose()?;
    let shelf = books::shelf(&store, sort, folder_key.as_deref())?;

    if shelf.is_empty() {
        println!("The shelf is empty.");
        return Ok(());
    }
    for book in &shelf {
        let when = book
            .value
            .recent_date()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".into());
        let status = if book.value.finished_date.is_some() {
            "read".to_string()
        } else if book.value.total_pages > 0 {
            format!("{}/{}", book.value.current_page, book.value.total_pages)
        } else {
            "reading".to_string()
        };
        println!(
            "{:<10} {:<10} {} by {}  ({})",
            when, status, book.value.title, book.value.author, book.key
        );
    }
    Ok(())
}

pub struct NewBook<'a> {
    pub title: &'a str,
    pub author: Option<&'a str>,
    pub started: Option<&'a str>,
    pub finished: Option<&'a str>,
    pub pages: Option<u32>,
    pub lookup: bool,
}

async fn add_with(config: &TtylConfig, store: &EntryStore, new: NewBook<'_>) -> Result<()> {
    let mut book = Book::new(new.title, new.author.unwrap_or_default());
    book.started_date = Some(new.started.map(|d| parse_date(Some(d))).transpose()?.unwrap_or_else(today));
    book.finished_date = new.finished.map(|d| parse_date(Some(d))).transpose()?;
    book.total_pages = new.pages.unwrap_or_default();

    if new.lookup {
        let lookup = BookLookup::new(&config.books, Duration::from_secs(config.ai.timeout_secs))?;
        match with_spinner("looking up book...", lookup.lookup(new.title, new.author)).await {
            Ok(Some(meta)) => {
                if book.author.trim().is_empty() {
                    book.author = meta.author.unwrap_or_default();
                }
                if book.total_pages == 0 {
                    book.total_pages = meta.total_pages.unwrap_or_default();
                }
                book.cover_url = meta.cover_url;
            }
            Ok(None) => println!("No match found; saving what you entered."),
            Err(e) => {
                tracing::warn!(error = %e, "book lookup failed");
                println!("Lookup failed; saving what you entered.");
            }
        }
    }

    let added = books::add_book(store, book, Utc::now())?;
    println!("Added \"{}\" by {} ({})", added.value.title, added.value.author, added.key);
    Ok(())
}

pub async fn add(config: &TtylConfig, new: NewBook<'_>) -> Result<()> {
    let store = open_store(config)?;
    add_with(config, &store, new).await
}

/// Read title and author off a cover photo, then add the book.
pub async fn scan(config: &TtylConfig, image: &Path, lookup: bool) -> Result<()> {
    let jpeg = std::fs::read(image)
        .with_context(|| format!("failed to read image: {}", image.display()))?;
    let generator = generator(config)?;

    let Some(found) = with_spinner("identifying book...", scan_book_cover(generator.as_ref(), &jpeg)).await
    else {
        println!("Couldn't make out a book in that image.");
        return Ok(());
    };
    println!("Found \"{}\" by {}", found.title, found.author);
    if found.title.trim().is_empty() {
        println!("No title found; add it manually.");
        return Ok(());
    }

    let store = open_store(config)?;
    let new = NewBook {
        title: &found.title,
        author: Some(&found.author),
        started: None,
        finished: None,
        pages: None,
        lookup,
    };
    add_with(config, &store, new).await
}

pub fn show(config: &TtylConfig, key: &str) -> Result<()> {
    let store = open_store(config)?;
    let book = books::load_book(&store, key)?.with_context(|| format!("no book at {key}"))?;

    println!("{} by {}", book.title, book.author);
    if let Some(category) = &book.category {
        println!("Category: {category}");
    }
    if let Some(started) = book.started_date {
        println!("Started:  {started}");
    }
    if let Some(finished) = book.finished_date {
        println!("Finished: {finished}");
    }
    if book.total_pages > 0 {
        println!("Progress: {}/{}", book.current_page, book.total_pages);
    }
    if !book.notes.is_empty() {
        println!("\n{}", book.notes);
    }
    if !book.takeaways.is_empty() {
        println!("\nTakeaways:");
        for t in &book.takeaways {
            println!("  [{}] {}", t.id, t.text);
        }
    }
    Ok(())
}

pub fn notes(config: &TtylConfig, key: &str, text: String) -> Result<()> {
    let store = open_store(config)?;
    books::update_book(&store, key, |b| b.notes = text)?;
    println!("Notes saved.");
    Ok(())
}

pub fn add_takeaway(config: &TtylConfig, key: &str, text: &str) -> Result<()> {
    let store = open_store(config)?;
    match books::update_book(&store, key, |b| books::add_takeaway(b, text, Utc::now()))? {
        Some(id) => println!("Added takeaway {id}"),
        None => println!("Takeaway is blank, nothing added."),
    }
    Ok(())
}

pub fn remove_takeaway(config: &TtylConfig, key: &str, id: i64) -> Result<()> {
    let store = open_store(config)?;
    if books::update_book(&store, key, |b| books::remove_takeaway(b, id))? {
        println!("Removed takeaway {id}");
    } else {
        println!("No takeaway {id} on {key}");
    }
    Ok(())
}

pub fn page(config: &TtylConfig, key: &str, page: u32, finished: bool) -> Result<()> {
    let store = open_store(config)?;
    let (current, total) = books::update_book(&store, key, |b| {
        books::set_current_page(b, page);
        if finished {
            b.finished_date = Some(today());
        }
        (b.current_page, b.total_pages)
    })?;
    if total > 0 {
        println!("Page {current} of {total}");
    } else {
        println!("Page {current}");
    }
    Ok(())
}

pub fn move_book(config: &TtylConfig, key: &str, folder: Option<&str>) -> Result<()> {
    let store = open_store(config)?;
    let folder_key = folder.map(|f| resolve_folder(&store, f)).transpose()?;
    books::move_to_folder(&store, key, folder_key.as_deref())?;
    match folder {
        Some(f) => println!("Moved {key} to {f}"),
        None => println!("Removed {key} from its folder"),
    }
    Ok(())
}

pub fn delete(config: &TtylConfig, keys: &[String], yes: bool) -> Result<()> {
    let store = open_store(config)?;
    let question = match keys {
        [one] => format!("Remove {one} from your shelf?"),
        many => format!("Remove {} books from your shelf?", many.len()),
    };
    if !confirm(&question, yes)? {
        println!("Cancelled.");
        return Ok(());
    }
    let count = books::delete_books(&store, keys)?;
    println!("Removed {count} book(s).");
    Ok(())
}

pub async fn organize(config: &TtylConfig) -> Result<()> {
    let store = open_store(config)?;
    let generator = generator(config)?;
    let report = with_spinner(
        "sorting your shelf...",
        books::auto_organize(&store, generator.as_ref(), Utc::now()),
    )
    .await?;
    println!(
        "Filed {} book(s), created {} folder(s), skipped {}.",
        report.filed, report.folders_created, report.skipped
    );
    Ok(())
}

pub fn stats(config: &TtylConfig) -> Result<()> {
    let store = open_store(config)?;
    let all = books::all_books(&store)?;
    let stats = books::reading_stats(&all, config.books.reading_goal, today());

    println!("Reading");
    println!("{}", "=".repeat(40));
    match &stats.current_book {
        Some(book) => println!(
            "  Currently reading:  {} ({}%)",
            book.value.title, stats.current_progress
        ),
        None => println!("  Currently reading:  -"),
    }
    println!("  Pages this year:    {}", stats.pages_this_year);
    println!(
        "  Yearly goal:        {} of {} books ({}%)",
        stats.books_finished, stats.goal, stats.goal_percent
    );
    Ok(())
}

#[derive(Debug, Clone)]
pub enum FolderAction {
    List,
    Create { name: String },
    Rename { folder: String, name: String },
    Delete { folder: String, yes: bool },
}

pub fn folder(config: &TtylConfig, action: FolderAction) -> Result<()> {
    let store = open_store(config)?;
    match action {
        FolderAction::List => {
            let all = books::all_books(&store)?;
            for folder in books::list_folders(&store)? {
                let count = all
                    .iter()
                    .filter(|b| b.value.folder_id.as_deref() == Some(folder.key.as_str()))
                    .count();
                println!("{:<24} {:>3} book(s)  ({})", folder.value.name, count, folder.key);
            }
        }
        FolderAction::Create { name } => {
            if let Some(existing) = books::find_folder(&store, &name)? {
                println!("Folder \"{}\" already exists ({})", existing.value.name, existing.key);
            } else {
                let created = books::create_folder(&store, &name, Utc::now())?;
                println!("Created \"{}\" ({})", created.value.name, created.key);
            }
        }
        FolderAction::Rename { folder, name } => {
            let key = resolve_folder(&store, &folder)?;
            books::rename_folder(&store, &key, &name)?;
            println!("Renamed {key} to \"{}\"", name.trim());
        }
        FolderAction::Delete { folder, yes } => {
            let key = resolve_folder(&store, &folder)?;
            if !confirm(&format!("Delete folder {folder}? Its books stay on the shelf."), yes)? {
                println!("Cancelled.");
                return Ok(());
            }
            let orphaned = books::delete_folder(&store, &key)?;
            println!("Deleted {key}; {orphaned} book(s) unfiled.");
        }
    }
    Ok(())
}
