//! The bookshelf: books, folders, takeaways and bulk organizing.

pub mod analytics;
pub mod folders;
pub mod lookup;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::str::FromStr;

use crate::ai::helpers::suggest_book_category;
use crate::ai::Generator;
use crate::records::{Book, Keyed, Record, RecordKind, Takeaway};
use crate::store::EntryStore;

pub use analytics::reading_stats;
pub use folders::{create_folder, delete_folder, find_folder, list_folders, rename_folder};

/// Bookshelf ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BookSort {
    /// Newest first by finished date, else started date. Undated books sink to the end.
    #[default]
    Recent,
    Title,
    Author,
}

impl FromStr for BookSort {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "recent" => Ok(Self::Recent),
            "title" => Ok(Self::Title),
            "author" => Ok(Self::Author),
            other => anyhow::bail!("unknown sort {other:?} (expected recent, title or author)"),
        }
    }
}

/// Sort in place; ties fall back to the key so the order is total.
pub fn sort_books(books: &mut [Keyed<Book>], sort: BookSort) {
    books.sort_by(|a, b| {
        let primary = match sort {
            BookSort::Recent => match (a.value.recent_date(), b.value.recent_date()) {
                (Some(x), Some(y)) => y.cmp(&x),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            BookSort::Title => a.value.title.cmp(&b.value.title),
            BookSort::Author => a.value.author.cmp(&b.value.author),
        };
        primary.then_with(|| a.key.cmp(&b.key))
    });
}

/// Every book in the store, unsorted.
pub fn all_books(store: &EntryStore) -> Result<Vec<Keyed<Book>>> {
    Ok(store
        .scan(&[RecordKind::Book])?
        .into_iter()
        .filter_map(|r| match r.value {
            Record::Book(book) => Some(Keyed {
                key: r.key,
                value: book,
            }),
            _ => None,
        })
        .collect())
}

/// Books for the shelf view, optionally restricted to one folder.
pub fn shelf(store: &EntryStore, sort: BookSort, folder: Option<&str>) -> Result<Vec<Keyed<Book>>> {
    let mut books = all_books(store)?;
    if let Some(folder) = folder {
        books.retain(|b| b.value.folder_id.as_deref() == Some(folder));
    }
    sort_books(&mut books, sort);
    Ok(books)
}

pub fn load_book(store: &EntryStore, key: &str) -> Result<Option<Book>> {
    match store.load(key)? {
        Some(Record::Book(book)) => Ok(Some(book)),
        Some(other) => anyhow::bail!("{key} is a {} record, not a book", other.kind()),
        None => Ok(None),
    }
}

pub fn save_book(store: &EntryStore, key: &str, book: &Book) -> Result<()> {
    store.save(key, &Record::Book(book.clone()))
}

/// Store a new book. Title and author are required; a missing start date defaults
/// to today.
pub fn add_book(store: &EntryStore, mut book: Book, now: DateTime<Utc>) -> Result<Keyed<Book>> {
    anyhow::ensure!(
        !book.title.trim().is_empty() && !book.author.trim().is_empty(),
        "a book needs both a title and an author"
    );
    book.title = book.title.trim().to_string();
    book.author = book.author.trim().to_string();
    book.started_date.get_or_insert(now.date_naive());
    book.created_at.get_or_insert(now);

    let key = store.unique_key(RecordKind::Book, now)?;
    save_book(store, &key, &book)?;
    tracing::info!(key = %key, title = %book.title, "book added");
    Ok(Keyed { key, value: book })
}

/// Load, mutate, and write back a book.
pub fn update_book<T>(store: &EntryStore, key: &str, f: impl FnOnce(&mut Book) -> T) -> Result<T> {
    let mut book = load_book(store, key)?.with_context(|| format!("no book at {key}"))?;
    let out = f(&mut book);
    save_book(store, key, &book)?;
    Ok(out)
}

/// Remove one book. Callers confirm first.
pub fn delete_book(store: &EntryStore, key: &str) -> Result<()> {
    store.delete(key)
}

/// Remove several books; returns how many keys were processed. Nothing is deleted
/// unless every key is a book key.
pub fn delete_books(store: &EntryStore, keys: &[String]) -> Result<usize> {
    if let Some(bad) = keys.iter().find(|key| !RecordKind::Book.owns(key)) {
        anyhow::bail!("{bad} is not a book");
    }
    for key in keys {
        store.delete(key)?;
    }
    tracing::info!(count = keys.len(), "books deleted");
    Ok(keys.len())
}

/// Append a takeaway; blank text is ignored. Ids never go backwards, even when the
/// clock does.
pub fn add_takeaway(book: &mut Book, text: &str, now: DateTime<Utc>) -> Option<i64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let next = book
        .takeaways
        .iter()
        .map(|t| t.id)
        .max()
        .map_or(i64::MIN, |last| last + 1);
    let id = now.timestamp_millis().max(next);
    book.takeaways.push(Takeaway {
        id,
        text: text.to_string(),
    });
    Some(id)
}

pub fn remove_takeaway(book: &mut Book, id: i64) -> bool {
    let before = book.takeaways.len();
    book.takeaways.retain(|t| t.id != id);
    book.takeaways.len() != before
}

/// Set reading progress, clamped to the page count when one is known.
pub fn set_current_page(book: &mut Book, page: u32) {
    book.current_page = if book.total_pages > 0 {
        page.min(book.total_pages)
    } else {
        page
    };
}

/// File a book under `folder` (or unfile it with `None`). The folder must exist.
pub fn move_to_folder(store: &EntryStore, book_key: &str, folder: Option<&str>) -> Result<()> {
    if let Some(folder) = folder {
        anyhow::ensure!(
            matches!(store.load(folder)?, Some(Record::Folder(_))),
            "no folder at {folder}"
        );
    }
    update_book(store, book_key, |book| {
        book.folder_id = folder.map(str::to_string);
    })
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OrganizeReport {
    pub filed: usize,
    pub folders_created: usize,
    pub skipped: usize,
}

/// File every unfiled book into a folder named after its suggested category,
/// reusing an existing folder when the names match case-insensitively.
pub async fn auto_organize(
    store: &EntryStore,
    generator: &dyn Generator,
    now: DateTime<Utc>,
) -> Result<OrganizeReport> {
    let mut report = OrganizeReport::default();
    let mut unfiled: Vec<_> = all_books(store)?
        .into_iter()
        .filter(|b| b.value.folder_id.is_none())
        .collect();
    unfiled.sort_by(|a, b| a.key.cmp(&b.key));

    for Keyed { key, value: book } in unfiled {
        let Some(category) = suggest_book_category(generator, &book.title, &book.author).await
        else {
            report.skipped += 1;
            continue;
        };

        let folder_key = match find_folder(store, &category)? {
            Some(existing) => existing.key,
            None => {
                report.folders_created += 1;
                create_folder(store, &category, now)?.key
            }
        };

        update_book(store, &key, |b| {
            b.folder_id = Some(folder_key.clone());
            b.category = Some(category.clone());
        })?;
        report.filed += 1;
    }

    tracing::info!(
        filed = report.filed,
        folders_created = report.folders_created,
        skipped = report.skipped,
        "auto-organize finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn keyed(key: &str, title: &str, author: &str, finished: Option<&str>) -> Keyed<Book> {
        let mut book = Book::new(title, author);
        book.finished_date = finished.map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap());
        Keyed {
            key: key.into(),
            value: book,
        }
    }

    fn titles(books: &[Keyed<Book>]) -> Vec<&str> {
        books.iter().map(|b| b.value.title.as_str()).collect()
    }

    #[test]
    fn title_sort_is_ascending_with_key_tiebreak() {
        let mut books = vec![
            keyed("book-3", "Dune", "Herbert", None),
            keyed("book-1", "Beloved", "Morrison", None),
            keyed("book-2", "Dune", "Herbert", None),
        ];
        sort_books(&mut books, BookSort::Title);
        assert_eq!(titles(&books), ["Beloved", "Dune", "Dune"]);
        assert_eq!(books[1].key, "book-2");
        assert_eq!(books[2].key, "book-3");
    }

    #[test]
    fn recent_sort_puts_undated_last() {
        let mut books = vec![
            keyed("book-1", "Old", "a", Some("2020-01-01")),
            keyed("book-2", "Undated", "b", None),
            keyed("book-3", "New", "c", Some("2024-05-01")),
        ];
        sort_books(&mut books, BookSort::Recent);
        assert_eq!(titles(&books), ["New", "Old", "Undated"]);
    }

    #[test]
    fn takeaway_ids_stay_monotonic() {
        let mut book = Book::new("t", "a");
        let now = Utc.timestamp_millis_opt(1_000).unwrap();
        let first = add_takeaway(&mut book, "one", now).unwrap();
        let second = add_takeaway(&mut book, "two", now).unwrap();
        let earlier = Utc.timestamp_millis_opt(10).unwrap();
        let third = add_takeaway(&mut book, "three", earlier).unwrap();
        assert_eq!(first, 1_000);
        assert_eq!(second, 1_001);
        assert_eq!(third, 1_002);

        assert_eq!(add_takeaway(&mut book, "  ", now), None);
        assert!(remove_takeaway(&mut book, second));
        assert!(!remove_takeaway(&mut book, second));
        assert_eq!(book.takeaways.len(), 2);
    }

    #[test]
    fn current_page_clamps_to_total() {
        let mut book = Book::new("t", "a");
        set_current_page(&mut book, 50);
        assert_eq!(book.current_page, 50);
        book.total_pages = 40;
        set_current_page(&mut book, 50);
        assert_eq!(book.current_page, 40);
    }

    #[test]
    fn add_book_requires_title_and_author() {
        let store = EntryStore::in_memory().unwrap();
        let now = Utc.with_ymd_and_hms(2024, 4, 2, 8, 0, 0).unwrap();
        assert!(add_book(&store, Book::new("  ", "x"), now).is_err());

        let added = add_book(&store, Book::new(" Dune ", "Frank Herbert"), now).unwrap();
        assert_eq!(added.value.title, "Dune");
        assert_eq!(added.value.started_date, NaiveDate::from_ymd_opt(2024, 4, 2));
        assert_eq!(load_book(&store, &added.key).unwrap().unwrap(), added.value);
    }

    #[test]
    fn bulk_delete_rejects_foreign_keys() {
        let store = EntryStore::in_memory().unwrap();
        assert!(delete_books(&store, &["journal-2024-01-01".into()]).is_err());
    }

    #[test]
    fn rejected_bulk_delete_leaves_every_book() {
        let store = EntryStore::in_memory().unwrap();
        let now = Utc.with_ymd_and_hms(2024, 4, 2, 8, 0, 0).unwrap();
        let book = add_book(&store, Book::new("Dune", "Frank Herbert"), now).unwrap();
        crate::journal::save_content(&store, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), "hi")
            .unwrap();

        let batch = vec![book.key.clone(), "journal-2024-01-01".to_string()];
        assert!(delete_books(&store, &batch).is_err());

        assert!(load_book(&store, &book.key).unwrap().is_some());
        assert!(store.get("journal-2024-01-01").unwrap().is_some());
    }

    #[test]
    fn author_sort_is_ascending() {
        let mut books = vec![
            keyed("book-1", "Emma", "Jane Austen", None),
            keyed("book-2", "Dune", "Frank Herbert", None),
            keyed("book-3", "Beloved", "Toni Morrison", None),
        ];
        sort_books(&mut books, BookSort::Author);
        assert_eq!(titles(&books), ["Dune", "Emma", "Beloved"]);
    }

    #[test]
    fn recent_sort_falls_back_to_started_date() {
        let mut started_late = keyed("book-1", "Started", "a", None);
        started_late.value.started_date = NaiveDate::from_ymd_opt(2024, 6, 1);
        let finished_early = keyed("book-2", "Finished", "b", Some("2024-02-01"));
        let mut both = keyed("book-3", "Both", "c", Some("2023-12-31"));
        both.value.started_date = NaiveDate::from_ymd_opt(2024, 9, 1);

        let mut books = vec![finished_early, both, started_late];
        sort_books(&mut books, BookSort::Recent);
        assert_eq!(titles(&books), ["Started", "Finished", "Both"]);
    }
}
