use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::records::{Book, Keyed};

/// Reading summary shown above the shelf.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingStats {
    /// Most recently started book without a finish date.
    pub current_book: Option<Keyed<Book>>,
    /// Percent through the current book, 0 when its page count is unknown.
    pub current_progress: u32,
    /// Pages of books finished this year plus progress in unfinished ones.
    pub pages_this_year: u32,
    pub books_finished: usize,
    pub goal: u32,
    pub goal_percent: u32,
}

pub fn reading_stats(books: &[Keyed<Book>], goal: u32, today: NaiveDate) -> ReadingStats {
    let current_book = books
        .iter()
        .filter(|b| b.value.finished_date.is_none())
        .filter_map(|b| b.value.started_date.map(|d| (d, b)))
        .max_by(|(da, a), (db, b)| da.cmp(db).then_with(|| b.key.cmp(&a.key)))
        .map(|(_, b)| b.clone());

    let current_progress = current_book
        .as_ref()
        .filter(|b| b.value.total_pages > 0)
        .map_or(0, |b| percent(b.value.current_page as usize, b.value.total_pages as usize));

    let finished_pages: u32 = books
        .iter()
        .filter(|b| b.value.finished_date.is_some_and(|d| d.year() == today.year()))
        .map(|b| b.value.total_pages)
        .sum();
    let reading_pages: u32 = books
        .iter()
        .filter(|b| b.value.finished_date.is_none())
        .map(|b| b.value.current_page)
        .sum();

    let books_finished = books.iter().filter(|b| b.value.finished_date.is_some()).count();
    let goal_percent = if goal == 0 {
        0
    } else {
        percent(books_finished, goal as usize)
    };

    ReadingStats {
        current_book,
        current_progress,
        pages_this_year: finished_pages + reading_pages,
        books_finished,
        goal,
        goal_percent,
    }
}

fn percent(part: usize, whole: usize) -> u32 {
    ((part as f64 / whole as f64) * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(key: &str, started: Option<&str>, finished: Option<&str>, total: u32, current: u32) -> Keyed<Book> {
        let date = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();
        let mut b = Book::new(key, "someone");
        b.started_date = started.map(date);
        b.finished_date = finished.map(date);
        b.total_pages = total;
        b.current_page = current;
        Keyed {
            key: key.into(),
            value: b,
        }
    }

    #[test]
    fn stats_follow_reading_rules() {
        let today = NaiveDate::from_ymd_opt(2024, 8, 1).unwrap();
        let books = vec![
            book("book-1", Some("2024-01-01"), Some("2024-02-01"), 300, 300),
            book("book-2", Some("2023-01-01"), Some("2023-03-01"), 500, 500),
            book("book-3", Some("2024-06-01"), None, 200, 50),
            book("book-4", Some("2024-07-01"), None, 0, 10),
        ];
        let stats = reading_stats(&books, 30, today);

        assert_eq!(stats.current_book.unwrap().key, "book-4");
        assert_eq!(stats.current_progress, 0);
        assert_eq!(stats.pages_this_year, 300 + 50 + 10);
        assert_eq!(stats.books_finished, 2);
        assert_eq!(stats.goal_percent, 7);
    }

    #[test]
    fn empty_shelf() {
        let stats = reading_stats(&[], 30, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert!(stats.current_book.is_none());
        assert_eq!(stats.pages_this_year, 0);
        assert_eq!(stats.goal_percent, 0);
    }
}
