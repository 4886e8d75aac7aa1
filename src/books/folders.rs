//! Bookshelf folders. Books point at folders by key; folders never own books.

use anyhow::Result;
use chrono::{DateTime, Utc};

use super::{all_books, save_book};
use crate::records::{Folder, Keyed, Record, RecordKind};
use crate::store::EntryStore;

pub fn list_folders(store: &EntryStore) -> Result<Vec<Keyed<Folder>>> {
    let mut folders: Vec<_> = store
        .scan(&[RecordKind::Folder])?
        .into_iter()
        .filter_map(|r| match r.value {
            Record::Folder(folder) => Some(Keyed {
                key: r.key,
                value: folder,
            }),
            _ => None,
        })
        .collect();
    folders.sort_by(|a, b| {
        a.value
            .name
            .to_lowercase()
            .cmp(&b.value.name.to_lowercase())
            .then_with(|| a.key.cmp(&b.key))
    });
    Ok(folders)
}

/// Case-insensitive lookup by name.
pub fn find_folder(store: &EntryStore, name: &str) -> Result<Option<Keyed<Folder>>> {
    let wanted = name.trim().to_lowercase();
    Ok(list_folders(store)?
        .into_iter()
        .find(|f| f.value.name.trim().to_lowercase() == wanted))
}

pub fn create_folder(store: &EntryStore, name: &str, now: DateTime<Utc>) -> Result<Keyed<Folder>> {
    let name = name.trim();
    anyhow::ensure!(!name.is_empty(), "folder name cannot be blank");

    let folder = Folder {
        name: name.to_string(),
        created_at: now,
    };
    let key = store.unique_key(RecordKind::Folder, now)?;
    store.save(&key, &Record::Folder(folder.clone()))?;
    tracing::info!(key = %key, name, "folder created");
    Ok(Keyed { key, value: folder })
}

pub fn rename_folder(store: &EntryStore, key: &str, name: &str) -> Result<()> {
    let name = name.trim();
    anyhow::ensure!(!name.is_empty(), "folder name cannot be blank");

    let mut folder = match store.load(key)? {
        Some(Record::Folder(folder)) => folder,
        Some(other) => anyhow::bail!("{key} is a {} record, not a folder", other.kind()),
        None => anyhow::bail!("no folder at {key}"),
    };
    folder.name = name.to_string();
    store.save(key, &Record::Folder(folder))
}

/// Delete a folder and unfile its books. Returns the number of books orphaned.
pub fn delete_folder(store: &EntryStore, key: &str) -> Result<usize> {
    anyhow::ensure!(RecordKind::Folder.owns(key), "{key} is not a folder");
    let mut orphaned = 0;
    for mut book in all_books(store)? {
        if book.value.folder_id.as_deref() == Some(key) {
            book.value.folder_id = None;
            save_book(store, &book.key, &book.value)?;
            orphaned += 1;
        }
    }
    store.delete(key)?;
    tracing::info!(key, orphaned, "folder deleted");
    Ok(orphaned)
}
