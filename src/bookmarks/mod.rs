//! Bookmark grid: an ordered, size-limited list mirrored to the settings store.

pub mod favicon;

use crate::config;
use crate::storage::SettingsStore;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Settings key holding the serialized bookmark list
pub const BOOKMARKS_KEY: &str = "bookmarks";

/// Error type for bookmark mutations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookmarkError {
    CapacityExceeded,
    EmptyField(&'static str),
}

impl std::fmt::Display for BookmarkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookmarkError::CapacityExceeded => write!(
                f,
                "You can only have a maximum of {} bookmarks.",
                config::MAX_BOOKMARKS
            ),
            BookmarkError::EmptyField(field) => write!(f, "Bookmark {} cannot be empty", field),
        }
    }
}

impl std::error::Error for BookmarkError {}

/// A saved bookmark tile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: String,
    pub name: String,
    pub url: String,
    /// Favicon service URL derived from the host of `url`
    #[serde(default)]
    pub favicon: String,
}

/// One cell of the rendered grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tile<'a> {
    Bookmark(&'a Bookmark),
    /// The "Add New" button, shown while there is room for more bookmarks
    AddNew,
}

/// Prefix `https://` unless the URL already starts with `http://` or `https://`
pub fn normalize_url(url: &str) -> String {
    let trimmed = url.trim();
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// The user's bookmarks in display order
#[derive(Debug, Clone, Default)]
pub struct BookmarkList {
    items: Vec<Bookmark>,
}

impl BookmarkList {
    /// Restore the list from settings, dropping anything past the limit
    pub fn load(settings: &SettingsStore) -> Self {
        let mut items: Vec<Bookmark> = settings.get(BOOKMARKS_KEY, Vec::new());
        if items.len() > config::MAX_BOOKMARKS {
            log::warn!(
                "Stored list has {} bookmarks, keeping the first {}",
                items.len(),
                config::MAX_BOOKMARKS
            );
            items.truncate(config::MAX_BOOKMARKS);
        }
        log::debug!("Loaded {} bookmarks", items.len());
        Self { items }
    }

    pub fn items(&self) -> &[Bookmark] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= config::MAX_BOOKMARKS
    }

    pub fn get(&self, id: &str) -> Option<&Bookmark> {
        self.items.iter().find(|b| b.id == id)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|b| b.id == id)
    }

    fn persist(&self, settings: &mut SettingsStore) {
        if let Err(e) = settings.set(BOOKMARKS_KEY, &self.items) {
            log::warn!("Failed to save bookmarks: {}", e);
        }
    }

    /// Timestamp id, bumped until it is not already taken
    fn next_id(&self) -> String {
        let mut stamp = now_millis();
        loop {
            let id = stamp.to_string();
            if self.get(&id).is_none() {
                return id;
            }
            stamp += 1;
        }
    }

    /// Append a bookmark to the end of the grid
    pub fn add(
        &mut self,
        name: &str,
        url: &str,
        settings: &mut SettingsStore,
    ) -> Result<&Bookmark, BookmarkError> {
        if self.is_full() {
            log::info!("Bookmark limit reached, not adding '{}'", name);
            return Err(BookmarkError::CapacityExceeded);
        }

        let name = name.trim();
        if name.is_empty() {
            return Err(BookmarkError::EmptyField("name"));
        }
        if url.trim().is_empty() {
            return Err(BookmarkError::EmptyField("URL"));
        }

        let url = normalize_url(url);
        let bookmark = Bookmark {
            id: self.next_id(),
            name: name.to_string(),
            favicon: favicon::service_url(&url),
            url,
        };

        log::info!("Added bookmark '{}' ({})", bookmark.name, bookmark.url);
        self.items.push(bookmark);
        self.persist(settings);

        Ok(&self.items[self.items.len() - 1])
    }

    /// Change a bookmark's name and URL.
    /// Returns `Ok(false)` if no bookmark has this id.
    pub fn edit(
        &mut self,
        id: &str,
        name: &str,
        url: &str,
        settings: &mut SettingsStore,
    ) -> Result<bool, BookmarkError> {
        let Some(index) = self.position(id) else {
            return Ok(false);
        };

        let name = name.trim();
        if name.is_empty() {
            return Err(BookmarkError::EmptyField("name"));
        }
        if url.trim().is_empty() {
            return Err(BookmarkError::EmptyField("URL"));
        }

        let url = normalize_url(url);
        let bookmark = &mut self.items[index];
        if favicon::host_of(&bookmark.url) != favicon::host_of(&url) {
            bookmark.favicon = favicon::service_url(&url);
        }
        bookmark.name = name.to_string();
        bookmark.url = url;

        log::info!("Edited bookmark {}", id);
        self.persist(settings);
        Ok(true)
    }

    /// Delete a bookmark. Returns whether anything was removed.
    pub fn remove(&mut self, id: &str, settings: &mut SettingsStore) -> bool {
        let before = self.items.len();
        self.items.retain(|b| b.id != id);
        if self.items.len() == before {
            return false;
        }

        log::info!("Removed bookmark {}", id);
        self.persist(settings);
        true
    }

    /// Move the dragged bookmark to the target's slot.
    ///
    /// The dragged entry is taken out first and then inserted at the index
    /// the target had before the move, so dragging backwards lands in front
    /// of the target and dragging forwards lands behind it.
    pub fn reorder(&mut self, dragged_id: &str, target_id: &str, settings: &mut SettingsStore) -> bool {
        if dragged_id == target_id {
            return false;
        }
        let (Some(from), Some(to)) = (self.position(dragged_id), self.position(target_id)) else {
            return false;
        };

        let bookmark = self.items.remove(from);
        self.items.insert(to, bookmark);

        log::debug!("Moved bookmark {} from {} to {}", dragged_id, from, to);
        self.persist(settings);
        true
    }

    /// Grid cells for bookmarks whose names contain `filter` (case-insensitive),
    /// followed by the add tile if the list is not full
    pub fn view(&self, filter: &str) -> Vec<Tile<'_>> {
        let needle = filter.to_lowercase();
        let mut tiles: Vec<Tile<'_>> = self
            .items
            .iter()
            .filter(|b| b.name.to_lowercase().contains(&needle))
            .map(Tile::Bookmark)
            .collect();

        if !self.is_full() {
            tiles.push(Tile::AddNew);
        }
        tiles
    }
}
