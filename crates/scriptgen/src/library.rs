//! Saved scripts, saved ideas and the theme preference.
//!
//! Each collection is loaded once from the key-value store and written back
//! in full on every mutation.

use crate::cache::CachedArtifacts;
use crate::error::{Result, ScriptError};
use crate::models::Idea;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use store::{load_json, save_json, KeyValueStore, LIBRARY_KEY, SAVED_IDEAS_KEY, THEME_KEY};

/// Immutable once saved; only deletion is possible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryItem {
    /// Creation time in milliseconds since the epoch.
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub script: String,
    #[serde(default)]
    pub cache: CachedArtifacts,
}

#[derive(Default)]
pub struct Library {
    items: Vec<LibraryItem>,
    store: Option<Arc<dyn KeyValueStore>>,
}

impl Library {
    pub fn load(store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let items: Vec<LibraryItem> = load_json(store.as_ref(), LIBRARY_KEY)?.unwrap_or_default();
        tracing::debug!(target: "scriptgen", count = items.len(), "loaded script library");
        Ok(Self {
            items,
            store: Some(store),
        })
    }

    /// Newest first.
    pub fn items(&self) -> &[LibraryItem] {
        &self.items
    }

    pub fn get(&self, id: i64) -> Option<&LibraryItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn save(
        &mut self,
        title: &str,
        notes: Option<&str>,
        script: &str,
        cache: CachedArtifacts,
    ) -> Result<LibraryItem> {
        let title = title.trim();
        if title.is_empty() || script.trim().is_empty() {
            return Err(ScriptError::InvalidParameters(
                "a library item needs both a title and a script".to_string(),
            ));
        }
        let mut id = chrono::Utc::now().timestamp_millis();
        if let Some(newest) = self.items.first() {
            id = id.max(newest.id + 1);
        }
        let item = LibraryItem {
            id,
            title: title.to_string(),
            notes: notes.map(str::trim).filter(|n| !n.is_empty()).map(str::to_string),
            script: script.to_string(),
            cache,
        };
        self.items.insert(0, item.clone());
        self.persist()?;
        tracing::info!(target: "scriptgen", id, title = %item.title, "saved script to library");
        Ok(item)
    }

    /// Returns whether an item was removed.
    pub fn delete(&mut self, id: i64) -> Result<bool> {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        if self.items.len() == before {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    fn persist(&self) -> Result<()> {
        if let Some(store) = &self.store {
            save_json(store.as_ref(), LIBRARY_KEY, &self.items)?;
        }
        Ok(())
    }
}

/// Ideas kept from idea parsing, unique by title.
#[derive(Default)]
pub struct IdeaBook {
    ideas: Vec<Idea>,
    store: Option<Arc<dyn KeyValueStore>>,
}

impl IdeaBook {
    pub fn load(store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let ideas = load_json(store.as_ref(), SAVED_IDEAS_KEY)?.unwrap_or_default();
        Ok(Self {
            ideas,
            store: Some(store),
        })
    }

    pub fn ideas(&self) -> &[Idea] {
        &self.ideas
    }

    /// Returns false when an idea with the same title is already saved.
    pub fn save(&mut self, idea: Idea) -> Result<bool> {
        if self.ideas.iter().any(|i| i.title == idea.title) {
            return Ok(false);
        }
        self.ideas.push(idea);
        self.persist()?;
        Ok(true)
    }

    pub fn remove(&mut self, title: &str) -> Result<bool> {
        let before = self.ideas.len();
        self.ideas.retain(|i| i.title != title);
        if self.ideas.len() == before {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    fn persist(&self) -> Result<()> {
        if let Some(store) = &self.store {
            save_json(store.as_ref(), SAVED_IDEAS_KEY, &self.ideas)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn load(store: &dyn KeyValueStore) -> Result<Self> {
        Ok(load_json(store, THEME_KEY)?.unwrap_or_default())
    }

    pub fn save(self, store: &dyn KeyValueStore) -> Result<()> {
        save_json(store, THEME_KEY, &self)?;
        Ok(())
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use store::MemoryStore;

    #[test]
    fn items_are_newest_first_and_persisted() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut library = Library::load(store.clone()).unwrap();
        let first = library
            .save("Tides", None, "## A\ntext", CachedArtifacts::default())
            .unwrap();
        let second = library
            .save("Moons", Some("  "), "## B\ntext", CachedArtifacts::default())
            .unwrap();
        assert!(second.id > first.id);
        assert_eq!(second.notes, None);

        let reloaded = Library::load(store).unwrap();
        let titles: Vec<&str> = reloaded.items().iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Moons", "Tides"]);
    }

    #[test]
    fn save_requires_title_and_script() {
        let mut library = Library::default();
        assert!(library.save(" ", None, "text", CachedArtifacts::default()).is_err());
        assert!(library.save("Title", None, "  ", CachedArtifacts::default()).is_err());
    }

    #[test]
    fn delete_by_id() {
        let mut library = Library::default();
        let item = library
            .save("Tides", None, "text", CachedArtifacts::default())
            .unwrap();
        assert!(library.delete(item.id).unwrap());
        assert!(!library.delete(item.id).unwrap());
        assert!(library.get(item.id).is_none());
    }

    #[test]
    fn ideas_are_unique_by_title() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut book = IdeaBook::load(store.clone()).unwrap();
        let idea = Idea {
            title: "Deep sea".to_string(),
            outline: "lanternfish".to_string(),
        };
        assert!(book.save(idea.clone()).unwrap());
        assert!(!book.save(idea).unwrap());
        assert_eq!(IdeaBook::load(store.clone()).unwrap().ideas().len(), 1);
        assert!(book.remove("Deep sea").unwrap());
        assert!(IdeaBook::load(store).unwrap().ideas().is_empty());
    }

    #[test]
    fn theme_defaults_to_dark() {
        let store = MemoryStore::new();
        assert_eq!(Theme::load(&store).unwrap(), Theme::Dark);
        Theme::Light.save(&store).unwrap();
        assert_eq!(Theme::load(&store).unwrap(), Theme::Light);
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
    }
}
