//! Search engine registry.

use crate::config;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// A configured search provider
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Engine {
    pub id: String,
    pub name: String,
    /// URL prefix; the percent-encoded query is appended to it
    #[serde(rename = "url")]
    pub query_url_template: String,
    #[serde(rename = "icon", default)]
    pub icon_url: String,
    pub shortcut: String,
}

impl Engine {
    /// Build the destination URL string for an already-cleaned query
    pub fn search_url(&self, query: &str) -> String {
        format!("{}{}", self.query_url_template, urlencoding::encode(query))
    }
}

/// Layout of `engines.toml`
#[derive(Debug, Deserialize)]
struct EngineFile {
    #[serde(rename = "engine", default)]
    engines: Vec<Engine>,
}

/// Ordered, immutable list of engines plus the shortcut lookup table
#[derive(Debug, Clone)]
pub struct EngineRegistry {
    engines: Vec<Engine>,
    shortcuts: HashMap<String, usize>,
}

impl EngineRegistry {
    /// Build a registry from an ordered engine list.
    /// Duplicate shortcuts resolve to the last engine that declares them.
    pub fn new(engines: Vec<Engine>) -> Self {
        let shortcuts = engines
            .iter()
            .enumerate()
            .map(|(index, engine)| (engine.shortcut.clone(), index))
            .collect();

        Self { engines, shortcuts }
    }

    /// The engines shipped with the application
    pub fn builtin() -> Self {
        let engines = config::SEARCH_ENGINES
            .iter()
            .map(|(id, name, url, icon, shortcut)| Engine {
                id: id.to_string(),
                name: name.to_string(),
                query_url_template: url.to_string(),
                icon_url: icon.to_string(),
                shortcut: shortcut.to_string(),
            })
            .collect();

        Self::new(engines)
    }

    /// Load `engines.toml` from the profile directory, or the built-in list
    /// if the file is absent, malformed, or empty
    pub fn load(profile_path: &Path) -> Self {
        let path = profile_path.join(config::ENGINES_FILE);

        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    log::warn!("Failed to read {:?}: {}", path, e);
                }
                return Self::builtin();
            }
        };

        let registry = match toml::from_str::<EngineFile>(&contents) {
            Ok(file) => Self::new(file.engines),
            Err(e) => {
                log::warn!("Ignoring malformed {:?}: {}", path, e);
                return Self::builtin();
            }
        };

        if registry.is_empty() {
            log::warn!("{:?} defines no engines, using built-in list", path);
            return Self::builtin();
        }
        log::info!("Loaded {} search engines from {:?}", registry.len(), path);
        registry
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Engine> {
        self.engines.iter()
    }

    /// Engine at a dropdown position
    pub fn at(&self, index: usize) -> Option<&Engine> {
        self.engines.get(index)
    }

    pub fn get(&self, id: &str) -> Option<&Engine> {
        self.engines.iter().find(|e| e.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Resolve a shortcut token (case-sensitive) to its engine
    pub fn by_shortcut(&self, token: &str) -> Option<&Engine> {
        self.shortcuts.get(token).map(|&index| &self.engines[index])
    }
}
