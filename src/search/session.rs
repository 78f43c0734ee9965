//! Search box state: selected engine, query text, and the engine dropdown.

use super::dispatcher::{self, Dispatch, SearchError};
use super::{shortcut, DropdownNavigator, EngineRegistry};
use crate::config;
use crate::storage::SettingsStore;
use url::Url;

/// Settings key for the engine used by plain queries
pub const SELECTED_ENGINE_KEY: &str = "selectedEngine";

/// Settings key for the query draft
pub const QUERY_KEY: &str = "query";

/// What the front end should do after a search box interaction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchUpdate {
    /// Redirect the page here
    pub navigate: Option<Url>,
    /// Give keyboard focus back to the query box
    pub focus_query: bool,
}

#[derive(Debug, Clone)]
pub struct SearchSession {
    selected_engine_id: String,
    query: String,
    dropdown: DropdownNavigator,
}

impl SearchSession {
    /// Restore the selected engine and query draft.
    /// An engine that is no longer registered falls back to the default,
    /// or to the first registered engine.
    pub fn load(settings: &SettingsStore, registry: &EngineRegistry) -> Self {
        let mut selected = settings.get_string(SELECTED_ENGINE_KEY, config::DEFAULT_ENGINE);
        if !registry.contains(&selected) {
            let fallback = if registry.contains(config::DEFAULT_ENGINE) {
                config::DEFAULT_ENGINE.to_string()
            } else {
                registry.at(0).map(|e| e.id.clone()).unwrap_or_default()
            };
            log::warn!("Saved engine '{}' is not registered, using '{}'", selected, fallback);
            selected = fallback;
        }

        Self {
            selected_engine_id: selected,
            query: settings.get_string(QUERY_KEY, ""),
            dropdown: DropdownNavigator::new(),
        }
    }

    pub fn selected_engine_id(&self) -> &str {
        &self.selected_engine_id
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn dropdown(&self) -> &DropdownNavigator {
        &self.dropdown
    }

    /// Placeholder text for the empty query box
    pub fn placeholder(&self, registry: &EngineRegistry) -> String {
        match registry.get(&self.selected_engine_id) {
            Some(engine) => format!("Search {}...", engine.name),
            None => "Search...".to_string(),
        }
    }

    fn select_engine(&mut self, engine_id: &str, settings: &mut SettingsStore) {
        if self.selected_engine_id != engine_id {
            log::info!("Search engine changed to '{}'", engine_id);
        }
        self.selected_engine_id = engine_id.to_string();
        if let Err(e) = settings.set(SELECTED_ENGINE_KEY, engine_id) {
            log::warn!("Failed to save selected engine: {}", e);
        }
    }

    fn set_query(&mut self, text: &str, settings: &mut SettingsStore) {
        self.query = text.to_string();
        if let Err(e) = settings.set(QUERY_KEY, text.trim()) {
            log::warn!("Failed to save query draft: {}", e);
        }
    }

    /// The query box text changed.
    ///
    /// Text starting with `!` or `/` opens the dropdown. As soon as the text
    /// contains a complete known shortcut, its engine is selected, the token
    /// is removed from the text, and the dropdown closes again.
    pub fn input(&mut self, text: &str, registry: &EngineRegistry, settings: &mut SettingsStore) {
        self.set_query(text, settings);

        let trimmed = text.trim();
        if !(trimmed.starts_with('!') || trimmed.starts_with('/')) {
            self.dropdown.close();
            return;
        }

        self.dropdown.open();
        if let Some(detection) = shortcut::detect(trimmed, registry) {
            log::debug!(
                "Typed {:?} shortcut for '{}'",
                detection.position,
                detection.engine_id
            );
            self.select_engine(&detection.engine_id, settings);
            self.set_query(&detection.cleaned_query, settings);
            self.dropdown.close();
        }
    }

    /// The engine button was clicked
    pub fn toggle_dropdown(&mut self) -> SearchUpdate {
        self.dropdown.toggle();
        SearchUpdate {
            navigate: None,
            focus_query: true,
        }
    }

    /// A click landed outside the search control
    pub fn dismiss_dropdown(&mut self) {
        self.dropdown.close();
    }

    pub fn arrow_down(&mut self, registry: &EngineRegistry) {
        self.dropdown.move_down(registry.len());
    }

    pub fn arrow_up(&mut self, registry: &EngineRegistry) {
        self.dropdown.move_up(registry.len());
    }

    /// Commit the engine at `index`, whether highlighted or clicked
    pub fn pick(
        &mut self,
        index: usize,
        registry: &EngineRegistry,
        settings: &mut SettingsStore,
    ) -> SearchUpdate {
        let Some(engine) = registry.at(index) else {
            log::debug!("Ignoring pick of dropdown row {}", index);
            return SearchUpdate::default();
        };

        self.select_engine(&engine.id, settings);
        let cleaned = shortcut::strip_shortcut(&self.query, registry);
        self.set_query(&cleaned, settings);
        self.dropdown.close();

        SearchUpdate {
            navigate: None,
            focus_query: true,
        }
    }

    /// Enter was pressed in the query box
    pub fn enter(
        &mut self,
        registry: &EngineRegistry,
        settings: &mut SettingsStore,
    ) -> Result<SearchUpdate, SearchError> {
        if !self.dropdown.is_open() {
            return self.submit(registry, settings);
        }

        if let Some(index) = self.dropdown.highlighted() {
            return Ok(self.pick(index, registry, settings));
        }

        match shortcut::parse_command(&self.query, registry) {
            Some((engine_id, rest)) => {
                self.select_engine(&engine_id, settings);
                self.dropdown.close();
                if rest.is_empty() {
                    // Only the engine changes; the text stays for editing
                    return Ok(SearchUpdate {
                        navigate: None,
                        focus_query: true,
                    });
                }
                self.set_query(&rest, settings);
                self.submit(registry, settings)
            }
            None => {
                self.dropdown.close();
                self.submit(registry, settings)
            }
        }
    }

    /// Run the current query.
    ///
    /// The persisted draft is removed before navigating so a reload does not
    /// bring the old search back.
    pub fn submit(
        &mut self,
        registry: &EngineRegistry,
        settings: &mut SettingsStore,
    ) -> Result<SearchUpdate, SearchError> {
        match dispatcher::submit(&self.query, &self.selected_engine_id, registry)? {
            Dispatch::Ignored => Ok(SearchUpdate::default()),
            Dispatch::EngineSwitched(engine_id) => {
                self.select_engine(&engine_id, settings);
                Ok(SearchUpdate::default())
            }
            Dispatch::Navigate { engine_id, url } => {
                if engine_id != self.selected_engine_id {
                    self.select_engine(&engine_id, settings);
                }
                self.query.clear();
                if let Err(e) = settings.remove(QUERY_KEY) {
                    log::warn!("Failed to clear query draft: {}", e);
                }
                log::info!("Searching {} via {}", engine_id, url);
                Ok(SearchUpdate {
                    navigate: Some(url),
                    focus_query: false,
                })
            }
        }
    }
}
