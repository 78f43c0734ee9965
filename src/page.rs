//! The dashboard page: owns every piece of state and turns user actions
//! into state changes plus effects for the front end to carry out.

use crate::bookmarks::favicon::{self, Favicon};
use crate::bookmarks::{BookmarkError, BookmarkList, Tile};
use crate::context_menu::{ContextMenu, Point, Viewport};
use crate::dashboard::{Dashboard, ImageSlot, ImageSource, Theme};
use crate::fetch::Fetcher;
use crate::modal::{ModalKind, ModalStack};
use crate::profile::Profile;
use crate::search::{EngineRegistry, SearchError, SearchSession, SearchUpdate};
use crate::storage::{BlobStore, SettingsStore};
use std::collections::{HashMap, HashSet};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use url::Url;

/// Keys the page reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    /// A character typed with the platform modifier held
    Ctrl(char),
    ArrowUp,
    ArrowDown,
    Enter,
    Escape,
}

/// Where a pointer click landed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    /// The query box, engine button, or dropdown
    SearchControl,
    ContextMenu,
    Elsewhere,
}

/// A surface that fades out
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layer {
    ContextMenu,
    Modal(String),
}

/// Part of the page that needs redrawing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Search,
    Dropdown,
    Bookmarks,
    ContextMenu,
    Modals,
    Clock,
    Theme,
    Avatar,
    Background,
}

/// Something the front end has to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Leave the page for this URL
    Navigate(Url),
    FocusQuery,
    /// Message for the user
    Notice(String),
    Render(Region),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Key(Key),
    /// The query box now holds this text
    QueryInput(String),
    SubmitSearch,
    ToggleEngineMenu,
    PickEngine(usize),
    Click(ClickTarget),
    FilterBookmarks(String),
    ShowAddBookmark,
    AddBookmark { name: String, url: String },
    OpenContextMenu { bookmark_id: String, x: i32, y: i32 },
    EditFromMenu,
    SaveEdit { id: String, name: String, url: String },
    RemoveFromMenu,
    DragStart(String),
    DropOn(String),
    DragEnd,
    OpenSettings,
    CloseModal(String),
    ToggleClock,
    SetTheme(Theme),
    SetUsername(String),
    SetImageUrl { slot: ImageSlot, url: String },
    SetImageFile { slot: ImageSlot, file_name: String, bytes: Vec<u8> },
    RemoveImage(ImageSlot),
    Resize { width: i32, height: i32 },
    TransitionEnd(Layer),
    /// Time passed; finish hides whose grace period ran out
    Tick,
}

/// Result of a download done on a worker thread
#[derive(Debug, Clone, PartialEq, Eq)]
enum Fetched {
    /// Image bytes for a slot, or `None` if the download failed
    Image {
        slot: ImageSlot,
        url: String,
        bytes: Option<Vec<u8>>,
    },
    Favicon { host: String, icon: Favicon },
}

fn image_region(slot: ImageSlot) -> Region {
    match slot {
        ImageSlot::Avatar => Region::Avatar,
        ImageSlot::Background => Region::Background,
    }
}

pub struct Page {
    registry: EngineRegistry,
    search: SearchSession,
    bookmarks: BookmarkList,
    bookmark_filter: String,
    favicons: HashMap<String, Favicon>,
    /// Hosts with a favicon lookup in flight
    probing: HashSet<String>,
    context_menu: ContextMenu,
    modals: ModalStack,
    dashboard: Dashboard,
    dragging: Option<String>,
    viewport: Viewport,
    query_focused: bool,
    settings: SettingsStore,
    blobs: BlobStore,
    fetcher: Arc<dyn Fetcher>,
    fetched_tx: Sender<Fetched>,
    fetched_rx: Receiver<Fetched>,
    in_flight: usize,
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("search", &self.search)
            .field("bookmarks", &self.bookmarks.len())
            .field("context_menu", &self.context_menu.state())
            .field("query_focused", &self.query_focused)
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}

impl Page {
    /// Build the page from an opened profile
    pub fn open(profile: Profile, fetcher: Arc<dyn Fetcher>) -> Self {
        let Profile {
            settings,
            blobs,
            engines,
            ..
        } = profile;
        Self::from_parts(engines, settings, blobs, fetcher)
    }

    pub fn from_parts(
        registry: EngineRegistry,
        settings: SettingsStore,
        blobs: BlobStore,
        fetcher: Arc<dyn Fetcher>,
    ) -> Self {
        let search = SearchSession::load(&settings, &registry);
        let bookmarks = BookmarkList::load(&settings);
        let dashboard = Dashboard::load(&settings);
        let (fetched_tx, fetched_rx) = mpsc::channel();

        Self {
            registry,
            search,
            bookmarks,
            bookmark_filter: String::new(),
            favicons: HashMap::new(),
            probing: HashSet::new(),
            context_menu: ContextMenu::new(),
            modals: ModalStack::new(),
            dashboard,
            dragging: None,
            viewport: Viewport::default(),
            // The query box is focused when the page loads
            query_focused: true,
            settings,
            blobs,
            fetcher,
            fetched_tx,
            fetched_rx,
            in_flight: 0,
        }
    }

    pub fn registry(&self) -> &EngineRegistry {
        &self.registry
    }

    pub fn search(&self) -> &SearchSession {
        &self.search
    }

    pub fn bookmarks(&self) -> &BookmarkList {
        &self.bookmarks
    }

    pub fn bookmark_filter(&self) -> &str {
        &self.bookmark_filter
    }

    /// Grid cells under the current filter
    pub fn tiles(&self) -> Vec<Tile<'_>> {
        self.bookmarks.view(&self.bookmark_filter)
    }

    pub fn context_menu(&self) -> &ContextMenu {
        &self.context_menu
    }

    pub fn modals(&self) -> &ModalStack {
        &self.modals
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn dragging(&self) -> Option<&str> {
        self.dragging.as_deref()
    }

    pub fn is_query_focused(&self) -> bool {
        self.query_focused
    }

    pub fn image_source(&mut self, slot: ImageSlot) -> ImageSource {
        self.dashboard.image_source(slot, &self.settings, &mut self.blobs)
    }

    /// Downloads started but not yet picked up by a `Tick`
    pub fn pending_fetches(&self) -> usize {
        self.in_flight
    }

    /// Icon for a bookmark.
    ///
    /// The favicon service is asked once per host in the background; until
    /// the answer arrives the letter badge is returned.
    pub fn favicon(&mut self, bookmark_id: &str) -> Option<Favicon> {
        let url = self.bookmarks.get(bookmark_id)?.url.clone();
        let Some(host) = favicon::host_of(&url) else {
            return Some(Favicon::Default);
        };
        if let Some(icon) = self.favicons.get(&host) {
            return Some(icon.clone());
        }

        if self.probing.insert(host.clone()) {
            let lookup_host = host.clone();
            self.spawn_fetch(move |fetcher| Fetched::Favicon {
                icon: favicon::resolve(&url, fetcher),
                host: lookup_host,
            });
        }
        Some(favicon::fallback_for_host(&host))
    }

    /// Run a download off the interaction thread; the result is applied by
    /// the next `Tick`
    fn spawn_fetch<F>(&mut self, job: F)
    where
        F: FnOnce(&dyn Fetcher) -> Fetched + Send + 'static,
    {
        let fetcher = Arc::clone(&self.fetcher);
        let tx = self.fetched_tx.clone();
        let spawned = thread::Builder::new()
            .name("fetch".to_string())
            .spawn(move || {
                // The page may be gone by now
                let _ = tx.send(job(fetcher.as_ref()));
            });

        match spawned {
            Ok(_) => self.in_flight += 1,
            Err(e) => log::error!("Failed to start download thread: {}", e),
        }
    }

    pub fn dispatch(&mut self, action: Action) -> Vec<Effect> {
        self.dispatch_at(action, Instant::now())
    }

    /// Handle an action at a given time
    pub fn dispatch_at(&mut self, action: Action, now: Instant) -> Vec<Effect> {
        log::trace!("Dispatching {:?}", action);
        match action {
            Action::Key(key) => self.on_key(key, now),
            Action::QueryInput(text) => self.on_query_input(&text),
            Action::SubmitSearch => self.on_submit(),
            Action::ToggleEngineMenu => self.on_toggle_engine_menu(),
            Action::PickEngine(index) => self.on_pick_engine(index),
            Action::Click(target) => self.on_click(target, now),
            Action::FilterBookmarks(filter) => self.on_filter(filter),
            Action::ShowAddBookmark => self.on_show_add_bookmark(),
            Action::AddBookmark { name, url } => self.on_add_bookmark(&name, &url, now),
            Action::OpenContextMenu { bookmark_id, x, y } => {
                self.on_open_context_menu(&bookmark_id, Point::new(x, y), now)
            }
            Action::EditFromMenu => self.on_edit_from_menu(now),
            Action::SaveEdit { id, name, url } => self.on_save_edit(&id, &name, &url, now),
            Action::RemoveFromMenu => self.on_remove_from_menu(now),
            Action::DragStart(id) => self.on_drag_start(id),
            Action::DropOn(target) => self.on_drop(&target),
            Action::DragEnd => self.on_drag_end(),
            Action::OpenSettings => self.on_open_settings(),
            Action::CloseModal(id) => self.on_close_modal(&id, now),
            Action::ToggleClock => self.on_toggle_clock(),
            Action::SetTheme(theme) => self.on_set_theme(theme),
            Action::SetUsername(name) => self.on_set_username(&name),
            Action::SetImageUrl { slot, url } => self.on_set_image_url(slot, &url),
            Action::SetImageFile {
                slot,
                file_name,
                bytes,
            } => self.on_set_image_file(slot, &file_name, &bytes),
            Action::RemoveImage(slot) => self.on_remove_image(slot),
            Action::Resize { width, height } => self.on_resize(width, height),
            Action::TransitionEnd(layer) => self.on_transition_end(layer),
            Action::Tick => self.on_tick(now),
        }
    }

    // Keyboard

    fn on_key(&mut self, key: Key, now: Instant) -> Vec<Effect> {
        match key {
            Key::Char('/') if !self.query_focused => self.focus_query_shortcut(),
            Key::Ctrl(c) if matches!(c.to_ascii_lowercase(), 'e' | 'k') => {
                self.focus_query_shortcut()
            }
            Key::Escape => self.on_escape(now),
            Key::ArrowDown if self.dropdown_has_keys() => {
                self.search.arrow_down(&self.registry);
                vec![Effect::Render(Region::Dropdown)]
            }
            Key::ArrowUp if self.dropdown_has_keys() => {
                self.search.arrow_up(&self.registry);
                vec![Effect::Render(Region::Dropdown)]
            }
            Key::Enter if self.query_focused => {
                let result = self.search.enter(&self.registry, &mut self.settings);
                self.search_effects(result)
            }
            _ => Vec::new(),
        }
    }

    fn dropdown_has_keys(&self) -> bool {
        self.query_focused && self.search.dropdown().is_open()
    }

    fn focus_query_shortcut(&mut self) -> Vec<Effect> {
        if self.modals.has_any() || self.context_menu.is_visible() {
            log::debug!("Focus shortcut ignored while an overlay is open");
            return Vec::new();
        }
        self.query_focused = true;
        vec![Effect::FocusQuery]
    }

    /// Close the context menu, else the topmost modal, else the dropdown
    fn on_escape(&mut self, now: Instant) -> Vec<Effect> {
        if self.context_menu.is_visible() {
            self.context_menu.close(now);
            return vec![Effect::Render(Region::ContextMenu)];
        }
        if let Some(kind) = self.modals.close_top(now) {
            log::debug!("Escape closed modal '{}'", kind.id());
            return vec![Effect::Render(Region::Modals)];
        }
        if self.search.dropdown().is_open() {
            self.search.dismiss_dropdown();
            return vec![Effect::Render(Region::Dropdown)];
        }
        Vec::new()
    }

    // Search

    fn search_effects(&mut self, result: Result<SearchUpdate, SearchError>) -> Vec<Effect> {
        let mut effects = vec![Effect::Render(Region::Search), Effect::Render(Region::Dropdown)];
        match result {
            Ok(update) => {
                if update.focus_query {
                    self.query_focused = true;
                    effects.push(Effect::FocusQuery);
                }
                if let Some(url) = update.navigate {
                    effects.push(Effect::Navigate(url));
                }
            }
            Err(e) => {
                log::warn!("Search failed: {}", e);
                effects.push(Effect::Notice(e.to_string()));
            }
        }
        effects
    }

    fn on_query_input(&mut self, text: &str) -> Vec<Effect> {
        self.query_focused = true;
        self.search.input(text, &self.registry, &mut self.settings);
        vec![Effect::Render(Region::Search), Effect::Render(Region::Dropdown)]
    }

    fn on_submit(&mut self) -> Vec<Effect> {
        let result = self.search.submit(&self.registry, &mut self.settings);
        self.search_effects(result)
    }

    fn on_toggle_engine_menu(&mut self) -> Vec<Effect> {
        let update = self.search.toggle_dropdown();
        self.search_effects(Ok(update))
    }

    fn on_pick_engine(&mut self, index: usize) -> Vec<Effect> {
        let update = self.search.pick(index, &self.registry, &mut self.settings);
        self.search_effects(Ok(update))
    }

    fn on_click(&mut self, target: ClickTarget, now: Instant) -> Vec<Effect> {
        let mut effects = Vec::new();
        if target != ClickTarget::SearchControl {
            if self.query_focused {
                self.query_focused = false;
                effects.push(Effect::Render(Region::Search));
            }
            if self.search.dropdown().is_open() {
                self.search.dismiss_dropdown();
                effects.push(Effect::Render(Region::Dropdown));
            }
        }
        if target != ClickTarget::ContextMenu && self.context_menu.is_visible() {
            self.context_menu.close(now);
            effects.push(Effect::Render(Region::ContextMenu));
        }
        effects
    }

    // Bookmarks

    fn on_filter(&mut self, filter: String) -> Vec<Effect> {
        self.bookmark_filter = filter;
        vec![Effect::Render(Region::Bookmarks)]
    }

    fn show_limit_reached(&mut self) -> Vec<Effect> {
        self.modals.open(ModalKind::LimitReached);
        vec![
            Effect::Notice(BookmarkError::CapacityExceeded.to_string()),
            Effect::Render(Region::Modals),
        ]
    }

    fn on_show_add_bookmark(&mut self) -> Vec<Effect> {
        if self.bookmarks.is_full() {
            return self.show_limit_reached();
        }
        self.modals.open(ModalKind::AddBookmark);
        vec![Effect::Render(Region::Modals)]
    }

    fn on_add_bookmark(&mut self, name: &str, url: &str, now: Instant) -> Vec<Effect> {
        match self.bookmarks.add(name, url, &mut self.settings) {
            Ok(_) => {
                self.modals.close(ModalKind::AddBookmark.id(), now);
                vec![Effect::Render(Region::Bookmarks), Effect::Render(Region::Modals)]
            }
            Err(BookmarkError::CapacityExceeded) => self.show_limit_reached(),
            Err(e) => vec![Effect::Notice(e.to_string())],
        }
    }

    fn on_open_context_menu(&mut self, bookmark_id: &str, cursor: Point, now: Instant) -> Vec<Effect> {
        self.context_menu
            .open(cursor, bookmark_id, &self.bookmarks, self.viewport, now);
        vec![Effect::Render(Region::ContextMenu)]
    }

    fn on_edit_from_menu(&mut self, now: Instant) -> Vec<Effect> {
        let Some(id) = self.context_menu.target().map(str::to_string) else {
            return Vec::new();
        };
        self.context_menu.close(now);
        self.modals.open(ModalKind::EditBookmark(id));
        vec![Effect::Render(Region::ContextMenu), Effect::Render(Region::Modals)]
    }

    fn on_save_edit(&mut self, id: &str, name: &str, url: &str, now: Instant) -> Vec<Effect> {
        match self.bookmarks.edit(id, name, url, &mut self.settings) {
            Ok(found) => {
                if !found {
                    log::warn!("Bookmark {} disappeared while being edited", id);
                }
                self.modals.close("edit-bookmark", now);
                vec![Effect::Render(Region::Bookmarks), Effect::Render(Region::Modals)]
            }
            Err(e) => vec![Effect::Notice(e.to_string())],
        }
    }

    fn on_remove_from_menu(&mut self, now: Instant) -> Vec<Effect> {
        let Some(id) = self.context_menu.target().map(str::to_string) else {
            return Vec::new();
        };
        self.context_menu.close(now);
        self.bookmarks.remove(&id, &mut self.settings);
        vec![Effect::Render(Region::ContextMenu), Effect::Render(Region::Bookmarks)]
    }

    fn on_drag_start(&mut self, id: String) -> Vec<Effect> {
        if self.bookmarks.get(&id).is_none() {
            return Vec::new();
        }
        self.dragging = Some(id);
        vec![Effect::Render(Region::Bookmarks)]
    }

    fn on_drop(&mut self, target: &str) -> Vec<Effect> {
        let Some(dragged) = self.dragging.take() else {
            return Vec::new();
        };
        if self.bookmarks.reorder(&dragged, target, &mut self.settings) {
            vec![Effect::Render(Region::Bookmarks)]
        } else {
            Vec::new()
        }
    }

    fn on_drag_end(&mut self) -> Vec<Effect> {
        self.dragging = None;
        Vec::new()
    }

    // Modals

    fn on_open_settings(&mut self) -> Vec<Effect> {
        self.modals.open(ModalKind::Settings);
        vec![Effect::Render(Region::Modals)]
    }

    fn on_close_modal(&mut self, id: &str, now: Instant) -> Vec<Effect> {
        if self.modals.close(id, now) {
            vec![Effect::Render(Region::Modals)]
        } else {
            Vec::new()
        }
    }

    // Dashboard

    fn on_toggle_clock(&mut self) -> Vec<Effect> {
        self.dashboard.toggle_clock(&mut self.settings);
        vec![Effect::Render(Region::Clock)]
    }

    fn on_set_theme(&mut self, theme: Theme) -> Vec<Effect> {
        self.dashboard.set_theme(theme, &mut self.settings);
        vec![Effect::Render(Region::Theme)]
    }

    fn on_set_username(&mut self, name: &str) -> Vec<Effect> {
        self.dashboard.set_username(name, &mut self.settings);
        vec![Effect::Render(Region::Clock), Effect::Render(Region::Avatar)]
    }

    fn on_set_image_url(&mut self, slot: ImageSlot, url: &str) -> Vec<Effect> {
        if url.trim().is_empty() {
            return vec![Effect::Notice("Please enter an image URL".to_string())];
        }
        let url = url.trim().to_string();
        self.dashboard.set_image_url(slot, &url, &mut self.settings);

        self.spawn_fetch(move |fetcher| {
            let bytes = match fetcher.fetch(&url) {
                Ok(bytes) => Some(bytes),
                Err(e) => {
                    log::warn!("Failed to fetch {} image from {}: {}", slot.key(), url, e);
                    None
                }
            };
            Fetched::Image { slot, url, bytes }
        });
        vec![Effect::Render(image_region(slot))]
    }

    fn on_set_image_file(&mut self, slot: ImageSlot, file_name: &str, bytes: &[u8]) -> Vec<Effect> {
        match self.dashboard.set_image_from_file(
            slot,
            file_name,
            bytes,
            &mut self.settings,
            &mut self.blobs,
        ) {
            Ok(_) => vec![Effect::Render(image_region(slot))],
            Err(e) => {
                log::warn!("Failed to store {} image: {}", slot.key(), e);
                vec![Effect::Notice(format!("Could not save image: {}", e))]
            }
        }
    }

    fn on_remove_image(&mut self, slot: ImageSlot) -> Vec<Effect> {
        self.dashboard.remove_image(slot, &mut self.settings);
        vec![Effect::Render(image_region(slot))]
    }

    // Housekeeping

    fn on_resize(&mut self, width: i32, height: i32) -> Vec<Effect> {
        self.viewport = Viewport { width, height };
        Vec::new()
    }

    fn on_transition_end(&mut self, layer: Layer) -> Vec<Effect> {
        let finished = match layer {
            Layer::ContextMenu => self.context_menu.transition_end().is_some(),
            Layer::Modal(id) => self.modals.transition_end(&id),
        };
        if finished {
            vec![Effect::Render(Region::ContextMenu), Effect::Render(Region::Modals)]
        } else {
            Vec::new()
        }
    }

    fn on_tick(&mut self, now: Instant) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.context_menu.poll(now).is_some() {
            effects.push(Effect::Render(Region::ContextMenu));
        }
        if self.modals.poll(now) > 0 {
            effects.push(Effect::Render(Region::Modals));
        }
        while let Ok(fetched) = self.fetched_rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            effects.extend(self.on_fetched(fetched));
        }
        effects
    }

    fn on_fetched(&mut self, fetched: Fetched) -> Vec<Effect> {
        match fetched {
            Fetched::Image { slot, url, bytes } => {
                let Some(bytes) = bytes else {
                    // The URL stays in place
                    return Vec::new();
                };
                match self.dashboard.store_fetched_image(
                    slot,
                    &url,
                    bytes,
                    &mut self.settings,
                    &mut self.blobs,
                ) {
                    Some(_) => vec![Effect::Render(image_region(slot))],
                    None => Vec::new(),
                }
            }
            Fetched::Favicon { host, icon } => {
                self.probing.remove(&host);
                self.favicons.insert(host, icon);
                vec![Effect::Render(Region::Bookmarks)]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context_menu::MenuState;
    use crate::fetch::FetchError;
    use crate::transition::HideTransition;
    use tempfile::{tempdir, TempDir};

    struct OfflineFetcher;

    impl Fetcher for OfflineFetcher {
        fn fetch(&self, _url: &str) -> Result<Vec<u8>, FetchError> {
            Err(FetchError::Network("offline".to_string()))
        }
    }

    /// Answers every URL with the same bytes
    struct ServingFetcher(Vec<u8>);

    impl Fetcher for ServingFetcher {
        fn fetch(&self, _url: &str) -> Result<Vec<u8>, FetchError> {
            Ok(self.0.clone())
        }
    }

    fn page_with(fetcher: Arc<dyn Fetcher>) -> (Page, TempDir) {
        let dir = tempdir().unwrap();
        let page = Page::from_parts(
            EngineRegistry::builtin(),
            SettingsStore::in_memory(),
            BlobStore::new(dir.path()),
            fetcher,
        );
        (page, dir)
    }

    fn page() -> (Page, TempDir) {
        page_with(Arc::new(OfflineFetcher))
    }

    /// Tick until every background download has been applied
    fn settle(page: &mut Page) -> Vec<Effect> {
        let mut effects = Vec::new();
        for _ in 0..500 {
            effects.extend(page.dispatch(Action::Tick));
            if page.pending_fetches() == 0 {
                return effects;
            }
            thread::sleep(std::time::Duration::from_millis(2));
        }
        panic!("downloads did not finish");
    }

    fn navigated(effects: &[Effect]) -> Option<&str> {
        effects.iter().find_map(|e| match e {
            Effect::Navigate(url) => Some(url.as_str()),
            _ => None,
        })
    }

    fn add(page: &mut Page, name: &str) -> String {
        page.dispatch(Action::AddBookmark {
            name: name.to_string(),
            url: format!("{}.example", name.to_lowercase()),
        });
        page.bookmarks().items().last().unwrap().id.clone()
    }

    fn names(page: &Page) -> Vec<&str> {
        page.bookmarks().items().iter().map(|b| b.name.as_str()).collect()
    }

    #[test]
    fn test_plain_query_uses_selected_engine() {
        let (mut page, _dir) = page();
        page.dispatch(Action::QueryInput("weather".into()));
        let effects = page.dispatch(Action::Key(Key::Enter));
        assert_eq!(
            navigated(&effects),
            Some("https://www.google.com/search?q=weather")
        );
        assert_eq!(page.search().query(), "");
    }

    #[test]
    fn test_leading_shortcut_then_enter() {
        let (mut page, _dir) = page();
        page.dispatch(Action::QueryInput("!ddg cats".into()));
        assert_eq!(page.search().selected_engine_id(), "duckduckgo");
        assert_eq!(page.search().query(), "cats");
        assert!(!page.search().dropdown().is_open());

        let effects = page.dispatch(Action::Key(Key::Enter));
        assert_eq!(navigated(&effects), Some("https://duckduckgo.com/?q=cats"));
    }

    #[test]
    fn test_dropdown_keyboard_pick() {
        let (mut page, _dir) = page();
        page.dispatch(Action::QueryInput("!".into()));
        assert!(page.search().dropdown().is_open());

        page.dispatch(Action::Key(Key::ArrowUp));
        assert_eq!(page.search().dropdown().highlighted(), Some(6));
        let effects = page.dispatch(Action::Key(Key::Enter));

        assert!(effects.contains(&Effect::FocusQuery));
        assert_eq!(navigated(&effects), None);
        assert_eq!(page.search().selected_engine_id(), "ecosia");
        assert!(!page.search().dropdown().is_open());
    }

    #[test]
    fn test_arrows_ignored_when_dropdown_closed() {
        let (mut page, _dir) = page();
        let effects = page.dispatch(Action::Key(Key::ArrowDown));
        assert!(effects.is_empty());
        assert_eq!(page.search().dropdown().highlighted(), None);
    }

    #[test]
    fn test_focus_shortcuts_suppressed_by_modal() {
        let (mut page, _dir) = page();
        assert_eq!(
            page.dispatch(Action::Click(ClickTarget::Elsewhere)),
            vec![Effect::Render(Region::Search)]
        );
        assert!(!page.is_query_focused());

        assert_eq!(page.dispatch(Action::Key(Key::Char('/'))), vec![Effect::FocusQuery]);

        page.dispatch(Action::OpenSettings);
        assert!(page.dispatch(Action::Key(Key::Ctrl('k'))).is_empty());
        assert!(page.dispatch(Action::Key(Key::Ctrl('E'))).is_empty());
    }

    #[test]
    fn test_escape_closes_menu_then_modal() {
        let (mut page, _dir) = page();
        let now = Instant::now();
        let id = add(&mut page, "Docs");
        page.dispatch_at(Action::OpenSettings, now);
        page.dispatch_at(
            Action::OpenContextMenu {
                bookmark_id: id,
                x: 10,
                y: 10,
            },
            now,
        );

        page.dispatch_at(Action::Key(Key::Escape), now);
        assert_eq!(page.context_menu().state(), MenuState::Hiding);
        assert!(page.modals().is_open("settings"));

        page.dispatch_at(Action::Key(Key::Escape), now);
        assert!(!page.modals().is_open("settings"));

        let effects = page.dispatch_at(Action::Tick, now + HideTransition::grace());
        assert!(effects.contains(&Effect::Render(Region::ContextMenu)));
        assert!(effects.contains(&Effect::Render(Region::Modals)));
        assert!(!page.modals().has_any());
        assert_eq!(page.context_menu().state(), MenuState::Hidden);
    }

    #[test]
    fn test_limit_reached_opens_modal() {
        let (mut page, _dir) = page();
        for i in 0..12 {
            add(&mut page, &format!("Site{}", i));
        }
        assert!(!page.tiles().contains(&Tile::AddNew));

        let effects = page.dispatch(Action::ShowAddBookmark);
        assert!(effects.contains(&Effect::Notice(
            "You can only have a maximum of 12 bookmarks.".to_string()
        )));
        assert!(page.modals().is_open("limit-reached"));

        page.dispatch(Action::AddBookmark {
            name: "More".into(),
            url: "more.example".into(),
        });
        assert_eq!(page.bookmarks().len(), 12);
    }

    #[test]
    fn test_empty_bookmark_name_is_a_notice() {
        let (mut page, _dir) = page();
        let effects = page.dispatch(Action::AddBookmark {
            name: " ".into(),
            url: "example.com".into(),
        });
        assert!(matches!(effects.as_slice(), [Effect::Notice(_)]));
        assert!(page.bookmarks().is_empty());
    }

    #[test]
    fn test_drag_and_drop_reorders() {
        let (mut page, _dir) = page();
        let a = add(&mut page, "A");
        add(&mut page, "B");
        let c = add(&mut page, "C");

        assert_eq!(
            page.dispatch(Action::DragStart(c.clone())),
            vec![Effect::Render(Region::Bookmarks)]
        );
        assert_eq!(page.dragging(), Some(c.as_str()));
        assert!(page.dispatch(Action::DragStart("missing".into())).is_empty());
        assert_eq!(page.dragging(), Some(c.as_str()));
        let effects = page.dispatch(Action::DropOn(a.clone()));
        assert_eq!(effects, vec![Effect::Render(Region::Bookmarks)]);
        assert_eq!(names(&page), ["C", "A", "B"]);
        assert_eq!(page.dragging(), None);

        // Dropping without a drag in progress does nothing
        assert!(page.dispatch(Action::DropOn(a)).is_empty());
    }

    #[test]
    fn test_edit_and_remove_through_menu() {
        let (mut page, _dir) = page();
        let now = Instant::now();
        let id = add(&mut page, "Docs");
        add(&mut page, "Mail");

        page.dispatch_at(
            Action::OpenContextMenu {
                bookmark_id: id.clone(),
                x: 20,
                y: 20,
            },
            now,
        );
        page.dispatch_at(Action::EditFromMenu, now);
        assert_eq!(page.modals().top(), Some(&ModalKind::EditBookmark(id.clone())));
        assert_eq!(page.context_menu().state(), MenuState::Hiding);

        page.dispatch(Action::SaveEdit {
            id: id.clone(),
            name: "Reference".into(),
            url: "docs.rs".into(),
        });
        let edited = page.bookmarks().get(&id).unwrap();
        assert_eq!(edited.name, "Reference");
        assert_eq!(edited.url, "https://docs.rs");
        assert!(!page.modals().is_open("edit-bookmark"));

        page.dispatch_at(Action::TransitionEnd(Layer::ContextMenu), now);
        page.dispatch_at(
            Action::OpenContextMenu {
                bookmark_id: id.clone(),
                x: 20,
                y: 20,
            },
            now,
        );
        page.dispatch_at(Action::RemoveFromMenu, now);
        assert_eq!(names(&page), ["Mail"]);
        assert!(!page.context_menu().is_visible());
    }

    #[test]
    fn test_outside_click_closes_overlays() {
        let (mut page, _dir) = page();
        let id = add(&mut page, "Docs");
        page.dispatch(Action::ToggleEngineMenu);
        assert!(page.search().dropdown().is_open());
        page.dispatch(Action::OpenContextMenu {
            bookmark_id: id,
            x: 0,
            y: 0,
        });

        page.dispatch(Action::Click(ClickTarget::ContextMenu));
        assert!(page.context_menu().is_visible());
        assert!(!page.search().dropdown().is_open());

        page.dispatch(Action::Click(ClickTarget::Elsewhere));
        assert!(!page.context_menu().is_visible());
    }

    #[test]
    fn test_context_menu_respects_viewport() {
        let (mut page, _dir) = page();
        let id = add(&mut page, "Docs");
        page.dispatch(Action::Resize {
            width: 400,
            height: 300,
        });
        page.dispatch(Action::OpenContextMenu {
            bookmark_id: id,
            x: 390,
            y: 290,
        });
        assert_eq!(page.context_menu().anchor(), Point::new(205, 165));
    }

    #[test]
    fn test_filter_does_not_change_list() {
        let (mut page, _dir) = page();
        add(&mut page, "GitHub");
        add(&mut page, "Mail");

        page.dispatch(Action::FilterBookmarks("git".into()));
        let tiles = page.tiles();
        assert_eq!(tiles.len(), 2);
        assert!(matches!(tiles[0], Tile::Bookmark(b) if b.name == "GitHub"));
        assert_eq!(page.bookmarks().len(), 2);
    }

    #[test]
    fn test_favicon_falls_back_offline() {
        let (mut page, _dir) = page();
        let id = add(&mut page, "Docs");
        assert!(matches!(
            page.favicon(&id),
            Some(Favicon::Fallback { letter: 'D', .. })
        ));
        settle(&mut page);
        assert!(matches!(
            page.favicon(&id),
            Some(Favicon::Fallback { letter: 'D', .. })
        ));
        assert_eq!(page.favicon("missing"), None);
    }

    #[test]
    fn test_favicon_lookup_does_not_block() {
        let (mut page, _dir) = page_with(Arc::new(ServingFetcher(vec![1])));
        let id = add(&mut page, "Docs");

        // Badge first, one lookup per host even when asked twice
        assert!(matches!(page.favicon(&id), Some(Favicon::Fallback { .. })));
        page.favicon(&id);
        assert_eq!(page.pending_fetches(), 1);

        let effects = settle(&mut page);
        assert!(effects.contains(&Effect::Render(Region::Bookmarks)));
        assert_eq!(
            page.favicon(&id),
            Some(Favicon::Loaded("https://icons.duckduckgo.com/ip3/docs.example.ico".into()))
        );
        assert_eq!(page.pending_fetches(), 0);
    }

    #[test]
    fn test_image_url_downloads_in_background() {
        let (mut page, _dir) = page_with(Arc::new(ServingFetcher(vec![4, 2])));
        let url = "https://images.example/bg.jpg";

        page.dispatch(Action::SetImageUrl {
            slot: ImageSlot::Background,
            url: url.into(),
        });
        // Usable straight away, cached once the download lands
        assert_eq!(page.image_source(ImageSlot::Background), ImageSource::Url(url.into()));

        let effects = settle(&mut page);
        assert!(effects.contains(&Effect::Render(Region::Background)));
        assert_eq!(page.image_source(ImageSlot::Background), ImageSource::Blob(vec![4, 2]));
    }

    #[test]
    fn test_dashboard_actions() {
        let (mut page, _dir) = page();
        page.dispatch(Action::ToggleClock);
        page.dispatch(Action::SetTheme(Theme::Light));
        page.dispatch(Action::SetUsername("Ada".into()));
        assert_eq!(page.dashboard().theme(), Theme::Light);
        assert_eq!(page.dashboard().username(), "Ada");

        let effects = page.dispatch(Action::SetImageUrl {
            slot: ImageSlot::Background,
            url: "https://images.example/bg.jpg".into(),
        });
        assert_eq!(effects, vec![Effect::Render(Region::Background)]);
        assert_eq!(
            page.image_source(ImageSlot::Background),
            ImageSource::Url("https://images.example/bg.jpg".into())
        );

        page.dispatch(Action::SetImageFile {
            slot: ImageSlot::Avatar,
            file_name: "me.png".into(),
            bytes: vec![7, 7],
        });
        assert_eq!(page.image_source(ImageSlot::Avatar), ImageSource::Blob(vec![7, 7]));

        page.dispatch(Action::RemoveImage(ImageSlot::Avatar));
        assert_eq!(page.image_source(ImageSlot::Avatar), ImageSource::Default);
    }
}
