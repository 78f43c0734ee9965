//! Floating edit/remove menu attached to a single bookmark.

use crate::bookmarks::BookmarkList;
use crate::config;
use crate::transition::{Completion, HideTransition};
use std::time::Instant;

/// A position in page pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Visible page area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: i32,
    pub height: i32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 800,
        }
    }
}

/// Place the menu just below and right of the cursor, flipping to the
/// other side of the cursor on each axis where it would overflow
pub fn menu_position(cursor: Point, viewport: Viewport) -> Point {
    let offset = config::CONTEXT_MENU_OFFSET;

    let mut x = cursor.x + offset;
    let mut y = cursor.y + offset;

    if x + config::CONTEXT_MENU_WIDTH > viewport.width {
        x = cursor.x - config::CONTEXT_MENU_WIDTH - offset;
    }
    if y + config::CONTEXT_MENU_HEIGHT > viewport.height {
        y = cursor.y - config::CONTEXT_MENU_HEIGHT - offset;
    }

    Point::new(x.max(0), y.max(0))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    Hidden,
    Shown,
    /// Fading out, still drawn
    Hiding,
}

/// The single context menu instance
#[derive(Debug, Clone)]
pub struct ContextMenu {
    state: MenuState,
    target: Option<String>,
    anchor: Point,
    hide: HideTransition,
}

impl Default for ContextMenu {
    fn default() -> Self {
        Self {
            state: MenuState::Hidden,
            target: None,
            anchor: Point::default(),
            hide: HideTransition::default(),
        }
    }
}

impl ContextMenu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MenuState {
        self.state
    }

    pub fn is_visible(&self) -> bool {
        self.state == MenuState::Shown
    }

    /// Bookmark the menu acts on
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn anchor(&self) -> Point {
        self.anchor
    }

    /// Show the menu for a bookmark.
    ///
    /// Any menu already showing is replaced; a fade-out in progress is
    /// cancelled. If the bookmark no longer exists the menu is dismissed
    /// instead and `false` is returned.
    pub fn open(
        &mut self,
        cursor: Point,
        bookmark_id: &str,
        bookmarks: &BookmarkList,
        viewport: Viewport,
        now: Instant,
    ) -> bool {
        if bookmarks.get(bookmark_id).is_none() {
            log::debug!("No bookmark {} for context menu", bookmark_id);
            self.close(now);
            return false;
        }

        self.hide.cancel();
        self.target = Some(bookmark_id.to_string());
        self.anchor = menu_position(cursor, viewport);
        self.state = MenuState::Shown;
        true
    }

    /// Start fading the menu out
    pub fn close(&mut self, now: Instant) {
        if self.state == MenuState::Shown {
            self.state = MenuState::Hiding;
            self.hide.start(now);
        }
    }

    /// The fade-out animation finished
    pub fn transition_end(&mut self) -> Option<Completion> {
        let completion = self.hide.transition_end();
        if completion.is_some() {
            self.detach();
        }
        completion
    }

    /// Force the hide once the grace period is over
    pub fn poll(&mut self, now: Instant) -> Option<Completion> {
        let completion = self.hide.poll(now);
        if completion.is_some() {
            self.detach();
        }
        completion
    }

    fn detach(&mut self) {
        self.state = MenuState::Hidden;
        self.target = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SettingsStore;

    fn bookmarks() -> (BookmarkList, String) {
        let mut settings = SettingsStore::in_memory();
        let mut list = BookmarkList::default();
        let id = list.add("Example", "example.com", &mut settings).unwrap().id.clone();
        (list, id)
    }

    #[test]
    fn test_position_below_right_of_cursor() {
        let viewport = Viewport { width: 1000, height: 800 };
        assert_eq!(menu_position(Point::new(100, 100), viewport), Point::new(105, 105));
    }

    #[test]
    fn test_position_flips_near_edges() {
        let viewport = Viewport { width: 1000, height: 800 };
        assert_eq!(menu_position(Point::new(900, 100), viewport), Point::new(715, 105));
        assert_eq!(menu_position(Point::new(100, 750), viewport), Point::new(105, 625));
        assert_eq!(menu_position(Point::new(990, 790), viewport), Point::new(805, 665));
    }

    #[test]
    fn test_position_clamped_in_tiny_viewport() {
        let viewport = Viewport { width: 150, height: 100 };
        assert_eq!(menu_position(Point::new(10, 10), viewport), Point::new(0, 0));
    }

    #[test]
    fn test_open_and_close_with_timeout() {
        let (list, id) = bookmarks();
        let now = Instant::now();
        let mut menu = ContextMenu::new();

        assert!(menu.open(Point::new(10, 10), &id, &list, Viewport::default(), now));
        assert!(menu.is_visible());
        assert_eq!(menu.target(), Some(id.as_str()));
        assert_eq!(menu.anchor(), Point::new(15, 15));

        menu.close(now);
        assert_eq!(menu.state(), MenuState::Hiding);
        assert_eq!(menu.poll(now), None);
        assert_eq!(menu.poll(now + HideTransition::grace()), Some(Completion::Timeout));
        assert_eq!(menu.state(), MenuState::Hidden);
        assert_eq!(menu.target(), None);
    }

    #[test]
    fn test_close_with_transition_end() {
        let (list, id) = bookmarks();
        let now = Instant::now();
        let mut menu = ContextMenu::new();
        menu.open(Point::new(10, 10), &id, &list, Viewport::default(), now);
        menu.close(now);

        assert_eq!(menu.transition_end(), Some(Completion::TransitionEnd));
        assert_eq!(menu.state(), MenuState::Hidden);
        assert_eq!(menu.poll(now + HideTransition::grace()), None);
    }

    #[test]
    fn test_reopen_cancels_pending_hide() {
        let (list, id) = bookmarks();
        let now = Instant::now();
        let mut menu = ContextMenu::new();
        menu.open(Point::new(10, 10), &id, &list, Viewport::default(), now);
        menu.close(now);

        assert!(menu.open(Point::new(50, 60), &id, &list, Viewport::default(), now));
        assert_eq!(menu.poll(now + HideTransition::grace()), None);
        assert!(menu.is_visible());
        assert_eq!(menu.anchor(), Point::new(55, 65));
    }

    #[test]
    fn test_open_unknown_bookmark_dismisses() {
        let (list, id) = bookmarks();
        let now = Instant::now();
        let mut menu = ContextMenu::new();
        menu.open(Point::new(10, 10), &id, &list, Viewport::default(), now);

        assert!(!menu.open(Point::new(10, 10), "gone", &list, Viewport::default(), now));
        assert_eq!(menu.state(), MenuState::Hiding);
    }

    #[test]
    fn test_close_when_hidden_is_noop() {
        let mut menu = ContextMenu::new();
        menu.close(Instant::now());
        assert_eq!(menu.state(), MenuState::Hidden);
        assert_eq!(menu.transition_end(), None);
    }
}
