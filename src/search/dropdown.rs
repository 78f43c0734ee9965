//! Keyboard/pointer state for the engine picker dropdown.

use super::{Engine, EngineRegistry};

/// Open/closed state plus the keyboard highlight.
///
/// The highlight only exists while the dropdown is open; opening always
/// starts with nothing highlighted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DropdownNavigator {
    open: bool,
    highlighted: Option<usize>,
}

/// One rendered dropdown entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropdownRow<'a> {
    pub engine: &'a Engine,
    /// The engine currently used for searches
    pub selected: bool,
    /// The keyboard cursor is on this row
    pub highlighted: bool,
}

impl DropdownNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn highlighted(&self) -> Option<usize> {
        if self.open {
            self.highlighted
        } else {
            None
        }
    }

    pub fn open(&mut self) {
        self.open = true;
        self.highlighted = None;
    }

    pub fn close(&mut self) {
        self.open = false;
        self.highlighted = None;
    }

    pub fn toggle(&mut self) {
        if self.open {
            self.close();
        } else {
            self.open();
        }
    }

    /// Move the highlight down, wrapping from the last row to the first
    pub fn move_down(&mut self, len: usize) {
        if !self.open || len == 0 {
            return;
        }
        self.highlighted = Some(match self.highlighted {
            Some(index) => (index + 1) % len,
            None => 0,
        });
    }

    /// Move the highlight up, wrapping from the first row to the last
    pub fn move_up(&mut self, len: usize) {
        if !self.open || len == 0 {
            return;
        }
        self.highlighted = Some(match self.highlighted {
            Some(index) => (index + len - 1) % len,
            None => len - 1,
        });
    }

    /// Build the rows to draw, straight from the registry order.
    /// Returns nothing while closed.
    pub fn rows<'a>(&self, registry: &'a EngineRegistry, selected_id: &str) -> Vec<DropdownRow<'a>> {
        if !self.open {
            return Vec::new();
        }

        registry
            .iter()
            .enumerate()
            .map(|(index, engine)| DropdownRow {
                engine,
                selected: engine.id == selected_id,
                highlighted: self.highlighted == Some(index),
            })
            .collect()
    }
}
