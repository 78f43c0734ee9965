//! Stack of open dialogs.

use crate::transition::HideTransition;
use std::time::Instant;

/// The dialogs the dashboard can show
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalKind {
    Settings,
    AddBookmark,
    /// Editing the bookmark with this id
    EditBookmark(String),
    LimitReached,
}

impl ModalKind {
    /// Identifier shared by all modals of the same kind
    pub fn id(&self) -> &'static str {
        match self {
            ModalKind::Settings => "settings",
            ModalKind::AddBookmark => "add-bookmark",
            ModalKind::EditBookmark(_) => "edit-bookmark",
            ModalKind::LimitReached => "limit-reached",
        }
    }
}

#[derive(Debug, Clone)]
struct ActiveModal {
    kind: ModalKind,
    hide: HideTransition,
}

/// Open modals, oldest first.
///
/// A closing modal stays on the stack until its fade-out completes, so
/// `has_any` keeps reporting it until then.
#[derive(Debug, Clone, Default)]
pub struct ModalStack {
    modals: Vec<ActiveModal>,
}

impl ModalStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show a modal. An existing modal with the same id is replaced at once,
    /// even if it was fading out.
    pub fn open(&mut self, kind: ModalKind) {
        self.modals.retain(|m| m.kind.id() != kind.id());
        log::debug!("Opening modal '{}'", kind.id());
        self.modals.push(ActiveModal {
            kind,
            hide: HideTransition::default(),
        });
    }

    pub fn has_any(&self) -> bool {
        !self.modals.is_empty()
    }

    /// Topmost modal that is not already closing
    pub fn top(&self) -> Option<&ModalKind> {
        self.modals
            .iter()
            .rev()
            .find(|m| !m.hide.is_pending())
            .map(|m| &m.kind)
    }

    /// Whether a modal with this id is open and not closing
    pub fn is_open(&self, id: &str) -> bool {
        self.modals
            .iter()
            .any(|m| m.kind.id() == id && !m.hide.is_pending())
    }

    /// Start closing the modal with this id
    pub fn close(&mut self, id: &str, now: Instant) -> bool {
        match self
            .modals
            .iter_mut()
            .find(|m| m.kind.id() == id && !m.hide.is_pending())
        {
            Some(modal) => {
                modal.hide.start(now);
                true
            }
            None => false,
        }
    }

    /// Start closing the topmost modal (Escape)
    pub fn close_top(&mut self, now: Instant) -> Option<ModalKind> {
        let modal = self.modals.iter_mut().rev().find(|m| !m.hide.is_pending())?;
        modal.hide.start(now);
        Some(modal.kind.clone())
    }

    /// Ids of modals that are fading out
    pub fn closing(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.modals
            .iter()
            .filter(|m| m.hide.is_pending())
            .map(|m| m.kind.id())
    }

    /// The fade-out of the modal with this id finished
    pub fn transition_end(&mut self, id: &str) -> bool {
        let before = self.modals.len();
        self.modals
            .retain_mut(|m| !(m.kind.id() == id && m.hide.transition_end().is_some()));
        before != self.modals.len()
    }

    /// Detach modals whose grace period ran out; returns how many were removed
    pub fn poll(&mut self, now: Instant) -> usize {
        let before = self.modals.len();
        self.modals.retain_mut(|m| m.hide.poll(now).is_none());
        before - self.modals.len()
    }
}
