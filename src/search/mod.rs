//! Multi-engine search box with inline shortcuts.

pub mod dispatcher;
mod dropdown;
mod engine;
pub mod session;
pub mod shortcut;

pub use dispatcher::SearchError;
pub use dropdown::DropdownNavigator;
pub use engine::{Engine, EngineRegistry};
pub use session::{SearchSession, SearchUpdate};
