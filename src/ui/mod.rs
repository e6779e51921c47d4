pub mod app;
pub mod event;
pub mod overlay;
pub mod shortcut;
