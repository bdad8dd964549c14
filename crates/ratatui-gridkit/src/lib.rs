//! Batteries-included facade over `ratatui-gridkit-core`.
//!
//! Re-exports every core module so apps depend on one crate. Enable the
//! `crossterm` feature to translate `crossterm` events into the crate's
//! input vocabulary via [`crossterm_input`].

pub use ratatui_gridkit_core::theme;

pub use ratatui_gridkit_core::error;
pub use ratatui_gridkit_core::event;
pub use ratatui_gridkit_core::input;
pub use ratatui_gridkit_core::keymap;
pub use ratatui_gridkit_core::value;

#[cfg(feature = "crossterm")]
pub use ratatui_gridkit_core::crossterm_input;

pub use ratatui_gridkit_core::render;
pub use ratatui_gridkit_core::viewport;

pub use ratatui_gridkit_core::datagrid;
pub use ratatui_gridkit_core::form;

pub use ratatui_gridkit_core::checkbox;
pub use ratatui_gridkit_core::radio;
pub use ratatui_gridkit_core::sortable;
pub use ratatui_gridkit_core::splitpane;
pub use ratatui_gridkit_core::switch;
pub use ratatui_gridkit_core::tabs;
pub use ratatui_gridkit_core::textarea;
pub use ratatui_gridkit_core::tooltip;
