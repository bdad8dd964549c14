//! `ratatui-gridkit-core` provides data-driven UI components for terminal
//! apps: a data grid with a filter/sort/paginate pipeline, a declarative
//! form builder, drag-reorderable lists, split panes, tabs, and small
//! input primitives.
//!
//! ## Design goals
//!
//! - Event-loop agnostic: you drive input + rendering from your app.
//! - No async runtime: all components run on the main thread.
//! - State is explicit: widgets hold plain descriptor values and derive
//!   their view through pure functions; rendering is an idempotent
//!   projection and never mutates component state behind your back.
//! - Events over mutation: widgets never write through to caller-owned
//!   data. Every committed state change is reported both as a returned
//!   action and through registered [`event::Emitter`] handlers, so hosts
//!   can persist grid state from events alone.
//!
//! ## Getting started
//!
//! Most users should depend on the facade crate `ratatui-gridkit`. Use this
//! crate directly if you only need the core widgets/primitives.
//!
//! Useful entry points:
//! - [`datagrid::view::DataGridView`]: filterable, sortable, paginated grid
//!   with selection, column resize, and inline cell editing.
//! - [`form::view::FormView`]: declarative form with validation rules and
//!   field visibility dependencies.
//! - [`sortable::SortableList`]: drag-reorderable list.
//! - [`splitpane::SplitPane`] / [`tabs::TabsPanel`]: layout organisms.
//! - [`textarea::TextArea`]: multi-line input.
//!
//! ## Errors
//!
//! Invalid configuration (duplicate column keys, a zero page size, an
//! unknown filter operator) surfaces synchronously as
//! [`error::ConfigError`]; recoverable validation failures stay local to
//! the offending cell or field.
pub mod theme;

pub mod error;
pub mod event;
pub mod input;
pub mod keymap;
pub mod value;

#[cfg(feature = "crossterm")]
pub mod crossterm_input;

pub mod render;
pub mod viewport;

pub mod datagrid;
pub mod form;

pub mod checkbox;
pub mod radio;
pub mod sortable;
pub mod splitpane;
pub mod switch;
pub mod tabs;
pub mod textarea;
pub mod tooltip;
