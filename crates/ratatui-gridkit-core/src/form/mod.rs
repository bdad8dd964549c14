//! Declarative form builder: field specs with validation rules and a
//! visibility dependency graph, plus the [`view::FormView`] widget that
//! renders and drives them.

pub mod field;
pub mod rules;
pub mod view;
