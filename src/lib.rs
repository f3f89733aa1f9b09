//! Stacked form - a multi-step form where one step is expanded at a time
//!
//! The `form` module is the terminal-independent engine. `ui` and `app` host
//! it in a ratatui terminal for the demo binary.

pub mod app;
pub mod config;
pub mod form;
pub mod logging;
pub mod ui;
