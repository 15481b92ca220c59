//! Core data transforms – columns, formatting, sorting, filtering, the
//! table view, and the auto-scroll cycle.
//!
//! Nothing in this module depends on any TUI, HTTP, or async crate.

pub mod access;
pub mod column;
pub mod display;
pub mod filter;
pub mod format;
pub mod record;
pub mod scroll;
pub mod sort;
pub mod view;
