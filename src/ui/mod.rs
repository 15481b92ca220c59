//! UI / rendering layer. Everything that touches Ratatui widgets.
//!
//! This layer takes the *core* display model and turns it into pixels on
//! the terminal.  No network I/O happens here.

pub mod bars;
pub mod layout;
pub mod popup;
pub mod spinner;
pub mod table_widget;
pub mod theme;
