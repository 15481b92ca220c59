//! Application orchestration: state, timers, fetching and input handling.

pub mod client;
pub mod event;
pub mod handler;
pub mod refresh;
pub mod state;
pub mod timer;
