//! Terminal monitor for a running circuit.
//!
//! Provides an interactive view with:
//! - Per-element port values with trit coloring
//! - Step counter and circuit size
//! - Step/run/pause/reset controls on a periodic driver

mod app;
mod ui;

pub use app::{MonitorApp, run_monitor};
