//! wxlookup library
//!
//! Weather lookup with debounced city autocomplete, plus an offline asset
//! cache worker. The binary in `main.rs` wires these into a terminal UI and
//! an `assets` command.

pub mod app;
pub mod cache;
pub mod cli;
pub mod config;
pub mod controller;
pub mod data;
pub mod debounce;
pub mod logging;
pub mod notify;
pub mod ui;
pub mod view;
