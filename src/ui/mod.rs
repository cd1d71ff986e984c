//! UI rendering module for wxlookup
//!
//! This module contains all the rendering logic for the terminal user interface,
//! using the ratatui library for TUI components.

pub mod help_overlay;
pub mod weather_view;

pub use help_overlay::render as render_help_overlay;
pub use weather_view::render as render_weather_view;
