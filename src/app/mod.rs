//! Presentation session and main event loop.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete session state
//! - [`Message`]: All possible events and actions
//! - [`update`]: Pure function for state transitions
//! - [`App::run`]: Main event loop with rendering

mod effects;
mod event_loop;
mod input;
mod model;
mod update;

pub use model::{Model, PRERENDER_INTERVAL, Phase, SECOND, ToastLevel};
pub use update::{Message, update};

use std::path::PathBuf;

use crate::config::Settings;

/// Default slide terminal size when none is configured.
pub const DEFAULT_SLIDE_SIZE: (u16, u16) = (80, 24);

/// Main application struct that owns the terminals and runs the event loop.
pub struct App {
    source: PathBuf,
    cache_dir: Option<PathBuf>,
    settings: Settings,
    slide_tty: Option<PathBuf>,
    slide_size: (u16, u16),
    force_half_cell: bool,
}

impl App {
    /// Create a new application for the given document.
    pub fn new(source: PathBuf) -> Self {
        Self {
            source,
            cache_dir: None,
            settings: Settings::default(),
            slide_tty: None,
            slide_size: DEFAULT_SLIDE_SIZE,
            force_half_cell: false,
        }
    }

    /// Use validated settings, including the slide display target.
    #[must_use]
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.slide_tty.clone_from(&settings.slide_tty);
        self.slide_size = settings.slide_size.unwrap_or(DEFAULT_SLIDE_SIZE);
        self.settings = settings;
        self
    }

    /// Read page images from this directory instead of the default.
    #[must_use]
    pub fn with_cache_dir(mut self, cache_dir: Option<PathBuf>) -> Self {
        self.cache_dir = cache_dir;
        self
    }

    /// Force image rendering to half-block cells.
    #[must_use]
    pub const fn with_force_half_cell(mut self, force: bool) -> Self {
        self.force_half_cell = force;
        self
    }
}

#[cfg(test)]
mod tests;
