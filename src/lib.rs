// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. overview::OverviewGrid)
    clippy::module_name_repetitions
)]

//! # Podium
//!
//! A dual-terminal slide presenter for rasterized documents.
//!
//! Podium shows page images of a deck on one terminal (the slide surface)
//! while the invoking terminal (the presenter surface) shows:
//! - Clock, stopwatch and page counters
//! - Current and next slide thumbnails
//! - Speaker notes
//! - A navigable overview grid of every slide
//!
//! ## Architecture
//!
//! Podium uses The Elm Architecture (TEA) pattern:
//! - **Model**: Session state
//! - **Message**: User actions, timer ticks and host events
//! - **Update**: Pure state transitions
//! - **View**: Render both surfaces
//!
//! ## Modules
//!
//! - [`app`]: Session state machine and main event loop
//! - [`cache`]: Rasterized page lookup
//! - [`layout`]: Display size selection and image requests
//! - [`prerender`]: Idle-time image materialization
//! - [`overview`]: Slide grid navigation
//! - [`presenter`]: Presenter layout templates
//! - [`ui`]: Terminal drawing

pub mod app;
pub mod cache;
pub mod config;
pub mod error;
pub mod image;
pub mod layout;
pub mod notes;
pub mod overview;
pub mod perf;
pub mod prerender;
pub mod presenter;
pub mod surface;
pub mod timer;
pub mod ui;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model, update};
    pub use crate::cache::Deck;
    pub use crate::config::Settings;
    pub use crate::error::PresentError;
    pub use crate::notes::Notes;
    pub use crate::surface::Geometry;
}
