//! Terminal UI for both surfaces.
//!
//! - [`render`]: presenter layout or overview grid, status and toast bars
//! - [`render_slide`]: the audience-facing slide terminal
//! - [`grid`]: overview thumbnail placement and highlights

pub mod grid;

mod images;
mod overlays;
mod render;
mod status;

pub use render::{render, render_slide};
