//! Slide layout: fitting a page image into a surface.
//!
//! A slide keeps its aspect ratio, so only one axis is pinned to the surface
//! and the other follows. [`SlideSize`] records which axis that was; the
//! same value is both the display request and the prerender cache key.

use std::path::PathBuf;

/// The pinned axis and its pixel extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlideSize {
    /// Width pinned to this many pixels.
    Width(u32),
    /// Height pinned to this many pixels.
    Height(u32),
}

impl SlideSize {
    /// Full pixel dimensions for a slide of the given aspect ratio.
    pub fn dimensions(self, aspect_ratio: f64) -> (u32, u32) {
        // Pixel extents stay far below u32::MAX, and ratios are positive.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        match self {
            Self::Width(w) => (w, (f64::from(w) / aspect_ratio).round().max(1.0) as u32),
            Self::Height(h) => ((f64::from(h) * aspect_ratio).round().max(1.0) as u32, h),
        }
    }

    pub const fn pixels(self) -> u32 {
        match self {
            Self::Width(px) | Self::Height(px) => px,
        }
    }
}

impl std::fmt::Display for SlideSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Width(px) => write!(f, "width={px}"),
            Self::Height(px) => write!(f, "height={px}"),
        }
    }
}

/// Pick the constrained axis for a surface.
///
/// A surface wider than the slide letterboxes the sides, so height is
/// pinned. Equal ratios pin width.
pub fn compute_display_size(
    surface_width: u32,
    surface_height: u32,
    aspect_ratio: f64,
) -> SlideSize {
    if surface_height == 0 {
        return SlideSize::Width(surface_width);
    }
    let surface_ratio = f64::from(surface_width) / f64::from(surface_height);
    if surface_ratio > aspect_ratio {
        SlideSize::Height(surface_height)
    } else {
        SlideSize::Width(surface_width)
    }
}

/// A request to show one page image at one size.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRequest {
    pub page: usize,
    pub path: PathBuf,
    pub size: SlideSize,
}

impl ImageRequest {
    pub fn new(cache_dir: &std::path::Path, page: usize, size: SlideSize) -> Self {
        Self {
            page,
            path: crate::cache::page_image_path(cache_dir, page),
            size,
        }
    }
}
