//! Page image cache lookup.
//!
//! An external rasterizer turns each page of a document into
//! `page-<N>.png` inside a cache directory. This module only resolves those
//! paths and reads the handful of facts a session needs at start: whether the
//! rasterizer is still busy, how many pages exist, and the slide aspect ratio.

use std::path::{Path, PathBuf};

use crate::error::{PresentError, Result};

/// Marker file the rasterizer keeps in the cache directory while it works.
pub const BUSY_MARKER: &str = ".rasterizing";

/// Resolve the image file for a 1-based page number.
///
/// Pure path construction; existence is the caller's concern.
pub fn page_image_path(cache_dir: &Path, page: usize) -> PathBuf {
    cache_dir.join(format!("page-{page}.png"))
}

/// Default cache directory for a document: `<dir>/<stem>.pages`.
pub fn default_cache_dir(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map_or_else(|| "document".to_string(), |s| s.to_string_lossy().to_string());
    source
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
        .join(format!("{stem}.pages"))
}

/// Whether the rasterizer is still producing pages.
pub fn is_busy(cache_dir: &Path) -> bool {
    cache_dir.join(BUSY_MARKER).exists()
}

/// Count the contiguous run of page images starting at page 1.
pub fn count_pages(cache_dir: &Path) -> usize {
    let mut count = 0;
    while page_image_path(cache_dir, count + 1).is_file() {
        count += 1;
    }
    count
}

/// A rasterized document, ready to present.
#[derive(Debug, Clone, PartialEq)]
pub struct Deck {
    source: PathBuf,
    cache_dir: PathBuf,
    page_count: usize,
    aspect_ratio: f64,
}

impl Deck {
    /// Open a rasterized document.
    ///
    /// # Errors
    ///
    /// Returns [`PresentError::RasterizationInProgress`] while the busy
    /// marker exists, [`PresentError::NotRasterized`] when there is no first
    /// page, and [`PresentError::Decode`] when the first page header cannot be read.
    pub fn open(source: impl Into<PathBuf>, cache_dir: impl Into<PathBuf>) -> Result<Self> {
        let source = source.into();
        let cache_dir = cache_dir.into();
        if is_busy(&cache_dir) {
            return Err(PresentError::RasterizationInProgress);
        }
        let page_count = count_pages(&cache_dir);
        if page_count == 0 {
            return Err(PresentError::NotRasterized(cache_dir));
        }
        let first = page_image_path(&cache_dir, 1);
        let (width, height) =
            image::image_dimensions(&first).map_err(|err| PresentError::decode(&first, err))?;
        if height == 0 {
            return Err(PresentError::NotRasterized(cache_dir));
        }
        let aspect_ratio = f64::from(width) / f64::from(height);
        crate::perf::log_event(
            "deck.open",
            format!(
                "source={} pages={page_count} first={width}x{height} aspect={aspect_ratio:.4}",
                source.display()
            ),
        );
        Ok(Self {
            source,
            cache_dir,
            page_count,
            aspect_ratio,
        })
    }

    /// Build a deck from known facts without touching the filesystem.
    pub fn from_parts(
        source: impl Into<PathBuf>,
        cache_dir: impl Into<PathBuf>,
        page_count: usize,
        aspect_ratio: f64,
    ) -> Self {
        Self {
            source: source.into(),
            cache_dir: cache_dir.into(),
            page_count,
            aspect_ratio,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub const fn page_count(&self) -> usize {
        self.page_count
    }

    pub const fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }

    pub fn page_path(&self, page: usize) -> PathBuf {
        page_image_path(&self.cache_dir, page)
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::from_parts("", "", 1, 4.0 / 3.0)
    }
}
