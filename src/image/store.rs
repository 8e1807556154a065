//! Materialized slide images.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

use image::DynamicImage;
use image::imageops::FilterType;

use crate::error::{PresentError, Result};
use crate::layout::{ImageRequest, SlideSize};

/// Default memory budget for decoded images.
pub const DEFAULT_BUDGET_BYTES: usize = 512 * 1024 * 1024;

type StoreKey = (PathBuf, SlideSize);

/// Decoded page images, already scaled to the size they are drawn at.
///
/// Keyed by file and [`SlideSize`], so the prerender pipeline and the live
/// display share entries. The oldest entries are evicted once the byte
/// budget is exceeded.
#[derive(Debug)]
pub struct ImageStore {
    entries: HashMap<StoreKey, DynamicImage>,
    order: VecDeque<StoreKey>,
    bytes: usize,
    budget: usize,
}

impl ImageStore {
    pub fn new(budget_bytes: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            bytes: 0,
            budget: budget_bytes,
        }
    }

    pub fn get(&self, request: &ImageRequest) -> Option<&DynamicImage> {
        self.entries.get(&(request.path.clone(), request.size))
    }

    pub fn contains(&self, request: &ImageRequest) -> bool {
        self.entries
            .contains_key(&(request.path.clone(), request.size))
    }

    /// Decode and scale `request` unless it is already in memory.
    ///
    /// # Errors
    ///
    /// Returns [`PresentError::Decode`] when the page image is missing or
    /// unreadable.
    pub fn materialize(&mut self, request: &ImageRequest) -> Result<&DynamicImage> {
        let key = (request.path.clone(), request.size);
        if self.entries.contains_key(&key) {
            return Ok(&self.entries[&key]);
        }
        let image = load_scaled(&request.path, request.size)?;
        let size = image_bytes(&image);
        self.make_room(size);
        self.bytes += size;
        self.order.push_back(key.clone());
        Ok(self.entries.entry(key).or_insert(image))
    }

    fn make_room(&mut self, incoming: usize) {
        while self.bytes + incoming > self.budget {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            if let Some(image) = self.entries.remove(&oldest) {
                self.bytes = self.bytes.saturating_sub(image_bytes(&image));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub const fn bytes(&self) -> usize {
        self.bytes
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
        self.bytes = 0;
    }
}

impl Default for ImageStore {
    fn default() -> Self {
        Self::new(DEFAULT_BUDGET_BYTES)
    }
}

/// Load a page image and scale it so the pinned axis matches `size`.
fn load_scaled(path: &Path, size: SlideSize) -> Result<DynamicImage> {
    let _scope = crate::perf::scope("image.load_scaled");
    let image = image::open(path).map_err(|err| PresentError::decode(path, err))?;
    if image.height() == 0 {
        return Ok(image);
    }
    let aspect = f64::from(image.width()) / f64::from(image.height());
    let (width, height) = size.dimensions(aspect);
    crate::perf::log_event(
        "image.materialize",
        format!(
            "path={} from={}x{} to={width}x{height}",
            path.display(),
            image.width(),
            image.height()
        ),
    );
    if (width, height) == (image.width(), image.height()) {
        return Ok(image);
    }
    Ok(image.resize_exact(width, height, FilterType::Triangle))
}

fn image_bytes(image: &DynamicImage) -> usize {
    image.as_bytes().len()
}
