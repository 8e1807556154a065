//! Slide image materialization and terminal graphics.
//!
//! Page images are decoded and scaled once per size into an [`ImageStore`];
//! drawing goes through a `ratatui-image` [`Picker`], which chooses the
//! best graphics protocol the terminal supports.

mod store;

pub use store::{DEFAULT_BUDGET_BYTES, ImageStore};

#[cfg(unix)]
use std::time::Duration;

use ratatui_image::picker::Picker;
#[cfg(unix)]
use ratatui_image::picker::cap_parser::QueryStdioOptions;

#[cfg(unix)]
const PICKER_QUERY_TIMEOUT_MS: u64 = 250;

/// Fallback cell size in pixels when the terminal does not report one.
pub const FALLBACK_CELL_PX: (u16, u16) = (10, 20);

/// Create a picker for terminal image rendering.
///
/// Must run before the terminal enters raw mode. Falls back to half-blocks
/// when the terminal does not answer the capability query.
pub fn create_picker(force_half_cell: bool) -> Picker {
    if force_half_cell {
        crate::perf::log_event("image.create_picker", "forced protocol=Halfblocks");
        return Picker::halfblocks();
    }

    #[cfg(not(unix))]
    {
        crate::perf::log_event("image.create_picker", "windows fallback protocol=Halfblocks");
        Picker::halfblocks()
    }

    #[cfg(unix)]
    {
        match Picker::from_query_stdio_with_options(query_options()) {
            Ok(picker) => {
                crate::perf::log_event(
                    "image.create_picker",
                    format!(
                        "term={} protocol={:?} font={:?}",
                        std::env::var("TERM").unwrap_or_else(|_| "<unset>".to_string()),
                        picker.protocol_type(),
                        picker.font_size()
                    ),
                );
                picker
            }
            Err(err) => {
                tracing::warn!(%err, "terminal graphics query failed, using half-blocks");
                Picker::halfblocks()
            }
        }
    }
}

/// Cell size in pixels reported by the picker, with a sane fallback.
pub fn cell_pixels(picker: &Picker) -> (u16, u16) {
    let (width, height) = picker.font_size();
    if width == 0 || height == 0 {
        FALLBACK_CELL_PX
    } else {
        (width, height)
    }
}

#[cfg(unix)]
fn query_options() -> QueryStdioOptions {
    let mut options = QueryStdioOptions::default();
    options.timeout = Duration::from_millis(PICKER_QUERY_TIMEOUT_MS);
    options
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_picker_query_timeout_is_fast() {
        let options = query_options();
        assert_eq!(options.timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_forced_half_cell_picker_has_cell_size() {
        let picker = create_picker(true);
        let (width, height) = cell_pixels(&picker);
        assert!(width > 0 && height > 0);
    }
}
