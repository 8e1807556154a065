//! Error types for presentation actions.

use std::path::PathBuf;

use thiserror::Error;

/// Reasons a requested action is refused.
///
/// All variants except [`PresentError::Io`] and [`PresentError::Decode`] are
/// precondition violations: the action is rejected, nothing changes, and the
/// session stays usable.
#[derive(Debug, Error)]
pub enum PresentError {
    #[error("Document is still being rasterized, try again when it finishes")]
    RasterizationInProgress,

    #[error("{} is not a rasterized document (no page-1.png)", .0.display())]
    NotRasterized(PathBuf),

    #[error("No slide surface, press m to create one")]
    NoSlideSurface,

    #[error("Slide surface must be fullscreen before building the cache")]
    NotFullscreen,

    #[error("Presenter surface is gone")]
    PresenterGone,

    #[error("No slide display configured (use --slide-tty)")]
    NoSlideTarget,

    #[error("Failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PresentError {
    pub(crate) fn decode(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        Self::Decode {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = PresentError> = std::result::Result<T, E>;
