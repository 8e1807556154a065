//! Speaker notes.
//!
//! Notes live in an outline file next to the document, one heading per page
//! range:
//!
//! ```text
//! * 1
//! Welcome everyone.
//! * 3-5
//! Walk through the benchmark.
//! ```

use std::path::{Path, PathBuf};

use crate::error::{PresentError, Result};

/// Suffix appended to the document stem to find its notes file.
pub const NOTES_SUFFIX: &str = "-notes.org";

/// Text attached to an inclusive page range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

/// Immutable notes for one presentation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notes {
    entries: Vec<Note>,
}

impl Notes {
    pub const fn new(entries: Vec<Note>) -> Self {
        Self { entries }
    }

    /// Load notes for a document. A missing file yields no notes.
    ///
    /// # Errors
    ///
    /// Returns [`PresentError::Io`] if the file exists but cannot be read.
    pub fn load_for(source: &Path) -> Result<Self> {
        let path = notes_path_for(source);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no notes file");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path).map_err(|e| PresentError::io(&path, e))?;
        let notes = Self::parse(&content);
        crate::perf::log_event(
            "notes.load",
            format!("path={} entries={}", path.display(), notes.len()),
        );
        Ok(notes)
    }

    /// Parse outline text into notes, skipping headings that are not ranges.
    pub fn parse(content: &str) -> Self {
        let mut entries = Vec::new();
        let mut current: Option<(usize, usize, Vec<&str>)> = None;
        for line in content.lines() {
            if let Some(heading) = line.strip_prefix('*') {
                if let Some((start, end, body)) = current.take() {
                    entries.push(Note {
                        start,
                        end,
                        text: body.join("\n").trim().to_string(),
                    });
                }
                current = parse_range(heading.trim_start_matches('*').trim())
                    .map(|(start, end)| (start, end, Vec::new()));
            } else if let Some((_, _, body)) = current.as_mut() {
                body.push(line);
            }
        }
        if let Some((start, end, body)) = current {
            entries.push(Note {
                start,
                end,
                text: body.join("\n").trim().to_string(),
            });
        }
        Self { entries }
    }

    /// First note whose range contains `page`.
    pub fn lookup(&self, page: usize) -> Option<&str> {
        self.entries
            .iter()
            .find(|note| note.start <= page && page <= note.end)
            .map(|note| note.text.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn notes_path_for(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    source.with_file_name(format!("{stem}{NOTES_SUFFIX}"))
}

fn parse_range(heading: &str) -> Option<(usize, usize)> {
    let (start, end) = match heading.split_once('-') {
        Some((a, b)) => (a.trim().parse().ok()?, b.trim().parse().ok()?),
        None => {
            let page = heading.parse().ok()?;
            (page, page)
        }
    };
    (start <= end).then_some((start, end))
}
