//! Idle-time slide prerendering.
//!
//! A [`PrerenderJob`] walks a queue of `(page, size)` pairs, materializing
//! one per idle tick so later navigation never waits on decoding and
//! scaling. Pending input interrupts the job between items; the remaining
//! queue picks up on the next tick.

use std::collections::VecDeque;

use crate::layout::SlideSize;
use crate::timer::CancellationToken;

/// One unit of prerender work.
pub type WorkItem = (usize, SlideSize);

/// Disposable render target used only to force materialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScratchSurface {
    live: bool,
    last: Option<WorkItem>,
}

impl ScratchSurface {
    const fn new() -> Self {
        Self {
            live: true,
            last: None,
        }
    }

    pub const fn is_live(&self) -> bool {
        self.live
    }

    pub const fn last_rendered(&self) -> Option<WorkItem> {
        self.last
    }

    fn destroy(&mut self) {
        self.live = false;
        self.last = None;
    }
}

/// Result of one prerender tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// One item was materialized and more remain.
    Rendered { remaining: usize },
    /// Input arrived; the rest waits for the next tick.
    Interrupted { remaining: usize },
    /// The queue drained; scratch surface torn down and timer cancelled.
    Finished,
    /// The scratch surface died mid-run; the job cancelled itself.
    ScratchLost { remaining: usize },
    /// The job's token was cancelled from outside.
    Cancelled,
}

#[derive(Debug)]
pub struct PrerenderJob {
    queue: VecDeque<WorkItem>,
    scratch: ScratchSurface,
    token: CancellationToken,
    total: usize,
}

impl PrerenderJob {
    pub fn new(queue: VecDeque<WorkItem>, token: CancellationToken) -> Self {
        let total = queue.len();
        Self {
            queue,
            scratch: ScratchSurface::new(),
            token,
            total,
        }
    }

    /// Every page at the slide size, the current-slide thumbnail width and
    /// the next-slide thumbnail width, page by page.
    pub fn plan(
        page_count: usize,
        slide_size: SlideSize,
        current_thumb_width: u32,
        next_thumb_width: u32,
    ) -> VecDeque<WorkItem> {
        (1..=page_count)
            .flat_map(|page| {
                [
                    (page, slide_size),
                    (page, SlideSize::Width(current_thumb_width)),
                    (page, SlideSize::Width(next_thumb_width)),
                ]
            })
            .collect()
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    pub const fn total(&self) -> usize {
        self.total
    }

    pub const fn scratch(&self) -> &ScratchSurface {
        &self.scratch
    }

    pub fn is_done(&self) -> bool {
        self.token.is_cancelled()
    }

    /// The scratch surface went away underneath the job.
    pub fn lose_scratch(&mut self) {
        self.scratch.destroy();
    }

    /// Run one tick.
    ///
    /// `materialize` does the actual decode-and-scale for an item; a failure
    /// is logged and the item is dropped. `input_pending` is polled before
    /// and after the item.
    pub fn tick<E, F, P>(&mut self, mut materialize: F, input_pending: P) -> TickOutcome
    where
        E: std::fmt::Display,
        F: FnMut(usize, SlideSize) -> Result<(), E>,
        P: Fn() -> bool,
    {
        if self.token.is_cancelled() {
            return TickOutcome::Cancelled;
        }
        if !self.scratch.is_live() {
            self.token.cancel();
            tracing::warn!(remaining = self.queue.len(), "prerender scratch surface lost");
            return TickOutcome::ScratchLost {
                remaining: self.queue.len(),
            };
        }
        if self.queue.is_empty() {
            return self.finish();
        }
        if input_pending() {
            return TickOutcome::Interrupted {
                remaining: self.queue.len(),
            };
        }

        if let Some((page, size)) = self.queue.pop_front() {
            if let Err(err) = materialize(page, size) {
                tracing::warn!(page, %size, %err, "prerender failed");
            }
            self.scratch.last = Some((page, size));
            crate::perf::log_event(
                "prerender.item",
                format!("page={page} size={size} remaining={}", self.queue.len()),
            );
        }

        if self.queue.is_empty() {
            self.finish()
        } else if input_pending() {
            TickOutcome::Interrupted {
                remaining: self.queue.len(),
            }
        } else {
            TickOutcome::Rendered {
                remaining: self.queue.len(),
            }
        }
    }

    fn finish(&mut self) -> TickOutcome {
        self.scratch.destroy();
        self.token.cancel();
        tracing::info!(items = self.total, "prerender finished");
        TickOutcome::Finished
    }
}
