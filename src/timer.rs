//! Recurring timers for the single-threaded event loop.
//!
//! Every scheduled task carries a [`CancellationToken`]. The loop asks
//! [`Timers::take_due`] which tasks fired; cancelled tasks are dropped
//! without firing, so a handler never runs against a finished session.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Wall clock display and focus guard.
    Clock,
    /// Presentation stopwatch.
    Stopwatch,
    /// Idle-time slide prerendering.
    Prerender,
}

/// Shared cancellation flag for one scheduled task.
///
/// Clones observe the same flag. Cancelling is idempotent.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Rc<Cell<bool>>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

#[derive(Debug)]
struct Scheduled {
    kind: TimerKind,
    interval_ms: u64,
    next_due_ms: u64,
    idle_only: bool,
    token: CancellationToken,
}

/// The set of live recurring tasks.
#[derive(Debug, Default)]
pub struct Timers {
    entries: Vec<Scheduled>,
    now_ms: u64,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `kind` to fire every `interval`, replacing any existing task.
    ///
    /// Idle-only tasks are skipped while input is pending.
    pub fn schedule(
        &mut self,
        kind: TimerKind,
        interval: Duration,
        idle_only: bool,
    ) -> CancellationToken {
        self.cancel(kind);
        let interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX).max(1);
        let token = CancellationToken::new();
        self.entries.push(Scheduled {
            kind,
            interval_ms,
            next_due_ms: self.now_ms.saturating_add(interval_ms),
            idle_only,
            token: token.clone(),
        });
        tracing::debug!(?kind, interval_ms, idle_only, "timer scheduled");
        token
    }

    /// Cancel `kind` if it is scheduled. Returns whether anything was live.
    pub fn cancel(&mut self, kind: TimerKind) -> bool {
        let mut found = false;
        self.entries.retain(|entry| {
            if entry.kind == kind {
                found |= !entry.token.is_cancelled();
                entry.token.cancel();
                false
            } else {
                true
            }
        });
        if found {
            tracing::debug!(?kind, "timer cancelled");
        }
        found
    }

    pub fn cancel_all(&mut self) {
        for entry in self.entries.drain(..) {
            entry.token.cancel();
        }
    }

    pub fn is_scheduled(&self, kind: TimerKind) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.kind == kind && !entry.token.is_cancelled())
    }

    /// Advance to `now_ms` and return the tasks that fired, in schedule order.
    pub fn take_due(&mut self, now_ms: u64, input_pending: bool) -> Vec<TimerKind> {
        self.now_ms = self.now_ms.max(now_ms);
        self.entries.retain(|entry| !entry.token.is_cancelled());
        let mut fired = Vec::new();
        for entry in &mut self.entries {
            if entry.next_due_ms > self.now_ms || (entry.idle_only && input_pending) {
                continue;
            }
            // Skip missed periods instead of firing a burst.
            let missed = (self.now_ms - entry.next_due_ms) / entry.interval_ms;
            entry.next_due_ms += (missed + 1) * entry.interval_ms;
            fired.push(entry.kind);
        }
        fired
    }

    /// Milliseconds until the next live task is due.
    pub fn next_deadline_in(&self, now_ms: u64) -> Option<u64> {
        self.entries
            .iter()
            .filter(|entry| !entry.token.is_cancelled())
            .map(|entry| entry.next_due_ms.saturating_sub(now_ms))
            .min()
    }
}
