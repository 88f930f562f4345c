//! Event debouncing for live reload.
//!
//! Editors emit several filesystem events per save (truncate, write, rename
//! of a temp file). Events are coalesced per path and released once no new
//! event arrived for the debounce duration.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Kind of filesystem event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FsEventKind {
    Created,
    Modified,
    Removed,
}

/// A debounced filesystem event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct FsEvent {
    pub path: PathBuf,
    pub kind: FsEventKind,
}

struct Pending {
    kind: FsEventKind,
    deadline: Instant,
}

/// Per-path event debouncer.
///
/// Owned by the live reload task; time is passed in so callers decide the
/// clock.
pub(crate) struct EventDebouncer {
    pending: HashMap<PathBuf, Pending>,
    quiet_period: Duration,
}

impl EventDebouncer {
    pub(crate) fn new(quiet_period: Duration) -> Self {
        Self {
            pending: HashMap::new(),
            quiet_period,
        }
    }

    /// Record an event observed at `now`, pushing the path's deadline back.
    pub(crate) fn record(&mut self, path: PathBuf, kind: FsEventKind, now: Instant) {
        let deadline = now + self.quiet_period;

        let Some(existing) = self.pending.get_mut(&path) else {
            self.pending.insert(path, Pending { kind, deadline });
            return;
        };

        match coalesce(existing.kind, kind) {
            Some(kind) => {
                existing.kind = kind;
                existing.deadline = deadline;
            }
            None => {
                self.pending.remove(&path);
            }
        }
    }

    /// Remove and return events whose deadline passed at `now`.
    pub(crate) fn drain_ready(&mut self, now: Instant) -> Vec<FsEvent> {
        self.pending
            .extract_if(|_, pending| pending.deadline <= now)
            .map(|(path, pending)| FsEvent {
                path,
                kind: pending.kind,
            })
            .collect()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Merge a new event into a pending one.
///
/// `None` drops the path entirely: a file created and removed within one
/// quiet period never existed as far as the page is concerned.
#[allow(clippy::match_same_arms)]
fn coalesce(existing: FsEventKind, new: FsEventKind) -> Option<FsEventKind> {
    use FsEventKind::{Created, Modified, Removed};

    match (existing, new) {
        (Created, Removed) => None,
        (Created, _) => Some(Created),
        (Modified, kind) => Some(kind),
        // Atomic save: the old file is replaced by a new one.
        (Removed, Created) => Some(Modified),
        (Removed, _) => Some(Removed),
    }
}
