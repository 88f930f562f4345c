//! Live reload manager.
//!
//! Watches the README (and any extra watch patterns), debounces editor save
//! bursts and broadcasts one [`ReloadEvent`] per change.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::MissedTickBehavior;

use super::debouncer::{EventDebouncer, FsEvent, FsEventKind};

/// Default debounce duration.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Live reload error.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// Watched path cannot be resolved.
    #[error("Cannot watch {}: {source}", path.display())]
    Path {
        /// Path that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Invalid glob in the watch patterns.
    #[error("Invalid watch pattern {pattern:?}: {source}")]
    Pattern {
        /// Offending pattern.
        pattern: String,
        /// Underlying error.
        #[source]
        source: glob::PatternError,
    },

    /// File watcher error.
    #[error(transparent)]
    Notify(#[from] notify::Error),
}

/// Message pushed to hot reload clients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReloadEvent {
    /// Event type (always "reload").
    #[serde(rename = "type")]
    pub event_type: String,
    /// Changed file, relative to the README directory.
    pub path: String,
    /// Number of reloads since the server started.
    pub count: u64,
}

/// Shared handle to the reload broadcast.
///
/// Cloning is cheap; all clones feed the same counter and channel.
#[derive(Clone, Debug)]
pub struct ReloadHandle {
    broadcaster: broadcast::Sender<ReloadEvent>,
    count: Arc<AtomicU64>,
    clients: Arc<watch::Sender<usize>>,
    resource: String,
}

impl ReloadHandle {
    pub(crate) fn new(resource: impl Into<String>) -> Self {
        let (broadcaster, _rx) = broadcast::channel(100);
        let (clients, _rx) = watch::channel(0);
        Self {
            broadcaster,
            count: Arc::new(AtomicU64::new(0)),
            clients: Arc::new(clients),
            resource: resource.into(),
        }
    }

    /// Broadcast a reload of the README to every connected client.
    pub fn trigger(&self) -> ReloadEvent {
        self.notify(self.resource.clone())
    }

    pub(crate) fn notify(&self, path: String) -> ReloadEvent {
        let count = self.count.fetch_add(1, Ordering::Relaxed) + 1;
        let event = ReloadEvent {
            event_type: "reload".to_owned(),
            path,
            count,
        };
        // No subscribers is fine: nobody has the page open yet.
        let _ = self.broadcaster.send(event.clone());
        event
    }

    /// Receive every reload broadcast from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ReloadEvent> {
        self.broadcaster.subscribe()
    }

    /// Number of reloads broadcast so far.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Watch the number of connected hot reload clients.
    #[must_use]
    pub fn clients(&self) -> watch::Receiver<usize> {
        self.clients.subscribe()
    }

    /// Register a connected client until the guard is dropped.
    pub(crate) fn client_connected(&self) -> ClientGuard {
        self.clients.send_modify(|n| *n += 1);
        ClientGuard(Arc::clone(&self.clients))
    }
}

pub(crate) struct ClientGuard(Arc<watch::Sender<usize>>);

impl Drop for ClientGuard {
    fn drop(&mut self) {
        self.0.send_modify(|n| *n = n.saturating_sub(1));
    }
}

/// Paths that trigger a reload.
#[derive(Clone, Debug)]
struct WatchScope {
    root: PathBuf,
    readme: PathBuf,
    patterns: Vec<glob::Pattern>,
}

impl WatchScope {
    /// Path relative to the README directory when it is watched.
    fn relative(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let watched = path == self.readme
            || self
                .patterns
                .iter()
                .any(|pattern| pattern.matches_path(relative));
        watched.then(|| relative.to_string_lossy().replace('\\', "/"))
    }
}

/// Watches files and feeds the reload broadcast.
pub(crate) struct LiveReloadManager {
    scope: WatchScope,
    handle: ReloadHandle,
    debounce: Duration,
    watcher: Option<RecommendedWatcher>,
}

impl LiveReloadManager {
    /// Create a manager for `readme`, with extra glob patterns relative to its
    /// directory.
    pub(crate) fn new(
        readme: &Path,
        watch_patterns: &[String],
        handle: ReloadHandle,
    ) -> Result<Self, WatchError> {
        let readme = std::fs::canonicalize(readme).map_err(|source| WatchError::Path {
            path: readme.to_path_buf(),
            source,
        })?;
        let root = readme
            .parent()
            .map_or_else(|| PathBuf::from("/"), Path::to_path_buf);
        let patterns = watch_patterns
            .iter()
            .map(|pattern| {
                glob::Pattern::new(pattern).map_err(|source| WatchError::Pattern {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            scope: WatchScope {
                root,
                readme,
                patterns,
            },
            handle,
            debounce: DEFAULT_DEBOUNCE,
            watcher: None,
        })
    }

    #[must_use]
    pub(crate) fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Start watching.
    ///
    /// Spawns the task that debounces filesystem events and broadcasts
    /// reloads. The task ends when the manager is dropped.
    pub(crate) fn start(&mut self) -> Result<(), WatchError> {
        let (tx, mut rx) = mpsc::channel::<Event>(100);

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                Ok(event) => {
                    let _ = tx.blocking_send(event);
                }
                Err(err) => tracing::warn!(error = %err, "File watcher error"),
            }
        })?;

        // Extra patterns may reach into subdirectories; the README alone does not.
        let mode = if self.scope.patterns.is_empty() {
            RecursiveMode::NonRecursive
        } else {
            RecursiveMode::Recursive
        };
        watcher.watch(&self.scope.root, mode)?;
        self.watcher = Some(watcher);

        tracing::info!(
            readme = %self.scope.readme.display(),
            patterns = self.scope.patterns.len(),
            "Watching for changes"
        );

        let scope = self.scope.clone();
        let handle = self.handle.clone();
        let mut debouncer = EventDebouncer::new(self.debounce);

        tokio::spawn(async move {
            let mut tick = tokio::time::interval(POLL_INTERVAL);
            tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    event = rx.recv() => {
                        let Some(event) = event else { break };
                        record_event(&event, &scope, &mut debouncer);
                    }
                    _ = tick.tick(), if !debouncer.is_empty() => {
                        for fs_event in debouncer.drain_ready(Instant::now()) {
                            handle_fs_event(&fs_event, &scope, &handle);
                        }
                    }
                }
            }
        });

        Ok(())
    }
}

/// Record a raw filesystem event into the debouncer.
fn record_event(event: &Event, scope: &WatchScope, debouncer: &mut EventDebouncer) {
    let kind = match event.kind {
        EventKind::Create(_) => FsEventKind::Created,
        EventKind::Modify(_) => FsEventKind::Modified,
        EventKind::Remove(_) => FsEventKind::Removed,
        _ => return,
    };

    let now = Instant::now();
    for path in &event.paths {
        if scope.relative(path).is_some() {
            debouncer.record(path.clone(), kind, now);
            tracing::debug!(path = %path.display(), ?kind, "Recorded filesystem event");
        }
    }
}

/// Broadcast a debounced filesystem event.
fn handle_fs_event(fs_event: &FsEvent, scope: &WatchScope, handle: &ReloadHandle) {
    if fs_event.kind == FsEventKind::Removed && fs_event.path == scope.readme {
        // Reloading now would only show an error page; the next create reloads.
        tracing::warn!(path = %fs_event.path.display(), "Readme removed");
        return;
    }
    let Some(path) = scope.relative(&fs_event.path) else {
        return;
    };

    let event = handle.notify(path);
    tracing::info!(
        path = %event.path,
        kind = ?fs_event.kind,
        count = event.count,
        "Live reload event broadcast"
    );
}
