//! Background playlist polling
//!
//! A single tokio task owns the tracker. It polls the archive immediately
//! and then on every tick, publishing each result through a
//! [`tokio::sync::watch`] channel. Every poll runs under its own
//! [`CancellationToken`]; a refresh request arriving mid-poll cancels it and
//! starts over, and a cancelled poll publishes nothing. When the current song
//! changes, the previous artwork lookup is cancelled and a new one runs in
//! its own task.
//!
//! # Example
//!
//! ```no_run
//! use plttracker::{PlaylistTracker, TrackerSettings};
//! use pltsources::{ArchiveClient, ItunesArtwork, StreamStatusClient};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let handle = PlaylistTracker::spawn(
//!         TrackerSettings::default(),
//!         Arc::new(ArchiveClient::new()?),
//!         Arc::new(StreamStatusClient::new()?),
//!         Arc::new(ItunesArtwork::new()?),
//!     );
//!
//!     let mut updates = handle.subscribe();
//!     updates.changed().await?;
//!     println!("{:?}", updates.borrow().snapshot.current_title);
//!
//!     handle.shutdown().await;
//!     Ok(())
//! }
//! ```

use crate::state::TrackerState;
use futures::future;
use pltplaylist::{PlaylistParser, SongInfo};
use pltsources::{ArtworkProvider, LivenessProbe, LogSource};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Default delay between two polls (30 seconds)
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Tracker parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerSettings {
    pub poll_interval: Duration,
    pub parser: PlaylistParser,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            parser: PlaylistParser::default(),
        }
    }
}

/// How a single poll ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// A new snapshot was published
    Published,
    /// The archive could not be fetched; the error flag was published
    Failed,
    /// The poll was cancelled before publishing
    Cancelled,
}

/// Polling state machine
///
/// Normally driven by [`PlaylistTracker::spawn`]; [`PlaylistTracker::poll_once`]
/// runs a single cycle for one-shot use.
pub struct PlaylistTracker {
    settings: TrackerSettings,
    log_source: Arc<dyn LogSource>,
    liveness: Arc<dyn LivenessProbe>,
    artwork: Arc<dyn ArtworkProvider>,
    state_tx: Arc<watch::Sender<TrackerState>>,
    last_title: Option<String>,
    artwork_cancel: Option<CancellationToken>,
    root: CancellationToken,
}

impl PlaylistTracker {
    pub fn new(
        settings: TrackerSettings,
        log_source: Arc<dyn LogSource>,
        liveness: Arc<dyn LivenessProbe>,
        artwork: Arc<dyn ArtworkProvider>,
    ) -> Self {
        let (state_tx, _) = watch::channel(TrackerState::default());
        Self {
            settings,
            log_source,
            liveness,
            artwork,
            state_tx: Arc::new(state_tx),
            last_title: None,
            artwork_cancel: None,
            root: CancellationToken::new(),
        }
    }

    /// Start the tracker on the current tokio runtime
    pub fn spawn(
        settings: TrackerSettings,
        log_source: Arc<dyn LogSource>,
        liveness: Arc<dyn LivenessProbe>,
        artwork: Arc<dyn ArtworkProvider>,
    ) -> TrackerHandle {
        Self::new(settings, log_source, liveness, artwork).start()
    }

    /// Move the tracker into a background task
    pub fn start(self) -> TrackerHandle {
        let state_rx = self.state_tx.subscribe();
        let refresh = Arc::new(Notify::new());
        let shutdown = self.root.clone();

        let task = tokio::spawn(self.run(refresh.clone()));

        TrackerHandle {
            state_rx,
            refresh,
            shutdown,
            task,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<TrackerState> {
        self.state_tx.subscribe()
    }

    pub fn current(&self) -> TrackerState {
        self.state_tx.borrow().clone()
    }

    async fn run(mut self, refresh: Arc<Notify>) {
        let shutdown = self.root.clone();
        tracing::info!(
            interval_ms = self.settings.poll_interval.as_millis() as u64,
            "Playlist tracker started"
        );

        'outer: loop {
            // Poll, restarting whenever a refresh interrupts it
            loop {
                let token = shutdown.child_token();
                tokio::select! {
                    _ = shutdown.cancelled() => break 'outer,
                    _ = refresh.notified() => {
                        tracing::debug!("Refresh requested, restarting poll");
                        token.cancel();
                        continue;
                    }
                    outcome = self.poll_once(&token) => {
                        tracing::trace!(?outcome, "Poll finished");
                        break;
                    }
                }
            }

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.settings.poll_interval) => {}
                _ = refresh.notified() => tracing::debug!("Refresh requested"),
            }
        }

        if let Some(token) = self.artwork_cancel.take() {
            token.cancel();
        }
        tracing::info!("Playlist tracker stopped");
    }

    /// Run one poll cycle under `cancel`
    pub async fn poll_once(&mut self, cancel: &CancellationToken) -> PollOutcome {
        let fetched = tokio::select! {
            _ = cancel.cancelled() => return PollOutcome::Cancelled,
            results = future::join(self.liveness.is_live(), self.log_source.fetch_lines()) => results,
        };
        if cancel.is_cancelled() {
            return PollOutcome::Cancelled;
        }

        let (live, lines) = fetched;
        let stream_live = match live {
            Ok(live) => live,
            Err(e) => {
                tracing::warn!("Stream status check failed, assuming offline: {}", e);
                false
            }
        };

        let lines = match lines {
            Ok(lines) => lines,
            Err(e) => {
                tracing::warn!("Failed to fetch playlist: {}", e);
                self.state_tx.send_modify(|state| {
                    state.stream_live = stream_live;
                    state.error = true;
                    state.loading = false;
                    state.initial_load_complete = true;
                });
                return PollOutcome::Failed;
            }
        };

        let snapshot = self.settings.parser.parse(&lines, stream_live);
        let title = snapshot.current_title.clone();
        let title_changed = title != self.last_title;

        tracing::debug!(
            current = title.as_deref().unwrap_or("-"),
            history = snapshot.history.len(),
            stream_live,
            "Playlist updated"
        );

        self.state_tx.send_modify(|state| {
            state.snapshot = snapshot;
            state.stream_live = stream_live;
            state.error = false;
            state.loading = false;
            state.initial_load_complete = true;
            if title_changed {
                state.album_art = None;
            }
        });

        if title_changed {
            self.last_title = title.clone();
            self.refresh_artwork(title);
        }

        PollOutcome::Published
    }

    /// Cancel the running artwork lookup and start one for `title`
    fn refresh_artwork(&mut self, title: Option<String>) {
        if let Some(previous) = self.artwork_cancel.take() {
            previous.cancel();
        }

        let Some(title) = title else {
            return;
        };

        let token = self.root.child_token();
        self.artwork_cancel = Some(token.clone());

        let artwork = self.artwork.clone();
        let state_tx = self.state_tx.clone();

        tokio::spawn(async move {
            let song = SongInfo::parse(&title);
            let found = tokio::select! {
                _ = token.cancelled() => return,
                found = artwork.find_artwork(&song) => found,
            };
            if token.is_cancelled() {
                return;
            }

            let url = found.unwrap_or_else(|e| {
                tracing::warn!(%title, "Artwork lookup failed: {}", e);
                None
            });

            state_tx.send_if_modified(|state| {
                if state.current_title() == Some(title.as_str()) && state.album_art != url {
                    state.album_art = url;
                    true
                } else {
                    false
                }
            });
        });
    }
}

impl Drop for PlaylistTracker {
    fn drop(&mut self) {
        if let Some(token) = self.artwork_cancel.take() {
            token.cancel();
        }
    }
}

/// Handle to a running tracker
pub struct TrackerHandle {
    state_rx: watch::Receiver<TrackerState>,
    refresh: Arc<Notify>,
    shutdown: CancellationToken,
    task: JoinHandle<()>,
}

impl TrackerHandle {
    /// New receiver for state updates
    pub fn subscribe(&self) -> watch::Receiver<TrackerState> {
        self.state_rx.clone()
    }

    /// Latest published state
    pub fn current(&self) -> TrackerState {
        self.state_rx.borrow().clone()
    }

    /// Poll now instead of waiting for the next tick
    pub fn refresh(&self) {
        self.refresh.notify_one();
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stop the tracker and wait for its task to finish
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        if let Err(e) = self.task.await {
            tracing::error!("Tracker task failed: {}", e);
        }
    }
}
