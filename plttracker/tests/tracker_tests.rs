//! Integration tests for the spawned tracker

use async_trait::async_trait;
use pltplaylist::SongInfo;
use pltsources::{ArtworkProvider, Error, LivenessProbe, LogSource, Result};
use plttracker::{PlaylistTracker, TrackerSettings, TrackerState};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

struct ScriptedLog {
    current: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl ScriptedLog {
    fn new(titles: &[&str]) -> Arc<Self> {
        let log = Arc::new(Self {
            current: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        });
        log.play(titles);
        log
    }

    fn play(&self, titles: &[&str]) {
        *self.current.lock().unwrap() = titles
            .iter()
            .map(|t| format!("[2025-11-02 16:00:00] #quin69 sheepfarmer: 🔊 {}", t))
            .collect();
    }
}

#[async_trait]
impl LogSource for ScriptedLog {
    async fn fetch_lines(&self) -> Result<Vec<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.current.lock().unwrap().clone())
    }
}

/// First fetch hangs on an old playlist, later fetches answer at once
struct StalledFirstFetch {
    calls: AtomicUsize,
}

#[async_trait]
impl LogSource for StalledFirstFetch {
    async fn fetch_lines(&self) -> Result<Vec<String>> {
        let title = if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            tokio::time::sleep(Duration::from_secs(30)).await;
            "Stale - Old"
        } else {
            "Fresh - New"
        };
        Ok(vec![format!("[2025-11-02 16:00:00] #quin69 sheepfarmer: 🔊 {}", title)])
    }
}

struct AlwaysLive;

#[async_trait]
impl LivenessProbe for AlwaysLive {
    async fn is_live(&self) -> Result<bool> {
        Ok(true)
    }
}

/// Slow for one title so a song change can supersede it
struct SlowArt;

#[async_trait]
impl ArtworkProvider for SlowArt {
    fn name(&self) -> &str {
        "slow"
    }

    async fn find_artwork(&self, song: &SongInfo) -> Result<Option<String>> {
        if song.title == "Slow" {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
        if song.title == "Broken" {
            return Err(Error::other("no cover"));
        }
        Ok(Some(format!("https://img/{}.jpg", song.title)))
    }
}

async fn wait_until(
    rx: &mut tokio::sync::watch::Receiver<TrackerState>,
    f: impl FnMut(&TrackerState) -> bool,
) -> TrackerState {
    tokio::time::timeout(Duration::from_secs(2), rx.wait_for(f))
        .await
        .expect("timed out waiting for tracker state")
        .expect("tracker stopped")
        .clone()
}

fn settings() -> TrackerSettings {
    TrackerSettings {
        poll_interval: Duration::from_secs(3600),
        ..TrackerSettings::default()
    }
}

#[tokio::test]
async fn test_spawn_polls_immediately() {
    let log = ScriptedLog::new(&["A - One", "B - Two"]);
    let handle = PlaylistTracker::spawn(settings(), log.clone(), Arc::new(AlwaysLive), Arc::new(SlowArt));
    let mut rx = handle.subscribe();

    let state = wait_until(&mut rx, |s| s.album_art.is_some()).await;
    assert_eq!(state.current_title(), Some("A - One"));
    assert_eq!(state.snapshot.history_titles(), vec!["B - Two"]);
    assert_eq!(state.album_art.as_deref(), Some("https://img/One.jpg"));
    assert!(handle.is_running());

    handle.shutdown().await;
    assert_eq!(log.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_refresh_picks_up_new_song() {
    let log = ScriptedLog::new(&["A - One"]);
    let handle = PlaylistTracker::spawn(settings(), log.clone(), Arc::new(AlwaysLive), Arc::new(SlowArt));
    let mut rx = handle.subscribe();
    wait_until(&mut rx, |s| s.initial_load_complete).await;

    log.play(&["C - Three", "A - One"]);
    handle.refresh();

    let state = wait_until(&mut rx, |s| {
        s.album_art.as_deref() == Some("https://img/Three.jpg")
    })
    .await;
    assert_eq!(state.current_title(), Some("C - Three"));
    assert_eq!(handle.current().snapshot.history_titles(), vec!["A - One"]);

    handle.shutdown().await;
}

#[tokio::test]
async fn test_song_change_supersedes_artwork_lookup() {
    let log = ScriptedLog::new(&["S - Slow"]);
    let handle = PlaylistTracker::spawn(settings(), log.clone(), Arc::new(AlwaysLive), Arc::new(SlowArt));
    let mut rx = handle.subscribe();
    let state = wait_until(&mut rx, |s| s.initial_load_complete).await;
    assert_eq!(state.album_art, None);

    log.play(&["F - Fast", "S - Slow"]);
    handle.refresh();

    let state = wait_until(&mut rx, |s| s.album_art.is_some()).await;
    assert_eq!(state.current_title(), Some("F - Fast"));
    assert_eq!(state.album_art.as_deref(), Some("https://img/Fast.jpg"));

    handle.shutdown().await;
}

#[tokio::test]
async fn test_artwork_failure_leaves_no_cover() {
    let log = ScriptedLog::new(&["X - Broken"]);
    let handle = PlaylistTracker::spawn(settings(), log, Arc::new(AlwaysLive), Arc::new(SlowArt));
    let mut rx = handle.subscribe();

    let state = wait_until(&mut rx, |s| s.initial_load_complete).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(state.current_title(), Some("X - Broken"));
    assert_eq!(handle.current().album_art, None);

    handle.shutdown().await;
}

#[tokio::test]
async fn test_refresh_cancels_poll_in_flight() {
    let log = Arc::new(StalledFirstFetch {
        calls: AtomicUsize::new(0),
    });
    let handle = PlaylistTracker::spawn(settings(), log.clone(), Arc::new(AlwaysLive), Arc::new(SlowArt));
    let mut rx = handle.subscribe();

    tokio::time::timeout(Duration::from_secs(2), async {
        while log.calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("first fetch never started");
    assert!(!handle.current().initial_load_complete);

    handle.refresh();

    // The first completed poll is the one started by the refresh
    let state = wait_until(&mut rx, |s| s.initial_load_complete).await;
    assert_eq!(state.current_title(), Some("Fresh - New"));
    assert_eq!(log.calls.load(Ordering::SeqCst), 2);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(handle.current().current_title(), Some("Fresh - New"));

    handle.shutdown().await;
}
