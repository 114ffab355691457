//! Text presentation of the tracker state
//!
//! Pure helpers: nothing here reads the clock, so every function can be
//! tested with fixed inputs.

use crate::easter_egg::EasterEggView;
use crate::state::TrackerState;
use chrono::{DateTime, Utc};
use pltplaylist::{SongEntry, SongInfo};
use std::fmt::Write;
use url::Url;

pub const NO_SONG_PLAYING: &str = "No song playing";
pub const NO_RECENT_SONGS: &str = "No recently played songs";
pub const LOADING: &str = "Loading";

const SPOTIFY_SEARCH_BASE: &str = "https://open.spotify.com/search/";
const YOUTUBE_SEARCH_BASE: &str = "https://www.youtube.com/results";

/// Offline messages rotate every minute
pub const OFFLINE_ROTATION_MS: i64 = 60_000;

/// Banner shown instead of the current song while the stream is down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OfflineMessage {
    pub title: &'static str,
    pub subtitle: &'static str,
}

pub const OFFLINE_MESSAGES: &[OfflineMessage] = &[
    OfflineMessage {
        title: "Quin is offline right now",
        subtitle: "Probably checking Mathil's builds",
    },
    OfflineMessage {
        title: "Stream is offline",
        subtitle: "Reinventing the meta with some potent build",
    },
    OfflineMessage {
        title: "Quin69 is not live",
        subtitle: "Currently theorycrafting the next 0.01% build",
    },
    OfflineMessage {
        title: "Stream unavailable",
        subtitle: "Eating all the burgers in New Zealand",
    },
    OfflineMessage {
        title: "Not streaming right now",
        subtitle: "Searching for some bespoke builds",
    },
    OfflineMessage {
        title: "Stream is offline",
        subtitle: "Hunting benny vaders in chat",
    },
];

/// Message for a given wall-clock time in Unix milliseconds
pub fn offline_message(unix_millis: i64) -> &'static OfflineMessage {
    let minute = unix_millis.div_euclid(OFFLINE_ROTATION_MS);
    let index = minute.rem_euclid(OFFLINE_MESSAGES.len() as i64) as usize;
    &OFFLINE_MESSAGES[index]
}

/// Links to search a song on external services
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchLinks {
    pub spotify: Url,
    pub youtube: Url,
}

impl SearchLinks {
    /// `None` for blank titles
    pub fn for_title(title: &str) -> Option<Self> {
        if title.trim().is_empty() {
            return None;
        }

        let mut spotify = Url::parse(SPOTIFY_SEARCH_BASE).ok()?;
        spotify
            .path_segments_mut()
            .ok()?
            .pop_if_empty()
            .push(title);

        let mut youtube = Url::parse(YOUTUBE_SEARCH_BASE).ok()?;
        youtube.query_pairs_mut().append_pair("search_query", title);

        Some(Self { spotify, youtube })
    }
}

/// Search links for a history entry; skipped entries get none
pub fn entry_links(entry: &SongEntry) -> Option<SearchLinks> {
    if entry.is_skipped() {
        None
    } else {
        SearchLinks::for_title(&entry.title)
    }
}

/// `HH:MM` of the entry, or the raw timestamp when it does not parse
pub fn format_played_at(entry: &SongEntry) -> String {
    match entry.played_at() {
        Some(at) => at.format("%H:%M").to_string(),
        None => entry.timestamp.clone(),
    }
}

/// Header status line
pub fn status_line(state: &TrackerState) -> &'static str {
    if state.error {
        "Error loading playlist"
    } else if state.stream_live {
        "Live"
    } else {
        "Offline"
    }
}

/// Render the whole dashboard as plain text
///
/// `now` is the wall-clock time used to pick the offline message.
pub fn render_dashboard(state: &TrackerState, egg: &EasterEggView, now: DateTime<Utc>) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "PLTracker [{}]", status_line(state));
    let _ = writeln!(out);
    let _ = writeln!(out, "Now Playing");

    if state.loading && !state.initial_load_complete {
        let _ = writeln!(out, "  {}", LOADING);
    } else if state.shows_offline() {
        let message = offline_message(now.timestamp_millis());
        let _ = writeln!(out, "  Status:   {}", message.title);
        let _ = writeln!(out, "  Activity: {}", message.subtitle);
    } else if let Some(current) = state.current_title() {
        let song = SongInfo::parse(current);
        let _ = writeln!(out, "  Artist: {}", song.artist);
        let _ = writeln!(out, "  Title:  {}", song.title);
        if let Some(art) = &state.album_art {
            let _ = writeln!(out, "  Cover:  {}", art);
        }
        if egg.show_easter_egg {
            let _ = writeln!(out, "  ♪ ♫ ♪ ♫ ♪");
        }
        if let Some(message) = &egg.click_message {
            let _ = writeln!(out, "  ({})", message);
        }
        if let Some(links) = SearchLinks::for_title(current) {
            let _ = writeln!(out, "  Spotify: {}", links.spotify);
            let _ = writeln!(out, "  YouTube: {}", links.youtube);
        }
    } else {
        let _ = writeln!(out, "  {}", NO_SONG_PLAYING);
    }

    let _ = writeln!(out);
    let history = &state.snapshot.history;
    if history.is_empty() {
        let _ = writeln!(out, "Recently Played");
        let _ = writeln!(out, "  {}", NO_RECENT_SONGS);
    } else {
        let _ = writeln!(out, "Recently Played ({})", history.len());
        for entry in history {
            if entry.is_skipped() {
                let _ = writeln!(out, "  {:>5}  ~ {} ~", format_played_at(entry), entry.title);
            } else {
                let _ = writeln!(out, "  {:>5}  {}", format_played_at(entry), entry.title);
            }
        }
    }

    out
}
