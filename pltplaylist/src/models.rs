//! Data models for reconstructed playlists
//!
//! These structures are produced by the [`PlaylistParser`](crate::PlaylistParser)
//! and consumed by the tracker and the rendering layer.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Format of the bracketed timestamps found in archive lines
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Artist used when a display string carries no `" - "` separator
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Separator between artist and title in request display strings
pub const ARTIST_TITLE_SEPARATOR: &str = " - ";

// ============================================================================
// SongEntry
// ============================================================================

/// A requested song as it appeared in the chat log
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SongEntry {
    /// Display string, conventionally `"<Artist> - <Title>"`
    pub title: String,
    /// Bracketed timestamp contents (`YYYY-MM-DD HH:MM:SS`, UTC), or empty
    pub timestamp: String,
}

impl SongEntry {
    pub fn new(title: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            timestamp: timestamp.into(),
        }
    }

    /// Parsed timestamp, `None` when missing or malformed
    pub fn played_at(&self) -> Option<NaiveDateTime> {
        if self.timestamp.is_empty() {
            return None;
        }
        NaiveDateTime::parse_from_str(&self.timestamp, TIMESTAMP_FORMAT).ok()
    }

    /// Artist/title split of the display string
    pub fn song_info(&self) -> SongInfo {
        SongInfo::parse(&self.title)
    }

    /// Whether the bot announced this request as skipped
    ///
    /// Only the rendering layer looks at this; the parser keeps skipped
    /// entries like any other.
    pub fn is_skipped(&self) -> bool {
        is_skipped_title(&self.title)
    }
}

/// Case-insensitive check for the word "skipped" in a display string
pub fn is_skipped_title(title: &str) -> bool {
    title.to_lowercase().contains("skipped")
}

// ============================================================================
// PlaylistSnapshot
// ============================================================================

/// Complete parser output for one poll cycle
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlaylistSnapshot {
    /// Title of the most recent qualifying request
    pub current_title: Option<String>,
    /// Older requests, deduplicated, newest first
    pub history: Vec<SongEntry>,
    /// `true` when the stream was reported as not live
    pub is_offline: bool,
}

impl PlaylistSnapshot {
    /// Snapshot with no song at all
    pub fn empty(is_offline: bool) -> Self {
        Self {
            current_title: None,
            history: Vec::new(),
            is_offline,
        }
    }

    /// Titles of the history entries, in order
    pub fn history_titles(&self) -> Vec<&str> {
        self.history.iter().map(|entry| entry.title.as_str()).collect()
    }

    /// `true` when neither a current song nor any history is known
    pub fn is_empty(&self) -> bool {
        self.current_title.is_none() && self.history.is_empty()
    }

    /// Artist/title split of the current song
    pub fn current_song_info(&self) -> Option<SongInfo> {
        self.current_title.as_deref().map(SongInfo::parse)
    }
}

// ============================================================================
// SongInfo
// ============================================================================

/// Artist and title extracted from a display string
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SongInfo {
    pub artist: String,
    pub title: String,
}

impl SongInfo {
    /// Split `"Artist - Title"` into its parts
    ///
    /// Everything after the first separator belongs to the title, so
    /// `"A - B - C"` gives artist `A` and title `B - C`.
    ///
    /// ```
    /// use pltplaylist::SongInfo;
    ///
    /// let info = SongInfo::parse("Daft Punk - One More Time");
    /// assert_eq!(info.artist, "Daft Punk");
    /// assert_eq!(info.title, "One More Time");
    ///
    /// let bare = SongInfo::parse("  Untitled  ");
    /// assert_eq!(bare.artist, "Unknown Artist");
    /// assert_eq!(bare.title, "Untitled");
    /// ```
    pub fn parse(display: &str) -> Self {
        match display.split_once(ARTIST_TITLE_SEPARATOR) {
            Some((artist, title)) => Self {
                artist: artist.trim().to_string(),
                title: title.trim().to_string(),
            },
            None => Self {
                artist: UNKNOWN_ARTIST.to_string(),
                title: display.trim().to_string(),
            },
        }
    }

    /// `true` when the artist could not be determined
    pub fn has_known_artist(&self) -> bool {
        self.artist != UNKNOWN_ARTIST
    }
}
