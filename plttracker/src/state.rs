//! State shared between the tracker task and its observers

use pltplaylist::PlaylistSnapshot;
use serde::{Deserialize, Serialize};

/// Everything a view needs to render the playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerState {
    /// Last successfully parsed playlist
    pub snapshot: PlaylistSnapshot,
    /// Cover of the current song, if one was found
    pub album_art: Option<String>,
    /// Result of the last liveness check
    pub stream_live: bool,
    /// `true` until the first poll finishes
    pub loading: bool,
    /// `true` when the last archive fetch failed
    pub error: bool,
    /// Set once any poll has completed, successfully or not
    pub initial_load_complete: bool,
}

impl Default for TrackerState {
    fn default() -> Self {
        Self {
            snapshot: PlaylistSnapshot::empty(false),
            album_art: None,
            stream_live: false,
            loading: true,
            error: false,
            initial_load_complete: false,
        }
    }
}

impl TrackerState {
    pub fn current_title(&self) -> Option<&str> {
        self.snapshot.current_title.as_deref()
    }

    /// `true` when the offline banner should replace the current song
    pub fn shows_offline(&self) -> bool {
        self.initial_load_complete && self.snapshot.is_offline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = TrackerState::default();
        assert!(state.loading);
        assert!(!state.initial_load_complete);
        assert!(!state.snapshot.is_offline);
        assert!(state.snapshot.is_empty());
        assert!(!state.shows_offline());
        assert_eq!(state.current_title(), None);
    }

    #[test]
    fn test_shows_offline_after_first_load() {
        let mut state = TrackerState {
            snapshot: PlaylistSnapshot::empty(true),
            ..TrackerState::default()
        };
        assert!(!state.shows_offline());
        state.initial_load_complete = true;
        assert!(state.shows_offline());
    }

    #[test]
    fn test_serialized_shape() {
        let value = serde_json::to_value(TrackerState::default()).unwrap();
        assert_eq!(value["loading"], true);
        assert_eq!(value["album_art"], serde_json::Value::Null);
        assert_eq!(value["snapshot"]["history"], serde_json::json!([]));
    }
}
