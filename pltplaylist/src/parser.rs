//! Playlist reconstruction from archive lines
//!
//! The archive is queried newest-first, so the first qualifying line is the
//! song currently playing and every following line is older. The parser
//! trusts that order and never sorts.
//!
//! Expected line shape:
//!
//! ```text
//! [2025-11-02 16:09:47] #quin69 sheepfarmer: 🔊 Artist - Title
//! ```

use crate::models::{PlaylistSnapshot, SongEntry};
use crate::rules::ParserRules;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Maximum number of history entries kept in a snapshot
pub const MAX_HISTORY_SONGS: usize = 50;

static TIMESTAMP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[([0-9]{4}-[0-9]{2}-[0-9]{2} [0-9]{2}:[0-9]{2}:[0-9]{2})\]")
        .expect("valid timestamp regex")
});

/// Split raw archive text into lines, dropping blank ones
pub fn split_log_lines(text: &str) -> Vec<&str> {
    text.lines().filter(|line| !line.trim().is_empty()).collect()
}

/// Bracketed timestamp contents, or an empty string
pub fn extract_timestamp(line: &str) -> &str {
    TIMESTAMP_RE
        .captures(line)
        .and_then(|cap| cap.get(1))
        .map_or("", |m| m.as_str())
}

/// Turns archive lines into a [`PlaylistSnapshot`]
///
/// Pure and stateless: the same input always yields the same snapshot, and
/// a parser can be shared freely between tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistParser {
    rules: ParserRules,
    max_history: usize,
}

impl Default for PlaylistParser {
    fn default() -> Self {
        Self::new(ParserRules::default(), MAX_HISTORY_SONGS)
    }
}

impl PlaylistParser {
    pub fn new(rules: ParserRules, max_history: usize) -> Self {
        Self { rules, max_history }
    }

    pub fn rules(&self) -> &ParserRules {
        &self.rules
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }

    /// Extract the request from a single line
    ///
    /// Returns `None` when the line does not qualify. The title starts right
    /// after the first occurrence of the marker and is trimmed.
    pub fn extract_entry(&self, line: &str) -> Option<SongEntry> {
        if !self.rules.qualifies(line) {
            return None;
        }
        let marker = &self.rules.request_marker;
        let start = line.find(marker.as_str())? + marker.len();
        Some(SongEntry::new(
            line[start..].trim(),
            extract_timestamp(line),
        ))
    }

    /// Build the snapshot for one poll cycle
    ///
    /// # Arguments
    ///
    /// * `lines` - Non-blank archive lines, newest first
    /// * `stream_is_live` - Result of the external liveness check
    ///
    /// # Example
    ///
    /// ```
    /// use pltplaylist::PlaylistParser;
    ///
    /// let lines = [
    ///     "[2025-01-01 10:00:00] 🔊 A - X",
    ///     "[2025-01-01 09:59:00] 🔊 B - Y",
    ///     "[2025-01-01 09:58:00] 🔊 A - X",
    /// ];
    /// let snapshot = PlaylistParser::default().parse(&lines, true);
    /// assert_eq!(snapshot.current_title.as_deref(), Some("A - X"));
    /// assert_eq!(snapshot.history_titles(), vec!["B - Y"]);
    /// assert!(!snapshot.is_offline);
    /// ```
    pub fn parse<S: AsRef<str>>(&self, lines: &[S], stream_is_live: bool) -> PlaylistSnapshot {
        let is_offline = !stream_is_live;

        let mut entries = lines
            .iter()
            .filter_map(|line| self.extract_entry(line.as_ref()));

        let Some(current) = entries.next() else {
            return PlaylistSnapshot::empty(is_offline);
        };

        let mut seen: HashSet<String> = HashSet::new();
        seen.insert(current.title.clone());

        let mut history = Vec::new();
        for entry in entries {
            if seen.insert(entry.title.clone()) {
                history.push(entry);
            }
        }
        history.truncate(self.max_history);

        tracing::trace!(
            current = %current.title,
            history = history.len(),
            is_offline,
            "Parsed playlist"
        );

        PlaylistSnapshot {
            current_title: Some(current.title),
            history,
            is_offline,
        }
    }
}

/// Parse with the default rules and history cap
pub fn parse_playlist<S: AsRef<str>>(lines: &[S], stream_is_live: bool) -> PlaylistSnapshot {
    PlaylistParser::default().parse(lines, stream_is_live)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Exclusion;

    fn line(ts: &str, title: &str) -> String {
        format!("[{}] #quin69 sheepfarmer: 🔊 {}", ts, title)
    }

    #[test]
    fn test_no_qualifying_lines() {
        let lines = vec![
            "[2025-01-01 10:00:00] #quin69 someone: hello".to_string(),
            "[2025-01-01 09:00:00] #quin69 sheepfarmer: 🔊 VIBE mode on".to_string(),
        ];
        for live in [true, false] {
            let snapshot = parse_playlist(&lines, live);
            assert_eq!(snapshot, PlaylistSnapshot::empty(!live));
        }

        let empty: Vec<String> = Vec::new();
        assert_eq!(parse_playlist(&empty, true), PlaylistSnapshot::empty(false));
    }

    #[test]
    fn test_duplicate_of_current_is_dropped() {
        let lines = [
            "[2025-01-01 10:00:00] 🔊 A - X",
            "[2025-01-01 09:59:00] 🔊 B - Y",
            "[2025-01-01 09:58:00] 🔊 A - X",
        ];
        let snapshot = parse_playlist(&lines, true);
        assert_eq!(snapshot.current_title.as_deref(), Some("A - X"));
        assert_eq!(
            snapshot.history,
            vec![SongEntry::new("B - Y", "2025-01-01 09:59:00")]
        );
        assert!(!snapshot.is_offline);
    }

    #[test]
    fn test_first_occurrence_wins_in_history() {
        let lines = vec![
            line("2025-01-01 10:00:00", "A - X"),
            line("2025-01-01 09:59:00", "B - Y"),
            line("2025-01-01 09:58:00", "C - Z"),
            line("2025-01-01 09:57:00", "B - Y"),
            line("2025-01-01 09:56:00", "D - W"),
        ];
        let snapshot = parse_playlist(&lines, true);
        assert_eq!(snapshot.history_titles(), vec!["B - Y", "C - Z", "D - W"]);
        assert_eq!(snapshot.history[0].timestamp, "2025-01-01 09:59:00");
    }

    #[test]
    fn test_vibe_line_is_excluded_even_with_payload() {
        let lines = vec![
            "[2025-01-01 10:00:00] bot: 🔊 VIBE Artist - Song".to_string(),
            line("2025-01-01 09:59:00", "B - Y"),
        ];
        let snapshot = parse_playlist(&lines, true);
        assert_eq!(snapshot.current_title.as_deref(), Some("B - Y"));
        assert!(snapshot.history.is_empty());
    }

    #[test]
    fn test_offline_and_clearing_lines_are_excluded() {
        let lines = vec![
            "[2025-01-01 10:00:00] bot: 🔊 Stream went Offline".to_string(),
            "[2025-01-01 09:59:30] bot: 🔊 Clearing the spotify queue".to_string(),
            line("2025-01-01 09:59:00", "B - Y"),
        ];
        let snapshot = parse_playlist(&lines, true);
        assert_eq!(snapshot.current_title.as_deref(), Some("B - Y"));
    }

    #[test]
    fn test_offline_flag_is_independent_of_songs() {
        let lines = vec![line("2025-01-01 10:00:00", "A - X"), line("2025-01-01 09:00:00", "B - Y")];
        let snapshot = parse_playlist(&lines, false);
        assert!(snapshot.is_offline);
        assert_eq!(snapshot.current_title.as_deref(), Some("A - X"));
        assert_eq!(snapshot.history.len(), 1);
    }

    #[test]
    fn test_history_is_capped_after_dedup() {
        let mut lines = vec![line("2025-01-01 10:00:00", "current")];
        for i in 0..120 {
            // each title appears twice in a row; duplicates must not eat the cap
            lines.push(line("2025-01-01 09:00:00", &format!("Artist - Song {}", i)));
            lines.push(line("2025-01-01 08:00:00", &format!("Artist - Song {}", i)));
        }
        let snapshot = parse_playlist(&lines, true);
        assert_eq!(snapshot.history.len(), MAX_HISTORY_SONGS);
        assert_eq!(snapshot.history[0].title, "Artist - Song 0");
        assert_eq!(snapshot.history[49].title, "Artist - Song 49");

        let small = PlaylistParser::new(ParserRules::default(), 2).parse(&lines, true);
        assert_eq!(small.history_titles(), vec!["Artist - Song 0", "Artist - Song 1"]);
    }

    #[test]
    fn test_dedup_is_case_sensitive() {
        let lines = vec![
            line("2025-01-01 10:00:00", "A - X"),
            line("2025-01-01 09:59:00", "a - x"),
            line("2025-01-01 09:58:00", "A - X "),
        ];
        let snapshot = parse_playlist(&lines, true);
        // trailing whitespace is trimmed, so the third line is a duplicate
        assert_eq!(snapshot.history_titles(), vec!["a - x"]);
    }

    #[test]
    fn test_skipped_titles_are_kept() {
        let lines = vec![
            line("2025-01-01 10:00:00", "A - X (skipped)"),
            line("2025-01-01 09:59:00", "B - Y SKIPPED"),
        ];
        let snapshot = parse_playlist(&lines, true);
        assert_eq!(snapshot.current_title.as_deref(), Some("A - X (skipped)"));
        assert_eq!(snapshot.history_titles(), vec!["B - Y SKIPPED"]);
    }

    #[test]
    fn test_only_first_marker_is_used() {
        let lines = ["[2025-01-01 10:00:00] 🔊 Loud 🔊 Song"];
        let snapshot = parse_playlist(&lines, true);
        assert_eq!(snapshot.current_title.as_deref(), Some("Loud 🔊 Song"));
    }

    #[test]
    fn test_missing_timestamp_and_marker_without_space() {
        let lines = ["bot: 🔊A - X", "bot: 🔊    B - Y   "];
        let snapshot = parse_playlist(&lines, true);
        assert_eq!(snapshot.current_title.as_deref(), Some("A - X"));
        assert_eq!(snapshot.history, vec![SongEntry::new("B - Y", "")]);
    }

    #[test]
    fn test_marker_at_end_of_line_gives_empty_title() {
        let lines = ["[2025-01-01 10:00:00] bot: 🔊", "[2025-01-01 09:00:00] bot: 🔊 "];
        let snapshot = parse_playlist(&lines, true);
        assert_eq!(snapshot.current_title.as_deref(), Some(""));
        assert!(snapshot.history.is_empty());
    }

    #[test]
    fn test_invalid_timestamp_is_not_extracted() {
        assert_eq!(extract_timestamp("[2025-1-01 10:00:00] 🔊 A"), "");
        assert_eq!(extract_timestamp("x [2025-01-01 10:00:00] 🔊 A"), "2025-01-01 10:00:00");
    }

    #[test]
    fn test_non_ascii_digits_are_not_a_timestamp() {
        let line = "[٢٠٢٥-٠١-٠١ ١٠:٠٠:٠٠] 🔊 A - X";
        assert_eq!(extract_timestamp(line), "");

        let lines = ["[2025-01-01 11:00:00] 🔊 B - Y", line];
        let snapshot = parse_playlist(&lines, true);
        assert_eq!(snapshot.current_title.as_deref(), Some("B - Y"));
        assert_eq!(snapshot.history, vec![SongEntry::new("A - X", "")]);
    }

    #[test]
    fn test_idempotent() {
        let lines = vec![
            line("2025-01-01 10:00:00", "A - X"),
            line("2025-01-01 09:59:00", "B - Y"),
            line("2025-01-01 09:58:00", "C - Z"),
        ];
        let parser = PlaylistParser::default();
        assert_eq!(parser.parse(&lines, true), parser.parse(&lines, true));
    }

    #[test]
    fn test_properties_on_mixed_input() {
        let titles = ["A", "B", "A", "C", "B", "D", "A", "E", "C", "F"];
        let lines: Vec<String> = titles
            .iter()
            .map(|t| line("2025-01-01 10:00:00", t))
            .collect();
        let parser = PlaylistParser::new(ParserRules::default(), 3);
        let snapshot = parser.parse(&lines, true);

        let current = snapshot.current_title.clone().unwrap();
        assert_eq!(current, "A");
        let history = snapshot.history_titles();
        assert!(!history.contains(&current.as_str()));
        let unique: HashSet<&str> = history.iter().copied().collect();
        assert_eq!(unique.len(), history.len());
        assert!(history.len() <= 3);
        assert_eq!(history, vec!["B", "C", "D"]);
    }

    #[test]
    fn test_custom_rules_change_filtering() {
        let rules = ParserRules::new("🔊", vec![Exclusion::exact("[ad]")]);
        let parser = PlaylistParser::new(rules, 10);
        let lines = ["🔊 [ad] buy stuff", "🔊 VIBE - Song"];
        let snapshot = parser.parse(&lines, true);
        assert_eq!(snapshot.current_title.as_deref(), Some("VIBE - Song"));
    }

    #[test]
    fn test_split_log_lines() {
        let text = "[1] 🔊 A\r\n\n   \n[2] 🔊 B\n";
        assert_eq!(split_log_lines(text), vec!["[1] 🔊 A", "[2] 🔊 B"]);
        assert!(split_log_lines("").is_empty());
    }
}
