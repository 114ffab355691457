//! Substring rules deciding which archive lines are song requests

use serde::{Deserialize, Serialize};

/// Marker the request bot puts in front of every song it queues
pub const REQUEST_MARKER: &str = "🔊";

/// Mode-change announcements (`VIBE` mode) carry the marker too
pub const EXCLUDE_VIBE: &str = "VIBE";

/// Stream status lines that mention the stream going offline
pub const EXCLUDE_OFFLINE: &str = "offline";

/// Announcement emitted when the queue is cleared
pub const EXCLUDE_CLEARING: &str = "Clearing the spotify";

/// A substring that disqualifies a line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Exclusion {
    pub pattern: String,
    #[serde(default)]
    pub case_insensitive: bool,
}

impl Exclusion {
    /// Case-sensitive exclusion
    pub fn exact(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            case_insensitive: false,
        }
    }

    /// `true` when the pattern is empty or only whitespace
    pub fn is_empty(&self) -> bool {
        self.pattern.trim().is_empty()
    }

    /// Case-insensitive exclusion
    pub fn ignore_case(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            case_insensitive: true,
        }
    }

    /// `line_lower` must be `line.to_lowercase()`. An empty pattern
    /// matches nothing.
    fn matches(&self, line: &str, line_lower: &str) -> bool {
        if self.is_empty() {
            false
        } else if self.case_insensitive {
            line_lower.contains(&self.pattern.to_lowercase())
        } else {
            line.contains(&self.pattern)
        }
    }
}

/// Inclusion marker and exclusion list applied to every archive line
///
/// The defaults reproduce the heuristics observed on the request bot's
/// output. They are not known to be exhaustive, which is why they can be
/// replaced from configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParserRules {
    pub request_marker: String,
    pub exclusions: Vec<Exclusion>,
}

impl Default for ParserRules {
    fn default() -> Self {
        Self {
            request_marker: REQUEST_MARKER.to_string(),
            exclusions: vec![
                Exclusion::exact(EXCLUDE_VIBE),
                Exclusion::ignore_case(EXCLUDE_OFFLINE),
                Exclusion::exact(EXCLUDE_CLEARING),
            ],
        }
    }
}

impl ParserRules {
    pub fn new(request_marker: impl Into<String>, exclusions: Vec<Exclusion>) -> Self {
        Self {
            request_marker: request_marker.into(),
            exclusions,
        }
    }

    /// `true` when the line contains the marker and no exclusion
    pub fn qualifies(&self, line: &str) -> bool {
        if self.request_marker.is_empty() || !line.contains(&self.request_marker) {
            return false;
        }
        let line_lower = line.to_lowercase();
        !self
            .exclusions
            .iter()
            .any(|exclusion| exclusion.matches(line, &line_lower))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules() {
        let rules = ParserRules::default();
        assert!(rules.qualifies("[2025-01-01 10:00:00] #chan bot: 🔊 A - X"));
        assert!(!rules.qualifies("[2025-01-01 10:00:00] #chan bot: A - X"));
        assert!(!rules.qualifies("🔊 VIBE mode enabled"));
        assert!(!rules.qualifies("🔊 Stream is OFFLINE"));
        assert!(!rules.qualifies("🔊 Clearing the spotify queue"));
    }

    #[test]
    fn test_case_sensitivity_follows_flag() {
        let rules = ParserRules::default();
        // "vibe" in lower case does not match the case-sensitive VIBE rule
        assert!(rules.qualifies("🔊 Good vibe - Song"));
        // "clearing the Spotify" differs in case from the exact rule
        assert!(rules.qualifies("🔊 clearing the Spotify - Song"));
    }

    #[test]
    fn test_custom_rules() {
        let rules = ParserRules::new("♪", vec![Exclusion::ignore_case("AD")]);
        assert!(rules.qualifies("♪ A - X"));
        assert!(!rules.qualifies("♪ an ad break"));
        assert!(!rules.qualifies("🔊 A - X"));
    }

    #[test]
    fn test_blank_exclusion_excludes_nothing() {
        let rules = ParserRules::new("🔊", vec![Exclusion::exact(""), Exclusion::ignore_case("  ")]);
        assert!(rules.qualifies("[2025-01-01 10:00:00] #chan bot: 🔊 A - X"));
        assert!(Exclusion::exact("").is_empty());
        assert!(!Exclusion::exact("VIBE").is_empty());
    }

    #[test]
    fn test_empty_marker_never_qualifies() {
        let rules = ParserRules::new("", Vec::new());
        assert!(!rules.qualifies("anything"));
    }
}
