//! Extension pour intégrer les règles de parsing dans pltconfig
//!
//! Ce module fournit le trait `ParserConfigExt` qui ajoute à
//! `pltconfig::Config` la lecture des règles de filtrage et de la taille
//! maximale de l'historique.
//!
//! # Exemple
//!
//! ```no_run
//! use pltconfig::get_config;
//! use pltplaylist::ParserConfigExt;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = get_config();
//! let parser = config.get_playlist_parser()?;
//! println!("History capped at {}", parser.max_history());
//! # Ok(())
//! # }
//! ```

use crate::parser::{PlaylistParser, MAX_HISTORY_SONGS};
use crate::rules::{Exclusion, ParserRules, REQUEST_MARKER};
use anyhow::Result;
use pltconfig::Config;
use serde_yaml::{Number, Value};

/// Trait d'extension pour gérer la configuration du parser dans pltconfig
pub trait ParserConfigExt {
    /// Nombre maximal d'entrées dans l'historique (défaut: 50)
    fn get_playlist_max_history(&self) -> Result<usize>;

    /// Définit le nombre maximal d'entrées dans l'historique
    fn set_playlist_max_history(&self, max: usize) -> Result<()>;

    /// Règles de filtrage des lignes
    ///
    /// Les entrées absentes ou invalides reprennent les valeurs de
    /// [`ParserRules::default`]. Les exclusions au motif vide sont ignorées.
    fn get_playlist_rules(&self) -> Result<ParserRules>;

    /// Remplace les règles de filtrage
    fn set_playlist_rules(&self, rules: &ParserRules) -> Result<()>;

    /// Parser construit depuis la configuration
    fn get_playlist_parser(&self) -> Result<PlaylistParser> {
        Ok(PlaylistParser::new(
            self.get_playlist_rules()?,
            self.get_playlist_max_history()?,
        ))
    }
}

impl ParserConfigExt for Config {
    fn get_playlist_max_history(&self) -> Result<usize> {
        Ok(self.get_u64_or(&["playlist", "max_history"], MAX_HISTORY_SONGS as u64) as usize)
    }

    fn set_playlist_max_history(&self, max: usize) -> Result<()> {
        self.set_value(&["playlist", "max_history"], Value::Number(Number::from(max)))
    }

    fn get_playlist_rules(&self) -> Result<ParserRules> {
        let defaults = ParserRules::default();

        let request_marker = self
            .get_non_empty_string(&["playlist", "request_marker"])
            .unwrap_or_else(|| REQUEST_MARKER.to_string());

        let exclusions = match self.get_value(&["playlist", "exclusions"]) {
            Ok(value @ Value::Sequence(_)) => {
                match serde_yaml::from_value::<Vec<Exclusion>>(value) {
                    Ok(exclusions) => exclusions
                        .into_iter()
                        .filter(|exclusion| {
                            if exclusion.is_empty() {
                                tracing::warn!("Ignoring playlist exclusion with an empty pattern");
                            }
                            !exclusion.is_empty()
                        })
                        .collect(),
                    Err(e) => {
                        tracing::warn!("Invalid playlist exclusions: {}, using defaults", e);
                        defaults.exclusions
                    }
                }
            }
            _ => defaults.exclusions,
        };

        Ok(ParserRules::new(request_marker, exclusions))
    }

    fn set_playlist_rules(&self, rules: &ParserRules) -> Result<()> {
        self.set_value(
            &["playlist", "request_marker"],
            Value::String(rules.request_marker.clone()),
        )?;
        self.set_value(
            &["playlist", "exclusions"],
            serde_yaml::to_value(&rules.exclusions)?,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_builtin_rules() {
        let config = Config::defaults().unwrap();
        assert_eq!(config.get_playlist_rules().unwrap(), ParserRules::default());
        assert_eq!(config.get_playlist_max_history().unwrap(), MAX_HISTORY_SONGS);
        assert_eq!(config.get_playlist_parser().unwrap(), PlaylistParser::default());
    }

    #[test]
    fn test_rules_from_yaml() {
        let config = Config::from_yaml_str(
            "playlist:\n  max_history: 3\n  request_marker: \"♪\"\n  exclusions:\n    - pattern: ad\n      case_insensitive: true\n",
        )
        .unwrap();
        let parser = config.get_playlist_parser().unwrap();
        assert_eq!(parser.max_history(), 3);
        assert_eq!(parser.rules().request_marker, "♪");
        assert_eq!(parser.rules().exclusions, vec![Exclusion::ignore_case("ad")]);
    }

    #[test]
    fn test_malformed_exclusions_fall_back() {
        let config =
            Config::from_yaml_str("playlist:\n  exclusions:\n    - 42\n    - [1, 2]\n").unwrap();
        assert_eq!(
            config.get_playlist_rules().unwrap().exclusions,
            ParserRules::default().exclusions
        );
    }

    #[test]
    fn test_empty_exclusion_patterns_are_skipped() {
        let config = Config::from_yaml_str(
            "playlist:\n  exclusions:\n    - pattern: \"\"\n    - pattern: AD\n      case_insensitive: true\n",
        )
        .unwrap();
        let rules = config.get_playlist_rules().unwrap();
        assert_eq!(rules.exclusions, vec![Exclusion::ignore_case("AD")]);

        let snapshot = config
            .get_playlist_parser()
            .unwrap()
            .parse(&["[2025-01-01 10:00:00] #chan bot: 🔊 A - X"], true);
        assert_eq!(snapshot.current_title.as_deref(), Some("A - X"));
    }

    #[test]
    fn test_set_rules_round_trip() {
        let config = Config::defaults().unwrap();
        let rules = ParserRules::new("🎵", vec![Exclusion::exact("BOT")]);
        config.set_playlist_rules(&rules).unwrap();
        config.set_playlist_max_history(7).unwrap();
        assert_eq!(config.get_playlist_rules().unwrap(), rules);
        assert_eq!(config.get_playlist_max_history().unwrap(), 7);
    }
}
