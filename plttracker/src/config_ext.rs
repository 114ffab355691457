//! Extension pour intégrer le tracker dans pltconfig
//!
//! Ce module fournit le trait `TrackerConfigExt`: intervalle de polling et
//! paramètres de l'easter egg.

use crate::easter_egg::EasterEggSettings;
use crate::tracker::{TrackerSettings, DEFAULT_POLL_INTERVAL};
use anyhow::Result;
use pltconfig::Config;
use pltplaylist::ParserConfigExt;
use serde_yaml::{Number, Value};
use std::time::Duration;

/// Trait d'extension pour gérer la configuration du tracker dans pltconfig
pub trait TrackerConfigExt {
    /// Intervalle entre deux polls (défaut: 30 s)
    fn get_tracker_poll_interval(&self) -> Result<Duration>;

    /// Définit l'intervalle entre deux polls
    fn set_tracker_poll_interval(&self, interval: Duration) -> Result<()>;

    /// Paramètres de l'easter egg (clics, durée, cooldown)
    fn get_easter_egg_settings(&self) -> Result<EasterEggSettings>;

    /// Paramètres complets du tracker, parser compris
    fn get_tracker_settings(&self) -> Result<TrackerSettings>;
}

impl TrackerConfigExt for Config {
    fn get_tracker_poll_interval(&self) -> Result<Duration> {
        let ms = self.get_u64_or(
            &["tracker", "poll_interval_ms"],
            DEFAULT_POLL_INTERVAL.as_millis() as u64,
        );
        if ms == 0 {
            tracing::warn!("tracker.poll_interval_ms is 0, using default");
            return Ok(DEFAULT_POLL_INTERVAL);
        }
        Ok(Duration::from_millis(ms))
    }

    fn set_tracker_poll_interval(&self, interval: Duration) -> Result<()> {
        self.set_value(
            &["tracker", "poll_interval_ms"],
            Value::Number(Number::from(interval.as_millis() as u64)),
        )
    }

    fn get_easter_egg_settings(&self) -> Result<EasterEggSettings> {
        let defaults = EasterEggSettings::default();
        let clicks = self.get_u64_or(&["tracker", "easter_egg", "clicks"], defaults.clicks as u64);
        let duration = self.get_u64_or(
            &["tracker", "easter_egg", "duration_ms"],
            defaults.duration.as_millis() as u64,
        );
        let cooldown = self.get_u64_or(
            &["tracker", "easter_egg", "cooldown_ms"],
            defaults.cooldown.as_millis() as u64,
        );

        Ok(EasterEggSettings {
            clicks: u32::try_from(clicks).unwrap_or(defaults.clicks),
            duration: Duration::from_millis(duration),
            cooldown: Duration::from_millis(cooldown),
        })
    }

    fn get_tracker_settings(&self) -> Result<TrackerSettings> {
        Ok(TrackerSettings {
            poll_interval: self.get_tracker_poll_interval()?,
            parser: self.get_playlist_parser()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::defaults().unwrap();
        assert_eq!(config.get_tracker_settings().unwrap(), TrackerSettings::default());
        assert_eq!(
            config.get_easter_egg_settings().unwrap(),
            EasterEggSettings::default()
        );
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_yaml_str(
            "tracker:\n  poll_interval_ms: 5000\n  easter_egg:\n    clicks: 3\n    cooldown_ms: \"1000\"\n",
        )
        .unwrap();
        assert_eq!(
            config.get_tracker_poll_interval().unwrap(),
            Duration::from_secs(5)
        );
        let egg = config.get_easter_egg_settings().unwrap();
        assert_eq!(egg.clicks, 3);
        assert_eq!(egg.duration, Duration::from_millis(3000));
        assert_eq!(egg.cooldown, Duration::from_secs(1));
    }

    #[test]
    fn test_zero_interval_falls_back() {
        let config = Config::defaults().unwrap();
        config.set_tracker_poll_interval(Duration::ZERO).unwrap();
        assert_eq!(config.get_tracker_poll_interval().unwrap(), DEFAULT_POLL_INTERVAL);
    }
}
