//! Extension pour intégrer les sources HTTP dans pltconfig
//!
//! Ce module fournit le trait `SourcesConfigExt` qui ajoute à
//! `pltconfig::Config` la lecture des URLs, du canal, des identifiants
//! Spotify, ainsi que la construction des clients correspondants.
//!
//! # Exemple
//!
//! ```no_run
//! use pltconfig::get_config;
//! use pltsources::SourcesConfigExt;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = get_config();
//! let archive = config.create_archive_client()?;
//! let artwork = config.create_artwork_chain()?;
//! println!("{} on #{} ({} artwork providers)", archive.user(), archive.channel(), artwork.len());
//! # Ok(())
//! # }
//! ```

use crate::archive::{ArchiveClient, DEFAULT_ARCHIVE_BASE, DEFAULT_CHANNEL, DEFAULT_REQUEST_BOT};
use crate::artwork::itunes::{ItunesArtwork, DEFAULT_ITUNES_BASE};
use crate::artwork::spotify::{
    SpotifyArtwork, SpotifyCredentials, DEFAULT_ACCOUNTS_URL, DEFAULT_API_URL,
};
use crate::artwork::ArtworkChain;
use crate::http::HttpSettings;
use crate::status::{StreamStatusClient, DEFAULT_UPTIME_BASE};
use anyhow::Result;
use pltconfig::Config;
use serde_yaml::Value;
use std::sync::Arc;
use std::time::Duration;

/// Trait d'extension pour gérer la configuration des sources dans pltconfig
pub trait SourcesConfigExt {
    /// Canal dont le chat est suivi (défaut: quin69)
    fn get_sources_channel(&self) -> String;

    /// Change le canal suivi
    fn set_sources_channel(&self, channel: &str) -> Result<()>;

    /// URL de base de l'archive des logs
    fn get_archive_base_url(&self) -> String;

    /// Utilisateur qui annonce les demandes de chansons
    fn get_archive_user(&self) -> String;

    /// URL de base du service d'uptime
    fn get_uptime_base_url(&self) -> String;

    /// Vérifie si la recherche de pochettes est activée
    fn get_artwork_enabled(&self) -> Result<bool>;

    /// Active ou désactive la recherche de pochettes
    fn set_artwork_enabled(&self, enabled: bool) -> Result<()>;

    /// Identifiants Spotify
    ///
    /// Lus dans `sources.artwork.spotify.client_id` / `client_secret` quand
    /// les deux sont renseignés, sinon dans les variables d'environnement
    /// `SPOTIFY_CLIENT_ID` / `SPOTIFY_CLIENT_SECRET`.
    fn get_spotify_credentials(&self) -> Option<SpotifyCredentials>;

    fn get_spotify_accounts_url(&self) -> String;

    fn get_spotify_api_url(&self) -> String;

    fn get_itunes_base_url(&self) -> String;

    /// Paramètres HTTP communs (timeout et User-Agent de `host.http`)
    fn get_http_settings(&self) -> Result<HttpSettings>;

    /// Client d'archive configuré
    fn create_archive_client(&self) -> Result<ArchiveClient> {
        let http = self.get_http_settings()?;
        Ok(ArchiveClient::builder()
            .base_url(self.get_archive_base_url())
            .channel(self.get_sources_channel())
            .user(self.get_archive_user())
            .client(http.build_client()?)
            .build()?)
    }

    /// Client d'uptime configuré
    fn create_status_client(&self) -> Result<StreamStatusClient> {
        let http = self.get_http_settings()?;
        Ok(StreamStatusClient::builder()
            .base_url(self.get_uptime_base_url())
            .channel(self.get_sources_channel())
            .client(http.build_client()?)
            .build()?)
    }

    /// Chaîne de fournisseurs de pochettes
    ///
    /// Spotify en premier si des identifiants sont disponibles, puis iTunes.
    /// Vide quand la recherche de pochettes est désactivée.
    fn create_artwork_chain(&self) -> Result<ArtworkChain> {
        let mut chain = ArtworkChain::new();
        if !self.get_artwork_enabled()? {
            tracing::info!("Artwork lookup disabled");
            return Ok(chain);
        }

        let client = self.get_http_settings()?.build_client()?;

        match self.get_spotify_credentials() {
            Some(credentials) => {
                let spotify = SpotifyArtwork::builder()
                    .client(client.clone())
                    .accounts_url(self.get_spotify_accounts_url())
                    .api_url(self.get_spotify_api_url())
                    .credentials(Some(credentials))
                    .build()?;
                chain.push(Arc::new(spotify));
            }
            None => tracing::info!("Spotify credentials not set, using iTunes artwork only"),
        }

        chain.push(Arc::new(ItunesArtwork::with_client(
            client,
            self.get_itunes_base_url(),
        )));
        Ok(chain)
    }
}

impl SourcesConfigExt for Config {
    fn get_sources_channel(&self) -> String {
        self.get_string_or(&["sources", "channel"], DEFAULT_CHANNEL)
    }

    fn set_sources_channel(&self, channel: &str) -> Result<()> {
        self.set_value(&["sources", "channel"], Value::String(channel.to_string()))
    }

    fn get_archive_base_url(&self) -> String {
        self.get_string_or(&["sources", "archive", "base_url"], DEFAULT_ARCHIVE_BASE)
    }

    fn get_archive_user(&self) -> String {
        self.get_string_or(&["sources", "archive", "user"], DEFAULT_REQUEST_BOT)
    }

    fn get_uptime_base_url(&self) -> String {
        self.get_string_or(&["sources", "uptime", "base_url"], DEFAULT_UPTIME_BASE)
    }

    fn get_artwork_enabled(&self) -> Result<bool> {
        match self.get_value(&["sources", "artwork", "enabled"]) {
            Ok(Value::Bool(b)) => Ok(b),
            _ => Ok(true),
        }
    }

    fn set_artwork_enabled(&self, enabled: bool) -> Result<()> {
        self.set_value(&["sources", "artwork", "enabled"], Value::Bool(enabled))
    }

    fn get_spotify_credentials(&self) -> Option<SpotifyCredentials> {
        let id = self.get_non_empty_string(&["sources", "artwork", "spotify", "client_id"]);
        let secret =
            self.get_non_empty_string(&["sources", "artwork", "spotify", "client_secret"]);
        match (id, secret) {
            (Some(id), Some(secret)) => Some(SpotifyCredentials::new(id, secret)),
            _ => SpotifyCredentials::from_env(),
        }
    }

    fn get_spotify_accounts_url(&self) -> String {
        self.get_string_or(
            &["sources", "artwork", "spotify", "accounts_url"],
            DEFAULT_ACCOUNTS_URL,
        )
    }

    fn get_spotify_api_url(&self) -> String {
        self.get_string_or(&["sources", "artwork", "spotify", "api_url"], DEFAULT_API_URL)
    }

    fn get_itunes_base_url(&self) -> String {
        self.get_string_or(&["sources", "artwork", "itunes", "base_url"], DEFAULT_ITUNES_BASE)
    }

    fn get_http_settings(&self) -> Result<HttpSettings> {
        Ok(HttpSettings {
            timeout: Duration::from_secs(self.get_http_timeout_secs()? as u64),
            user_agent: self.get_http_user_agent(),
            proxy: None,
        })
    }
}
