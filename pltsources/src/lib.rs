//! # pltsources - HTTP collaborators for PLTracker
//!
//! Everything the tracker needs from the network:
//!
//! - [`ArchiveClient`]: newest-first chat-log lines of the request bot
//! - [`StreamStatusClient`]: whether the channel is live
//! - [`artwork`]: album cover lookup through Spotify and iTunes
//!
//! The tracker only sees the [`LogSource`], [`LivenessProbe`] and
//! [`ArtworkProvider`] traits, so every collaborator can be replaced.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pltsources::{ArchiveClient, StreamStatusClient};
//! use pltplaylist::parse_playlist;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let archive = ArchiveClient::new()?;
//!     let status = StreamStatusClient::new()?;
//!
//!     let live = status.is_live().await.unwrap_or(false);
//!     let snapshot = parse_playlist(&archive.fetch_lines().await?, live);
//!     println!("Now playing: {:?}", snapshot.current_title);
//!     Ok(())
//! }
//! ```

pub mod archive;
pub mod artwork;
pub mod error;
pub mod http;
pub mod status;
pub mod traits;

#[cfg(feature = "pltconfig")]
pub mod config_ext;

pub use archive::{ArchiveClient, ArchiveClientBuilder};
pub use artwork::{
    ArtworkChain, ArtworkProvider, ItunesArtwork, SpotifyArtwork, SpotifyCredentials, TokenCache,
};
pub use error::{Error, Result};
pub use http::HttpSettings;
pub use status::{classify_uptime, StreamStatus, StreamStatusClient, StreamStatusClientBuilder};
pub use traits::{LivenessProbe, LogSource};

#[cfg(feature = "pltconfig")]
pub use config_ext::SourcesConfigExt;
