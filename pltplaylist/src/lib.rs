//! Song-request playlist reconstruction for PLTracker
//!
//! This crate turns the newest-first lines of a chat-log archive into a
//! [`PlaylistSnapshot`]: the song currently playing plus a deduplicated,
//! capped history of earlier requests.
//!
//! # Example
//!
//! ```
//! use pltplaylist::{parse_playlist, split_log_lines};
//!
//! let raw = "[2025-11-02 16:09:47] #quin69 sheepfarmer: 🔊 Artist - Title\n\n";
//! let snapshot = parse_playlist(&split_log_lines(raw), true);
//! assert_eq!(snapshot.current_title.as_deref(), Some("Artist - Title"));
//! ```
//!
//! # Configuration Extension
//!
//! With the `pltconfig` feature (default), [`ParserConfigExt`] builds a
//! parser from the `playlist` section of the configuration.

pub mod models;
pub mod parser;
pub mod rules;

#[cfg(feature = "pltconfig")]
pub mod config_ext;

pub use models::{is_skipped_title, PlaylistSnapshot, SongEntry, SongInfo, UNKNOWN_ARTIST};
pub use parser::{extract_timestamp, parse_playlist, split_log_lines, PlaylistParser, MAX_HISTORY_SONGS};
pub use rules::{Exclusion, ParserRules, REQUEST_MARKER};

#[cfg(feature = "pltconfig")]
pub use config_ext::ParserConfigExt;
