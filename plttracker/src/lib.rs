//! # plttracker - keeps the PLTracker playlist up to date
//!
//! - [`PlaylistTracker`]: background poll loop publishing [`TrackerState`]
//! - [`EasterEgg`]: click counter for the play button
//! - [`display`]: plain-text rendering of the state
//!
//! With the `pltconfig` feature (default), [`TrackerConfigExt`] reads the
//! poll interval and easter egg timings from the configuration.

pub mod display;
pub mod easter_egg;
pub mod state;
pub mod tracker;

#[cfg(feature = "pltconfig")]
pub mod config_ext;

pub use display::{render_dashboard, OfflineMessage, SearchLinks};
pub use easter_egg::{EasterEgg, EasterEggSettings, EasterEggView};
pub use state::TrackerState;
pub use tracker::{PlaylistTracker, PollOutcome, TrackerHandle, TrackerSettings};

#[cfg(feature = "pltconfig")]
pub use config_ext::TrackerConfigExt;
