//! Seams between the tracker and the HTTP collaborators
//!
//! The tracker only depends on these traits, so tests and alternative
//! archives can plug in without touching the polling logic.

use crate::error::Result;
use async_trait::async_trait;

/// Supplies archive lines, newest first, with blank lines removed
#[async_trait]
pub trait LogSource: Send + Sync {
    async fn fetch_lines(&self) -> Result<Vec<String>>;
}

/// Reports whether the stream is currently live
#[async_trait]
pub trait LivenessProbe: Send + Sync {
    async fn is_live(&self) -> Result<bool>;
}
