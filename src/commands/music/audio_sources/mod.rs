//! This module defines how a user's query becomes a playable track.
//! It includes the `yt-dlp` backed resolver and the `TrackMetadata` struct
//! shared by the queue manager and the sink.

/// Submodule defining the `TrackMetadata` struct used across the music module.
pub(crate) mod track_metadata;
/// Submodule implementing the `AudioResolver` trait on top of `yt-dlp`.
pub(crate) mod youtube;

use serenity::async_trait;
use thiserror::Error;
use url::Url;

pub use track_metadata::TrackMetadata;
pub use youtube::YoutubeApi;

/// Reasons a query could not be turned into a playable track.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionFailure {
    #[error("No results found")]
    NotFound,

    #[error("Audio extraction failed: {0}")]
    ExtractionError(String),

    #[error("This video requires signing in; configure YTDL_COOKIEFILE with exported cookies")]
    RequiresAuth,
}

/// Trait for anything that can resolve a query or URL into a track.
/// Resolution may take arbitrary wall-clock time, so callers must never hold
/// a guild's playback lock while awaiting it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AudioResolver: Send + Sync {
    /// Resolve `query` (a URL or free-text search) into a track requested by `requested_by`.
    async fn resolve(
        &self,
        query: &str,
        requested_by: String,
    ) -> Result<TrackMetadata, ResolutionFailure>;
}

/// A utility struct providing general helper functions related to audio sources.
pub struct AudioSource;

impl AudioSource {
    /// Performs a basic check if the input string can be parsed as an http(s) URL.
    /// Does not validate if the URL is actually reachable or supported.
    pub fn is_url(input: &str) -> bool {
        Url::parse(input.trim())
            .map(|url| matches!(url.scheme(), "http" | "https"))
            .unwrap_or(false)
    }
}
