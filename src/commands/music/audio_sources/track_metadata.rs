//! Defines the `TrackMetadata` struct, the unified representation of a resolved
//! track, and the conversion from `yt-dlp` JSON output.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use super::ResolutionFailure;

/// A resolved, playable track plus the metadata needed to display and replay it.
/// Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackMetadata {
    /// The title of the track.
    pub title: String,
    /// URL or provider identifier used to (re)materialize a playable stream.
    pub url: String,
    /// The duration of the track, if available.
    #[serde(with = "humantime_serde")]
    pub duration: Option<Duration>,
    /// URL to a thumbnail image for the track, if available.
    pub thumbnail: Option<String>,
    /// The name of the user who requested the track.
    pub requested_by: Option<String>,
    /// The provider's raw response, kept so the stream can be rebuilt on repeat.
    #[serde(default)]
    pub raw: Value,
}

impl TrackMetadata {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            duration: None,
            thumbnail: None,
            requested_by: None,
            raw: Value::Null,
        }
    }

    pub fn with_requester(mut self, requested_by: impl Into<String>) -> Self {
        self.requested_by = Some(requested_by.into());
        self
    }

    /// Builds metadata from one `yt-dlp -j` document.
    ///
    /// Playlist and search responses carry their results under `entries`; the
    /// first entry is used, matching `--no-playlist` semantics.
    pub fn from_ytdlp_json(json: Value) -> Result<Self, ResolutionFailure> {
        let json = match json.get("entries") {
            Some(Value::Array(entries)) => entries
                .first()
                .cloned()
                .ok_or(ResolutionFailure::NotFound)?,
            Some(_) => {
                return Err(ResolutionFailure::ExtractionError(
                    "Unexpected 'entries' field in yt-dlp output".to_string(),
                ));
            }
            None => json,
        };

        // Prefer the page URL so the stream can be re-extracted later; direct
        // media URLs expire.
        let url = ["webpage_url", "original_url", "url"]
            .iter()
            .find_map(|key| json[*key].as_str())
            .map(str::to_string)
            .ok_or_else(|| {
                ResolutionFailure::ExtractionError("yt-dlp output has no URL".to_string())
            })?;

        let title = json["title"]
            .as_str()
            .unwrap_or("Unknown Title")
            .to_string();

        let duration = json["duration"]
            .as_f64()
            .filter(|secs| secs.is_finite() && *secs >= 0.0)
            .map(Duration::from_secs_f64);

        let thumbnail = json["thumbnail"].as_str().map(|s| s.to_string());

        Ok(Self {
            title,
            url,
            duration,
            thumbnail,
            requested_by: None,
            raw: json,
        })
    }

    /// Parses the stdout of a `yt-dlp -j` invocation.
    pub fn from_ytdlp_output(stdout: &[u8]) -> Result<Self, ResolutionFailure> {
        let text = String::from_utf8_lossy(stdout);
        // With a search prefix, yt-dlp prints one JSON document per result line
        let first_line = text
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .ok_or(ResolutionFailure::NotFound)?;

        let json: Value = serde_json::from_str(first_line).map_err(|e| {
            ResolutionFailure::ExtractionError(format!("Failed to parse video metadata: {}", e))
        })?;

        Self::from_ytdlp_json(json)
    }
}
