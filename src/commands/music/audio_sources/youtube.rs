//! Implements the `AudioResolver` trait by shelling out to `yt-dlp`.

use serenity::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::LazyLock;
use tokio::process::Command;
use tracing::{debug, info, warn};
use url::Url;

use regex::Regex;

use super::{AudioResolver, AudioSource, ResolutionFailure, TrackMetadata};

/// stderr fragments yt-dlp prints when a video is gated behind a login.
static AUTH_REQUIRED_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(sign in to confirm|cookies|login required|members-only|private video)")
        .expect("static regex")
});

/// stderr fragments yt-dlp prints when the video simply does not exist.
static NOT_FOUND_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(video unavailable|not found|no video formats|does not exist|404)")
        .expect("static regex")
});

/// Resolves queries and URLs through the `yt-dlp` command-line tool.
#[derive(Debug, Clone)]
pub struct YoutubeApi {
    ytdlp_path: String,
    cookie_file: Option<PathBuf>,
}

impl Default for YoutubeApi {
    fn default() -> Self {
        Self::new("yt-dlp", None)
    }
}

impl YoutubeApi {
    pub fn new(ytdlp_path: impl Into<String>, cookie_file: Option<PathBuf>) -> Self {
        Self {
            ytdlp_path: ytdlp_path.into(),
            cookie_file,
        }
    }

    /// Checks if the input string is a YouTube watch page or a youtu.be short link.
    pub fn is_youtube_url(query: &str) -> bool {
        match Url::parse(query) {
            Ok(url) => match url.host_str() {
                Some("www.youtube.com" | "youtube.com" | "m.youtube.com" | "music.youtube.com") => {
                    url.path().starts_with("/watch") || url.path().starts_with("/shorts/")
                }
                Some("youtu.be") => url.path().len() > 1,
                _ => false,
            },
            Err(_) => false,
        }
    }

    /// Turns the user's input into the positional argument handed to yt-dlp.
    /// Anything that is not a URL becomes a search for the first result.
    pub fn search_argument(query: &str) -> String {
        let query = query.trim();
        if AudioSource::is_url(query) {
            query.to_string()
        } else {
            format!("ytsearch:{}", query)
        }
    }

    /// Builds the yt-dlp argument list for a query.
    pub fn ytdlp_args(&self, query: &str) -> Vec<String> {
        let mut args = vec![
            "-j".to_string(),            // Output as JSON
            "--no-playlist".to_string(), // Don't process playlists
            "--no-warnings".to_string(),
            "--default-search".to_string(),
            "auto".to_string(),
        ];

        if let Some(cookie_file) = &self.cookie_file {
            args.push("--cookies".to_string());
            args.push(cookie_file.to_string_lossy().into_owned());
        }

        args.push(Self::search_argument(query));
        args
    }

    /// Maps yt-dlp's stderr to the failure the user should see.
    pub fn classify_failure(stderr: &str) -> ResolutionFailure {
        if AUTH_REQUIRED_REGEX.is_match(stderr) {
            ResolutionFailure::RequiresAuth
        } else if NOT_FOUND_REGEX.is_match(stderr) {
            ResolutionFailure::NotFound
        } else {
            let message = stderr
                .lines()
                .map(str::trim)
                .find(|line| !line.is_empty())
                .unwrap_or("yt-dlp exited with an error");
            ResolutionFailure::ExtractionError(message.to_string())
        }
    }
}

#[async_trait]
impl AudioResolver for YoutubeApi {
    async fn resolve(
        &self,
        query: &str,
        requested_by: String,
    ) -> Result<TrackMetadata, ResolutionFailure> {
        if query.trim().is_empty() {
            return Err(ResolutionFailure::NotFound);
        }

        let kind = if Self::is_youtube_url(query) {
            "YouTube link"
        } else if AudioSource::is_url(query) {
            "URL"
        } else {
            "search"
        };
        info!("Resolving audio source ({}) for query: {}", kind, query);
        let args = self.ytdlp_args(query);
        debug!("Running {} {:?}", self.ytdlp_path, args);

        let output = Command::new(&self.ytdlp_path)
            .args(&args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                ResolutionFailure::ExtractionError(format!("Failed to run {}: {}", self.ytdlp_path, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("yt-dlp failed for query '{}': {}", query, stderr.trim());
            return Err(Self::classify_failure(&stderr));
        }

        let mut metadata = TrackMetadata::from_ytdlp_output(&output.stdout)?;
        metadata.requested_by = Some(requested_by);

        info!("Resolved '{}' to '{}' ({})", query, metadata.title, metadata.url);
        Ok(metadata)
    }
}
