//! Sample data used across the integration tests

#[cfg(feature = "music")]
use maestro::commands::music::audio_sources::TrackMetadata;
use serenity::model::id::GuildId;
#[cfg(feature = "music")]
use std::time::Duration;

pub const GUILD_A: GuildId = GuildId::new(111_111_111);
pub const GUILD_B: GuildId = GuildId::new(222_222_222);

pub const SAMPLE_USER_ID: u64 = 123_456_789;
pub const OTHER_USER_ID: u64 = 987_654_321;

#[cfg(feature = "music")]
/// A resolved track the way yt-dlp would describe it
pub fn sample_track(title: &str) -> TrackMetadata {
    let mut track = TrackMetadata::new(title, format!("https://www.youtube.com/watch?v={}", title))
        .with_requester("tester");
    track.duration = Some(Duration::from_secs(200));
    track
}

#[cfg(feature = "music")]
/// One line of `yt-dlp -j` output for a single video
pub fn ytdlp_video_json() -> serde_json::Value {
    serde_json::json!({
        "title": "Never Gonna Give You Up",
        "webpage_url": "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
        "duration": 213,
        "thumbnail": "https://i.ytimg.com/vi/dQw4w9WgXcQ/maxresdefault.jpg"
    })
}
