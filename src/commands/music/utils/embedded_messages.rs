use poise::CreateReply;
use ::serenity::all::CreateEmbed;
use std::time::Duration;

use super::{
    format_duration,
    music_manager::{InvalidOperation, MusicError},
    queue_manager::{GuildSnapshot, PlaybackStatus, Skipped},
};
use crate::commands::music::audio_sources::{ResolutionFailure, TrackMetadata};

const SUCCESS_COLOR: u32 = 0x00ff00;
const ERROR_COLOR: u32 = 0xff0000;

/// Tracks listed before the queue embed is cut off
const QUEUE_DISPLAY_LIMIT: usize = 10;

/// Parse the metadata for the now playing and added to queue embeds
fn parse_metadata(metadata: &TrackMetadata) -> (String, String, String) {
    let title = metadata.title.clone();
    let url = metadata.url.clone();
    let duration_str = metadata
        .duration
        .map(format_duration)
        .unwrap_or_else(|| "Unknown duration".to_string());

    (title, url, duration_str)
}

fn with_thumbnail(embed: CreateEmbed, metadata: &TrackMetadata) -> CreateEmbed {
    match &metadata.thumbnail {
        Some(thumbnail) => embed.thumbnail(thumbnail),
        None => embed,
    }
}

fn error_reply(description: impl Into<String>) -> CreateReply {
    CreateReply::default()
        .embed(
            CreateEmbed::new()
                .title("❌ Error")
                .description(description)
                .color(ERROR_COLOR),
        )
        .ephemeral(true)
}

/// Create an embed for when a song is now playing
pub fn now_playing(metadata: &TrackMetadata) -> CreateEmbed {
    let (title, url, duration_str) = parse_metadata(metadata);

    let mut embed = CreateEmbed::new()
        .title("🎵 Now Playing")
        .description(format!("[{}]({})", title, url))
        .field("Duration", format!("`{}`", duration_str), true)
        .color(SUCCESS_COLOR);

    if let Some(requested_by) = &metadata.requested_by {
        embed = embed.field("Requested by", requested_by, true);
    }

    with_thumbnail(embed, metadata)
}

/// Create an embed for when a song is added to the queue
pub fn added_to_queue(metadata: &TrackMetadata, position: usize) -> CreateEmbed {
    let (title, url, duration_str) = parse_metadata(metadata);

    let embed = CreateEmbed::new()
        .title("🎵 Added to Queue")
        .description(format!("[{}]({})", title, url))
        .field("Duration", format!("`{}`", duration_str), true)
        .field("Position", format!("`#{}`", position), true)
        .color(SUCCESS_COLOR);

    with_thumbnail(embed, metadata)
}

/// Build the text body of the queue embed
pub fn queue_description(snapshot: &GuildSnapshot) -> String {
    let mut description = String::new();

    match &snapshot.now_playing {
        Some(metadata) => {
            let heading = match snapshot.status {
                PlaybackStatus::Paused => "**⏸️ Paused**\n",
                _ => "**🎵 Now Playing**\n",
            };
            description.push_str(heading);
            description.push_str(&format!("**[{}]({})**", metadata.title, metadata.url));
            if let Some(duration) = metadata.duration {
                description.push_str(&format!(" `{}`", format_duration(duration)));
            }
            description.push_str("\n\n");
        }
        None => description.push_str("**🔇 Nothing playing**\n\n"),
    }

    let queue = &snapshot.queue;
    if queue.is_empty() {
        description.push_str("**📭 Queue is empty**");
    } else {
        description.push_str(&format!("**📋 Queue - {} tracks**\n", queue.len()));
        for (index, track) in queue.iter().take(QUEUE_DISPLAY_LIMIT).enumerate() {
            description.push_str(&format!("`{}.` [{}]({})", index + 1, track.title, track.url));
            if let Some(duration) = track.duration {
                description.push_str(&format!(" `{}`", format_duration(duration)));
            }
            description.push('\n');
        }
        if queue.len() > QUEUE_DISPLAY_LIMIT {
            description.push_str(&format!(
                "...and {} more\n",
                queue.len() - QUEUE_DISPLAY_LIMIT
            ));
        }

        let total_duration: Duration = queue.iter().filter_map(|track| track.duration).sum();
        if total_duration.as_secs() > 0 {
            description.push_str(&format!(
                "\n**⏱️ Total Duration:** `{}`",
                format_duration(total_duration)
            ));
        }
    }

    description
}

/// Create an embed for the music queue
pub fn music_queue(snapshot: &GuildSnapshot) -> CreateReply {
    let repeat = if snapshot.repeat_enabled { "On" } else { "Off" };

    CreateReply::default().embed(
        CreateEmbed::new()
            .title("🎵 Music Queue")
            .description(queue_description(snapshot))
            .field("🔁 Repeat", repeat, true)
            .color(SUCCESS_COLOR),
    )
}

/// User-facing text for a music error
pub fn describe_error(err: &MusicError) -> String {
    match err {
        MusicError::UserNotInVoiceChannel => "You need to be in a voice channel".to_string(),
        MusicError::NotConnected => "I'm not connected to a voice channel".to_string(),
        MusicError::Resolution(ResolutionFailure::NotFound) => {
            "Couldn't find anything for that query".to_string()
        }
        MusicError::Resolution(ResolutionFailure::RequiresAuth) => {
            "That video requires a signed-in account".to_string()
        }
        MusicError::Resolution(ResolutionFailure::ExtractionError(reason)) => {
            format!("Failed to process audio source: {}", reason)
        }
        MusicError::InvalidOperation(InvalidOperation::IndexOutOfRange { len: 0, .. }) => {
            "The queue is empty".to_string()
        }
        MusicError::InvalidOperation(InvalidOperation::IndexOutOfRange { len, .. }) => {
            format!("Invalid position. The queue has {} tracks", len)
        }
        other => other.to_string(),
    }
}

/// Create an error reply for a failed music command
pub fn music_error(err: &MusicError) -> CreateReply {
    error_reply(describe_error(err))
}

/// Create an embed for when a track is paused
pub fn paused(metadata: &TrackMetadata) -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .title("⏸️ Paused")
            .description(format!("Paused [{}]({})", metadata.title, metadata.url))
            .color(SUCCESS_COLOR),
    )
}

/// Create an embed for when a track is resumed
pub fn resumed(metadata: &TrackMetadata) -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .title("▶️ Resumed")
            .description(format!("Resumed [{}]({})", metadata.title, metadata.url))
            .color(SUCCESS_COLOR),
    )
}

/// Create an embed for when no track is playing
pub fn no_track_playing() -> CreateReply {
    error_reply("No track is currently playing")
}

/// Create an embed for when repeat is enabled or disabled
pub fn repeat_status(enabled: bool) -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .title(if enabled {
                "🔁 Repeat Enabled"
            } else {
                "➡️ Repeat Disabled"
            })
            .description(if enabled {
                "The current track will play again when it ends"
            } else {
                "Playback will continue with the queue"
            })
            .color(if enabled { SUCCESS_COLOR } else { ERROR_COLOR }),
    )
}

/// Create an embed for when the bot leaves a voice channel
pub fn left_voice_channel() -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .title("👋 Left Voice Channel")
            .description("Successfully disconnected and cleared the queue")
            .color(SUCCESS_COLOR),
    )
}

/// Create an embed for when a track is removed from the queue
pub fn track_removed(metadata: &TrackMetadata, position: usize) -> CreateReply {
    let (title, url, _) = parse_metadata(metadata);

    CreateReply::default().embed(
        CreateEmbed::new()
            .title("🗑️ Track Removed")
            .description(format!(
                "Removed [{}]({}) from position #{}",
                title, url, position
            ))
            .color(SUCCESS_COLOR),
    )
}

/// Create an embed for when the bot stops playing music
pub fn stopped(dropped: usize) -> CreateReply {
    let description = match dropped {
        0 => "Playback stopped".to_string(),
        1 => "Playback stopped and 1 queued track cleared".to_string(),
        n => format!("Playback stopped and {} queued tracks cleared", n),
    };

    CreateReply::default().embed(
        CreateEmbed::new()
            .title("⏹️ Stopped")
            .description(description)
            .color(SUCCESS_COLOR),
    )
}

/// Create an embed for when a track is skipped
pub fn skipped(skip: &Skipped) -> CreateReply {
    let mut description = format!("Skipped [{}]({})", skip.skipped.title, skip.skipped.url);
    match &skip.next {
        Some(metadata) => {
            description.push_str(&format!("\nUp next: [{}]({})", metadata.title, metadata.url))
        }
        None => description.push_str("\nThe queue is now empty"),
    }

    CreateReply::default().embed(
        CreateEmbed::new()
            .title("⏭️ Skipped")
            .description(description)
            .color(SUCCESS_COLOR),
    )
}

/// Create an embed for when the queue is shuffled
pub fn shuffled(queue_length: usize) -> CreateReply {
    if queue_length < 2 {
        return error_reply("There is nothing to shuffle");
    }

    CreateReply::default().embed(
        CreateEmbed::new()
            .title("🔀 Shuffled")
            .description(format!("Shuffled {} tracks", queue_length))
            .color(SUCCESS_COLOR),
    )
}

/// Create an embed for when the volume changes
pub fn volume_set(percent: u16) -> CreateReply {
    let icon = match percent {
        0 => "🔇",
        1..=50 => "🔈",
        51..=100 => "🔉",
        _ => "🔊",
    };

    CreateReply::default().embed(
        CreateEmbed::new()
            .title(format!("{} Volume", icon))
            .description(format!("Volume set to `{}%`", percent))
            .color(SUCCESS_COLOR),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn track_with_duration(title: &str, seconds: u64) -> TrackMetadata {
        let mut track = TrackMetadata::new(title, format!("https://youtu.be/{}", title));
        track.duration = Some(Duration::from_secs(seconds));
        track
    }

    #[test]
    fn test_queue_description_for_idle_guild() {
        let snapshot = GuildSnapshot {
            status: PlaybackStatus::Idle,
            now_playing: None,
            queue: Vec::new(),
            repeat_enabled: false,
        };

        assert_eq!(
            queue_description(&snapshot),
            "**🔇 Nothing playing**\n\n**📭 Queue is empty**"
        );
    }

    #[test]
    fn test_queue_description_lists_pending_tracks_with_total() {
        let snapshot = GuildSnapshot {
            status: PlaybackStatus::Playing,
            now_playing: Some(track_with_duration("a", 60)),
            queue: vec![track_with_duration("b", 90), track_with_duration("c", 30)],
            repeat_enabled: true,
        };

        let description = queue_description(&snapshot);
        assert!(description.starts_with("**🎵 Now Playing**\n**[a](https://youtu.be/a)** `1:00`"));
        assert!(description.contains("**📋 Queue - 2 tracks**"));
        assert!(description.contains("`1.` [b](https://youtu.be/b) `1:30`"));
        assert!(description.contains("`2.` [c](https://youtu.be/c) `0:30`"));
        assert!(description.ends_with("**⏱️ Total Duration:** `2:00`"));
    }

    #[test]
    fn test_queue_description_truncates_long_queues() {
        let queue = (0..13)
            .map(|i| TrackMetadata::new(format!("t{}", i), "https://youtu.be/x"))
            .collect();
        let snapshot = GuildSnapshot {
            status: PlaybackStatus::Paused,
            now_playing: Some(TrackMetadata::new("current", "https://youtu.be/c")),
            queue,
            repeat_enabled: false,
        };

        let description = queue_description(&snapshot);
        assert!(description.starts_with("**⏸️ Paused**"));
        assert!(description.contains("`10.` [t9]"));
        assert!(!description.contains("[t10]"));
        assert!(description.contains("...and 3 more"));
    }

    #[test]
    fn test_describe_out_of_range_on_empty_queue() {
        let err = MusicError::from(InvalidOperation::IndexOutOfRange { index: 1, len: 0 });
        assert_eq!(describe_error(&err), "The queue is empty");
    }

    #[test]
    fn test_describe_out_of_range() {
        let err = MusicError::from(InvalidOperation::IndexOutOfRange { index: 9, len: 3 });
        assert_eq!(describe_error(&err), "Invalid position. The queue has 3 tracks");
    }

    #[test]
    fn test_describe_resolution_failures() {
        assert_eq!(
            describe_error(&ResolutionFailure::NotFound.into()),
            "Couldn't find anything for that query"
        );
        assert_eq!(
            describe_error(&ResolutionFailure::ExtractionError("boom".into()).into()),
            "Failed to process audio source: boom"
        );
    }
}
