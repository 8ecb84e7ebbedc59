use poise::serenity_prelude as serenity;
use serenity::client::Context;
use serenity::model::id::{ChannelId, GuildId, UserId};
use serenity::prelude::Mutex as SerenityMutex;
use songbird::{Call, Songbird};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

use crate::commands::music::audio_sources::ResolutionFailure;

use super::audio_sink::SinkFailure;

/// Errors that can occur during music operations
#[derive(Error, Debug)]
pub enum MusicError {
    #[error("Not in a guild")]
    NotInGuild,

    #[error("Failed to join voice channel: {0}")]
    JoinError(String),

    #[error("Not connected to a voice channel")]
    NotConnected,

    #[error("User is not in a voice channel")]
    UserNotInVoiceChannel,

    #[error(transparent)]
    Resolution(#[from] ResolutionFailure),

    #[error(transparent)]
    Sink(#[from] SinkFailure),

    #[error(transparent)]
    InvalidOperation(#[from] InvalidOperation),
}

/// Requests that are not valid in the guild's current playback state
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidOperation {
    #[error("Nothing is currently playing")]
    NothingPlaying,

    #[error("Playback is not paused")]
    NotPaused,

    #[error("Position {index} is out of range (queue has {len} tracks)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Volume {0}% is out of range (0-200)")]
    VolumeOutOfRange(u16),
}

/// Result type for music operations
pub type MusicResult<T> = Result<T, MusicError>;

/// Voice connection helpers around the shared Songbird instance
pub struct MusicManager;

impl MusicManager {
    /// Join a voice channel
    pub async fn join_channel(
        songbird: &Songbird,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> MusicResult<Arc<SerenityMutex<Call>>> {
        songbird
            .join(guild_id, channel_id)
            .await
            .map_err(|e| MusicError::JoinError(e.to_string()))
    }

    /// Leave a voice channel
    pub async fn leave_channel(songbird: &Songbird, guild_id: GuildId) -> MusicResult<()> {
        // Check if we're in a voice channel
        if songbird.get(guild_id).is_none() {
            return Err(MusicError::NotConnected);
        }

        songbird
            .remove(guild_id)
            .await
            .map_err(|_| MusicError::JoinError("Failed to leave voice channel".to_string()))?;

        info!("Left voice channel in guild {}", guild_id);
        Ok(())
    }

    /// Get the voice channel ID that the user is currently in
    pub fn get_user_voice_channel(
        ctx: &Context,
        guild_id: GuildId,
        user_id: UserId,
    ) -> MusicResult<ChannelId> {
        let guild = ctx.cache.guild(guild_id).ok_or(MusicError::NotInGuild)?;

        let voice_state = guild
            .voice_states
            .get(&user_id)
            .ok_or(MusicError::UserNotInVoiceChannel)?;

        voice_state
            .channel_id
            .ok_or(MusicError::UserNotInVoiceChannel)
    }

    /// Make sure the bot is connected to the caller's voice channel, joining it if needed.
    pub async fn confirm_voice_connection(
        ctx: &Context,
        songbird: &Songbird,
        guild_id: GuildId,
        user_id: UserId,
    ) -> MusicResult<ChannelId> {
        let channel_id = Self::get_user_voice_channel(ctx, guild_id, user_id)?;

        if songbird.get(guild_id).is_none() {
            if let Err(err) = Self::join_channel(songbird, guild_id, channel_id).await {
                error!(
                    "Failed to join voice channel {} for guild {}: {}",
                    channel_id, guild_id, err
                );
                return Err(err);
            }
            info!("Joined voice channel {} in guild {}", channel_id, guild_id);
        }

        Ok(channel_id)
    }
}
