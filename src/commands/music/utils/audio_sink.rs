//! The audio sink is whatever actually transmits a track into a guild's voice call.
//! The queue manager only talks to it through [`AudioSink`], which keeps the
//! playback state machine testable without a gateway connection.

use serenity::async_trait;
use serenity::model::id::GuildId;
use std::sync::Weak;
use thiserror::Error;

use super::queue_manager::{Advance, QueueManager};
use crate::commands::music::audio_sources::TrackMetadata;

/// Failures reported by the sink, either when asked to do something or when a
/// stream dies during playback.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SinkFailure {
    #[error("Not connected to a voice channel")]
    NotConnected,

    #[error("Failed to create audio stream: {0}")]
    Stream(String),

    #[error("Playback failed: {0}")]
    Playback(String),

    #[error("Failed to control track: {0}")]
    Control(String),
}

/// One-shot handle the sink invokes when the stream it was given ends.
///
/// It carries the generation the stream was started under; the manager ignores
/// the notification if the guild has moved on since.
pub struct TrackCompletion {
    manager: Weak<QueueManager>,
    guild_id: GuildId,
    generation: u64,
}

impl TrackCompletion {
    pub(super) fn new(manager: Weak<QueueManager>, guild_id: GuildId, generation: u64) -> Self {
        Self {
            manager,
            guild_id,
            generation,
        }
    }

    pub fn guild_id(&self) -> GuildId {
        self.guild_id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Report that the stream ended, with the failure if it ended because of one.
    pub async fn notify(self, outcome: Option<SinkFailure>) -> Advance {
        match self.manager.upgrade() {
            Some(manager) => {
                manager
                    .complete(self.guild_id, self.generation, outcome)
                    .await
            }
            None => Advance::Discarded,
        }
    }
}

impl std::fmt::Debug for TrackCompletion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackCompletion")
            .field("guild_id", &self.guild_id)
            .field("generation", &self.generation)
            .finish()
    }
}

#[async_trait]
pub trait AudioSink: Send + Sync {
    /// Begin streaming `track`, replacing anything already playing in the guild.
    /// `on_complete` must be notified exactly once when the stream ends.
    async fn start_stream(
        &self,
        guild_id: GuildId,
        track: &TrackMetadata,
        on_complete: TrackCompletion,
    ) -> Result<(), SinkFailure>;

    async fn pause(&self, guild_id: GuildId) -> Result<(), SinkFailure>;

    async fn resume(&self, guild_id: GuildId) -> Result<(), SinkFailure>;

    async fn stop_stream(&self, guild_id: GuildId) -> Result<(), SinkFailure>;

    async fn is_active(&self, guild_id: GuildId) -> bool;

    /// Set the playback volume, where `1.0` is unity gain.
    async fn set_volume(&self, guild_id: GuildId, volume: f32) -> Result<(), SinkFailure>;
}
