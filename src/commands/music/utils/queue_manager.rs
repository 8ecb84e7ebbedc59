use dashmap::DashMap;
use rand::seq::SliceRandom;
use serenity::model::id::GuildId;
use std::collections::VecDeque;
use std::sync::{Arc, Weak};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use super::audio_sink::{AudioSink, SinkFailure, TrackCompletion};
use super::music_manager::{InvalidOperation, MusicResult};
use crate::commands::music::audio_sources::TrackMetadata;

/// Playback status of a single guild
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    #[default]
    Idle,
    Playing,
    Paused,
}

/// Where an enqueued track ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueuePosition {
    /// Playback started with this track
    Started,
    /// 1-based position in the pending queue
    Queued(usize),
}

/// What a completion notification did to the guild
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    Playing(TrackMetadata),
    Idle,
    /// The notification belonged to a stream that was already superseded
    Discarded,
}

/// A skip as seen under the lock that performed it
#[derive(Debug, Clone, PartialEq)]
pub struct Skipped {
    pub skipped: TrackMetadata,
    /// `None` when the queue ran out and the guild went idle
    pub next: Option<TrackMetadata>,
}

/// Read-only view of a guild, taken under a single lock acquisition
#[derive(Debug, Clone, PartialEq)]
pub struct GuildSnapshot {
    pub status: PlaybackStatus,
    pub now_playing: Option<TrackMetadata>,
    pub queue: Vec<TrackMetadata>,
    pub repeat_enabled: bool,
}

/// Per-guild state. `now_playing` is set exactly when `status` is not `Idle`,
/// and an idle guild never has pending tracks.
#[derive(Debug, Default)]
struct GuildPlaybackState {
    pending: VecDeque<TrackMetadata>,
    repeat_enabled: bool,
    now_playing: Option<TrackMetadata>,
    status: PlaybackStatus,
    generation: u64,
}

impl GuildPlaybackState {
    /// Make `track` current and return the generation its stream belongs to.
    fn begin(&mut self, track: TrackMetadata) -> u64 {
        self.generation += 1;
        self.now_playing = Some(track);
        self.status = PlaybackStatus::Playing;
        self.generation
    }

    fn go_idle(&mut self) {
        self.generation += 1;
        self.now_playing = None;
        self.status = PlaybackStatus::Idle;
    }

    fn is_active(&self) -> bool {
        self.status != PlaybackStatus::Idle
    }
}

/// Owns every guild's queue and drives the play/pause/stop/skip state machine.
///
/// Each guild has its own lock; guilds never block each other. The registry
/// only grows: a guild's entry is created on first use and kept afterwards.
pub struct QueueManager {
    guilds: DashMap<GuildId, Arc<Mutex<GuildPlaybackState>>>,
    sink: Arc<dyn AudioSink>,
    this: Weak<QueueManager>,
}

impl QueueManager {
    /// Create a new queue manager streaming through `sink`
    pub fn new(sink: Arc<dyn AudioSink>) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            guilds: DashMap::new(),
            sink,
            this: this.clone(),
        })
    }

    fn guild(&self, guild_id: GuildId) -> Arc<Mutex<GuildPlaybackState>> {
        self.guilds.entry(guild_id).or_default().clone()
    }

    fn completion(&self, guild_id: GuildId, generation: u64) -> TrackCompletion {
        TrackCompletion::new(self.this.clone(), guild_id, generation)
    }

    /// Add a track for a guild. If nothing is playing it starts right away.
    ///
    /// The track must already be resolved. If the sink cannot start it, the
    /// error is returned and the guild is left untouched.
    pub async fn enqueue(
        &self,
        guild_id: GuildId,
        track: TrackMetadata,
    ) -> MusicResult<QueuePosition> {
        let state = self.guild(guild_id);
        let mut state = state.lock().await;

        if state.is_active() {
            info!("Queued '{}' for guild {}", track.title, guild_id);
            state.pending.push_back(track);
            return Ok(QueuePosition::Queued(state.pending.len()));
        }

        debug_assert!(state.pending.is_empty());
        let generation = state.begin(track.clone());
        let completion = self.completion(guild_id, generation);

        match self.sink.start_stream(guild_id, &track, completion).await {
            Ok(()) => {
                info!(
                    "Started '{}' for guild {} (generation {})",
                    track.title, guild_id, generation
                );
                Ok(QueuePosition::Started)
            }
            Err(err) => {
                error!(
                    "Failed to start '{}' for guild {}: {}",
                    track.title, guild_id, err
                );
                // Undo the transition; the generation stays bumped so nothing
                // from the failed attempt can act later.
                state.now_playing = None;
                state.status = PlaybackStatus::Idle;
                Err(err.into())
            }
        }
    }

    /// Start the next pending track, dropping any the sink refuses to start.
    /// Goes idle once the queue runs out. Caller holds the guild lock.
    async fn advance(
        &self,
        guild_id: GuildId,
        state: &mut GuildPlaybackState,
    ) -> Option<TrackMetadata> {
        while let Some(next) = state.pending.pop_front() {
            let generation = state.begin(next.clone());
            let completion = self.completion(guild_id, generation);

            match self.sink.start_stream(guild_id, &next, completion).await {
                Ok(()) => {
                    info!(
                        "Now playing '{}' in guild {} (generation {})",
                        next.title, guild_id, generation
                    );
                    return Some(next);
                }
                Err(err) => {
                    warn!(
                        "Skipping '{}' in guild {}, stream could not start: {}",
                        next.title, guild_id, err
                    );
                }
            }
        }

        info!("Queue finished for guild {}", guild_id);
        state.go_idle();
        None
    }

    /// Entered by the sink (through [`TrackCompletion`]) when a stream ends.
    ///
    /// Failures are logged and treated like a natural end. With repeat on, the
    /// finished track goes back to the front of the queue before advancing.
    pub(crate) async fn complete(
        &self,
        guild_id: GuildId,
        generation: u64,
        outcome: Option<SinkFailure>,
    ) -> Advance {
        let state = self.guild(guild_id);
        let mut state = state.lock().await;

        if state.generation != generation || !state.is_active() {
            debug!(
                "Discarding stale completion for guild {} (generation {}, current {})",
                guild_id, generation, state.generation
            );
            return Advance::Discarded;
        }

        if let Some(err) = outcome {
            error!("Player error in guild {}: {}", guild_id, err);
        }

        if state.repeat_enabled {
            if let Some(finished) = state.now_playing.take() {
                debug!("Repeating '{}' in guild {}", finished.title, guild_id);
                state.pending.push_front(finished);
            }
        }

        match self.advance(guild_id, &mut state).await {
            Some(track) => Advance::Playing(track),
            None => Advance::Idle,
        }
    }

    /// Skip the current track. Returns the track that is playing afterwards.
    ///
    /// The preempted stream's own completion arrives later under the old
    /// generation and is discarded, so the queue advances exactly once.
    pub async fn skip(&self, guild_id: GuildId) -> MusicResult<Skipped> {
        let state = self.guild(guild_id);
        let mut state = state.lock().await;

        let skipped = match (&state.now_playing, state.is_active()) {
            (Some(current), true) => current.clone(),
            _ => return Err(InvalidOperation::NothingPlaying.into()),
        };
        info!("Skipping '{}' in guild {}", skipped.title, guild_id);

        if let Err(err) = self.sink.stop_stream(guild_id).await {
            warn!("Failed to stop stream while skipping in guild {}: {}", guild_id, err);
        }

        let next = self.advance(guild_id, &mut state).await;
        Ok(Skipped { skipped, next })
    }

    /// Stop playback and clear the queue. Returns how many pending tracks were dropped.
    /// Does not leave the voice channel.
    pub async fn stop(&self, guild_id: GuildId) -> usize {
        let state = self.guild(guild_id);
        let mut state = state.lock().await;

        let dropped = state.pending.len();
        state.pending.clear();
        let was_active = state.is_active();
        state.go_idle();

        // The sink may still hold a stream the guild no longer tracks
        if was_active || self.sink.is_active(guild_id).await {
            if let Err(err) = self.sink.stop_stream(guild_id).await {
                warn!("Failed to stop stream in guild {}: {}", guild_id, err);
            }
        }

        info!(
            "Stopped playback in guild {} ({} queued tracks dropped)",
            guild_id, dropped
        );
        dropped
    }

    /// Pause the current track. Only valid while playing.
    pub async fn pause(&self, guild_id: GuildId) -> MusicResult<TrackMetadata> {
        let state = self.guild(guild_id);
        let mut state = state.lock().await;

        let current = match (state.status, &state.now_playing) {
            (PlaybackStatus::Playing, Some(track)) => track.clone(),
            _ => return Err(InvalidOperation::NothingPlaying.into()),
        };

        self.sink.pause(guild_id).await?;
        state.status = PlaybackStatus::Paused;
        info!("Paused '{}' in guild {}", current.title, guild_id);
        Ok(current)
    }

    /// Resume a paused track. Only valid while paused.
    pub async fn resume(&self, guild_id: GuildId) -> MusicResult<TrackMetadata> {
        let state = self.guild(guild_id);
        let mut state = state.lock().await;

        let current = match (state.status, &state.now_playing) {
            (PlaybackStatus::Paused, Some(track)) => track.clone(),
            _ => return Err(InvalidOperation::NotPaused.into()),
        };

        self.sink.resume(guild_id).await?;
        state.status = PlaybackStatus::Playing;
        info!("Resumed '{}' in guild {}", current.title, guild_id);
        Ok(current)
    }

    /// Set the repeat flag for a guild and return the new value
    pub async fn set_repeat(&self, guild_id: GuildId, enabled: bool) -> bool {
        let state = self.guild(guild_id);
        let mut state = state.lock().await;
        state.repeat_enabled = enabled;
        info!("Repeat for guild {}: {}", guild_id, enabled);
        enabled
    }

    /// Flip the repeat flag for a guild and return the new value
    pub async fn toggle_repeat(&self, guild_id: GuildId) -> bool {
        let state = self.guild(guild_id);
        let mut state = state.lock().await;
        state.repeat_enabled = !state.repeat_enabled;
        info!("Repeat for guild {}: {}", guild_id, state.repeat_enabled);
        state.repeat_enabled
    }

    pub async fn is_repeat_enabled(&self, guild_id: GuildId) -> bool {
        self.guild(guild_id).lock().await.repeat_enabled
    }

    /// Randomly reorder the pending queue. Returns its length.
    pub async fn shuffle(&self, guild_id: GuildId) -> usize {
        let state = self.guild(guild_id);
        let mut state = state.lock().await;

        if state.pending.len() > 1 {
            state.pending.make_contiguous().shuffle(&mut rand::rng());
            info!("Shuffled queue for guild {}", guild_id);
        }
        state.pending.len()
    }

    /// Remove the track at a 1-based position in the pending queue
    pub async fn remove_at(&self, guild_id: GuildId, index: usize) -> MusicResult<TrackMetadata> {
        let state = self.guild(guild_id);
        let mut state = state.lock().await;

        let len = state.pending.len();
        if index < 1 || index > len {
            return Err(InvalidOperation::IndexOutOfRange { index, len }.into());
        }

        let removed = state
            .pending
            .remove(index - 1)
            .ok_or(InvalidOperation::IndexOutOfRange { index, len })?;
        info!(
            "Removed '{}' from position {} in guild {}",
            removed.title, index, guild_id
        );
        Ok(removed)
    }

    /// Set the volume (0-200 percent) of the current and subsequent tracks
    pub async fn set_volume(&self, guild_id: GuildId, percent: u16) -> MusicResult<()> {
        if percent > 200 {
            return Err(InvalidOperation::VolumeOutOfRange(percent).into());
        }

        let state = self.guild(guild_id);
        let state = state.lock().await;
        if !state.is_active() {
            return Err(InvalidOperation::NothingPlaying.into());
        }

        self.sink
            .set_volume(guild_id, f32::from(percent) / 100.0)
            .await?;
        info!("Volume for guild {} set to {}%", guild_id, percent);
        Ok(())
    }

    /// Get the pending queue for a guild
    pub async fn peek_queue(&self, guild_id: GuildId) -> Vec<TrackMetadata> {
        let state = self.guild(guild_id);
        let state = state.lock().await;
        state.pending.iter().cloned().collect()
    }

    /// Get the current track for a guild
    pub async fn now_playing(&self, guild_id: GuildId) -> Option<TrackMetadata> {
        self.guild(guild_id).lock().await.now_playing.clone()
    }

    pub async fn status(&self, guild_id: GuildId) -> PlaybackStatus {
        self.guild(guild_id).lock().await.status
    }

    pub async fn snapshot(&self, guild_id: GuildId) -> GuildSnapshot {
        let state = self.guild(guild_id);
        let state = state.lock().await;
        GuildSnapshot {
            status: state.status,
            now_playing: state.now_playing.clone(),
            queue: state.pending.iter().cloned().collect(),
            repeat_enabled: state.repeat_enabled,
        }
    }
}
