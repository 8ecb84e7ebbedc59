use dashmap::DashMap;
use serenity::async_trait;
use serenity::model::id::GuildId;
use songbird::input::{Input, YoutubeDl};
use songbird::tracks::{PlayMode, Track, TrackHandle};
use songbird::{Event, Songbird, TrackEvent};
use std::path::PathBuf;
use std::sync::Arc;
use std::fmt::Display;
use tracing::{debug, info, warn};

use super::audio_sink::{AudioSink, SinkFailure, TrackCompletion};
use super::event_handlers::SongEndNotifier;
use crate::commands::music::audio_sources::TrackMetadata;

/// Volume new guilds start at (half gain)
pub const DEFAULT_VOLUME: f32 = 0.5;

/// Streams tracks into a guild's voice call through Songbird.
/// Assumes the bot already joined the call; a missing call is `NotConnected`.
pub struct SongbirdSink {
    songbird: Arc<Songbird>,
    http_client: reqwest::Client,
    cookie_file: Option<PathBuf>,
    current_handles: Arc<DashMap<GuildId, TrackHandle>>,
    volumes: DashMap<GuildId, f32>,
}

impl SongbirdSink {
    pub fn new(
        songbird: Arc<Songbird>,
        http_client: reqwest::Client,
        cookie_file: Option<PathBuf>,
    ) -> Self {
        Self {
            songbird,
            http_client,
            cookie_file,
            current_handles: Arc::new(DashMap::new()),
            volumes: DashMap::new(),
        }
    }

    fn volume_for(&self, guild_id: GuildId) -> f32 {
        self.volumes
            .get(&guild_id)
            .map(|v| *v)
            .unwrap_or(DEFAULT_VOLUME)
    }

    fn current_handle(&self, guild_id: GuildId) -> Result<TrackHandle, SinkFailure> {
        self.current_handles
            .get(&guild_id)
            .map(|handle| handle.clone())
            .ok_or(SinkFailure::NotConnected)
    }

    /// Rebuild a lazily-extracted input from the track's locator.
    fn create_input(&self, track: &TrackMetadata) -> Input {
        let source = YoutubeDl::new(self.http_client.clone(), track.url.clone());
        match &self.cookie_file {
            Some(cookie_file) => source
                .user_args(vec![
                    "--cookies".to_string(),
                    cookie_file.to_string_lossy().into_owned(),
                ])
                .into(),
            None => source.into(),
        }
    }
}

fn control_error(err: impl Display) -> SinkFailure {
    SinkFailure::Control(err.to_string())
}

/// Map a failed event registration to `SinkFailure::Stream`, stopping the
/// already playing track first so nothing keeps streaming untracked.
fn abandon_on_error<E: Display, S: Display>(
    registered: Result<(), E>,
    stop: impl FnOnce() -> Result<(), S>,
) -> Result<(), SinkFailure> {
    let Err(err) = registered else {
        return Ok(());
    };
    if let Err(stop_err) = stop() {
        warn!("Failed to stop untracked stream: {}", stop_err);
    }
    Err(SinkFailure::Stream(err.to_string()))
}

#[async_trait]
impl AudioSink for SongbirdSink {
    async fn start_stream(
        &self,
        guild_id: GuildId,
        track: &TrackMetadata,
        on_complete: TrackCompletion,
    ) -> Result<(), SinkFailure> {
        let call = self
            .songbird
            .get(guild_id)
            .ok_or(SinkFailure::NotConnected)?;

        let input = self.create_input(track);
        let volume = self.volume_for(guild_id);

        let track_handle = {
            let mut handler = call.lock().await;
            // play_only keeps a single active stream per guild
            handler.play_only(Track::from(input).volume(volume))
        };
        debug!("Track handle created for: {}", track.title);

        let notifier = SongEndNotifier::new(
            guild_id,
            track_handle.clone(),
            self.current_handles.clone(),
            on_complete,
        );
        let notifier = Arc::new(notifier);

        let registered = track_handle
            .add_event(Event::Track(TrackEvent::End), ArcNotifier(notifier.clone()))
            .and_then(|()| {
                track_handle.add_event(Event::Track(TrackEvent::Error), ArcNotifier(notifier))
            });
        // play_only already started the track, so it must not outlive the error
        abandon_on_error(registered, || track_handle.stop())?;

        self.current_handles.insert(guild_id, track_handle);
        info!("Streaming '{}' in guild {}", track.title, guild_id);
        Ok(())
    }

    async fn pause(&self, guild_id: GuildId) -> Result<(), SinkFailure> {
        self.current_handle(guild_id)?.pause().map_err(control_error)
    }

    async fn resume(&self, guild_id: GuildId) -> Result<(), SinkFailure> {
        self.current_handle(guild_id)?.play().map_err(control_error)
    }

    async fn stop_stream(&self, guild_id: GuildId) -> Result<(), SinkFailure> {
        match self.current_handles.remove(&guild_id) {
            Some((_, handle)) => handle.stop().map_err(control_error),
            None => Ok(()),
        }
    }

    async fn is_active(&self, guild_id: GuildId) -> bool {
        let Ok(handle) = self.current_handle(guild_id) else {
            return false;
        };
        match handle.get_info().await {
            Ok(state) => matches!(state.playing, PlayMode::Play | PlayMode::Pause),
            Err(_) => false,
        }
    }

    async fn set_volume(&self, guild_id: GuildId, volume: f32) -> Result<(), SinkFailure> {
        self.volumes.insert(guild_id, volume);
        match self.current_handles.get(&guild_id) {
            Some(handle) => handle.set_volume(volume).map_err(control_error),
            None => Ok(()),
        }
    }
}

/// Lets the End and Error events share one notifier so the completion fires once.
struct ArcNotifier(Arc<SongEndNotifier>);

#[async_trait]
impl songbird::EventHandler for ArcNotifier {
    async fn act(&self, ctx: &songbird::EventContext<'_>) -> Option<Event> {
        songbird::EventHandler::act(self.0.as_ref(), ctx).await
    }
}
