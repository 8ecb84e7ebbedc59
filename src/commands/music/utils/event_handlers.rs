use dashmap::DashMap;
use poise::serenity_prelude as serenity;
use serenity::async_trait;
use serenity::model::id::GuildId;
use songbird::tracks::{PlayMode, TrackHandle};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::audio_sink::{SinkFailure, TrackCompletion};

/// Event handler for when a song ends or errors out.
///
/// Registered for both `TrackEvent::End` and `TrackEvent::Error`; whichever
/// fires first delivers the completion, the other finds it already taken.
pub struct SongEndNotifier {
    pub guild_id: GuildId,
    pub track_handle: TrackHandle,
    pub current_handles: Arc<DashMap<GuildId, TrackHandle>>,
    pub completion: Mutex<Option<TrackCompletion>>,
}

impl SongEndNotifier {
    pub fn new(
        guild_id: GuildId,
        track_handle: TrackHandle,
        current_handles: Arc<DashMap<GuildId, TrackHandle>>,
        completion: TrackCompletion,
    ) -> Self {
        Self {
            guild_id,
            track_handle,
            current_handles,
            completion: Mutex::new(Some(completion)),
        }
    }

    async fn handle_track_end(&self, outcome: Option<SinkFailure>) {
        let Some(completion) = self.completion.lock().await.take() else {
            return;
        };

        // Forget the handle unless a newer track already replaced it
        self.current_handles
            .remove_if(&self.guild_id, |_, handle| {
                handle.uuid() == self.track_handle.uuid()
            });

        info!(
            "Track ended for guild {} (generation {})",
            self.guild_id,
            completion.generation()
        );
        let advance = completion.notify(outcome).await;
        debug!("Track end in guild {} resulted in {:?}", self.guild_id, advance);
    }
}

#[async_trait]
impl songbird::EventHandler for SongEndNotifier {
    async fn act(&self, ctx: &songbird::EventContext<'_>) -> Option<songbird::Event> {
        if let songbird::EventContext::Track(tracks) = ctx {
            let outcome = tracks.first().and_then(|(state, _)| match &state.playing {
                PlayMode::Errored(err) => Some(SinkFailure::Playback(format!("{:?}", err))),
                _ => None,
            });
            self.handle_track_end(outcome).await;
        }
        None
    }
}
