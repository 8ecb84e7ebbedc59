//! Mock implementations for external dependencies

use async_trait::async_trait;
use maestro::commands::music::audio_sources::TrackMetadata;
use maestro::commands::music::utils::audio_sink::{AudioSink, SinkFailure, TrackCompletion};
use mockall::mock;
use serenity::model::id::GuildId;
use std::sync::{Arc, Mutex};

mock! {
    pub Sink {}

    #[async_trait]
    impl AudioSink for Sink {
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
        async fn set_volume(&self, guild_id: GuildId, volume: f32) -> Result<(), SinkFailure>;
    }
}

/// Completions handed to the mock sink, in start order
pub type Completions = Arc<Mutex<Vec<TrackCompletion>>>;

/// A sink that accepts every start and keeps the completion handles.
/// Control calls succeed; expectations for them can be added by the caller.
pub fn capturing_sink() -> (MockSink, Completions) {
    let completions: Completions = Arc::default();
    let mut sink = MockSink::new();

    let captured = completions.clone();
    sink.expect_start_stream()
        .returning(move |_, _, on_complete| {
            captured.lock().unwrap().push(on_complete);
            Ok(())
        });
    sink.expect_stop_stream().returning(|_| Ok(()));
    sink.expect_pause().returning(|_| Ok(()));
    sink.expect_resume().returning(|_| Ok(()));
    sink.expect_is_active().returning(|_| false);

    (sink, completions)
}

/// Remove the oldest undelivered completion
pub fn take_first(completions: &Completions) -> TrackCompletion {
    completions.lock().unwrap().remove(0)
}

/// Remove the most recent completion
pub fn take_last(completions: &Completions) -> TrackCompletion {
    completions
        .lock()
        .unwrap()
        .pop()
        .expect("no stream was started")
}
