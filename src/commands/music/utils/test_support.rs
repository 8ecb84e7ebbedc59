//! In-memory sink used by the music unit tests.

use serenity::async_trait;
use serenity::model::id::GuildId;
use std::collections::HashSet;
use std::sync::Mutex;

use super::audio_sink::{AudioSink, SinkFailure, TrackCompletion};
use super::queue_manager::Advance;
use crate::commands::music::audio_sources::TrackMetadata;

pub fn track(title: &str) -> TrackMetadata {
    TrackMetadata::new(title, format!("https://youtu.be/{}", title))
}

#[derive(Debug, Clone, PartialEq)]
pub enum SinkCall {
    Start(String),
    Pause,
    Resume,
    Stop,
    Volume(f32),
}

/// Records every instruction and keeps the completion handles so tests can
/// decide when (and whether) a stream "ends".
#[derive(Default)]
pub struct RecordingSink {
    calls: Mutex<Vec<SinkCall>>,
    completions: Mutex<Vec<Option<TrackCompletion>>>,
    failing_titles: Mutex<HashSet<String>>,
    fail_controls: Mutex<bool>,
}

impl RecordingSink {
    pub fn calls(&self) -> Vec<SinkCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn started_titles(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SinkCall::Start(title) => Some(title),
                _ => None,
            })
            .collect()
    }

    pub fn fail_starts_for(&self, title: &str) {
        self.failing_titles.lock().unwrap().insert(title.to_string());
    }

    pub fn fail_controls(&self, fail: bool) {
        *self.fail_controls.lock().unwrap() = fail;
    }

    /// Take the completion handed over by the `index`-th successful start.
    pub fn take_completion(&self, index: usize) -> TrackCompletion {
        self.completions.lock().unwrap()[index]
            .take()
            .expect("completion already delivered")
    }

    /// End the most recently started stream.
    pub async fn finish_latest(&self, outcome: Option<SinkFailure>) -> Advance {
        let completion = {
            let mut completions = self.completions.lock().unwrap();
            completions
                .iter_mut()
                .rev()
                .find_map(Option::take)
                .expect("no stream in flight")
        };
        completion.notify(outcome).await
    }

    fn control(&self, call: SinkCall) -> Result<(), SinkFailure> {
        if *self.fail_controls.lock().unwrap() {
            return Err(SinkFailure::Control("track handle gone".into()));
        }
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

#[async_trait]
impl AudioSink for RecordingSink {
    async fn start_stream(
        &self,
        _guild_id: GuildId,
        track: &TrackMetadata,
        on_complete: TrackCompletion,
    ) -> Result<(), SinkFailure> {
        if self.failing_titles.lock().unwrap().contains(&track.title) {
            return Err(SinkFailure::Stream(format!("cannot open {}", track.url)));
        }
        self.calls
            .lock()
            .unwrap()
            .push(SinkCall::Start(track.title.clone()));
        self.completions.lock().unwrap().push(Some(on_complete));
        Ok(())
    }

    async fn pause(&self, _guild_id: GuildId) -> Result<(), SinkFailure> {
        self.control(SinkCall::Pause)
    }

    async fn resume(&self, _guild_id: GuildId) -> Result<(), SinkFailure> {
        self.control(SinkCall::Resume)
    }

    async fn stop_stream(&self, _guild_id: GuildId) -> Result<(), SinkFailure> {
        self.control(SinkCall::Stop)
    }

    async fn is_active(&self, _guild_id: GuildId) -> bool {
        self.completions.lock().unwrap().iter().any(Option::is_some)
    }

    async fn set_volume(&self, _guild_id: GuildId, volume: f32) -> Result<(), SinkFailure> {
        self.control(SinkCall::Volume(volume))
    }
}
