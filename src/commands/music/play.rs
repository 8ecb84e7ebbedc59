use super::*;
use crate::commands::music::{
    audio_sources::{AudioResolver, TrackMetadata},
    utils::{
        music_manager::{MusicManager, MusicResult},
        queue_manager::{QueueManager, QueuePosition},
    },
};
use tracing::{error, info};

/// Play a song from YouTube or a direct URL
#[poise::command(slash_command, category = "Music")]
pub async fn play(
    ctx: Context<'_>,
    #[description = "URL or search query"] query: String,
) -> CommandResult {
    info!("Received play command with query: {}", query);
    let guild_id = guild_id(&ctx)?;
    let data = ctx.data();

    // Join the caller's channel if we're not connected yet
    if let Err(err) = MusicManager::confirm_voice_connection(
        ctx.serenity_context(),
        &data.songbird,
        guild_id,
        ctx.author().id,
    )
    .await
    {
        ctx.send(embedded_messages::music_error(&err)).await?;
        return Ok(());
    }

    // Resolution shells out to yt-dlp and can take a while
    ctx.defer().await?;

    let requested_by = ctx.author().name.clone();
    match queue_request(&data.music, data.resolver.as_ref(), guild_id, &query, requested_by).await
    {
        Ok((track, QueuePosition::Started)) => {
            ctx.send(CreateReply::default().embed(embedded_messages::now_playing(&track)))
                .await?;
        }
        Ok((track, QueuePosition::Queued(position))) => {
            ctx.send(
                CreateReply::default().embed(embedded_messages::added_to_queue(&track, position)),
            )
            .await?;
        }
        Err(err) => {
            error!("Failed to play '{}' in guild {}: {}", query, guild_id, err);
            ctx.send(embedded_messages::music_error(&err)).await?;
        }
    }

    Ok(())
}

/// Resolve `query` and hand the track to the queue manager.
/// The resolver runs before any guild lock is taken.
pub async fn queue_request(
    music: &QueueManager,
    resolver: &dyn AudioResolver,
    guild_id: GuildId,
    query: &str,
    requested_by: String,
) -> MusicResult<(TrackMetadata, QueuePosition)> {
    let track = resolver.resolve(query, requested_by).await?;
    let position = music.enqueue(guild_id, track.clone()).await?;
    Ok((track, position))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::music::audio_sources::{MockAudioResolver, ResolutionFailure};
    use crate::commands::music::utils::music_manager::MusicError;
    use crate::commands::music::utils::queue_manager::PlaybackStatus;
    use crate::commands::music::utils::test_support::{track, RecordingSink};
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    const GUILD: GuildId = GuildId::new(7);

    fn resolver_for(title: &'static str) -> MockAudioResolver {
        let mut resolver = MockAudioResolver::new();
        resolver
            .expect_resolve()
            .returning(move |_, requested_by| Ok(track(title).with_requester(requested_by)));
        resolver
    }

    #[tokio::test]
    async fn test_first_request_starts_playback() {
        let sink = Arc::new(RecordingSink::default());
        let music = QueueManager::new(sink.clone());
        let resolver = resolver_for("intro");

        let (track, position) = queue_request(&music, &resolver, GUILD, "intro", "alice".into())
            .await
            .unwrap();

        assert_eq!(position, QueuePosition::Started);
        assert_eq!(track.requested_by.as_deref(), Some("alice"));
        assert_eq!(sink.started_titles(), vec!["intro".to_string()]);
    }

    #[tokio::test]
    async fn test_second_request_is_queued() {
        let sink = Arc::new(RecordingSink::default());
        let music = QueueManager::new(sink.clone());
        let resolver = resolver_for("song");

        queue_request(&music, &resolver, GUILD, "song", "alice".into())
            .await
            .unwrap();
        let (_, position) = queue_request(&music, &resolver, GUILD, "song", "bob".into())
            .await
            .unwrap();

        assert_eq!(position, QueuePosition::Queued(1));
        assert_eq!(sink.started_titles().len(), 1);
    }

    #[tokio::test]
    async fn test_resolution_failure_leaves_guild_idle() {
        let sink = Arc::new(RecordingSink::default());
        let music = QueueManager::new(sink.clone());
        let mut resolver = MockAudioResolver::new();
        resolver
            .expect_resolve()
            .withf(|query, _| query.contains("missing"))
            .times(1)
            .returning(|_, _| Err(ResolutionFailure::NotFound));

        let result = queue_request(&music, &resolver, GUILD, "missing", "alice".into()).await;

        assert_matches!(
            result,
            Err(MusicError::Resolution(ResolutionFailure::NotFound))
        );
        assert_eq!(music.status(GUILD).await, PlaybackStatus::Idle);
        assert!(sink.calls().is_empty());
    }
}
