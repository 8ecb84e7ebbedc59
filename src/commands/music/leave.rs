use super::*;
use crate::commands::music::utils::music_manager::MusicManager;

/// Stop playback and leave the voice channel
#[poise::command(slash_command, category = "Music")]
pub async fn leave(ctx: Context<'_>) -> CommandResult {
    let guild_id = guild_id(&ctx)?;
    let data = ctx.data();

    // Clear the queue first so nothing advances into the closed call
    data.music.stop(guild_id).await;

    match MusicManager::leave_channel(&data.songbird, guild_id).await {
        Ok(()) => {
            ctx.send(embedded_messages::left_voice_channel()).await?;
        }
        Err(err) => {
            ctx.send(embedded_messages::music_error(&err)).await?;
        }
    }

    Ok(())
}
