use super::*;

/// Remove a track from the queue by its position
#[poise::command(slash_command, category = "Music")]
pub async fn remove(
    ctx: Context<'_>,
    #[description = "Position of the track to remove (1-based)"]
    #[min = 1]
    position: usize,
) -> CommandResult {
    let guild_id = guild_id(&ctx)?;

    match ctx.data().music.remove_at(guild_id, position).await {
        Ok(removed_track) => {
            ctx.send(embedded_messages::track_removed(&removed_track, position))
                .await?
        }
        Err(err) => ctx.send(embedded_messages::music_error(&err)).await?,
    };

    Ok(())
}
