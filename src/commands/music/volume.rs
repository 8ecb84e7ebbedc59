use super::*;

/// Set the playback volume
#[poise::command(slash_command, category = "Music")]
pub async fn volume(
    ctx: Context<'_>,
    #[description = "Volume in percent (0-200)"]
    #[min = 0]
    #[max = 200]
    percent: u16,
) -> CommandResult {
    let guild_id = guild_id(&ctx)?;

    match ctx.data().music.set_volume(guild_id, percent).await {
        Ok(()) => ctx.send(embedded_messages::volume_set(percent)).await?,
        Err(err) => ctx.send(embedded_messages::music_error(&err)).await?,
    };

    Ok(())
}
