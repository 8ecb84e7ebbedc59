use super::*;

/// Pause the current track
#[poise::command(slash_command, category = "Music")]
pub async fn pause(ctx: Context<'_>) -> CommandResult {
    let guild_id = guild_id(&ctx)?;

    match ctx.data().music.pause(guild_id).await {
        Ok(track) => ctx.send(embedded_messages::paused(&track)).await?,
        Err(err) => ctx.send(embedded_messages::music_error(&err)).await?,
    };

    Ok(())
}

/// Resume the paused track
#[poise::command(slash_command, category = "Music")]
pub async fn resume(ctx: Context<'_>) -> CommandResult {
    let guild_id = guild_id(&ctx)?;

    match ctx.data().music.resume(guild_id).await {
        Ok(track) => ctx.send(embedded_messages::resumed(&track)).await?,
        Err(err) => ctx.send(embedded_messages::music_error(&err)).await?,
    };

    Ok(())
}
