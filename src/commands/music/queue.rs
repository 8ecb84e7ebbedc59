use super::*;

/// View the current music queue
#[poise::command(slash_command, category = "Music")]
pub async fn queue(ctx: Context<'_>) -> CommandResult {
    let guild_id = guild_id(&ctx)?;

    let snapshot = ctx.data().music.snapshot(guild_id).await;
    ctx.send(embedded_messages::music_queue(&snapshot)).await?;

    Ok(())
}

/// Show the track that is playing right now
#[poise::command(slash_command, category = "Music")]
pub async fn nowplaying(ctx: Context<'_>) -> CommandResult {
    let guild_id = guild_id(&ctx)?;

    match ctx.data().music.now_playing(guild_id).await {
        Some(track) => {
            ctx.send(CreateReply::default().embed(embedded_messages::now_playing(&track)))
                .await?
        }
        None => ctx.send(embedded_messages::no_track_playing()).await?,
    };

    Ok(())
}
