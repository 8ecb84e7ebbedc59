use super::*;

/// Stop the music and clear the queue
#[poise::command(slash_command, category = "Music")]
pub async fn stop(ctx: Context<'_>) -> CommandResult {
    let guild_id = guild_id(&ctx)?;

    let dropped = ctx.data().music.stop(guild_id).await;
    ctx.send(embedded_messages::stopped(dropped)).await?;

    Ok(())
}
