use super::*;

/// Shuffle the upcoming tracks
#[poise::command(slash_command, category = "Music")]
pub async fn shuffle(ctx: Context<'_>) -> CommandResult {
    let guild_id = guild_id(&ctx)?;

    let queue_length = ctx.data().music.shuffle(guild_id).await;
    ctx.send(embedded_messages::shuffled(queue_length)).await?;

    Ok(())
}
