use super::*;
use tracing::info;

/// Skip the currently playing song
#[poise::command(slash_command, category = "Music")]
pub async fn skip(ctx: Context<'_>) -> CommandResult {
    let guild_id = guild_id(&ctx)?;

    match ctx.data().music.skip(guild_id).await {
        Ok(skip) => {
            info!(
                "Skip in guild {} moved on to {:?}",
                guild_id,
                skip.next.as_ref().map(|t| &t.title)
            );
            ctx.send(embedded_messages::skipped(&skip)).await?;
        }
        Err(err) => {
            ctx.send(embedded_messages::music_error(&err)).await?;
        }
    }

    Ok(())
}
