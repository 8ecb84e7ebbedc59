use super::*;

/// Repeat the current track, or toggle repeat when no value is given
#[poise::command(slash_command, category = "Music")]
pub async fn repeat(
    ctx: Context<'_>,
    #[description = "Turn repeat on or off"] enabled: Option<bool>,
) -> CommandResult {
    let guild_id = guild_id(&ctx)?;
    let music = &ctx.data().music;

    let enabled = match enabled {
        Some(enabled) => music.set_repeat(guild_id, enabled).await,
        None => music.toggle_repeat(guild_id).await,
    };
    ctx.send(embedded_messages::repeat_status(enabled)).await?;

    Ok(())
}
