use super::*;

/// Show a user's balance
#[poise::command(slash_command, category = "Economy")]
pub async fn balance(
    ctx: Context<'_>,
    #[description = "User whose balance to show"] member: Option<serenity::User>,
) -> CommandResult {
    let user = member.as_ref().unwrap_or_else(|| ctx.author());
    let balance = ctx.data().economy.balance(user.id.get()).await;

    let embed = CreateEmbed::new()
        .title(format!("💰 Balance of {}", user.name))
        .field("Balance", format!("{} 💰", balance), false)
        .color(GOLD_COLOR);

    ctx.send(CreateReply::default().embed(embed)).await?;

    Ok(())
}
