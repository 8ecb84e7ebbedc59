use super::*;

const LEADERBOARD_SIZE: usize = 10;

/// Show the richest users
#[poise::command(slash_command, category = "Economy")]
pub async fn leaderboard(ctx: Context<'_>) -> CommandResult {
    let ranking = ctx.data().economy.leaderboard(LEADERBOARD_SIZE).await;

    let mut embed = CreateEmbed::new()
        .title("🏆 Leaderboard")
        .color(GOLD_COLOR);

    if ranking.is_empty() {
        embed = embed.description("Nobody has any money yet");
    }

    for (rank, (user_id, balance)) in ranking.into_iter().enumerate() {
        let name = ctx
            .cache()
            .user(serenity::UserId::new(user_id))
            .map(|user| user.name.clone())
            .unwrap_or_else(|| format!("User {}", user_id));
        embed = embed.field(
            format!("{}. {}", rank + 1, name),
            format!("{} 💰", balance),
            false,
        );
    }

    ctx.send(CreateReply::default().embed(embed)).await?;

    Ok(())
}
