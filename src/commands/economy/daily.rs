use super::*;
use chrono::Utc;
use ledger::DAILY_REWARD;

/// Claim your daily reward
#[poise::command(slash_command, category = "Economy")]
pub async fn daily(ctx: Context<'_>) -> CommandResult {
    let reward = rand::random_range(DAILY_REWARD);

    match ctx
        .data()
        .economy
        .claim_daily(ctx.author().id.get(), reward, Utc::now())
        .await
    {
        Ok(payout) => {
            let embed = CreateEmbed::new()
                .title("🎁 Daily reward!")
                .field("Received", format!("{} 💰", payout.amount), true)
                .field("New balance", format!("{} 💰", payout.balance), true)
                .color(GOLD_COLOR);
            ctx.send(CreateReply::default().embed(embed)).await?;
        }
        Err(err) => {
            ctx.send(economy_error(&err)).await?;
        }
    }

    Ok(())
}
