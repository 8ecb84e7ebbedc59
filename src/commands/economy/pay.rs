use super::*;
use chrono::Utc;
use poise::serenity_prelude::Mentionable;

/// Send money to another user
#[poise::command(slash_command, category = "Economy")]
pub async fn pay(
    ctx: Context<'_>,
    #[description = "User to send money to"] member: serenity::User,
    #[description = "Amount to send"]
    #[min = 1]
    #[max = 10000]
    amount: i64,
) -> CommandResult {
    let sender = ctx.author();

    match ctx
        .data()
        .economy
        .pay(sender.id.get(), member.id.get(), amount, Utc::now())
        .await
    {
        Ok(balance) => {
            let embed = CreateEmbed::new()
                .title("💸 Transfer")
                .field("From", sender.mention().to_string(), true)
                .field("To", member.mention().to_string(), true)
                .field("Amount", format!("{} 💰", amount), true)
                .field("Your balance", format!("{} 💰", balance), false)
                .color(SUCCESS_COLOR);
            ctx.send(CreateReply::default().embed(embed)).await?;
        }
        Err(err) => {
            ctx.send(economy_error(&err)).await?;
        }
    }

    Ok(())
}
