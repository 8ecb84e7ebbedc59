use super::*;

const STATEMENT_SIZE: usize = 10;

/// Show a user's most recent transactions
#[poise::command(slash_command, category = "Economy")]
pub async fn statement(
    ctx: Context<'_>,
    #[description = "User whose transactions to show"] member: Option<serenity::User>,
) -> CommandResult {
    let user = member.as_ref().unwrap_or_else(|| ctx.author());
    let transactions = ctx
        .data()
        .economy
        .statement(user.id.get(), STATEMENT_SIZE)
        .await;

    if transactions.is_empty() {
        ctx.send(
            CreateReply::default()
                .content("📄 No recent transactions.")
                .ephemeral(true),
        )
        .await?;
        return Ok(());
    }

    let lines: Vec<String> = transactions
        .iter()
        .map(|t| {
            format!(
                "[{}] {} {:+} {}",
                t.time.format("%Y-%m-%d %H:%M:%S"),
                t.kind,
                t.amount,
                t.note
            )
        })
        .collect();

    let embed = CreateEmbed::new()
        .title(format!("📄 History of {}", user.name))
        .description(lines.join("\n"))
        .color(SUCCESS_COLOR);

    ctx.send(CreateReply::default().embed(embed).ephemeral(true))
        .await?;

    Ok(())
}
