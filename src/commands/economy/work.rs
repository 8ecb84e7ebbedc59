use super::*;
use chrono::Utc;
use ledger::{JOBS, WORK_SALARY};

/// Work a shift to earn some money
#[poise::command(slash_command, category = "Economy")]
pub async fn work(ctx: Context<'_>) -> CommandResult {
    let job = JOBS[rand::random_range(0..JOBS.len())];
    let salary = rand::random_range(WORK_SALARY);

    match ctx
        .data()
        .economy
        .work(ctx.author().id.get(), job, salary, Utc::now())
        .await
    {
        Ok(payout) => {
            let embed = CreateEmbed::new()
                .title("💼 Work")
                .field("Job", job, true)
                .field("Salary", format!("{} 💰", payout.amount), true)
                .field("New balance", format!("{} 💰", payout.balance), true)
                .color(SUCCESS_COLOR);
            ctx.send(CreateReply::default().embed(embed)).await?;
        }
        Err(err) => {
            ctx.send(economy_error(&err)).await?;
        }
    }

    Ok(())
}
