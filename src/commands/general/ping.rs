use poise::{serenity_prelude as serenity, CreateReply};
use ::serenity::all::CreateEmbed;
use std::time::{Duration, Instant};

use crate::{CommandResult, Context};

/// Ping the bot to check its latency
#[poise::command(slash_command, category = "General")]
pub async fn ping(ctx: Context<'_>) -> CommandResult {
    let started = Instant::now();
    let reply = ctx
        .send(CreateReply::default().content("🏓 Pinging..."))
        .await?;
    let round_trip = started.elapsed().as_millis();

    let gateway = match get_shard_latency(&ctx).await {
        Some(latency) => format!("{} ms", latency.as_millis()),
        None => "not measured yet".to_string(),
    };

    let embed = CreateEmbed::new()
        .title("Pong!")
        .field("Gateway latency", gateway, true)
        .field("Round trip", format!("{} ms", round_trip), true)
        .color(0x00ff00);

    reply
        .edit(ctx, CreateReply::default().content("").embed(embed))
        .await?;

    Ok(())
}

async fn get_shard_latency(ctx: &Context<'_>) -> Option<Duration> {
    let shard_manager = ctx.framework().shard_manager();
    let runners = shard_manager.runners.lock().await;

    // Each shard runner tracks the heartbeat latency of its own connection
    let runner = runners.get(&serenity::ShardId(ctx.serenity_context().shard_id.0))?;

    runner.latency
}
