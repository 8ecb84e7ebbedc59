use super::*;
use chrono::Utc;
use poise::serenity_prelude::Mentionable;
use super::warnings::AUTO_KICK_THRESHOLD;

const DEFAULT_REASON: &str = "No reason given";

/// Warn a member and keep a record of it
#[poise::command(
    slash_command,
    guild_only,
    category = "Moderation",
    default_member_permissions = "KICK_MEMBERS"
)]
pub async fn warn(
    ctx: Context<'_>,
    #[description = "Member to warn"] member: serenity::User,
    #[description = "Reason for the warning"] reason: Option<String>,
) -> CommandResult {
    let guild_id = guild_id(&ctx)?;
    let reason = reason.unwrap_or_else(|| DEFAULT_REASON.to_string());

    let count = match ctx
        .data()
        .warnings
        .warn(
            guild_id.get(),
            member.id.get(),
            ctx.author().id.get(),
            &reason,
            Utc::now(),
        )
        .await
    {
        Ok(count) => count,
        Err(err) => {
            ctx.send(warning_error(&err)).await?;
            return Ok(());
        }
    };

    ctx.say(format!(
        "⚠️ {} has been warned. Reason: {}",
        member.mention(),
        reason
    ))
    .await?;

    if count >= AUTO_KICK_THRESHOLD {
        match guild_id
            .kick_with_reason(ctx.http(), member.id, "Too many warnings")
            .await
        {
            Ok(()) => {
                ctx.say(format!(
                    "🔨 {} was kicked automatically ({} warnings).",
                    member.mention(),
                    count
                ))
                .await?;
            }
            Err(e) => tracing::warn!(
                "Could not kick user {} from guild {} after {} warnings: {}",
                member.id, guild_id, count, e
            ),
        }
    }

    Ok(())
}

/// Show the warnings of a member
#[poise::command(slash_command, guild_only, category = "Moderation")]
pub async fn warnings(
    ctx: Context<'_>,
    #[description = "Member whose warnings to show"] member: Option<serenity::User>,
) -> CommandResult {
    let guild_id = guild_id(&ctx)?;
    let user = member.as_ref().unwrap_or_else(|| ctx.author());
    let history = ctx
        .data()
        .warnings
        .warnings(guild_id.get(), user.id.get())
        .await;

    if history.is_empty() {
        ctx.send(
            CreateReply::default()
                .content("✅ No warnings for this member.")
                .ephemeral(true),
        )
        .await?;
        return Ok(());
    }

    let mut embed = CreateEmbed::new()
        .title(format!("⚠️ Warnings of {}", user.name))
        .color(WARNING_COLOR);

    for (index, warning) in history.iter().enumerate() {
        let moderator = warning
            .moderator_id()
            .and_then(|id| ctx.cache().user(serenity::UserId::new(id)))
            .map(|moderator| moderator.name.clone())
            .unwrap_or_else(|| warning.moderator.clone());
        let when = warning
            .timestamp
            .map(|time| time.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default();
        embed = embed.field(
            format!("{}. By {} • {}", index + 1, moderator, when),
            warning.reason.clone(),
            false,
        );
    }

    ctx.send(CreateReply::default().embed(embed)).await?;

    Ok(())
}

/// Clear every warning of a member
#[poise::command(
    slash_command,
    guild_only,
    category = "Moderation",
    default_member_permissions = "KICK_MEMBERS"
)]
pub async fn clearwarnings(
    ctx: Context<'_>,
    #[description = "Member whose warnings to clear"] member: serenity::User,
) -> CommandResult {
    let guild_id = guild_id(&ctx)?;

    match ctx
        .data()
        .warnings
        .clear(guild_id.get(), member.id.get())
        .await
    {
        Ok(removed) => {
            let embed = CreateEmbed::new()
                .description(format!(
                    "✅ Cleared {} warnings of {}",
                    removed,
                    member.mention()
                ))
                .color(SUCCESS_COLOR);
            ctx.send(CreateReply::default().embed(embed)).await?;
        }
        Err(err) => {
            ctx.send(warning_error(&err)).await?;
        }
    }

    Ok(())
}
