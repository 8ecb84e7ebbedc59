//! This module aggregates all the command modules for the bot.

/// Balance, rewards and transfers backed by the JSON store.
pub mod economy;
/// General purpose commands (e.g., ping, help).
pub mod general;
/// Member warnings backed by the JSON store.
pub mod moderation;

/// Commands related to music playback (requires the `music` feature).
#[cfg(feature = "music")]
pub mod music;

use tracing::error;

use crate::{Data, Error};

/// Framework-wide error hook. Command errors are logged and reported back to
/// the invoking user; everything else goes to poise's default handler.
pub async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!(
                "Command '{}' failed for {}: {}",
                ctx.command().qualified_name,
                ctx.author().name,
                error
            );
            let reply = poise::CreateReply::default()
                .content(format!("❌ Something went wrong: {}", error))
                .ephemeral(true);
            if let Err(e) = ctx.send(reply).await {
                error!("Failed to report command error: {}", e);
            }
        }
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}
