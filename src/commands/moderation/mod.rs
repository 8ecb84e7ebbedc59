pub mod warn;

pub mod warnings;

use crate::{CommandResult, Context};
use ::serenity::all::CreateEmbed;
use poise::{serenity_prelude as serenity, CreateReply};
use tracing::error;
use warnings::WarningError;

const WARNING_COLOR: u32 = 0xffd700;
const SUCCESS_COLOR: u32 = 0x00ff00;
const ERROR_COLOR: u32 = 0xff0000;

fn warning_error(err: &WarningError) -> CreateReply {
    if let WarningError::Storage(source) = err {
        error!("Warning storage failure: {}", source);
    }

    CreateReply::default()
        .embed(
            CreateEmbed::new()
                .title("❌ Error")
                .description(err.to_string())
                .color(ERROR_COLOR),
        )
        .ephemeral(true)
}

fn guild_id(ctx: &Context<'_>) -> Result<serenity::GuildId, &'static str> {
    ctx.guild_id().ok_or("This command only works in a server")
}
