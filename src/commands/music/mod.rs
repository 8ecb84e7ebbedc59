pub mod leave;
pub mod pause;
pub mod play;
pub mod queue;
pub mod remove;
pub mod repeat;
pub mod shuffle;
pub mod skip;
pub mod stop;
pub mod volume;

pub mod audio_sources;
pub mod utils;

use crate::{CommandResult, Context};
use poise::{serenity_prelude::GuildId, CreateReply};
use utils::{embedded_messages, music_manager::MusicError};

/// Music commands are guild-only
fn guild_id(ctx: &Context<'_>) -> Result<GuildId, MusicError> {
    ctx.guild_id().ok_or(MusicError::NotInGuild)
}
