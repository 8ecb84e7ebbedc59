pub mod balance;
pub mod daily;
pub mod leaderboard;
pub mod pay;
pub mod statement;
pub mod work;

pub mod ledger;

use crate::{CommandResult, Context};
use ledger::EconomyError;
use poise::{serenity_prelude as serenity, CreateReply};
use ::serenity::all::CreateEmbed;
use tracing::error;

const GOLD_COLOR: u32 = 0xffd700;
const SUCCESS_COLOR: u32 = 0x00ff00;
const ERROR_COLOR: u32 = 0xff0000;

/// Reply for a rejected economy request. Storage failures are logged since
/// the user can't do anything about them.
fn economy_error(err: &EconomyError) -> CreateReply {
    if let EconomyError::Storage(source) = err {
        error!("Economy storage failure: {}", source);
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
