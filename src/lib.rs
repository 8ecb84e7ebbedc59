//! maestro: a Discord bot with per-guild music queues and a small economy.

pub mod commands;
pub mod config;
pub mod utils;

use std::sync::Arc;

use commands::economy::ledger::Economy;
use commands::moderation::warnings::WarningLedger;
use config::BotConfig;

#[cfg(feature = "music")]
use commands::music::{audio_sources::AudioResolver, utils::queue_manager::QueueManager};

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
pub type CommandResult = Result<(), Error>;

/// User data, stored and accessible in all command invocations
pub struct Data {
    pub config: BotConfig,
    pub economy: Arc<Economy>,
    pub warnings: Arc<WarningLedger>,
    #[cfg(feature = "music")]
    pub songbird: Arc<songbird::Songbird>,
    #[cfg(feature = "music")]
    pub music: Arc<QueueManager>,
    #[cfg(feature = "music")]
    pub resolver: Arc<dyn AudioResolver>,
}
