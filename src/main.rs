use ::serenity::all::ClientBuilder;
use dotenv::dotenv;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use maestro::{
    commands::{
        economy::{
            balance::*, daily::*, leaderboard::*, ledger::Economy, pay::*, statement::*, work::*,
        },
        general::{help::*, ping::*},
        moderation::{warn::*, warnings::WarningLedger},
        on_error,
    },
    config::BotConfig,
    utils::storage::JsonFileStore,
    Data, Error,
};

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenv().ok();

    // Initialize logging with debug level for our crate
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("maestro=debug,warn")),
        )
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .with_target(true)
        .with_ansi(true)
        .pretty()
        .init();

    let config = BotConfig::from_env()?;
    info!("Using data directory {:?}", config.data_dir);

    let store = Arc::new(JsonFileStore::new(config.data_dir.clone()));
    let economy = Arc::new(Economy::load(store.clone()).await?);
    let warning_ledger = Arc::new(WarningLedger::load(store).await?);

    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILD_VOICE_STATES;

    // Create a vector to hold our commands
    let mut commands = vec![
        // Default commands
        register(),
        help(),
        // General commands
        ping(),
        // Economy commands
        balance(),
        daily(),
        work(),
        pay(),
        leaderboard(),
        statement(),
        // Moderation commands
        warn(),
        warnings(),
        clearwarnings(),
    ];

    // Handle Music feature
    #[cfg(feature = "music")]
    let music = {
        use maestro::commands::music::{
            leave::*, pause::*, play::*, queue::*, remove::*, repeat::*, shuffle::*, skip::*,
            stop::*, volume::*,
        };

        // Add music commands
        commands.extend(vec![
            play(),
            pause(),
            resume(),
            skip(),
            stop(),
            queue(),
            nowplaying(),
            remove(),
            shuffle(),
            repeat(),
            volume(),
            leave(),
        ]);

        MusicStack::new(&config)
    };

    let token = config.discord_token.clone();
    let fast_sync = config.fast_sync_per_guild;

    #[cfg(feature = "music")]
    let songbird = music.songbird.clone();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands,
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                let commands = &framework.options().commands;

                if fast_sync {
                    // Guild registration shows up immediately, global can take a while
                    for guild in &ready.guilds {
                        match poise::builtins::register_in_guild(ctx, commands, guild.id).await {
                            Ok(()) => info!("Registered commands in guild {}", guild.id),
                            Err(e) => error!(
                                "Failed to register commands in guild {}: {}",
                                guild.id, e
                            ),
                        }
                    }
                    if let Err(e) = poise::builtins::register_globally(ctx, commands).await {
                        warn!("Global command registration failed: {}", e);
                    }
                } else {
                    poise::builtins::register_globally(ctx, commands).await?;
                }

                info!("{} is connected", ready.user.name);
                Ok(Data {
                    config,
                    economy,
                    warnings: warning_ledger,
                    #[cfg(feature = "music")]
                    songbird: music.songbird,
                    #[cfg(feature = "music")]
                    music: music.queue,
                    #[cfg(feature = "music")]
                    resolver: music.resolver,
                })
            })
        });

    let client_builder = ClientBuilder::new(token, intents).framework(framework.build());

    // Create and run client
    #[cfg(feature = "music")]
    {
        build_and_start_client(client_builder, songbird).await
    }

    #[cfg(not(feature = "music"))]
    {
        build_and_start_client(client_builder).await
    }
}

/// Everything the music commands share, created before the client so the
/// same Songbird instance can be registered with it.
#[cfg(feature = "music")]
struct MusicStack {
    songbird: Arc<songbird::Songbird>,
    queue: Arc<maestro::commands::music::utils::queue_manager::QueueManager>,
    resolver: Arc<dyn maestro::commands::music::audio_sources::AudioResolver>,
}

#[cfg(feature = "music")]
impl MusicStack {
    fn new(config: &BotConfig) -> Self {
        use maestro::commands::music::{
            audio_sources::YoutubeApi,
            utils::{queue_manager::QueueManager, songbird_sink::SongbirdSink},
        };

        let songbird = songbird::Songbird::serenity();
        let sink = SongbirdSink::new(
            songbird.clone(),
            reqwest::Client::new(),
            config.ytdl_cookie_file.clone(),
        );
        let resolver = YoutubeApi::new(config.ytdlp_path.clone(), config.ytdl_cookie_file.clone());

        Self {
            songbird,
            queue: QueueManager::new(Arc::new(sink)),
            resolver: Arc::new(resolver),
        }
    }
}

#[cfg(feature = "music")]
async fn build_and_start_client(
    client_builder: ClientBuilder,
    songbird: Arc<songbird::Songbird>,
) -> Result<(), Error> {
    use songbird::SerenityInit;

    let mut client = client_builder.register_songbird_with(songbird).await?;
    client.start().await.map_err(Into::into)
}

#[cfg(not(feature = "music"))]
async fn build_and_start_client(client_builder: ClientBuilder) -> Result<(), Error> {
    let mut client = client_builder.await?;
    client.start().await.map_err(Into::into)
}
