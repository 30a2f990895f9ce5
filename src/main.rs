use anyhow::Context as _;
use serenity::Client;
use serenity::all::GatewayIntents;
use std::sync::Arc;
use tracing::{error, info};

mod config;
mod duration;
mod keepalive;
mod ledger;
mod logging;
mod platform;
mod render;
mod tracker;
mod voice_tracker;
use crate::config::Config;
use crate::voice_tracker::{SessionStore, VoiceHandler};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config = Config::from_env()?;
    logging::init(config.log_file.as_deref()).context("failed to open diagnostic log file")?;

    // 표시 이름 조회에 멤버 캐시가 필요하다
    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_VOICE_STATES
        | GatewayIntents::GUILD_MEMBERS;

    let keepalive_addr = config.keepalive_addr;
    tokio::spawn(async move {
        if let Err(e) = keepalive::serve(keepalive_addr).await {
            error!("keep-alive server stopped: {}", e);
        }
    });

    let store = voice_tracker::new_session_store(&config);
    let config = Arc::new(config);

    let mut client = Client::builder(&config.token, intents)
        .event_handler(VoiceHandler::new(config.clone()))
        .type_map_insert::<SessionStore>(store)
        .await
        .context("failed to create discord client")?;

    info!(guild = %config.guild_id, "봇을 시작합니다...");

    client.start().await.context("discord client stopped")?;
    Ok(())
}
