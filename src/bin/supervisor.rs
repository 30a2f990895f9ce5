//! 봇 프로세스가 어떤 이유로든 끝나면 잠시 기다렸다가 다시 띄운다.

use anyhow::Context as _;
use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tokio::process::Command;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const RESTART_DELAY: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("vctracker_supervisor=info")),
        )
        .init();

    let bot = bot_path()?;

    loop {
        info!("starting {}", bot.display());
        match Command::new(&bot).kill_on_drop(true).spawn() {
            Ok(mut child) => {
                tokio::select! {
                    status = child.wait() => match status {
                        Ok(status) => warn!("bot exited with {}", status),
                        Err(e) => error!("failed to wait for bot: {}", e),
                    },
                    _ = tokio::signal::ctrl_c() => {
                        info!("shutting down, stopping bot");
                        child.kill().await.context("failed to stop bot")?;
                        return Ok(());
                    }
                }
            }
            Err(e) => error!("failed to start {}: {}", bot.display(), e),
        }

        tokio::select! {
            _ = tokio::time::sleep(RESTART_DELAY) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                return Ok(());
            }
        }
    }
}

fn bot_path() -> anyhow::Result<PathBuf> {
    resolve_bot_path(std::env::var_os("VCTRACKER_BIN"), std::env::current_exe)
}

// VCTRACKER_BIN이 없으면 이 실행 파일 옆의 vctracker를 쓴다
fn resolve_bot_path(
    override_path: Option<OsString>,
    current_exe: impl FnOnce() -> io::Result<PathBuf>,
) -> anyhow::Result<PathBuf> {
    if let Some(path) = override_path {
        return Ok(PathBuf::from(path));
    }
    let exe = current_exe().context("cannot locate supervisor executable")?;
    let dir = exe
        .parent()
        .context("supervisor executable has no parent directory")?;
    Ok(dir.join(format!("vctracker{}", std::env::consts::EXE_SUFFIX)))
}
