use crate::ledger::TrackedUser;
use serenity::model::id::{ChannelId, GuildId, UserId};
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_GUILD_ID: u64 = 1460365410552516743;
const DEFAULT_LOG_CHANNEL_ID: u64 = 1462864794788036638;
const DEFAULT_TRACKED: [(u64, &str); 2] = [(811267159925588010, "💜"), (652651964722577408, "❤️")];
const DEFAULT_REFRESH_SECS: u64 = 30;
const DEFAULT_KEEPALIVE_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_LOG_FILE: &str = "vc_tracker_log.txt";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set in the environment or .env file")]
    Missing(&'static str),
    #[error("{key} has an invalid value {value:?}")]
    Invalid { key: &'static str, value: String },
    #[error("the two tracked users must be different")]
    DuplicateTrackedUser,
}

#[derive(Clone)]
pub struct Config {
    pub token: String,
    pub guild_id: GuildId,
    pub log_channel_id: ChannelId,
    /// 없으면 길드의 아무 음성 채널이나 접속으로 본다
    pub voice_channel_id: Option<ChannelId>,
    pub tracked: [TrackedUser; 2],
    pub refresh_interval: Duration,
    pub keepalive_addr: SocketAddr,
    pub log_file: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let token = lookup("DISCORD_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .ok_or(ConfigError::Missing("DISCORD_TOKEN"))?;

        let guild_id = GuildId::new(parse_id(&lookup, "GUILD_ID")?.unwrap_or(DEFAULT_GUILD_ID));
        let log_channel_id =
            ChannelId::new(parse_id(&lookup, "VC_LOG_CHANNEL_ID")?.unwrap_or(DEFAULT_LOG_CHANNEL_ID));
        let voice_channel_id = parse_id(&lookup, "VOICE_CHANNEL_ID")?.map(ChannelId::new);

        let first = tracked_user(&lookup, 1, DEFAULT_TRACKED[0])?;
        let second = tracked_user(&lookup, 2, DEFAULT_TRACKED[1])?;
        if first.id == second.id {
            return Err(ConfigError::DuplicateTrackedUser);
        }

        let refresh_secs = match lookup("REFRESH_INTERVAL_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::Invalid {
                    key: "REFRESH_INTERVAL_SECS",
                    value: raw,
                })?,
            None => DEFAULT_REFRESH_SECS,
        };

        let raw_addr = lookup("KEEPALIVE_ADDR").unwrap_or_else(|| DEFAULT_KEEPALIVE_ADDR.to_string());
        let keepalive_addr = raw_addr.trim().parse().map_err(|_| ConfigError::Invalid {
            key: "KEEPALIVE_ADDR",
            value: raw_addr.clone(),
        })?;

        // 빈 문자열이면 파일 로그를 끈다
        let log_file = match lookup("LOG_FILE") {
            Some(path) if path.trim().is_empty() => None,
            Some(path) => Some(PathBuf::from(path)),
            None => Some(PathBuf::from(DEFAULT_LOG_FILE)),
        };

        Ok(Self {
            token,
            guild_id,
            log_channel_id,
            voice_channel_id,
            tracked: [first, second],
            refresh_interval: Duration::from_secs(refresh_secs),
            keepalive_addr,
            log_file,
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("token", &"<redacted>")
            .field("guild_id", &self.guild_id)
            .field("log_channel_id", &self.log_channel_id)
            .field("voice_channel_id", &self.voice_channel_id)
            .field("tracked", &self.tracked)
            .field("refresh_interval", &self.refresh_interval)
            .field("keepalive_addr", &self.keepalive_addr)
            .field("log_file", &self.log_file)
            .finish()
    }
}

fn parse_id(lookup: &impl Fn(&str) -> Option<String>, key: &'static str) -> Result<Option<u64>, ConfigError> {
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    match raw.trim().parse::<u64>() {
        Ok(id) if id != 0 => Ok(Some(id)),
        _ => Err(ConfigError::Invalid { key, value: raw }),
    }
}

fn tracked_user(
    lookup: &impl Fn(&str) -> Option<String>,
    slot: usize,
    (default_id, default_marker): (u64, &str),
) -> Result<TrackedUser, ConfigError> {
    let (id_key, marker_key) = match slot {
        1 => ("TRACKED_USER_1", "TRACKED_MARKER_1"),
        _ => ("TRACKED_USER_2", "TRACKED_MARKER_2"),
    };
    let id = parse_id(lookup, id_key)?.unwrap_or(default_id);
    let marker = lookup(marker_key).unwrap_or_else(|| default_marker.to_string());
    Ok(TrackedUser::new(UserId::new(id), marker))
}
