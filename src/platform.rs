use serenity::async_trait;
use serenity::builder::EditMessage;
use serenity::cache::Cache;
use serenity::http::{Http, HttpError};
use serenity::model::id::{ChannelId, GuildId, MessageId, UserId};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("status message no longer exists")]
    MessageNotFound,
    #[error("no display name available for user {0}")]
    LookupUnavailable(UserId),
    #[error("platform unavailable: {0}")]
    Unavailable(String),
    #[error("discord error: {0}")]
    Discord(#[from] serenity::Error),
}

/// 트래커가 디스코드 쪽에 요구하는 기능.
///
/// 이름 조회는 캐시에서 바로 끝나므로 동기 함수다. 메시지 내용을 모두 만든 뒤에
/// 전송 요청만 await 하기 위함.
#[async_trait]
pub trait VoicePlatform: Send + Sync {
    /// 길드와 로그 채널을 지금 쓸 수 있는지. 실패하면 트래커는 장부를 건드리지 않는다.
    fn check_available(&self) -> Result<(), PlatformError>;

    fn display_name(&self, user: UserId) -> Result<String, PlatformError>;

    async fn create_message(&self, content: String) -> Result<MessageId, PlatformError>;

    async fn edit_message(&self, message: MessageId, content: String) -> Result<(), PlatformError>;
}

pub struct SerenityPlatform {
    http: Arc<Http>,
    cache: Arc<Cache>,
    guild_id: GuildId,
    log_channel_id: ChannelId,
}

impl SerenityPlatform {
    pub fn new(http: Arc<Http>, cache: Arc<Cache>, guild_id: GuildId, log_channel_id: ChannelId) -> Self {
        Self {
            http,
            cache,
            guild_id,
            log_channel_id,
        }
    }
}

#[async_trait]
impl VoicePlatform for SerenityPlatform {
    fn check_available(&self) -> Result<(), PlatformError> {
        let guild = self
            .cache
            .guild(self.guild_id)
            .ok_or_else(|| PlatformError::Unavailable(format!("guild {} not cached", self.guild_id)))?;
        if !guild.channels.contains_key(&self.log_channel_id) {
            return Err(PlatformError::Unavailable(format!(
                "channel {} not found in guild {}",
                self.log_channel_id, self.guild_id
            )));
        }
        Ok(())
    }

    fn display_name(&self, user: UserId) -> Result<String, PlatformError> {
        let guild = self
            .cache
            .guild(self.guild_id)
            .ok_or_else(|| PlatformError::Unavailable(format!("guild {} not cached", self.guild_id)))?;
        guild
            .members
            .get(&user)
            .map(|member| member.display_name().to_string())
            .ok_or(PlatformError::LookupUnavailable(user))
    }

    async fn create_message(&self, content: String) -> Result<MessageId, PlatformError> {
        self.check_available()?;
        let message = self.log_channel_id.say(&self.http, content).await?;
        Ok(message.id)
    }

    async fn edit_message(&self, message: MessageId, content: String) -> Result<(), PlatformError> {
        self.log_channel_id
            .edit_message(&self.http, message, EditMessage::new().content(content))
            .await
            .map(|_| ())
            .map_err(map_edit_error)
    }
}

fn map_edit_error(err: serenity::Error) -> PlatformError {
    let status = match &err {
        serenity::Error::Http(HttpError::UnsuccessfulRequest(response)) => Some(response.status_code.as_u16()),
        _ => None,
    };
    edit_failure(status, err)
}

// 수정 대상 메시지가 지워졌으면 404가 온다
fn edit_failure(status: Option<u16>, err: serenity::Error) -> PlatformError {
    match status {
        Some(404) => PlatformError::MessageNotFound,
        _ => PlatformError::Discord(err),
    }
}
