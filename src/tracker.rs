use crate::duration::format_duration;
use crate::ledger::{SessionLedger, TrackedUser, Transition};
use crate::platform::{PlatformError, VoicePlatform};
use crate::render::{self, Snapshot, UserLine};
use chrono::{DateTime, TimeDelta, Utc};
use serenity::model::id::{MessageId, UserId};
use tracing::{debug, info, warn};

/// 두 유저의 음성 채널 세션을 추적하고 상태 메시지 하나를 관리한다.
///
/// 모든 메서드는 한 번에 하나씩 호출된다고 가정한다 (호출부에서 Mutex로 직렬화).
/// 장부 변경과 메시지 렌더링은 항상 첫 await 이전에 끝난다.
pub struct SessionTracker {
    users: [TrackedUser; 2],
    ledger: SessionLedger,
    status_message: Option<MessageId>,
}

impl SessionTracker {
    pub fn new(users: [TrackedUser; 2]) -> Self {
        Self {
            users,
            ledger: SessionLedger::new(),
            status_message: None,
        }
    }

    pub fn is_tracked(&self, user: UserId) -> bool {
        self.users.iter().any(|tracked| tracked.id == user)
    }

    pub async fn on_presence_transition<P>(
        &mut self,
        platform: &P,
        user: UserId,
        was_connected: bool,
        is_connected: bool,
        now: DateTime<Utc>,
    ) -> Result<(), PlatformError>
    where
        P: VoicePlatform + ?Sized,
    {
        if !self.is_tracked(user) {
            return Ok(());
        }
        debug!(%user, was_connected, is_connected, "presence transition");
        // 길드나 채널이 없으면 이번 이벤트는 버리고 다음 이벤트에서 다시 시도한다
        platform.check_available()?;

        let transition = if is_connected {
            self.ledger.record_connect(user, now)
        } else {
            let since = self.ledger.connected_since(user);
            let transition = self.ledger.record_disconnect(user, now);
            if let Some(start) = since {
                info!(%user, "left voice after {}", format_duration(now - start));
            }
            transition
        };

        match transition {
            Transition::Activated => self.start_session(platform, user, now).await,
            Transition::Deactivated => self.finish_session(platform, now).await,
            Transition::Unchanged => Ok(()),
        }
    }

    /// 세션이 열려 있고 상태 메시지가 있을 때만 메시지를 수정한다.
    /// 시도한 메시지 작업 수를 돌려준다. 메시지가 사라져 실패한 수정도 1로 센다.
    pub async fn refresh<P>(&mut self, platform: &P, now: DateTime<Utc>) -> Result<usize, PlatformError>
    where
        P: VoicePlatform + ?Sized,
    {
        if !self.ledger.is_active() {
            return Ok(0);
        }
        let (Some(message), Some(start)) = (self.status_message, self.ledger.session_start()) else {
            return Ok(0);
        };

        let ledger = &self.ledger;
        let content = self.render(platform, start, None, |user| ledger.live_elapsed(user, now))?;

        match platform.edit_message(message, content).await {
            Ok(()) => Ok(1),
            Err(PlatformError::MessageNotFound) => {
                warn!(%message, "live message is gone, pausing refresh until next session");
                self.status_message = None;
                Ok(1)
            }
            Err(e) => Err(e),
        }
    }

    async fn start_session<P>(&mut self, platform: &P, opened_by: UserId, now: DateTime<Utc>) -> Result<(), PlatformError>
    where
        P: VoicePlatform + ?Sized,
    {
        self.ledger.open_session(now);
        if let Some(stale) = self.status_message.take() {
            warn!(%stale, "dropping status message left over from previous session");
        }
        info!(user = %opened_by, "voice session started");

        let content = self.render(platform, now, None, |_| TimeDelta::zero())?;
        let message = platform.create_message(content).await?;
        self.status_message = Some(message);
        Ok(())
    }

    async fn finish_session<P>(&mut self, platform: &P, now: DateTime<Utc>) -> Result<(), PlatformError>
    where
        P: VoicePlatform + ?Sized,
    {
        let start = self.ledger.session_start().unwrap_or(now);
        let message = self.status_message.take();
        self.ledger.close_session();
        info!("voice session ended. total duration: {}", format_duration(now - start));

        // 모두 나간 상태라 진행 중인 구간은 없다
        let ledger = &self.ledger;
        let content = self.render(platform, start, Some(now), |user| ledger.accumulated(user))?;

        let Some(message) = message else {
            return Ok(());
        };
        match platform.edit_message(message, content).await {
            Err(PlatformError::MessageNotFound) => {
                warn!(%message, "status message vanished before summary could be written");
                Ok(())
            }
            other => other,
        }
    }

    fn render<P>(
        &self,
        platform: &P,
        session_start: DateTime<Utc>,
        session_end: Option<DateTime<Utc>>,
        elapsed: impl Fn(UserId) -> TimeDelta,
    ) -> Result<String, PlatformError>
    where
        P: VoicePlatform + ?Sized,
    {
        let users = self
            .users
            .iter()
            .map(|tracked| {
                Ok(UserLine {
                    marker: tracked.marker.clone(),
                    name: platform.display_name(tracked.id)?,
                    elapsed: elapsed(tracked.id),
                })
            })
            .collect::<Result<Vec<_>, PlatformError>>()?;

        Ok(render::render(&Snapshot {
            users,
            session_start,
            session_end,
        }))
    }
}
