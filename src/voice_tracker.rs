use crate::config::Config;
use crate::platform::SerenityPlatform;
use crate::tracker::SessionTracker;
use chrono::Utc;
use serenity::async_trait;
use serenity::all::Ready;
use serenity::model::id::ChannelId;
use serenity::model::voice::VoiceState;
use serenity::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

// 세션 추적기. Mutex가 이벤트 처리와 주기 갱신을 한 줄로 세운다
pub struct SessionStore;

impl TypeMapKey for SessionStore {
    type Value = Arc<Mutex<SessionTracker>>;
}

pub fn new_session_store(config: &Config) -> Arc<Mutex<SessionTracker>> {
    Arc::new(Mutex::new(SessionTracker::new(config.tracked.clone())))
}

pub struct VoiceHandler {
    config: Arc<Config>,
    refresher_started: AtomicBool,
}

impl VoiceHandler {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            config,
            refresher_started: AtomicBool::new(false),
        }
    }

    fn platform(&self, ctx: &Context) -> SerenityPlatform {
        SerenityPlatform::new(
            ctx.http.clone(),
            ctx.cache.clone(),
            self.config.guild_id,
            self.config.log_channel_id,
        )
    }

    fn is_present(&self, state: &VoiceState) -> bool {
        is_present(state.channel_id, self.config.voice_channel_id)
    }
}

#[async_trait]
impl EventHandler for VoiceHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("{}님의 봇이 준비되었습니다!", ready.user.name);

        // 재접속 때마다 ready가 다시 오므로 갱신 루프는 한 번만 띄운다
        if self.refresher_started.swap(true, Ordering::SeqCst) {
            return;
        }
        let Some(tracker) = session_store(&ctx).await else {
            error!("session tracker missing from client data, live refresh disabled");
            return;
        };
        let platform = self.platform(&ctx);
        let period = self.config.refresh_interval;
        tokio::spawn(async move {
            run_refresher(tracker, platform, period).await;
        });
    }

    async fn voice_state_update(&self, ctx: Context, old: Option<VoiceState>, new: VoiceState) {
        if new.guild_id != Some(self.config.guild_id) {
            return;
        }
        let Some(tracker) = session_store(&ctx).await else {
            error!("session tracker missing from client data");
            return;
        };

        let was_connected = old.as_ref().is_some_and(|state| self.is_present(state));
        let is_connected = self.is_present(&new);

        let mut tracker = tracker.lock().await;
        if !tracker.is_tracked(new.user_id) {
            return;
        }
        let platform = self.platform(&ctx);
        if let Err(e) = tracker
            .on_presence_transition(&platform, new.user_id, was_connected, is_connected, Utc::now())
            .await
        {
            error!(user = %new.user_id, "presence update failed: {}", e);
        }
    }
}

async fn session_store(ctx: &Context) -> Option<Arc<Mutex<SessionTracker>>> {
    let data = ctx.data.read().await;
    data.get::<SessionStore>().cloned()
}

// 음성 채널을 지정했다면 그 채널에 있을 때만 접속으로 본다
fn is_present(channel: Option<ChannelId>, watched: Option<ChannelId>) -> bool {
    channel.is_some_and(|channel| watched.is_none_or(|watched| watched == channel))
}

async fn run_refresher(tracker: Arc<Mutex<SessionTracker>>, platform: SerenityPlatform, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // 첫 tick은 바로 끝난다
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let mut tracker = tracker.lock().await;
        if let Err(e) = tracker.refresh(&platform, Utc::now()).await {
            warn!("live message refresh failed: {}", e);
        }
    }
}
