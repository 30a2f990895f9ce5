use chrono::{DateTime, TimeDelta, Utc};
use serenity::model::id::UserId;
use std::collections::HashMap;

/// 추적 대상 유저. 프로세스가 살아있는 동안 변하지 않는다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedUser {
    pub id: UserId,
    pub marker: String,
}

impl TrackedUser {
    pub fn new(id: UserId, marker: impl Into<String>) -> Self {
        Self {
            id,
            marker: marker.into(),
        }
    }
}

/// 접속/퇴장 기록이 세션 상태를 바꿨는지 여부
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Unchanged,
    Activated,
    Deactivated,
}

/// 현재 세션의 시간 기록.
///
/// `connected_since`의 키 집합이 곧 현재 접속 중인 유저 집합이다.
/// `accumulated`는 이번 세션 동안 끝난 접속 구간의 합이다.
#[derive(Debug, Default)]
pub struct SessionLedger {
    active: bool,
    session_start: Option<DateTime<Utc>>,
    connected_since: HashMap<UserId, DateTime<Utc>>,
    accumulated: HashMap<UserId, TimeDelta>,
}

impl SessionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// 이미 접속 중이면 아무 것도 하지 않는다 (처음 기록한 시각이 유지됨).
    pub fn record_connect(&mut self, user: UserId, now: DateTime<Utc>) -> Transition {
        if self.connected_since.contains_key(&user) {
            return Transition::Unchanged;
        }
        let was_empty = self.connected_since.is_empty();
        self.connected_since.insert(user, now);

        if was_empty && !self.active {
            Transition::Activated
        } else {
            Transition::Unchanged
        }
    }

    pub fn record_disconnect(&mut self, user: UserId, now: DateTime<Utc>) -> Transition {
        let Some(start) = self.connected_since.remove(&user) else {
            return Transition::Unchanged;
        };
        let stint = (now - start).max(TimeDelta::zero());
        *self.accumulated.entry(user).or_insert_with(TimeDelta::zero) += stint;

        if self.connected_since.is_empty() && self.active {
            Transition::Deactivated
        } else {
            Transition::Unchanged
        }
    }

    /// 접속 중인 유저의 시작 시각은 건드리지 않고 누적 시간만 비운다.
    pub fn open_session(&mut self, now: DateTime<Utc>) {
        self.active = true;
        self.session_start = Some(now);
        self.accumulated.clear();
    }

    pub fn close_session(&mut self) {
        self.active = false;
        self.session_start = None;
    }

    pub fn live_elapsed(&self, user: UserId, now: DateTime<Utc>) -> TimeDelta {
        let in_progress = self
            .connected_since
            .get(&user)
            .map(|start| (now - *start).max(TimeDelta::zero()))
            .unwrap_or_else(TimeDelta::zero);
        self.accumulated(user) + in_progress
    }

    pub fn accumulated(&self, user: UserId) -> TimeDelta {
        self.accumulated
            .get(&user)
            .copied()
            .unwrap_or_else(TimeDelta::zero)
    }

    pub fn connected_since(&self, user: UserId) -> Option<DateTime<Utc>> {
        self.connected_since.get(&user).copied()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn session_start(&self) -> Option<DateTime<Utc>> {
        self.session_start
    }
}
