//! Transient success/error notifications raised by the admin orchestrator.

use std::time::Duration;

use tokio::time::Instant;
use uuid::Uuid;

const SUCCESS_TTL: Duration = Duration::from_secs(3);
const ERROR_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub text: String,
    pub raised_at: Instant,
    pub ttl: Duration,
}

impl Notification {
    pub fn success(text: impl Into<String>, now: Instant) -> Self {
        Self::with_ttl(NotificationKind::Success, text, now, SUCCESS_TTL)
    }

    pub fn error(text: impl Into<String>, now: Instant) -> Self {
        Self::with_ttl(NotificationKind::Error, text, now, ERROR_TTL)
    }

    pub fn with_ttl(
        kind: NotificationKind,
        text: impl Into<String>,
        now: Instant,
        ttl: Duration,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            text: text.into(),
            raised_at: now,
            ttl,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.raised_at) >= self.ttl
    }
}

/// Stack of notifications, each dismissed on its own timer or explicitly.
#[derive(Debug, Clone, Default)]
pub struct Notifications {
    items: Vec<Notification>,
}

impl Notifications {
    pub fn push(&mut self, notification: Notification) {
        self.items.push(notification);
    }

    pub fn success(&mut self, text: impl Into<String>) {
        self.push(Notification::success(text, Instant::now()));
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.push(Notification::error(text, Instant::now()));
    }

    /// Notifications still on screen at `now`; expired ones are dropped.
    pub fn active(&mut self, now: Instant) -> &[Notification] {
        self.items.retain(|item| !item.is_expired(now));
        &self.items
    }

    pub fn dismiss(&mut self, id: Uuid) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    /// Take every notification regardless of expiry.
    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.items)
    }

    pub fn latest(&self) -> Option<&Notification> {
        self.items.last()
    }
}
