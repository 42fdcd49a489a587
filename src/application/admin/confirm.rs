//! Two-step delete confirmation for a content list.
//!
//! A list holds at most one pending id. The first press arms it; a second
//! press on the same id inside the window confirms. Arming another id moves
//! the pending state there.

use std::time::Duration;

use tokio::time::Instant;

pub const DELETE_CONFIRM_WINDOW: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePress {
    /// First press; a second press before `expires_at` confirms.
    Armed { id: u64, expires_at: Instant },
    Confirmed { id: u64 },
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    id: u64,
    armed_at: Instant,
}

#[derive(Debug, Clone)]
pub struct DeleteConfirmation {
    window: Duration,
    pending: Option<Pending>,
}

impl Default for DeleteConfirmation {
    fn default() -> Self {
        Self::new(DELETE_CONFIRM_WINDOW)
    }
}

impl DeleteConfirmation {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    pub fn press(&mut self, id: u64, now: Instant) -> DeletePress {
        if self.pending_id(now) == Some(id) {
            self.pending = None;
            return DeletePress::Confirmed { id };
        }

        self.pending = Some(Pending { id, armed_at: now });
        DeletePress::Armed {
            id,
            expires_at: now + self.window,
        }
    }

    /// Id awaiting confirmation at `now`, if its window has not lapsed.
    pub fn pending_id(&self, now: Instant) -> Option<u64> {
        self.pending
            .filter(|pending| now.saturating_duration_since(pending.armed_at) < self.window)
            .map(|pending| pending.id)
    }

    pub fn is_pending(&self, id: u64, now: Instant) -> bool {
        self.pending_id(now) == Some(id)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
