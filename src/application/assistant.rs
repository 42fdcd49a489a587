//! Chat assistant: a thin conversation wrapper around a text completion
//! collaborator. Failures never surface to the user; a canned reply is
//! substituted instead.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use metrics::counter;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_HISTORY_TURNS: usize = 10;

pub const FALLBACK_REPLIES: &[&str] = &[
    "I'm having trouble reaching my brain right now. Please try again in a moment.",
    "Sorry, I couldn't come up with an answer just now. Feel free to browse the projects in the meantime.",
    "Something went wrong on my side. You can always reach out through the contact page instead.",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            text: text.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("chat assistant is not configured")]
    NotConfigured,
    #[error("chat transport error: {0}")]
    Transport(String),
    #[error("chat endpoint rejected the request with status {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("chat endpoint returned no reply")]
    EmptyReply,
}

impl ChatError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Produces the assistant's next reply given the conversation so far.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    async fn complete(&self, message: &str, history: &[ChatTurn]) -> Result<String, ChatError>;
}

/// Stand-in used when no endpoint is configured; every call falls back.
#[derive(Debug, Default)]
pub struct UnconfiguredChat;

#[async_trait]
impl ChatCompletion for UnconfiguredChat {
    async fn complete(&self, _message: &str, _history: &[ChatTurn]) -> Result<String, ChatError> {
        Err(ChatError::NotConfigured)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySource {
    Model,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub source: ReplySource,
}

pub struct Assistant {
    client: Arc<dyn ChatCompletion>,
    history: VecDeque<ChatTurn>,
    max_turns: usize,
    next_fallback: usize,
}

impl Assistant {
    pub fn new(client: Arc<dyn ChatCompletion>, max_turns: usize) -> Self {
        Self {
            client,
            history: VecDeque::new(),
            max_turns: max_turns.max(2),
            next_fallback: 0,
        }
    }

    pub fn history(&self) -> impl Iterator<Item = &ChatTurn> {
        self.history.iter()
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// Ask the collaborator for a reply. Blank input yields `None`.
    ///
    /// Only exchanges the model actually answered are kept in the history.
    pub async fn ask(&mut self, message: &str) -> Option<Reply> {
        let message = message.trim();
        if message.is_empty() {
            return None;
        }

        let history: Vec<ChatTurn> = self.history.iter().cloned().collect();
        match self.client.complete(message, &history).await {
            Ok(text) if !text.trim().is_empty() => {
                let text = text.trim().to_string();
                self.remember(ChatTurn::user(message));
                self.remember(ChatTurn::assistant(text.clone()));
                debug!(turns = self.history.len(), "assistant replied");
                Some(Reply {
                    text,
                    source: ReplySource::Model,
                })
            }
            Ok(_) => Some(self.fallback(&ChatError::EmptyReply)),
            Err(err) => Some(self.fallback(&err)),
        }
    }

    fn remember(&mut self, turn: ChatTurn) {
        self.history.push_back(turn);
        while self.history.len() > self.max_turns {
            self.history.pop_front();
        }
    }

    fn fallback(&mut self, err: &ChatError) -> Reply {
        warn!(error = %err, "chat completion failed; using fallback reply");
        counter!("folio_chat_fallback_total").increment(1);

        let text = FALLBACK_REPLIES[self.next_fallback % FALLBACK_REPLIES.len()];
        self.next_fallback = self.next_fallback.wrapping_add(1);
        Reply {
            text: text.to_string(),
            source: ReplySource::Fallback,
        }
    }
}
