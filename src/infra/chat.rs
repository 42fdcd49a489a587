//! Chat completion over an OpenAI-compatible `/chat/completions` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

use crate::application::assistant::{ChatCompletion, ChatError, ChatRole, ChatTurn};

#[derive(Debug, Clone)]
pub struct ChatEndpointConfig {
    /// Base URL that `chat/completions` is appended to.
    pub endpoint: Url,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub system_prompt: Option<String>,
    pub timeout: Option<Duration>,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct HttpChatClient {
    client: Client,
    url: Url,
    config: ChatEndpointConfig,
}

impl HttpChatClient {
    pub fn new(config: ChatEndpointConfig) -> Result<Self, ChatError> {
        let mut url = config.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| ChatError::transport("chat endpoint cannot be a base URL"))?
            .pop_if_empty()
            .extend(["chat", "completions"]);

        let mut builder =
            Client::builder().user_agent(concat!("folio/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(ChatError::transport)?;
        Ok(Self {
            client,
            url,
            config,
        })
    }

    fn messages<'a>(
        &'a self,
        message: &'a str,
        history: &'a [ChatTurn],
    ) -> Vec<WireMessage<'a>> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        if let Some(prompt) = &self.config.system_prompt {
            messages.push(WireMessage {
                role: "system",
                content: prompt,
            });
        }
        messages.extend(history.iter().map(|turn| WireMessage {
            role: match turn.role {
                ChatRole::User => "user",
                ChatRole::Assistant => "assistant",
            },
            content: &turn.text,
        }));
        messages.push(WireMessage {
            role: "user",
            content: message,
        });
        messages
    }
}

#[async_trait]
impl ChatCompletion for HttpChatClient {
    #[instrument(skip_all, fields(model = %self.config.model, turns = history.len()))]
    async fn complete(&self, message: &str, history: &[ChatTurn]) -> Result<String, ChatError> {
        let request = CompletionRequest {
            model: &self.config.model,
            messages: self.messages(message, history),
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .client
            .post(self.url.clone())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(ChatError::transport)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ChatError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let body: CompletionResponse = response.json().await.map_err(ChatError::transport)?;
        let reply = body
            .choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(ChatError::EmptyReply)?;
        debug!(chars = reply.len(), "chat completion received");
        Ok(reply)
    }
}
