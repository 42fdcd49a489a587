use std::sync::Arc;

use folio::{
    application::{
        assistant::{Assistant, ChatCompletion, UnconfiguredChat},
        error::AppError,
    },
    config::{ChatArgs, Settings},
    infra::{
        chat::{ChatEndpointConfig, HttpChatClient},
        error::InfraError,
    },
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

pub async fn run(settings: &Settings, args: ChatArgs) -> Result<(), AppError> {
    let mut assistant = Assistant::new(client(settings)?, settings.assistant.history_turns);

    if let Some(message) = args.message {
        if let Some(reply) = assistant.ask(&message).await {
            println!("{}", reply.text);
        }
        return Ok(());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.map_err(InfraError::from)? {
        if let Some(reply) = assistant.ask(&line).await {
            println!("{}", reply.text);
        }
    }
    Ok(())
}

fn client(settings: &Settings) -> Result<Arc<dyn ChatCompletion>, AppError> {
    let assistant = &settings.assistant;
    let Some(api_key) = assistant.api_key.clone() else {
        warn!("assistant.api_key is not set; every reply will be a fallback");
        return Ok(Arc::new(UnconfiguredChat));
    };

    let client = HttpChatClient::new(ChatEndpointConfig {
        endpoint: assistant.endpoint.clone(),
        api_key,
        model: assistant.model.clone(),
        max_tokens: assistant.max_tokens.get(),
        system_prompt: assistant.system_prompt.clone(),
        timeout: assistant.request_timeout,
    })?;
    Ok(Arc::new(client))
}
