use serde::{Deserialize, Serialize};

use super::{non_blank, prompts, Generator, Run, Task};
use crate::api_connection::{CompletionRequest, Turn};
use crate::error::GenerationError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurn {
    pub content: String,
    pub is_user: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub messages: Vec<ChatTurn>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
}

impl Generator {
    /// Free conversation; the reply is returned as generated, unparsed.
    pub async fn chat(&self, input: &ChatRequest) -> Result<ChatReply, GenerationError> {
        if input.messages.is_empty() {
            return Err(GenerationError::invalid("messages are required"));
        }

        let mut run = Run::start(Task::Chat);
        let options = &self.profiles.chat;
        let system = non_blank(input.system_prompt.as_deref()).unwrap_or(prompts::DEFAULT_CHAT_SYSTEM);
        let turns = input
            .messages
            .iter()
            .map(|m| Turn::from_chat(m.is_user, m.content.clone()))
            .collect();
        let request = CompletionRequest::text(system, turns, options);
        let reply = self.complete(&mut run, request, options).await?;

        run.finish();
        Ok(ChatReply { reply })
    }
}
