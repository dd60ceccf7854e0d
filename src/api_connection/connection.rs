use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use super::endpoints::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, GeminiRequest,
    GeminiRequestContent, GeminiRequestPart, GeminiResponse, GeminiSystemInstruction,
    GenerationConfig, InlineData,
};
use super::request::{CompletionRequest, ProviderKind, Role, TurnContent};
use crate::config::{AppConfig, ProviderSettings};

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("API key not found in environment: {0}")]
    MissingApiKey(String),

    #[error("completion call timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("provider error {status}: {body}")]
    ProviderError {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("malformed provider response: {0}")]
    MalformedProviderResponse(String),
}

/// Sends one prompt to a completion backend and returns its raw text.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(
        &self,
        request: CompletionRequest,
        timeout: Duration,
    ) -> Result<String, CompletionError>;
}

/// Talks to an OpenAI-compatible chat endpoint for text and to Gemini for vision.
#[derive(Debug, Clone)]
pub struct HttpCompletionClient {
    client: Client,
    text: ProviderSettings,
    vision: ProviderSettings,
}

impl HttpCompletionClient {
    pub fn new(text: ProviderSettings, vision: ProviderSettings) -> Self {
        Self {
            client: Client::new(),
            text,
            vision,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.text.clone(), config.vision.clone())
    }

    fn settings(&self, kind: ProviderKind) -> &ProviderSettings {
        match kind {
            ProviderKind::Text => &self.text,
            ProviderKind::Vision => &self.vision,
        }
    }

    pub fn text_payload(&self, request: &CompletionRequest) -> ChatCompletionRequest {
        let mut messages = Vec::with_capacity(request.turns.len() + 1);
        if !request.system_instruction.is_empty() {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: request.system_instruction.clone(),
            });
        }
        for turn in &request.turns {
            if let TurnContent::Media { .. } = turn.content {
                warn!("text provider cannot take inline media, sending the text part only");
            }
            let role = match turn.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            };
            messages.push(ChatMessage {
                role: role.to_string(),
                content: turn.content.text().to_string(),
            });
        }

        ChatCompletionRequest {
            model: request
                .model
                .clone()
                .unwrap_or_else(|| self.text.model.clone()),
            messages,
            max_tokens: request.max_output_tokens,
            temperature: request.temperature,
        }
    }

    /// `generateContent` endpoint for the request's model, or the configured default.
    pub fn vision_endpoint(&self, request: &CompletionRequest) -> String {
        let model = request.model.as_deref().unwrap_or(&self.vision.model);
        format!("{}/{}:generateContent", self.vision.url.trim_end_matches('/'), model)
    }

    pub fn vision_payload(request: &CompletionRequest) -> GeminiRequest {
        let contents = request
            .turns
            .iter()
            .map(|turn| {
                let role = match turn.role {
                    Role::User => "user",
                    Role::Assistant => "model",
                };
                let parts = match &turn.content {
                    TurnContent::Text(text) => vec![GeminiRequestPart::Text { text: text.clone() }],
                    TurnContent::Media { text, media } => vec![
                        GeminiRequestPart::Inline {
                            inline_data: InlineData {
                                mime_type: media.mime_type.clone(),
                                data: media.data.clone(),
                            },
                        },
                        GeminiRequestPart::Text { text: text.clone() },
                    ],
                };
                GeminiRequestContent {
                    role: role.to_string(),
                    parts,
                }
            })
            .collect();

        let system_instruction = (!request.system_instruction.is_empty()).then(|| {
            GeminiSystemInstruction {
                parts: vec![GeminiRequestPart::Text {
                    text: request.system_instruction.clone(),
                }],
            }
        });

        GeminiRequest {
            contents,
            system_instruction,
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_output_tokens,
            },
        }
    }

    async fn send(&self, request: CompletionRequest) -> Result<String, CompletionError> {
        let settings = self.settings(request.provider_kind);
        let api_key = settings
            .api_key
            .as_deref()
            .ok_or_else(|| CompletionError::MissingApiKey(settings.api_key_var.to_string()))?;

        let response = match request.provider_kind {
            ProviderKind::Text => {
                self.client
                    .post(&settings.url)
                    .bearer_auth(api_key)
                    .json(&self.text_payload(&request))
                    .send()
                    .await?
            }
            ProviderKind::Vision => {
                self.client
                    .post(self.vision_endpoint(&request))
                    .query(&[("key", api_key)])
                    .json(&Self::vision_payload(&request))
                    .send()
                    .await?
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(CompletionError::ProviderError { status, body });
        }

        let body = response.text().await?;
        let text = match request.provider_kind {
            ProviderKind::Text => serde_json::from_str::<ChatCompletionResponse>(&body)
                .map_err(|e| CompletionError::MalformedProviderResponse(e.to_string()))?
                .into_text()
                .ok_or_else(|| {
                    CompletionError::MalformedProviderResponse(
                        "choices[0].message.content is missing".to_string(),
                    )
                })?,
            ProviderKind::Vision => serde_json::from_str::<GeminiResponse>(&body)
                .map_err(|e| CompletionError::MalformedProviderResponse(e.to_string()))?
                .into_text()
                .ok_or_else(|| {
                    CompletionError::MalformedProviderResponse(
                        "candidates[0].content.parts[0].text is missing".to_string(),
                    )
                })?,
        };

        debug!(kind = ?request.provider_kind, chars = text.len(), "completion received");
        Ok(text)
    }
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    async fn complete(
        &self,
        request: CompletionRequest,
        timeout: Duration,
    ) -> Result<String, CompletionError> {
        match tokio::time::timeout(timeout, self.send(request)).await {
            Ok(result) => result,
            Err(_) => Err(CompletionError::Timeout {
                after_ms: timeout.as_millis() as u64,
            }),
        }
    }
}
