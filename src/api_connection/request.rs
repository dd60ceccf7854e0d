use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which completion backend a request is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Text,
    Vision,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Base64 image bytes attached to a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineMedia {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnContent {
    Text(String),
    Media { text: String, media: InlineMedia },
}

impl TurnContent {
    pub fn text(&self) -> &str {
        match self {
            TurnContent::Text(text) => text,
            TurnContent::Media { text, .. } => text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub content: TurnContent,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: TurnContent::Text(text.into()),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: TurnContent::Text(text.into()),
        }
    }

    /// Maps the application's "is this the end user" flag onto a role.
    pub fn from_chat(is_user: bool, text: impl Into<String>) -> Self {
        if is_user {
            Self::user(text)
        } else {
            Self::assistant(text)
        }
    }

    pub fn user_with_media(text: impl Into<String>, media: InlineMedia) -> Self {
        Self {
            role: Role::User,
            content: TurnContent::Media {
                text: text.into(),
                media,
            },
        }
    }
}

/// Knobs shared by every task-specific orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOptions {
    /// Overrides the provider's default model when set.
    pub model: Option<String>,
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

impl GenerationOptions {
    pub fn new(max_output_tokens: u32, temperature: f32, timeout_secs: u64) -> Self {
        Self {
            model: None,
            max_output_tokens,
            temperature,
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}

/// One immutable completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub provider_kind: ProviderKind,
    pub model: Option<String>,
    pub system_instruction: String,
    pub turns: Vec<Turn>,
    pub max_output_tokens: u32,
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(
        provider_kind: ProviderKind,
        system_instruction: impl Into<String>,
        turns: Vec<Turn>,
        options: &GenerationOptions,
    ) -> Self {
        Self {
            provider_kind,
            model: options.model.clone(),
            system_instruction: system_instruction.into(),
            turns,
            max_output_tokens: options.max_output_tokens,
            temperature: options.temperature.clamp(0.0, 1.0),
        }
    }

    pub fn text(system_instruction: impl Into<String>, turns: Vec<Turn>, options: &GenerationOptions) -> Self {
        Self::new(ProviderKind::Text, system_instruction, turns, options)
    }

    pub fn vision(turn: Turn, options: &GenerationOptions) -> Self {
        Self::new(ProviderKind::Vision, String::new(), vec![turn], options)
    }
}
