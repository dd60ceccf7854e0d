//! Scripted completion client.
//!
//! Responses are matched by provider kind and a substring of the prompt, so
//! orchestrators can be driven end to end without network access.

use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

use super::connection::{CompletionClient, CompletionError};
use super::request::{CompletionRequest, ProviderKind};

struct Scripted {
    kind: ProviderKind,
    needle: String,
    outcome: Result<String, u16>,
}

#[derive(Default)]
pub struct FakeCompletionClient {
    scripted: Vec<Scripted>,
    calls: Mutex<Vec<CompletionRequest>>,
}

impl FakeCompletionClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers any `kind` call whose prompt contains `needle` (case-insensitive).
    pub fn respond(mut self, kind: ProviderKind, needle: &str, text: &str) -> Self {
        self.scripted.push(Scripted {
            kind,
            needle: needle.to_lowercase(),
            outcome: Ok(text.to_string()),
        });
        self
    }

    /// Fails matching calls with a provider error carrying `status`.
    pub fn fail(mut self, kind: ProviderKind, needle: &str, status: u16) -> Self {
        self.scripted.push(Scripted {
            kind,
            needle: needle.to_lowercase(),
            outcome: Err(status),
        });
        self
    }

    pub fn calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self, kind: ProviderKind) -> usize {
        self.calls()
            .iter()
            .filter(|request| request.provider_kind == kind)
            .count()
    }
}

fn prompt_text(request: &CompletionRequest) -> String {
    let mut text = request.system_instruction.to_lowercase();
    for turn in &request.turns {
        text.push('\n');
        text.push_str(&turn.content.text().to_lowercase());
    }
    text
}

#[async_trait]
impl CompletionClient for FakeCompletionClient {
    async fn complete(
        &self,
        request: CompletionRequest,
        _timeout: Duration,
    ) -> Result<String, CompletionError> {
        let prompt = prompt_text(&request);
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(request.clone());
        }

        let hit = self
            .scripted
            .iter()
            .find(|s| s.kind == request.provider_kind && prompt.contains(&s.needle));

        match hit.map(|s| &s.outcome) {
            Some(Ok(text)) => Ok(text.clone()),
            Some(Err(status)) => Err(CompletionError::ProviderError {
                status: reqwest::StatusCode::from_u16(*status)
                    .unwrap_or(reqwest::StatusCode::INTERNAL_SERVER_ERROR),
                body: "scripted failure".to_string(),
            }),
            None => Err(CompletionError::MalformedProviderResponse(format!(
                "no scripted response for {:?} prompt: {}",
                request.provider_kind,
                prompt.chars().take(100).collect::<String>()
            ))),
        }
    }
}
