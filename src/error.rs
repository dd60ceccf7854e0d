use thiserror::Error;

use crate::api_connection::CompletionError;
use crate::orchestrator::{Stage, Task};
use crate::response_parser::ParseError;
use crate::store::StoreError;

/// What broke inside a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineFailure {
    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum GenerationError {
    /// The caller's request is missing something or malformed.
    #[error("{0}")]
    InvalidInput(String),

    #[error("{task} failed while {stage}: {source}")]
    Failed {
        task: Task,
        stage: Stage,
        #[source]
        source: PipelineFailure,
    },
}

impl GenerationError {
    pub fn invalid(message: impl Into<String>) -> Self {
        GenerationError::InvalidInput(message.into())
    }

    /// 4xx for caller mistakes, 5xx for everything the pipeline itself failed at.
    pub fn status_code(&self) -> u16 {
        match self {
            GenerationError::InvalidInput(_) => 400,
            GenerationError::Failed { source, .. } => match source {
                PipelineFailure::Completion(CompletionError::Timeout { .. }) => 504,
                PipelineFailure::Completion(CompletionError::MissingApiKey(_)) => 500,
                PipelineFailure::Completion(_) => 502,
                PipelineFailure::Parse(_) => 502,
                PipelineFailure::Store(StoreError::NotFound(_)) => 404,
                PipelineFailure::Store(_) => 500,
            },
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            GenerationError::InvalidInput(message) => message.clone(),
            GenerationError::Failed { task, source, .. } => match source {
                // Response body only goes to the logs.
                PipelineFailure::Completion(CompletionError::ProviderError { status, .. }) => {
                    format!("{task} failed: provider error {status}")
                }
                _ => format!("{task} failed: {source}"),
            },
        }
    }
}
