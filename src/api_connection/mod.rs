pub mod connection;
pub mod endpoints;
pub mod fake;
pub mod request;

pub use connection::{CompletionClient, CompletionError, HttpCompletionClient};
pub use fake::FakeCompletionClient;
pub use request::{
    CompletionRequest, GenerationOptions, InlineMedia, ProviderKind, Role, Turn, TurnContent,
};
