//! Language-model providers.
//!
//! A provider performs exactly one "complete this instruction" round trip,
//! optionally constrained to a JSON schema. Everything task-specific lives in
//! [`crate::client::GenerationClient`].

pub mod gemini;
pub mod mock;

use crate::error::ProviderError;
use crate::models::Completion;
use serde_json::Value;

pub use gemini::{GeminiConfig, GeminiProvider};
pub use mock::MockProvider;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProviderKind {
    Gemini,
    Mock,
}

impl ProviderKind {
    pub fn as_str(&self) -> &str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::Mock => "mock",
        }
    }
}

#[derive(Clone, Debug)]
pub struct CompletionRequest {
    /// Human-readable task name, used in error messages and logs.
    pub operation: &'static str,
    pub model: String,
    pub instruction: String,
    /// When set, the response must be JSON matching this schema.
    pub response_schema: Option<Value>,
    pub temperature: f32,
}

#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    async fn complete(
        &self,
        credential: &str,
        request: &CompletionRequest,
    ) -> Result<Completion, ProviderError>;
}
