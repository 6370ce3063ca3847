use super::{CompletionRequest, LlmProvider, ProviderKind};
use crate::error::ProviderError;
use crate::models::{Completion, LlmResponseTelemetry};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::Duration;

enum MockReply {
    Text(String),
    Fail(ProviderError),
}

/// Scripted provider: replies are served in push order, every call is recorded.
#[derive(Default)]
pub struct MockProvider {
    replies: Mutex<VecDeque<MockReply>>,
    fallback: Option<String>,
    delay: Option<Duration>,
    calls: Mutex<Vec<(String, CompletionRequest)>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply used once the scripted queue is empty.
    pub fn with_fallback(mut self, text: impl Into<String>) -> Self {
        self.fallback = Some(text.into());
        self
    }

    /// Sleep before answering, to exercise deadlines.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn push_text(&self, text: impl Into<String>) -> &Self {
        self.replies.lock().push_back(MockReply::Text(text.into()));
        self
    }

    pub fn push_error(&self, error: ProviderError) -> &Self {
        self.replies.lock().push_back(MockReply::Fail(error));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.calls.lock().iter().map(|(_, r)| r.clone()).collect()
    }

    pub fn credentials_used(&self) -> Vec<String> {
        self.calls.lock().iter().map(|(c, _)| c.clone()).collect()
    }
}

#[async_trait::async_trait]
impl LlmProvider for MockProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Mock
    }

    async fn complete(
        &self,
        credential: &str,
        request: &CompletionRequest,
    ) -> Result<Completion, ProviderError> {
        self.calls
            .lock()
            .push((credential.to_string(), request.clone()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let reply = self.replies.lock().pop_front();
        let text = match reply {
            Some(MockReply::Text(text)) => text,
            Some(MockReply::Fail(err)) => return Err(err),
            None => self.fallback.clone().ok_or_else(|| {
                ProviderError::Transport(format!(
                    "Could not {}. Details: mock provider has no scripted reply.",
                    request.operation
                ))
            })?,
        };
        Ok(Completion {
            text,
            telemetry: LlmResponseTelemetry {
                model: request.model.clone(),
                ..Default::default()
            },
        })
    }
}
