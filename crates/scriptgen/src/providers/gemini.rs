use super::{CompletionRequest, LlmProvider, ProviderKind};
use crate::error::ProviderError;
use crate::models::{Completion, LlmResponseTelemetry};
use serde::Deserialize;
use serde_json::json;
use std::time::{Duration, Instant};

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";

const BLOCKING_FINISH_REASONS: &[&str] = &["SAFETY", "PROHIBITED_CONTENT", "BLOCKLIST", "SPII"];

#[derive(Clone, Debug)]
pub struct GeminiConfig {
    pub api_base: String,
    pub connect_timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_base: GEMINI_API_BASE.to_string(),
            connect_timeout: Duration::from_secs(20),
        }
    }
}

pub struct GeminiProvider {
    config: GeminiConfig,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(config: GeminiConfig) -> Result<Self, ProviderError> {
        if config.api_base.trim().is_empty() {
            return Err(ProviderError::Transport(
                "Gemini API base URL is required.".to_string(),
            ));
        }
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|err| ProviderError::Transport(format!("Gemini client setup failed: {err}")))?;
        Ok(Self { config, client })
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            model.trim()
        )
    }

    fn payload(request: &CompletionRequest) -> serde_json::Value {
        let mut generation_config = json!({ "temperature": request.temperature });
        if let Some(schema) = &request.response_schema {
            generation_config["responseMimeType"] = json!("application/json");
            generation_config["responseSchema"] = schema.clone();
        }
        json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": request.instruction }]
            }],
            "generationConfig": generation_config,
        })
    }
}

#[async_trait::async_trait]
impl LlmProvider for GeminiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    async fn complete(
        &self,
        credential: &str,
        request: &CompletionRequest,
    ) -> Result<Completion, ProviderError> {
        let operation = request.operation;
        let start = Instant::now();
        let response = self
            .client
            .post(self.endpoint(&request.model))
            .header("Accept", "application/json")
            .header("x-goog-api-key", credential.trim())
            .json(&Self::payload(request))
            .send()
            .await
            .map_err(|err| {
                ProviderError::classify(
                    operation,
                    err.status().map(|s| s.as_u16()),
                    &err.to_string(),
                )
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|err| {
            ProviderError::classify(operation, None, &format!("read response failed: {err}"))
        })?;
        let elapsed = start.elapsed();

        if !status.is_success() {
            let detail = serde_json::from_str::<GeminiErrorEnvelope>(&body)
                .map(|env| format!("{}: {}", env.error.status, env.error.message))
                .unwrap_or(body);
            tracing::warn!(
                target: "scriptgen",
                operation,
                model = %request.model,
                status = status.as_u16(),
                "Gemini request failed after {:.2?}",
                elapsed
            );
            return Err(ProviderError::classify(
                operation,
                Some(status.as_u16()),
                &detail,
            ));
        }

        let parsed: GeminiResponse = serde_json::from_str(&body)
            .map_err(|err| ProviderError::malformed(operation, format!("invalid JSON: {err}")))?;
        if let Some(reason) = parsed
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            tracing::warn!(target: "scriptgen", operation, reason, "prompt blocked");
            return Err(ProviderError::blocked(operation));
        }
        let candidate = parsed
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::malformed(operation, "no candidates"))?;
        if candidate
            .finish_reason
            .as_deref()
            .map_or(false, |r| BLOCKING_FINISH_REASONS.contains(&r))
        {
            return Err(ProviderError::blocked(operation));
        }
        let text = candidate
            .content
            .and_then(|c| c.parts)
            .map(|parts| {
                parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();
        if text.trim().is_empty() {
            return Err(ProviderError::malformed(operation, "empty response"));
        }

        let usage = parsed.usage_metadata.unwrap_or_default();
        let telemetry = LlmResponseTelemetry {
            model: request.model.clone(),
            input_tokens: usage.prompt_token_count,
            output_tokens: usage.candidates_token_count,
            total_tokens: usage.total_token_count,
            latency: Some(elapsed),
        };
        Ok(Completion { text, telemetry })
    }
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default, rename = "promptFeedback")]
    prompt_feedback: Option<GeminiPromptFeedback>,
    #[serde(default, rename = "usageMetadata")]
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
    #[serde(default, rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Option<Vec<GeminiPart>>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiPromptFeedback {
    #[serde(default, rename = "blockReason")]
    block_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct GeminiUsage {
    #[serde(default, rename = "promptTokenCount")]
    prompt_token_count: Option<u32>,
    #[serde(default, rename = "candidatesTokenCount")]
    candidates_token_count: Option<u32>,
    #[serde(default, rename = "totalTokenCount")]
    total_token_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorEnvelope {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(schema: Option<serde_json::Value>) -> CompletionRequest {
        CompletionRequest {
            operation: "generate script",
            model: "gemini-2.5-flash".to_string(),
            instruction: "Write about tides.".to_string(),
            response_schema: schema,
            temperature: 0.7,
        }
    }

    #[test]
    fn endpoint_trims_base_and_model() {
        let provider = GeminiProvider::new(GeminiConfig {
            api_base: "http://localhost:9999/".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            provider.endpoint(" gemini-2.5-pro "),
            "http://localhost:9999/v1beta/models/gemini-2.5-pro:generateContent"
        );
    }

    #[test]
    fn payload_includes_schema_only_when_requested() {
        let plain = GeminiProvider::payload(&request(None));
        assert!(plain["generationConfig"].get("responseSchema").is_none());
        assert_eq!(plain["contents"][0]["parts"][0]["text"], "Write about tides.");

        let structured = GeminiProvider::payload(&request(Some(json!({ "type": "ARRAY" }))));
        assert_eq!(structured["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(structured["generationConfig"]["responseSchema"]["type"], "ARRAY");
    }

    #[test]
    fn error_envelope_parses() {
        let body = r#"{"error":{"code":429,"message":"Quota exceeded for metric","status":"RESOURCE_EXHAUSTED"}}"#;
        let env: GeminiErrorEnvelope = serde_json::from_str(body).unwrap();
        assert_eq!(env.error.status, "RESOURCE_EXHAUSTED");
    }

    #[test]
    fn empty_base_is_rejected() {
        let result = GeminiProvider::new(GeminiConfig {
            api_base: " ".to_string(),
            ..Default::default()
        });
        assert!(result.is_err());
    }
}
