//! Typed wrapper around the language-model provider, one method per task.
//!
//! The client holds no mutable state. The active credential is looked up on
//! every call so a key added or removed in the settings takes effect
//! immediately, and every call is bounded by the configured deadline.

use crate::config::StudioConfig;
use crate::credentials::CredentialSource;
use crate::error::ProviderError;
use crate::models::{Idea, SceneVisualPrompt, ScriptPartSummary, StyleSuggestion, VisualPrompt};
use crate::outline::outline_banner;
use crate::params::{GenerationParameters, Style, Tone, Voice};
use crate::prompts::{self, PartRequest};
use crate::providers::{CompletionRequest, GeminiProvider, LlmProvider};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone, Copy)]
enum ModelTier {
    Fast,
    Quality,
}

#[derive(Clone)]
pub struct GenerationClient {
    provider: Arc<dyn LlmProvider>,
    credentials: Arc<dyn CredentialSource>,
    config: StudioConfig,
}

impl GenerationClient {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        credentials: Arc<dyn CredentialSource>,
        config: StudioConfig,
    ) -> Self {
        Self {
            provider,
            credentials,
            config,
        }
    }

    /// Client backed by the Gemini REST API.
    pub fn gemini(
        config: StudioConfig,
        credentials: Arc<dyn CredentialSource>,
    ) -> Result<Self, ProviderError> {
        let provider = GeminiProvider::new(config.gemini())?;
        Ok(Self::new(Arc::new(provider), credentials, config))
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    fn model(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Fast => &self.config.fast_model,
            ModelTier::Quality => &self.config.quality_model,
        }
    }

    fn request(
        &self,
        operation: &'static str,
        tier: ModelTier,
        instruction: String,
        response_schema: Option<Value>,
    ) -> CompletionRequest {
        CompletionRequest {
            operation,
            model: self.model(tier).to_string(),
            instruction,
            response_schema,
            temperature: self.config.temperature,
        }
    }

    async fn call(&self, request: CompletionRequest) -> Result<String, ProviderError> {
        let credential = self
            .credentials
            .active_credential()
            .filter(|c| !c.trim().is_empty())
            .ok_or(ProviderError::CredentialMissing)?;
        self.call_with(&credential, request).await
    }

    async fn call_with(
        &self,
        credential: &str,
        request: CompletionRequest,
    ) -> Result<String, ProviderError> {
        let deadline = self.config.request_timeout();
        let operation = request.operation;
        tracing::debug!(
            target: "scriptgen",
            operation,
            provider = self.provider.kind().as_str(),
            model = %request.model,
            "sending request"
        );
        match tokio::time::timeout(deadline, self.provider.complete(credential, &request)).await {
            Ok(Ok(completion)) => {
                tracing::info!(
                    target: "scriptgen",
                    operation,
                    model = %completion.telemetry.model,
                    input_tokens = ?completion.telemetry.input_tokens,
                    output_tokens = ?completion.telemetry.output_tokens,
                    latency = ?completion.telemetry.latency,
                    "request completed"
                );
                Ok(completion.text)
            }
            Ok(Err(err)) => {
                tracing::warn!(target: "scriptgen", operation, "request failed: {err}");
                Err(err)
            }
            Err(_) => {
                tracing::warn!(
                    target: "scriptgen",
                    operation,
                    "request timed out after {deadline:?}"
                );
                Err(ProviderError::timed_out(operation, deadline.as_secs()))
            }
        }
    }

    async fn call_json<T: DeserializeOwned>(
        &self,
        request: CompletionRequest,
    ) -> Result<T, ProviderError> {
        let operation = request.operation;
        let text = self.call(request).await?;
        parse_json(operation, &text)
    }

    pub async fn generate_script(
        &self,
        params: &GenerationParameters,
    ) -> Result<String, ProviderError> {
        let request = self.request(
            "generate script",
            ModelTier::Fast,
            prompts::direct_script_prompt(params),
            None,
        );
        self.call(request).await
    }

    /// The returned outline starts with the outline banner.
    pub async fn generate_outline(
        &self,
        params: &GenerationParameters,
    ) -> Result<String, ProviderError> {
        let request = self.request(
            "generate outline",
            ModelTier::Fast,
            prompts::outline_prompt(params),
            None,
        );
        let body = self.call(request).await?;
        Ok(format!(
            "{}{}",
            outline_banner(params.resolved_word_count()),
            body.trim()
        ))
    }

    pub async fn generate_part(&self, part: &PartRequest<'_>) -> Result<String, ProviderError> {
        let request = self.request(
            "generate script part",
            ModelTier::Quality,
            prompts::part_prompt(part),
            None,
        );
        self.call(request).await
    }

    pub async fn revise_script(
        &self,
        script: &str,
        instruction: &str,
        params: &GenerationParameters,
    ) -> Result<String, ProviderError> {
        let request = self.request(
            "revise script",
            ModelTier::Quality,
            prompts::revision_prompt(script, instruction, params),
            None,
        );
        self.call(request).await
    }

    pub async fn extract_dialogue(
        &self,
        script: &str,
        language: &str,
    ) -> Result<String, ProviderError> {
        let request = self.request(
            "extract dialogue",
            ModelTier::Fast,
            prompts::dialogue_prompt(script, language),
            None,
        );
        self.call(request).await
    }

    pub async fn visual_prompt(&self, scene: &str) -> Result<VisualPrompt, ProviderError> {
        const OPERATION: &str = "generate visual prompt";
        let request = self.request(
            OPERATION,
            ModelTier::Fast,
            prompts::visual_prompt_prompt(scene, &self.config.translation_language),
            Some(prompts::visual_prompt_schema()),
        );
        let prompt: VisualPrompt = self.call_json(request).await?;
        if prompt.english.trim().is_empty() {
            return Err(ProviderError::malformed(OPERATION, "empty english prompt"));
        }
        Ok(prompt)
    }

    pub async fn all_visual_prompts(
        &self,
        script: &str,
    ) -> Result<Vec<SceneVisualPrompt>, ProviderError> {
        const OPERATION: &str = "generate visual prompts";
        let request = self.request(
            OPERATION,
            ModelTier::Fast,
            prompts::all_visual_prompts_prompt(script, &self.config.translation_language),
            Some(prompts::all_visual_prompts_schema()),
        );
        let batch: Vec<SceneVisualPrompt> = self.call_json(request).await?;
        if batch.iter().any(|p| p.scene.trim().is_empty()) {
            return Err(ProviderError::malformed(OPERATION, "entry without scene text"));
        }
        Ok(batch)
    }

    pub async fn scene_summaries(
        &self,
        script: &str,
    ) -> Result<Vec<ScriptPartSummary>, ProviderError> {
        let request = self.request(
            "summarize scenes",
            ModelTier::Quality,
            prompts::scene_summaries_prompt(script, &self.config.translation_language),
            Some(prompts::scene_summaries_schema()),
        );
        self.call_json(request).await
    }

    /// Ten title ideas around a theme; blank input yields no suggestions.
    pub async fn suggest_topics(
        &self,
        theme: &str,
        language: &str,
    ) -> Result<Vec<String>, ProviderError> {
        if theme.trim().is_empty() {
            return Ok(Vec::new());
        }
        let request = self.request(
            "suggest topics",
            ModelTier::Fast,
            prompts::topic_suggestions_prompt(theme, language),
            Some(prompts::string_list_schema(
                "topics",
                "Engaging video titles.",
            )),
        );
        let list: TopicList = self.call_json(request).await?;
        Ok(clean_list(list.topics))
    }

    pub async fn suggest_keywords(
        &self,
        topic: &str,
        language: &str,
    ) -> Result<Vec<String>, ProviderError> {
        if topic.trim().is_empty() {
            return Ok(Vec::new());
        }
        let request = self.request(
            "suggest keywords",
            ModelTier::Fast,
            prompts::keyword_suggestions_prompt(topic, language),
            Some(prompts::string_list_schema(
                "keywords",
                "Search-friendly keywords.",
            )),
        );
        let list: KeywordList = self.call_json(request).await?;
        Ok(clean_list(list.keywords))
    }

    /// Tone, style and voice picked from the closed sets; anything else is malformed.
    pub async fn suggest_style_options(
        &self,
        topic: &str,
    ) -> Result<StyleSuggestion, ProviderError> {
        const OPERATION: &str = "suggest a style";
        let request = self.request(
            OPERATION,
            ModelTier::Fast,
            prompts::style_suggestions_prompt(topic),
            Some(prompts::style_schema()),
        );
        let raw: RawStyle = self.call_json(request).await?;
        Ok(StyleSuggestion {
            tone: raw
                .tone
                .parse::<Tone>()
                .map_err(|e| ProviderError::malformed(OPERATION, e))?,
            style: raw
                .style
                .parse::<Style>()
                .map_err(|e| ProviderError::malformed(OPERATION, e))?,
            voice: raw
                .voice
                .parse::<Voice>()
                .map_err(|e| ProviderError::malformed(OPERATION, e))?,
        })
    }

    /// One cheap round trip with the given key, independent of the stored keys.
    pub async fn validate_credential(&self, credential: &str) -> Result<(), ProviderError> {
        let credential = credential.trim();
        if credential.is_empty() {
            return Err(ProviderError::CredentialMissing);
        }
        let request = self.request(
            "validate API key",
            ModelTier::Fast,
            prompts::VALIDATION_PROMPT.to_string(),
            None,
        );
        self.call_with(credential, request).await.map(|_| ())
    }

    pub async fn parse_ideas(&self, text: &str) -> Result<Vec<Idea>, ProviderError> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        let request = self.request(
            "parse ideas",
            ModelTier::Fast,
            prompts::ideas_prompt(text),
            Some(prompts::ideas_schema()),
        );
        let list: IdeaList = self.call_json(request).await?;
        Ok(list
            .ideas
            .into_iter()
            .filter(|idea| !idea.title.trim().is_empty())
            .map(|idea| Idea {
                title: idea.title.trim().to_string(),
                outline: idea.outline.trim().to_string(),
            })
            .collect())
    }
}

#[derive(Deserialize)]
struct TopicList {
    topics: Vec<String>,
}

#[derive(Deserialize)]
struct KeywordList {
    keywords: Vec<String>,
}

#[derive(Deserialize)]
struct IdeaList {
    ideas: Vec<Idea>,
}

#[derive(Deserialize)]
struct RawStyle {
    tone: String,
    style: String,
    voice: String,
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse a structured reply, tolerating a surrounding markdown code fence.
fn parse_json<T: DeserializeOwned>(operation: &str, text: &str) -> Result<T, ProviderError> {
    let mut body = text.trim();
    if let Some(rest) = body.strip_prefix("```") {
        let rest = rest.strip_prefix("json").unwrap_or(rest);
        body = rest.strip_suffix("```").unwrap_or(rest).trim();
    }
    serde_json::from_str(body).map_err(|err| ProviderError::malformed(operation, err))
}
