use crate::providers::gemini::{GeminiConfig, GEMINI_API_BASE};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_FAST_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_QUALITY_MODEL: &str = "gemini-2.5-pro";

/// Client-side settings for the generation client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    pub api_base: String,

    /// Model for scripts, outlines, suggestions, extraction and visual prompts
    pub fast_model: String,

    /// Model for revisions, outline parts and scene summaries
    pub quality_model: String,

    /// Per-call deadline in seconds
    pub request_timeout_secs: u64,

    pub temperature: f32,

    /// Second language visual prompts and scene summaries are written in
    pub translation_language: String,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            api_base: GEMINI_API_BASE.to_string(),
            fast_model: DEFAULT_FAST_MODEL.to_string(),
            quality_model: DEFAULT_QUALITY_MODEL.to_string(),
            request_timeout_secs: 120,
            temperature: 0.7,
            translation_language: "Vietnamese".to_string(),
        }
    }
}

impl StudioConfig {
    pub fn with_api_base(mut self, url: impl Into<String>) -> Self {
        self.api_base = url.into();
        self
    }

    pub fn with_models(mut self, fast: impl Into<String>, quality: impl Into<String>) -> Self {
        self.fast_model = fast.into();
        self.quality_model = quality.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    pub fn with_translation_language(mut self, language: impl Into<String>) -> Self {
        self.translation_language = language.into();
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn gemini(&self) -> GeminiConfig {
        GeminiConfig {
            api_base: self.api_base.clone(),
            ..Default::default()
        }
    }

    /// Apply `SCRIPTGEN_*` environment overrides on top of the current values.
    pub fn apply_env(mut self) -> Self {
        self.apply_overrides(|name| std::env::var(name).ok());
        self
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        if let Some(base) = get("SCRIPTGEN_API_BASE") {
            self.api_base = base;
        }
        if let Some(model) = get("SCRIPTGEN_FAST_MODEL") {
            self.fast_model = model;
        }
        if let Some(model) = get("SCRIPTGEN_QUALITY_MODEL") {
            self.quality_model = model;
        }
        if let Some(secs) = get("SCRIPTGEN_TIMEOUT_SECS") {
            match secs.parse::<u64>() {
                Ok(secs) => self.request_timeout_secs = secs,
                Err(_) => tracing::warn!(
                    target: "scriptgen",
                    "ignoring SCRIPTGEN_TIMEOUT_SECS={secs}: not a number of seconds"
                ),
            }
        }
    }

    /// Save configuration to JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write config {}", path.display()))?;
        Ok(())
    }

    /// Load configuration from JSON
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = serde_json::from_str(&json)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("studio.json");
        let config = StudioConfig::default()
            .with_timeout(30)
            .with_translation_language("English");
        config.save(&path).unwrap();
        assert_eq!(StudioConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: StudioConfig = serde_json::from_str(r#"{"fast_model":"tiny"}"#).unwrap();
        assert_eq!(config.fast_model, "tiny");
        assert_eq!(config.quality_model, DEFAULT_QUALITY_MODEL);
        assert_eq!(config.request_timeout_secs, 120);
    }

    #[test]
    fn env_overrides_apply() {
        let vars: HashMap<&str, &str> = [
            ("SCRIPTGEN_API_BASE", "http://127.0.0.1:8080"),
            ("SCRIPTGEN_QUALITY_MODEL", " big "),
            ("SCRIPTGEN_TIMEOUT_SECS", "oops"),
        ]
        .into_iter()
        .collect();
        let mut config = StudioConfig::default();
        config.apply_overrides(|name| vars.get(name).map(|v| v.to_string()));
        assert_eq!(config.api_base, "http://127.0.0.1:8080");
        assert_eq!(config.quality_model, "big");
        assert_eq!(config.fast_model, DEFAULT_FAST_MODEL);
        assert_eq!(config.request_timeout_secs, 120);
    }
}
