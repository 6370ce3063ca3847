use crate::params::{Style, Tone, Voice};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Image/video generator prompt for one scene, with a translation for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualPrompt {
    pub english: String,
    pub translation: String,
}

/// One entry of a whole-script visual prompt batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneVisualPrompt {
    /// Original text of the scene, also the single-prompt cache key.
    pub scene: String,
    pub english: String,
    pub translation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneSummary {
    pub scene_number: u32,
    pub summary: String,
    pub visual_prompt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptPartSummary {
    pub part_title: String,
    pub scenes: Vec<SceneSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleSuggestion {
    pub tone: Tone,
    pub style: Style,
    pub voice: Voice,
}

/// A video idea recovered from free-form notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Idea {
    pub title: String,
    #[serde(default)]
    pub outline: String,
}

#[derive(Clone, Debug, Default)]
pub struct LlmResponseTelemetry {
    pub model: String,
    pub input_tokens: Option<u32>,
    pub output_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
    pub latency: Option<Duration>,
}

/// Raw completion returned by a provider.
#[derive(Clone, Debug, Default)]
pub struct Completion {
    pub text: String,
    pub telemetry: LlmResponseTelemetry,
}
