//! Derived-artifact cache, scoped to one script value.
//!
//! Four stores: single visual prompts keyed by exact scene text, the whole
//! visual-prompt batch, scene summaries and extracted dialogue. The owner
//! clears all of them whenever the script changes.

use crate::models::{SceneVisualPrompt, ScriptPartSummary, VisualPrompt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Storage behind the derived-artifact lookups. Keys are opaque strings so a
/// content-hash keyed implementation can replace [`SceneTextCache`].
pub trait ArtifactCache: Send + Sync {
    fn invalidate_all(&mut self);

    fn visual_prompt(&self, scene: &str) -> Option<VisualPrompt>;
    fn store_visual_prompt(&mut self, scene: &str, prompt: VisualPrompt);

    fn visual_prompt_batch(&self) -> Option<Vec<SceneVisualPrompt>>;
    fn store_visual_prompt_batch(&mut self, batch: Vec<SceneVisualPrompt>);

    fn scene_summaries(&self) -> Option<Vec<ScriptPartSummary>>;
    fn store_scene_summaries(&mut self, summaries: Vec<ScriptPartSummary>);

    fn dialogue(&self) -> Option<String>;
    fn store_dialogue(&mut self, dialogue: String);

    fn snapshot(&self) -> CachedArtifacts;
    fn restore(&mut self, snapshot: CachedArtifacts);

    fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }
}

/// Serialized form stored with a library item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CachedArtifacts {
    pub visual_prompts: HashMap<String, VisualPrompt>,
    pub all_visual_prompts: Option<Vec<SceneVisualPrompt>>,
    pub summaries: Option<Vec<ScriptPartSummary>>,
    pub extracted_dialogue: Option<String>,
}

impl CachedArtifacts {
    pub fn is_empty(&self) -> bool {
        self.visual_prompts.is_empty()
            && self.all_visual_prompts.is_none()
            && self.summaries.is_none()
            && self.extracted_dialogue.is_none()
    }
}

/// Keys single prompts by the exact scene text, whitespace included.
#[derive(Debug, Clone, Default)]
pub struct SceneTextCache {
    artifacts: CachedArtifacts,
}

impl SceneTextCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ArtifactCache for SceneTextCache {
    fn invalidate_all(&mut self) {
        self.artifacts = CachedArtifacts::default();
    }

    fn visual_prompt(&self, scene: &str) -> Option<VisualPrompt> {
        self.artifacts.visual_prompts.get(scene).cloned()
    }

    fn store_visual_prompt(&mut self, scene: &str, prompt: VisualPrompt) {
        self.artifacts
            .visual_prompts
            .insert(scene.to_string(), prompt);
    }

    fn visual_prompt_batch(&self) -> Option<Vec<SceneVisualPrompt>> {
        self.artifacts.all_visual_prompts.clone()
    }

    fn store_visual_prompt_batch(&mut self, batch: Vec<SceneVisualPrompt>) {
        self.artifacts.all_visual_prompts = Some(batch);
    }

    fn scene_summaries(&self) -> Option<Vec<ScriptPartSummary>> {
        self.artifacts.summaries.clone()
    }

    fn store_scene_summaries(&mut self, summaries: Vec<ScriptPartSummary>) {
        self.artifacts.summaries = Some(summaries);
    }

    fn dialogue(&self) -> Option<String> {
        self.artifacts.extracted_dialogue.clone()
    }

    fn store_dialogue(&mut self, dialogue: String) {
        self.artifacts.extracted_dialogue = Some(dialogue);
    }

    fn snapshot(&self) -> CachedArtifacts {
        self.artifacts.clone()
    }

    fn restore(&mut self, snapshot: CachedArtifacts) {
        self.artifacts = snapshot;
    }

    fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

/// Overlay single-scene prompts onto a batch. A single prompt for the same
/// scene always wins over the batch entry.
pub fn reconcile(batch: &[SceneVisualPrompt], cache: &dyn ArtifactCache) -> Vec<SceneVisualPrompt> {
    batch
        .iter()
        .map(|entry| match cache.visual_prompt(&entry.scene) {
            Some(single) => SceneVisualPrompt {
                scene: entry.scene.clone(),
                english: single.english,
                translation: single.translation,
            },
            None => entry.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt(english: &str) -> VisualPrompt {
        VisualPrompt {
            english: english.to_string(),
            translation: format!("vi: {english}"),
        }
    }

    fn entry(scene: &str, english: &str) -> SceneVisualPrompt {
        SceneVisualPrompt {
            scene: scene.to_string(),
            english: english.to_string(),
            translation: String::new(),
        }
    }

    #[test]
    fn keys_are_exact_text() {
        let mut cache = SceneTextCache::new();
        cache.store_visual_prompt("## Scene 1\nRain.", prompt("rain"));
        assert!(cache.visual_prompt("## Scene 1\nRain.").is_some());
        assert!(cache.visual_prompt("## Scene 1\nRain. ").is_none());
    }

    #[test]
    fn invalidate_clears_every_store() {
        let mut cache = SceneTextCache::new();
        cache.store_visual_prompt("a", prompt("a"));
        cache.store_visual_prompt_batch(vec![entry("a", "a")]);
        cache.store_scene_summaries(Vec::new());
        cache.store_dialogue("hi".to_string());
        assert!(!cache.is_empty());
        cache.invalidate_all();
        assert!(cache.is_empty());
        assert!(cache.scene_summaries().is_none());
    }

    #[test]
    fn single_prompt_overrides_batch() {
        let mut cache = SceneTextCache::new();
        cache.store_visual_prompt("scene one", prompt("fresh"));
        let merged = reconcile(&[entry("scene one", "old"), entry("scene two", "batch")], &cache);
        assert_eq!(merged[0].english, "fresh");
        assert_eq!(merged[0].translation, "vi: fresh");
        assert_eq!(merged[1].english, "batch");
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let mut cache = SceneTextCache::new();
        cache.store_dialogue("spoken words".to_string());
        let json = serde_json::to_string(&cache.snapshot()).unwrap();
        assert!(json.contains("extractedDialogue"));

        let mut restored = SceneTextCache::new();
        restored.restore(serde_json::from_str(&json).unwrap());
        assert_eq!(restored.dialogue().as_deref(), Some("spoken words"));
        // older snapshots may lack fields entirely
        let empty: CachedArtifacts = serde_json::from_str("{}").unwrap();
        assert!(empty.is_empty());
    }
}
