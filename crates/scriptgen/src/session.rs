//! One open script document and every transition that changes it.
//!
//! The script text and its derived-artifact cache sit behind a single lock so
//! that replacing the script and clearing the cache happen together. The lock
//! is never held across a provider call: each operation snapshots what it
//! needs, awaits the client, then re-locks to apply the result. A result
//! computed from a script that has since changed is returned to the caller but
//! never written into the cache.

use crate::busy::{BusyGate, Feature};
use crate::cache::{reconcile, ArtifactCache, CachedArtifacts, SceneTextCache};
use crate::client::GenerationClient;
use crate::error::{Result, ScriptError};
use crate::library::{Library, LibraryItem};
use crate::models::{Idea, SceneVisualPrompt, ScriptPartSummary, StyleSuggestion, VisualPrompt};
use crate::outline::{decide_generation_mode, split_outline_into_parts, GenerationMode, ScriptState};
use crate::params::GenerationParameters;
use crate::prompts::PartRequest;
use crate::scenes::{promptable_scenes, word_count_report, WordCountReport};
use crate::sequence::{append_part, PartSequence, SequenceProgress, SequenceState};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

struct Document {
    script: ScriptState,
    params: GenerationParameters,
    cache: Box<dyn ArtifactCache>,
    sequence: PartSequence,
    revision: u32,
    /// Bumped on every script change.
    epoch: u64,
}

impl Document {
    /// Replace the script and drop everything derived from the old one.
    fn replace_script(&mut self, script: ScriptState) {
        self.script = script;
        self.cache.invalidate_all();
        self.epoch += 1;
    }
}

/// Snapshot taken before a derived-artifact call.
struct ScriptSnapshot {
    text: String,
    language: String,
    epoch: u64,
}

#[derive(Clone)]
pub struct ScriptSession {
    client: GenerationClient,
    doc: Arc<Mutex<Document>>,
    busy: BusyGate,
}

impl ScriptSession {
    pub fn new(client: GenerationClient) -> Self {
        Self::with_cache(client, Box::new(SceneTextCache::new()))
    }

    pub fn with_cache(client: GenerationClient, cache: Box<dyn ArtifactCache>) -> Self {
        Self {
            client,
            doc: Arc::new(Mutex::new(Document {
                script: ScriptState::Empty,
                params: GenerationParameters::default(),
                cache,
                sequence: PartSequence::default(),
                revision: 0,
                epoch: 0,
            })),
            busy: BusyGate::new(),
        }
    }

    pub fn with_busy_gate(mut self, busy: BusyGate) -> Self {
        self.busy = busy;
        self
    }

    pub fn busy(&self) -> &BusyGate {
        &self.busy
    }

    pub fn client(&self) -> &GenerationClient {
        &self.client
    }

    pub fn script(&self) -> ScriptState {
        self.doc.lock().script.clone()
    }

    pub fn script_text(&self) -> String {
        self.doc.lock().script.text().to_string()
    }

    pub fn parameters(&self) -> GenerationParameters {
        self.doc.lock().params.clone()
    }

    /// Successful revisions since the script was last generated.
    pub fn revision(&self) -> u32 {
        self.doc.lock().revision
    }

    pub fn sequence_state(&self) -> SequenceState {
        self.doc.lock().sequence.state()
    }

    pub fn progress(&self) -> Option<SequenceProgress> {
        self.doc.lock().sequence.progress()
    }

    pub fn cached_artifacts(&self) -> CachedArtifacts {
        self.doc.lock().cache.snapshot()
    }

    /// Generate a script directly, or an outline for long video scripts.
    pub async fn generate(&self, params: GenerationParameters) -> Result<GenerationMode> {
        params.validate()?;
        let _guard = self.busy.try_acquire(Feature::Generate)?;
        let mode = decide_generation_mode(&params);
        {
            let mut doc = self.doc.lock();
            doc.params = params.clone();
            doc.revision = 0;
            doc.sequence = PartSequence::default();
            doc.replace_script(ScriptState::Empty);
        }
        tracing::info!(
            target: "scriptgen",
            title = %params.title,
            words = params.resolved_word_count(),
            ?mode,
            "generating"
        );

        let script = match mode {
            GenerationMode::Direct => {
                ScriptState::Final(self.client.generate_script(&params).await?)
            }
            GenerationMode::Outline => {
                ScriptState::Outline(self.client.generate_outline(&params).await?)
            }
        };
        self.doc.lock().replace_script(script);
        Ok(mode)
    }

    /// Split the current outline and reset the script for part-by-part generation.
    pub fn start_sequential(&self, params: GenerationParameters) -> Result<SequenceProgress> {
        params.validate()?;
        if self.busy.is_busy(Feature::SequentialParts) {
            return Err(ScriptError::Busy(Feature::SequentialParts));
        }
        let mut doc = self.doc.lock();
        let outline = match &doc.script {
            ScriptState::Outline(text) => text.clone(),
            _ => return Err(ScriptError::NoOutline),
        };
        let parts = split_outline_into_parts(&outline)?;
        let sequence = PartSequence::start(parts, params.resolved_word_count())?;
        tracing::info!(
            target: "scriptgen",
            parts = sequence.parts().len(),
            budgets = ?sequence.budgets(),
            "starting sequential generation"
        );
        doc.params = params;
        doc.revision = 0;
        doc.sequence = sequence;
        doc.replace_script(ScriptState::Draft(String::new()));
        doc.sequence.progress().ok_or(ScriptError::NotRunning)
    }

    /// Generate the pending part and append it.
    ///
    /// `cancel` is checked before the call is issued. On failure or
    /// cancellation the sequence goes back to idle and the parts already
    /// appended stay in the script.
    pub async fn generate_next_part(&self, cancel: &CancellationToken) -> Result<SequenceState> {
        let _guard = self.busy.try_acquire(Feature::SequentialParts)?;
        let (outline, previous, current, target_words, params, epoch, index) = {
            let mut doc = self.doc.lock();
            if cancel.is_cancelled() && doc.sequence.is_running() {
                doc.sequence.abandon();
                tracing::info!(target: "scriptgen", "sequential generation cancelled");
                return Err(ScriptError::Cancelled);
            }
            let pending = doc.sequence.pending().ok_or(ScriptError::NotRunning)?;
            (
                doc.sequence.full_outline().to_string(),
                doc.script.text().to_string(),
                pending.outline.to_string(),
                pending.target_words,
                doc.params.clone(),
                doc.epoch,
                pending.index,
            )
        };
        tracing::debug!(target: "scriptgen", part = index + 1, target_words, "generating part");

        let result = self
            .client
            .generate_part(&PartRequest {
                full_outline: &outline,
                previous_script: &previous,
                current_part: &current,
                target_words,
                params: &params,
            })
            .await;

        let mut doc = self.doc.lock();
        if doc.epoch != epoch {
            // the document was replaced while the part was in flight
            return Err(ScriptError::Cancelled);
        }
        match result {
            Ok(part) => {
                let script = append_part(&previous, &part);
                let state = doc.sequence.advance();
                let script = match state {
                    SequenceState::Completed => ScriptState::Final(script),
                    _ => ScriptState::Draft(script),
                };
                doc.replace_script(script);
                Ok(state)
            }
            Err(err) => {
                doc.sequence.abandon();
                tracing::warn!(
                    target: "scriptgen",
                    part = index + 1,
                    "part generation failed: {err}"
                );
                Err(err.into())
            }
        }
    }

    /// Generate every remaining part in outline order, one at a time.
    pub async fn generate_all_parts(&self, cancel: &CancellationToken) -> Result<()> {
        loop {
            match self.generate_next_part(cancel).await? {
                SequenceState::Running { .. } => continue,
                _ => return Ok(()),
            }
        }
    }

    /// Rewrite the whole script following `instruction`. Returns the new revision number.
    pub async fn revise(&self, instruction: &str) -> Result<u32> {
        if instruction.trim().is_empty() {
            return Err(ScriptError::InvalidParameters(
                "describe the change you want".to_string(),
            ));
        }
        let _guard = self.busy.try_acquire(Feature::Revise)?;
        let (script, params, epoch) = {
            let doc = self.doc.lock();
            if doc.sequence.is_running() {
                return Err(ScriptError::Busy(Feature::SequentialParts));
            }
            if doc.script.is_empty() {
                return Err(ScriptError::NothingToProcess);
            }
            (doc.script.text().to_string(), doc.params.clone(), doc.epoch)
        };

        let revised = self
            .client
            .revise_script(&script, instruction, &params)
            .await?;

        let mut doc = self.doc.lock();
        if doc.epoch != epoch {
            return Err(ScriptError::Cancelled);
        }
        doc.revision += 1;
        doc.replace_script(ScriptState::Final(revised));
        tracing::info!(target: "scriptgen", revision = doc.revision, "script revised");
        Ok(doc.revision)
    }

    fn snapshot(&self) -> Result<ScriptSnapshot> {
        let doc = self.doc.lock();
        if doc.script.is_empty() {
            return Err(ScriptError::NothingToProcess);
        }
        Ok(ScriptSnapshot {
            text: doc.script.text().to_string(),
            language: doc.params.language.clone(),
            epoch: doc.epoch,
        })
    }

    /// Store a derived result only if the script it came from is still current.
    fn store_if_current(&self, epoch: u64, store: impl FnOnce(&mut dyn ArtifactCache)) {
        let mut doc = self.doc.lock();
        if doc.epoch == epoch {
            store(doc.cache.as_mut());
        } else {
            tracing::debug!(target: "scriptgen", "script changed, not caching stale result");
        }
    }

    pub async fn extract_dialogue(&self) -> Result<String> {
        let _guard = self.busy.try_acquire(Feature::Dialogue)?;
        let cached = self.doc.lock().cache.dialogue();
        if let Some(dialogue) = cached {
            return Ok(dialogue);
        }
        let snap = self.snapshot()?;
        let dialogue = self
            .client
            .extract_dialogue(&snap.text, &snap.language)
            .await?;
        self.store_if_current(snap.epoch, |cache| cache.store_dialogue(dialogue.clone()));
        Ok(dialogue)
    }

    /// Cached prompt for `scene` (exact text), fetched on a miss.
    pub async fn visual_prompt(&self, scene: &str) -> Result<VisualPrompt> {
        let _guard = self.busy.try_acquire(Feature::VisualPrompt)?;
        let cached = self.doc.lock().cache.visual_prompt(scene);
        if let Some(prompt) = cached {
            return Ok(prompt);
        }
        self.fetch_visual_prompt(scene).await
    }

    /// Fetch a new prompt for `scene`, replacing any cached one.
    pub async fn regenerate_visual_prompt(&self, scene: &str) -> Result<VisualPrompt> {
        let _guard = self.busy.try_acquire(Feature::VisualPrompt)?;
        self.fetch_visual_prompt(scene).await
    }

    async fn fetch_visual_prompt(&self, scene: &str) -> Result<VisualPrompt> {
        if scene.trim().is_empty() {
            return Err(ScriptError::NothingToProcess);
        }
        let epoch = self.snapshot()?.epoch;
        let prompt = self.client.visual_prompt(scene).await?;
        self.store_if_current(epoch, |cache| cache.store_visual_prompt(scene, prompt.clone()));
        Ok(prompt)
    }

    /// Prompts for every section. Single-scene prompts override batch entries.
    pub async fn all_visual_prompts(&self) -> Result<Vec<SceneVisualPrompt>> {
        let _guard = self.busy.try_acquire(Feature::AllVisualPrompts)?;
        {
            let doc = self.doc.lock();
            if let Some(batch) = doc.cache.visual_prompt_batch() {
                return Ok(reconcile(&batch, doc.cache.as_ref()));
            }
        }
        let snap = self.snapshot()?;
        let batch = self.client.all_visual_prompts(&snap.text).await?;

        let mut doc = self.doc.lock();
        if doc.epoch != snap.epoch {
            // single prompts in the cache now belong to a different script
            tracing::debug!(target: "scriptgen", "script changed, not caching stale result");
            return Ok(batch);
        }
        let merged = reconcile(&batch, doc.cache.as_ref());
        doc.cache.store_visual_prompt_batch(merged.clone());
        Ok(merged)
    }

    pub async fn scene_summaries(&self) -> Result<Vec<ScriptPartSummary>> {
        let _guard = self.busy.try_acquire(Feature::SceneSummaries)?;
        let cached = self.doc.lock().cache.scene_summaries();
        if let Some(summaries) = cached {
            return Ok(summaries);
        }
        let snap = self.snapshot()?;
        let summaries = self.client.scene_summaries(&snap.text).await?;
        self.store_if_current(snap.epoch, |cache| {
            cache.store_scene_summaries(summaries.clone())
        });
        Ok(summaries)
    }

    pub async fn suggest_topics(&self, theme: &str, language: &str) -> Result<Vec<String>> {
        let _guard = self.busy.try_acquire(Feature::TopicSuggestions)?;
        Ok(self.client.suggest_topics(theme, language).await?)
    }

    pub async fn suggest_keywords(&self, topic: &str, language: &str) -> Result<Vec<String>> {
        let _guard = self.busy.try_acquire(Feature::KeywordSuggestions)?;
        Ok(self.client.suggest_keywords(topic, language).await?)
    }

    pub async fn suggest_style_options(&self, topic: &str) -> Result<StyleSuggestion> {
        if topic.trim().is_empty() {
            return Err(ScriptError::InvalidParameters(
                "enter a topic first".to_string(),
            ));
        }
        let _guard = self.busy.try_acquire(Feature::StyleSuggestions)?;
        Ok(self.client.suggest_style_options(topic).await?)
    }

    pub async fn parse_ideas(&self, text: &str) -> Result<Vec<Idea>> {
        let _guard = self.busy.try_acquire(Feature::IdeaParsing)?;
        Ok(self.client.parse_ideas(text).await?)
    }

    /// Scenes of the current script that can get their own visual prompt.
    pub fn promptable_scenes(&self) -> Vec<String> {
        let doc = self.doc.lock();
        promptable_scenes(doc.script.text(), doc.script.is_outline())
    }

    pub fn word_count_report(&self) -> WordCountReport {
        let doc = self.doc.lock();
        word_count_report(doc.script.text(), doc.params.resolved_word_count())
    }

    /// Replace script and cache with a saved item in one step.
    pub fn load_library_item(&self, item: &LibraryItem) {
        let mut doc = self.doc.lock();
        let mut params = GenerationParameters::new(item.title.clone());
        params.notes = item.notes.clone();
        doc.params = params;
        doc.revision = 0;
        doc.sequence = PartSequence::default();
        doc.replace_script(ScriptState::from_loaded(item.script.clone()));
        doc.cache.restore(item.cache.clone());
        tracing::info!(
            target: "scriptgen",
            id = item.id,
            title = %item.title,
            "loaded library item"
        );
    }

    /// Save the current script, title, notes and cache to `library`.
    pub fn save_to_library(&self, library: &mut Library) -> Result<LibraryItem> {
        let (title, notes, script, cache) = {
            let doc = self.doc.lock();
            (
                doc.params.title.clone(),
                doc.params.notes.clone(),
                doc.script.text().to_string(),
                doc.cache.snapshot(),
            )
        };
        library.save(&title, notes.as_deref(), &script, cache)
    }
}
