use crate::error::ScriptError;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Feature areas that may each have at most one call in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Feature {
    Generate,
    SequentialParts,
    Revise,
    TopicSuggestions,
    KeywordSuggestions,
    StyleSuggestions,
    IdeaParsing,
    Dialogue,
    VisualPrompt,
    AllVisualPrompts,
    SceneSummaries,
    CredentialValidation,
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Feature::Generate => "script generation",
            Feature::SequentialParts => "sequential part generation",
            Feature::Revise => "revision",
            Feature::TopicSuggestions => "topic suggestions",
            Feature::KeywordSuggestions => "keyword suggestions",
            Feature::StyleSuggestions => "style suggestions",
            Feature::IdeaParsing => "idea parsing",
            Feature::Dialogue => "dialogue extraction",
            Feature::VisualPrompt => "visual prompt generation",
            Feature::AllVisualPrompts => "batch visual prompt generation",
            Feature::SceneSummaries => "scene summarization",
            Feature::CredentialValidation => "API key validation",
        };
        f.write_str(label)
    }
}

/// Shared set of busy features. Cloning shares the same set, so the UI can
/// hold a copy to grey out controls while a session works.
#[derive(Clone, Default)]
pub struct BusyGate {
    active: Arc<Mutex<HashSet<Feature>>>,
}

impl BusyGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_acquire(&self, feature: Feature) -> Result<BusyGuard, ScriptError> {
        let mut active = self.active.lock();
        if !active.insert(feature) {
            return Err(ScriptError::Busy(feature));
        }
        Ok(BusyGuard {
            active: Arc::clone(&self.active),
            feature,
        })
    }

    pub fn is_busy(&self, feature: Feature) -> bool {
        self.active.lock().contains(&feature)
    }

    pub fn any_busy(&self) -> bool {
        !self.active.lock().is_empty()
    }
}

/// Releases its feature when dropped.
pub struct BusyGuard {
    active: Arc<Mutex<HashSet<Feature>>>,
    feature: Feature,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.active.lock().remove(&self.feature);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_fails_until_release() {
        let gate = BusyGate::new();
        let guard = gate.try_acquire(Feature::Dialogue).unwrap();
        assert!(gate.is_busy(Feature::Dialogue));
        assert!(matches!(
            gate.try_acquire(Feature::Dialogue),
            Err(ScriptError::Busy(Feature::Dialogue))
        ));
        // other features are independent
        let _other = gate.try_acquire(Feature::VisualPrompt).unwrap();

        drop(guard);
        assert!(!gate.is_busy(Feature::Dialogue));
        assert!(gate.try_acquire(Feature::Dialogue).is_ok());
    }

    #[test]
    fn clones_share_state() {
        let gate = BusyGate::new();
        let view = gate.clone();
        let _guard = gate.try_acquire(Feature::Generate).unwrap();
        assert!(view.is_busy(Feature::Generate));
        assert!(view.any_busy());
    }
}
