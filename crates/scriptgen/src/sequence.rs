//! Part-by-part generation state machine.
//!
//! `Idle -> Running(i) -> Completed`. A failure or cancellation drops back to
//! `Idle`; the text accumulated so far lives in the session and is kept.

use crate::error::ScriptError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SequenceState {
    #[default]
    Idle,
    Running {
        index: usize,
    },
    Completed,
}

/// "part `current` of `total`", 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceProgress {
    pub current: usize,
    pub total: usize,
}

/// Split `total_words` evenly across `parts`; the remainder goes to the
/// earliest parts so the budgets always add up to the total.
pub fn part_budgets(total_words: u32, parts: usize) -> Vec<u32> {
    if parts == 0 {
        return Vec::new();
    }
    let count = parts as u32;
    let base = total_words / count;
    let remainder = (total_words % count) as usize;
    (0..parts)
        .map(|i| if i < remainder { base + 1 } else { base })
        .collect()
}

/// Join a new part onto the script with a blank line.
pub fn append_part(script: &str, part: &str) -> String {
    if script.is_empty() {
        part.to_string()
    } else {
        format!("{script}\n\n{part}")
    }
}

/// The part currently due, with everything needed to request it.
#[derive(Debug, Clone, Copy)]
pub struct PendingPart<'a> {
    pub index: usize,
    pub outline: &'a str,
    pub target_words: u32,
}

#[derive(Debug, Clone, Default)]
pub struct PartSequence {
    parts: Vec<String>,
    full_outline: String,
    budgets: Vec<u32>,
    state: SequenceState,
}

impl PartSequence {
    pub fn start(parts: Vec<String>, total_words: u32) -> Result<Self, ScriptError> {
        if parts.is_empty() {
            return Err(ScriptError::InvalidOutline(
                "the outline has no parts".to_string(),
            ));
        }
        let budgets = part_budgets(total_words, parts.len());
        let full_outline = parts.join("\n");
        Ok(Self {
            parts,
            full_outline,
            budgets,
            state: SequenceState::Running { index: 0 },
        })
    }

    pub fn state(&self) -> SequenceState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, SequenceState::Running { .. })
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    pub fn budgets(&self) -> &[u32] {
        &self.budgets
    }

    /// All parts joined by newlines; sent with every part request.
    pub fn full_outline(&self) -> &str {
        &self.full_outline
    }

    pub fn pending(&self) -> Option<PendingPart<'_>> {
        match self.state {
            SequenceState::Running { index } => Some(PendingPart {
                index,
                outline: self.parts.get(index)?,
                target_words: self.budgets.get(index).copied().unwrap_or_default(),
            }),
            _ => None,
        }
    }

    pub fn progress(&self) -> Option<SequenceProgress> {
        match self.state {
            SequenceState::Running { index } => Some(SequenceProgress {
                current: index + 1,
                total: self.parts.len(),
            }),
            _ => None,
        }
    }

    /// Record that the pending part was appended.
    pub fn advance(&mut self) -> SequenceState {
        if let SequenceState::Running { index } = self.state {
            self.state = if index + 1 < self.parts.len() {
                SequenceState::Running { index: index + 1 }
            } else {
                SequenceState::Completed
            };
        }
        self.state
    }

    /// Leave sequential mode after a failure or cancellation.
    pub fn abandon(&mut self) {
        self.state = SequenceState::Idle;
    }
}
