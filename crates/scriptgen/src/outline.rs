//! Long-script decision and outline splitting.

use crate::error::ScriptError;
use crate::params::{GenerationParameters, ScriptType};
use serde::{Deserialize, Serialize};

/// Video scripts above this many words are produced outline-first.
pub const LONG_SCRIPT_THRESHOLD: u32 = 1000;

/// Heading that marks a text blob as an outline rather than a final script.
pub const OUTLINE_MARKER: &str = "### Detailed Outline";

/// Separates the banner from the outline body.
pub const OUTLINE_SEPARATOR: &str = "---";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerationMode {
    Direct,
    Outline,
}

/// Pure decision; no network call is involved.
pub fn decide_generation_mode(params: &GenerationParameters) -> GenerationMode {
    if params.script_type == ScriptType::Video
        && params.resolved_word_count() > LONG_SCRIPT_THRESHOLD
    {
        GenerationMode::Outline
    } else {
        GenerationMode::Direct
    }
}

/// Banner prepended to every generated outline.
pub fn outline_banner(target_words: u32) -> String {
    format!(
        "{OUTLINE_MARKER} for a Long Script\n\n**Note:** the requested script is about {target_words} words, \
         above the {LONG_SCRIPT_THRESHOLD}-word limit for a single pass. Below is the outline the AI produced. \
         Use \"Generate full script\" to have each part written in turn.\n\n{OUTLINE_SEPARATOR}\n\n"
    )
}

/// What the current script text is. Decided once, when the text is produced.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text")]
pub enum ScriptState {
    #[default]
    Empty,
    /// Parts are still being appended.
    Draft(String),
    Outline(String),
    Final(String),
}

impl ScriptState {
    /// Classify text that did not come from the pipeline, such as a library item.
    pub fn from_loaded(text: String) -> Self {
        if text.trim().is_empty() {
            ScriptState::Empty
        } else if text.contains(OUTLINE_MARKER) {
            ScriptState::Outline(text)
        } else {
            ScriptState::Final(text)
        }
    }

    pub fn text(&self) -> &str {
        match self {
            ScriptState::Empty => "",
            ScriptState::Draft(text) | ScriptState::Outline(text) | ScriptState::Final(text) => {
                text
            }
        }
    }

    pub fn is_outline(&self) -> bool {
        matches!(self, ScriptState::Outline(_))
    }

    pub fn is_empty(&self) -> bool {
        self.text().trim().is_empty()
    }
}

/// Split an outline into ordered parts.
///
/// The body is everything after the first `---`. It is cut before every line
/// that starts with two or more `#` followed by whitespace, so each heading
/// stays with the part it introduces. Blank segments are dropped.
pub fn split_outline_into_parts(outline: &str) -> Result<Vec<String>, ScriptError> {
    if outline.trim().is_empty() || !outline.contains(OUTLINE_MARKER) {
        return Err(ScriptError::NoOutline);
    }
    let body = match outline.split_once(OUTLINE_SEPARATOR) {
        Some((_, body)) => body.trim(),
        None => {
            return Err(ScriptError::InvalidOutline(
                "missing the '---' separator".to_string(),
            ))
        }
    };
    if body.is_empty() {
        return Err(ScriptError::InvalidOutline(
            "nothing follows the '---' separator".to_string(),
        ));
    }

    let mut parts = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in body.split('\n') {
        if !current.is_empty() && starts_part(line) {
            parts.push(current.join("\n"));
            current.clear();
        }
        current.push(line);
    }
    if !current.is_empty() {
        parts.push(current.join("\n"));
    }
    parts.retain(|part| !part.trim().is_empty());
    Ok(parts)
}

/// A markdown heading of level two or deeper at column zero.
fn starts_part(line: &str) -> bool {
    let hashes = line.chars().take_while(|c| *c == '#').count();
    hashes >= 2
        && line[hashes..]
            .chars()
            .next()
            .map_or(false, char::is_whitespace)
}
