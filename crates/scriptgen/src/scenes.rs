//! Scene segmentation and spoken word counts.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Scenes shorter than this (trimmed) are not offered a visual prompt.
pub const MIN_PROMPTABLE_CHARS: usize = 50;

static SPEAKER_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*[\p{L}\p{N} ._'-]{1,40}:[ \t]*").expect("valid regex"));
static BRACKET_CUE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[^\]]*\]").expect("valid regex"));
static EMPHASIS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[*_]{1,3}").expect("valid regex"));
static RULE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*-{3,}[ \t]*$").expect("valid regex"));
static HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^#{1,6}[ \t]+(.*)$").expect("valid regex"));

/// Split a script into scenes at lines starting with `## ` or `### `.
/// Each scene keeps its heading; blank segments are dropped.
pub fn split_scenes(script: &str) -> Vec<String> {
    let mut scenes = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in script.split('\n') {
        let is_scene_heading = line.starts_with("## ") || line.starts_with("### ");
        if is_scene_heading && !current.is_empty() {
            scenes.push(current.join("\n"));
            current.clear();
        }
        current.push(line);
    }
    if !current.is_empty() {
        scenes.push(current.join("\n"));
    }
    scenes.retain(|s| !s.trim().is_empty());
    scenes
}

pub fn is_promptable(scene: &str) -> bool {
    scene.trim().chars().count() > MIN_PROMPTABLE_CHARS
}

/// Scenes eligible for per-scene visual prompts. Outlines get none.
pub fn promptable_scenes(script: &str, is_outline: bool) -> Vec<String> {
    if is_outline {
        return Vec::new();
    }
    split_scenes(script)
        .into_iter()
        .filter(|scene| is_promptable(scene))
        .collect()
}

/// Words that would actually be read aloud.
pub fn spoken_word_count(text: &str) -> usize {
    let text = RULE.replace_all(text, "");
    let text = HEADING.replace_all(&text, "");
    let text = BRACKET_CUE.replace_all(&text, " ");
    let text = EMPHASIS.replace_all(&text, "");
    let text = SPEAKER_LABEL.replace_all(&text, "");
    text.split_whitespace().count()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LengthVerdict {
    /// Within 10% of the target.
    OnTarget,
    /// Within 20%.
    Near,
    OffTarget,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionCount {
    pub title: String,
    pub words: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordCountReport {
    pub sections: Vec<SectionCount>,
    pub total: usize,
    pub target: u32,
    /// `total - target`
    pub difference: i64,
    pub percent: f64,
    pub verdict: LengthVerdict,
}

pub fn word_count_report(script: &str, target: u32) -> WordCountReport {
    let sections: Vec<SectionCount> = split_scenes(script)
        .iter()
        .map(|scene| SectionCount {
            title: section_title(scene),
            words: spoken_word_count(scene),
        })
        .collect();
    let total: usize = sections.iter().map(|s| s.words).sum();
    let difference = total as i64 - i64::from(target);
    let percent = if target == 0 {
        0.0
    } else {
        difference as f64 / f64::from(target) * 100.0
    };
    let verdict = if percent.abs() <= 10.0 {
        LengthVerdict::OnTarget
    } else if percent.abs() <= 20.0 {
        LengthVerdict::Near
    } else {
        LengthVerdict::OffTarget
    };
    WordCountReport {
        sections,
        total,
        target,
        difference,
        percent,
        verdict,
    }
}

fn section_title(scene: &str) -> String {
    HEADING
        .captures(scene)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_else(|| "Introduction".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = "Opening line before any heading.\n\
## Scene 1\nThe camera pans across a quiet harbour at dawn, gulls circling overhead.\n\
### Scene 2\nShort.\n\
#### Not a split\nstill scene 2\n";

    #[test]
    fn splits_on_level_two_and_three() {
        let scenes = split_scenes(SCRIPT);
        assert_eq!(scenes.len(), 3);
        assert!(scenes[0].starts_with("Opening"));
        assert!(scenes[1].starts_with("## Scene 1"));
        assert!(scenes[2].starts_with("### Scene 2"));
        assert!(scenes[2].contains("#### Not a split"));
    }

    #[test]
    fn only_long_scenes_are_promptable() {
        let scenes = promptable_scenes(SCRIPT, false);
        assert_eq!(scenes.len(), 1);
        assert!(scenes[0].starts_with("## Scene 1"));
        assert!(promptable_scenes(SCRIPT, true).is_empty());
    }

    #[test]
    fn spoken_words_skip_labels_and_cues() {
        let text = "---\n**Sarah:** Hello there [laughs] friends\nTom: *Welcome* back\n";
        assert_eq!(spoken_word_count(text), 5);
    }

    #[test]
    fn report_verdicts() {
        let script = "## One\nword word word word word word word word word\n## Two\nword";
        let on = word_count_report(script, 10);
        assert_eq!(on.total, 10);
        assert_eq!(on.verdict, LengthVerdict::OnTarget);
        assert_eq!(on.sections[0].title, "One");

        let near = word_count_report(script, 12);
        assert_eq!(near.verdict, LengthVerdict::Near);
        assert_eq!(near.difference, -2);

        assert_eq!(word_count_report(script, 40).verdict, LengthVerdict::OffTarget);
    }
}
