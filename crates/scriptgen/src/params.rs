//! Generation parameters: the bundle every generation call consumes.

use crate::error::ScriptError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Speaking rate used to turn a duration into a word target.
pub const WORDS_PER_MINUTE: u32 = 150;

/// Word target used when the caller does not specify one.
pub const DEFAULT_WORD_COUNT: u32 = 800;

pub const LANGUAGES: &[&str] = &[
    "Vietnamese",
    "English",
    "Korean",
    "Japanese",
    "Spanish",
    "Portuguese",
    "Hindi",
];

macro_rules! closed_set {
    ($(#[$meta:meta])* $name:ident { $($variant:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| format!("unknown {}: '{}'", stringify!($name), wanted))
            }
        }
    };
}

closed_set!(
    /// Emotional register of the script.
    Tone {
        Formal,
        Informative,
        Conversational,
        Persuasive,
        Humorous,
        Empathetic,
        Inspirational,
    }
);

closed_set!(
    /// How the content is structured.
    Style {
        Narrative,
        Descriptive,
        Expository,
        Persuasive,
        Technical,
        Academic,
        Business,
    }
);

closed_set!(
    /// Personality of the narrator or speakers.
    Voice {
        Authoritative,
        Conversational,
        Personal,
        Humorous,
        Professional,
        Empathetic,
        Persuasive,
    }
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleOptions {
    pub tone: Tone,
    pub style: Style,
    pub voice: Voice,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self {
            tone: Tone::Conversational,
            style: Style::Narrative,
            voice: Voice::Conversational,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattingOptions {
    pub headings: bool,
    pub bullets: bool,
    pub bold: bool,
    pub include_intro: bool,
    pub include_outro: bool,
}

impl Default for FormattingOptions {
    fn default() -> Self {
        Self {
            headings: true,
            bullets: true,
            bold: true,
            include_intro: true,
            include_outro: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScriptType {
    Video,
    Podcast,
}

/// Exactly one length representation is authoritative per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LengthSpec {
    Words(u32),
    Minutes(u32),
}

impl LengthSpec {
    pub fn word_count(&self) -> u32 {
        match *self {
            LengthSpec::Words(words) => words,
            LengthSpec::Minutes(minutes) => minutes.saturating_mul(WORDS_PER_MINUTE),
        }
    }
}

impl Default for LengthSpec {
    fn default() -> Self {
        LengthSpec::Words(DEFAULT_WORD_COUNT)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PartCount {
    #[default]
    Auto,
    Fixed(u32),
}

/// Podcast speaker count. Fixed counts must be within 2..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpeakerCount {
    #[default]
    Auto,
    Fixed(u8),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationParameters {
    pub title: String,
    pub notes: Option<String>,
    pub language: String,
    pub style: StyleOptions,
    /// Comma-separated keywords, as typed by the user.
    pub keywords: String,
    pub formatting: FormattingOptions,
    pub length: LengthSpec,
    pub parts: PartCount,
    pub script_type: ScriptType,
    pub speakers: SpeakerCount,
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            title: String::new(),
            notes: None,
            language: LANGUAGES[0].to_string(),
            style: StyleOptions::default(),
            keywords: String::new(),
            formatting: FormattingOptions::default(),
            length: LengthSpec::default(),
            parts: PartCount::Auto,
            script_type: ScriptType::Video,
            speakers: SpeakerCount::Auto,
        }
    }
}

impl GenerationParameters {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_style(mut self, style: StyleOptions) -> Self {
        self.style = style;
        self
    }

    pub fn with_keywords(mut self, keywords: impl Into<String>) -> Self {
        self.keywords = keywords.into();
        self
    }

    pub fn with_formatting(mut self, formatting: FormattingOptions) -> Self {
        self.formatting = formatting;
        self
    }

    pub fn with_length(mut self, length: LengthSpec) -> Self {
        self.length = length;
        self
    }

    pub fn with_parts(mut self, parts: PartCount) -> Self {
        self.parts = parts;
        self
    }

    pub fn with_script_type(mut self, script_type: ScriptType) -> Self {
        self.script_type = script_type;
        self
    }

    pub fn with_speakers(mut self, speakers: SpeakerCount) -> Self {
        self.speakers = speakers;
        self
    }

    /// Word target after converting a duration, if one was given.
    pub fn resolved_word_count(&self) -> u32 {
        self.length.word_count()
    }

    pub fn keyword_list(&self) -> Vec<String> {
        self.keywords
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Notes with surrounding whitespace removed, `None` when blank.
    pub fn notes_text(&self) -> Option<&str> {
        self.notes.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }

    pub fn validate(&self) -> Result<(), ScriptError> {
        if self.title.trim().is_empty() {
            return Err(ScriptError::InvalidParameters(
                "enter or pick a topic first".to_string(),
            ));
        }
        if self.language.trim().is_empty() {
            return Err(ScriptError::InvalidParameters(
                "a target language is required".to_string(),
            ));
        }
        if self.resolved_word_count() == 0 {
            return Err(ScriptError::InvalidParameters(
                "the length target must be greater than zero".to_string(),
            ));
        }
        if let PartCount::Fixed(0) = self.parts {
            return Err(ScriptError::InvalidParameters(
                "the number of parts must be at least 1".to_string(),
            ));
        }
        if let SpeakerCount::Fixed(n) = self.speakers {
            if !(2..=5).contains(&n) {
                return Err(ScriptError::InvalidParameters(format!(
                    "speaker count must be between 2 and 5, got {n}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_converts_at_fixed_rate() {
        let params = GenerationParameters::new("Volcanoes").with_length(LengthSpec::Minutes(12));
        assert_eq!(params.resolved_word_count(), 12 * 150);
        assert_eq!(LengthSpec::Words(930).word_count(), 930);
    }

    #[test]
    fn keywords_are_split_and_trimmed() {
        let params =
            GenerationParameters::new("Tea").with_keywords(" oolong, ,matcha ,  green tea");
        assert_eq!(params.keyword_list(), vec!["oolong", "matcha", "green tea"]);
    }

    #[test]
    fn closed_sets_parse_case_insensitively() {
        assert_eq!("humorous".parse::<Tone>().unwrap(), Tone::Humorous);
        assert_eq!(" Business ".parse::<Style>().unwrap(), Style::Business);
        assert!("Whimsical".parse::<Voice>().is_err());
        assert_eq!(Tone::ALL.len(), 7);
    }

    #[test]
    fn validation_rules() {
        assert!(GenerationParameters::new("  ").validate().is_err());
        assert!(GenerationParameters::new("Tides").validate().is_ok());
        assert!(GenerationParameters::new("Tides")
            .with_speakers(SpeakerCount::Fixed(6))
            .validate()
            .is_err());
        assert!(GenerationParameters::new("Tides")
            .with_speakers(SpeakerCount::Fixed(3))
            .validate()
            .is_ok());
        assert!(GenerationParameters::new("Tides")
            .with_parts(PartCount::Fixed(0))
            .validate()
            .is_err());
        assert!(GenerationParameters::new("Tides")
            .with_length(LengthSpec::Minutes(0))
            .validate()
            .is_err());
    }

    #[test]
    fn blank_notes_are_none() {
        let params = GenerationParameters::new("Tides").with_notes("   ");
        assert_eq!(params.notes_text(), None);
        let params = params.with_notes(" moon pull ");
        assert_eq!(params.notes_text(), Some("moon pull"));
    }
}
