//! Instruction text and response schemas for each generation task.
//!
//! Wording is free to change; the structural constraints (language, length,
//! continuity, JSON shape) are what the rest of the crate relies on.

use crate::params::{
    GenerationParameters, PartCount, ScriptType, SpeakerCount, Style, Tone, Voice,
};
use serde_json::{json, Value};

/// Inputs for one sequential part.
#[derive(Debug, Clone)]
pub struct PartRequest<'a> {
    pub full_outline: &'a str,
    pub previous_script: &'a str,
    pub current_part: &'a str,
    pub target_words: u32,
    pub params: &'a GenerationParameters,
}

fn keywords_line(params: &GenerationParameters) -> String {
    let keywords = params.keyword_list();
    if keywords.is_empty() {
        "None".to_string()
    } else {
        keywords.join(", ")
    }
}

fn style_guide(params: &GenerationParameters) -> String {
    let style = params.style;
    format!(
        "- Tone: {tone}. The script should feel {tone_lc}.\n\
         - Style: {style_name}. Structure the content in a {style_lc} manner.\n\
         - Voice: {voice}. The narrator's personality should be {voice_lc}.",
        tone = style.tone,
        tone_lc = style.tone.as_str().to_lowercase(),
        style_name = style.style,
        style_lc = style.style.as_str().to_lowercase(),
        voice = style.voice,
        voice_lc = style.voice.as_str().to_lowercase(),
    )
}

pub fn direct_script_prompt(params: &GenerationParameters) -> String {
    let language = params.language.trim();
    let words = params.resolved_word_count();
    let fmt = params.formatting;
    let mut prompt = match params.script_type {
        ScriptType::Podcast => {
            let speakers = match params.speakers {
                SpeakerCount::Auto => {
                    "Choose the best number of speakers (2-4) for this topic.".to_string()
                }
                SpeakerCount::Fixed(n) => format!("Write a conversation for exactly {n} speakers."),
            };
            format!(
                "You are an expert podcast scriptwriter. Write a complete podcast script in {language}.\n\
                 Topic: \"{title}\".\n\n\
                 Speakers:\n\
                 - {speakers}\n\
                 - Give every speaker a fitting, gender-specific personal name instead of roles like \"Host\" or \"Guest\".\n\
                 - Start every line of dialogue with the speaker's name and a colon (\"Sarah:\").\n\n\
                 Structure and length:\n\
                 - Aim for approximately {words} words.\n\
                 - {intro}\n\
                 - Organise the talk into logical segments.\n\
                 - {outro}\n\
                 - Add sound cues in square brackets where useful ([transition sound]).\n",
                title = params.title.trim(),
                intro = if fmt.include_intro {
                    "Open with a captivating introduction and an [intro music] cue."
                } else {
                    "Do not write a separate introduction."
                },
                outro = if fmt.include_outro {
                    "Close with an outro, a call to action and an [outro music] cue."
                } else {
                    "Do not write a separate outro."
                },
            )
        }
        ScriptType::Video => {
            let parts = match params.parts {
                PartCount::Auto => {
                    "Split the script into a logical number of main parts.".to_string()
                }
                PartCount::Fixed(1) => "Write one continuous part.".to_string(),
                PartCount::Fixed(n) => format!("Split the script into {n} main parts."),
            };
            format!(
                "You are an expert YouTube scriptwriter. Write a complete video script in {language}, \
                 culturally relevant for that audience.\n\
                 Topic: \"{title}\".\n\n\
                 Retention: weave in, sparingly, an early promise of a later reveal, open questions, \
                 surprising facts, a soft mid-video call to action and a sequel hook in the outro.\n\n\
                 Structure and length:\n\
                 - Aim for approximately {words} words.\n\
                 - {parts}\n\
                 - {intro}\n\
                 - {outro}\n\
                 - All parts must connect and keep one consistent narrative.\n",
                title = params.title.trim(),
                intro = if fmt.include_intro {
                    "Open with an introduction that hooks the viewer."
                } else {
                    "Do not write a separate introduction."
                },
                outro = if fmt.include_outro {
                    "Close with an outro and a call to action."
                } else {
                    "Do not write a separate outro."
                },
            )
        }
    };
    if let Some(notes) = params.notes_text() {
        prompt.push_str(&format!("\nFollow these notes from the author:\n\"\"\"\n{notes}\n\"\"\"\n"));
    }
    prompt.push_str(&format!("\nWriting style:\n{}\n", style_guide(params)));
    prompt.push_str(&format!(
        "\nKeywords to integrate naturally: {}.\n",
        keywords_line(params)
    ));
    prompt.push_str(&format!(
        "\nFormatting:\n- {}\n- {}\n- {}\n",
        if fmt.headings {
            "Use clear markdown headings (## for main parts)."
        } else {
            "Do not use special headings."
        },
        if fmt.bullets {
            "Use bullet lists where they help."
        } else {
            "Do not use lists."
        },
        if fmt.bold {
            "Use **bold** to emphasise key phrases."
        } else {
            "Do not use bold or italics."
        },
    ));
    prompt.push_str("\nWrite the complete script now.");
    prompt
}

pub fn outline_prompt(params: &GenerationParameters) -> String {
    let language = params.language.trim();
    let mut prompt = format!(
        "You are an expert YouTube scriptwriter and content strategist. Write a detailed outline \
         for a long-form video.\n\
         Topic: \"{title}\"\n\
         Language: {language}\n\
         Target script length: approximately {words} words.\n\n\
         Instructions:\n\
         1. Break the topic into a logical sequence (introduction, parts, conclusion).\n\
         2. For each part list the key talking points and questions to answer.\n\
         3. Mark where engagement hooks should go.\n\
         4. Make it detailed enough to reach the target length.\n\
         5. Start every part with a markdown heading of level two (## ).\n\
         6. Write everything in {language}.\n",
        title = params.title.trim(),
        words = params.resolved_word_count(),
    );
    if let Some(notes) = params.notes_text() {
        prompt.push_str(&format!("\nBuild on these notes from the author:\n\"\"\"\n{notes}\n\"\"\"\n"));
    }
    prompt.push_str("\nReturn only the outline, starting directly with the first heading.");
    prompt
}

pub fn part_prompt(request: &PartRequest<'_>) -> String {
    let params = request.params;
    let fmt = params.formatting;
    let mut formatting = Vec::new();
    if fmt.headings {
        formatting.push("Use headings if needed.");
    }
    if fmt.bullets {
        formatting.push("Use lists if needed.");
    }
    if fmt.bold {
        formatting.push("Use bold or italics if needed.");
    }
    format!(
        "You are an expert YouTube scriptwriter continuing a video script. Keep transitions seamless \
         and the narrative consistent.\n\n\
         Overall outline:\n\"\"\"\n{outline}\n\"\"\"\n\n\
         Script written so far (context only, do not repeat it):\n\"\"\"\n{previous}\n\"\"\"\n\n\
         Write the script for this part of the outline:\n\"\"\"\n{current}\n\"\"\"\n\n\
         Rules:\n\
         - Write ONLY this part, starting with its heading from the outline.\n\
         - Its opening must connect smoothly to the end of the script so far.\n\
         - Length: this part MUST be close to {words} words. Not noticeably shorter, not longer.\n\
         - Style: Tone {tone}, Style {style}, Voice {voice}.\n\
         - Add surprising facts, twists or open questions where they fit naturally.\n\
         - Language: {language}.\n\
         - Keywords to integrate naturally: {keywords}.\n\
         - Formatting: {formatting}\n",
        outline = request.full_outline,
        previous = request.previous_script,
        current = request.current_part,
        words = request.target_words,
        tone = params.style.tone,
        style = params.style.style,
        voice = params.style.voice,
        language = params.language.trim(),
        keywords = keywords_line(params),
        formatting = if formatting.is_empty() {
            "plain text.".to_string()
        } else {
            formatting.join(" ")
        },
    )
}

pub fn revision_prompt(script: &str, instruction: &str, params: &GenerationParameters) -> String {
    let context = match params.script_type {
        ScriptType::Podcast => {
            "The script is a podcast. Keep the conversational format and the established speaker names as labels."
        }
        ScriptType::Video => {
            "The script is a YouTube video. Keep the video script format with narration and visual cues."
        }
    };
    format!(
        "You are an expert script editor. Revise the script below following the user's request.\n\
         {context}\n\n\
         Original script:\n\"\"\"\n{script}\n\"\"\"\n\n\
         Revision request:\n\"{instruction}\"\n\n\
         Rules:\n\
         - Keep Tone {tone}, Style {style}, Voice {voice}.\n\
         - The script must stay coherent; integrate the change seamlessly.\n\
         - Keep the language {language}.\n\
         - Return the FULL revised script, not only the changed parts, starting directly with its content.",
        instruction = instruction.trim(),
        tone = params.style.tone,
        style = params.style.style,
        voice = params.style.voice,
        language = params.language.trim(),
    )
}

pub fn dialogue_prompt(script: &str, language: &str) -> String {
    format!(
        "You prepare scripts for text-to-speech. Extract ONLY the words meant to be spoken aloud \
         from the script below.\n\n\
         Script:\n\"\"\"\n{script}\n\"\"\"\n\n\
         Remove speaker labels, headings, bracketed cues ([music], [show graphic]), markdown emphasis, \
         notes for the editor and '---' separators. Keep paragraph breaks. \
         Keep the original language ({language}). Return the clean text only."
    )
}

pub fn visual_prompt_prompt(scene: &str, translation_language: &str) -> String {
    format!(
        "You are a visual director. From the script scene below, write a concise, evocative English \
         prompt for an AI image or video generator, covering setting, characters, action, mood and \
         camera style. Also give a {translation_language} translation of it.\n\
         Output only a JSON object with the keys \"english\" and \"translation\".\n\n\
         Scene:\n\"\"\"\n{scene}\n\"\"\""
    )
}

pub fn all_visual_prompts_prompt(script: &str, translation_language: &str) -> String {
    format!(
        "You are a visual director. The script below is divided into sections by markdown headings \
         (## or ###). For EACH section write one English prompt for an AI image/video generator \
         (setting, characters, action, mood, camera style) and a {translation_language} translation.\n\n\
         Script:\n\"\"\"\n{script}\n\"\"\"\n\n\
         Return a JSON array; each element has \"scene\" (the exact original text of the section), \
         \"english\" and \"translation\"."
    )
}

pub fn scene_summaries_prompt(script: &str, summary_language: &str) -> String {
    format!(
        "You are a video production assistant. Break the script below into scenes of about 8 seconds \
         each. The script is organised in parts by markdown headings (## or ###); create several \
         scenes per part.\n\n\
         Script:\n\"\"\"\n{script}\n\"\"\"\n\n\
         For each scene give a short 'summary' in {summary_language} of the action or dialogue, and a \
         detailed English 'visualPrompt' for an AI video generator. Return a JSON array of parts, \
         each with 'partTitle' (the heading text) and 'scenes' (objects with 'sceneNumber' starting \
         at 1 in every part, 'summary', 'visualPrompt')."
    )
}

pub fn topic_suggestions_prompt(theme: &str, language: &str) -> String {
    format!(
        "Based on the central theme \"{}\", write exactly 10 specific, engaging, search-friendly \
         YouTube video titles in {language}, covering different angles of the theme.",
        theme.trim()
    )
}

pub fn keyword_suggestions_prompt(topic: &str, language: &str) -> String {
    format!(
        "Based on the video topic \"{}\", list at least 5 relevant, search-friendly keywords in {language}.",
        topic.trim()
    )
}

pub fn style_suggestions_prompt(topic: &str) -> String {
    let names = |values: Vec<&str>| values.join(", ");
    format!(
        "Pick the best writing style for a video about \"{}\".\n\
         tone must be one of: {}.\n\
         style must be one of: {}.\n\
         voice must be one of: {}.",
        topic.trim(),
        names(Tone::ALL.iter().map(|v| v.as_str()).collect()),
        names(Style::ALL.iter().map(|v| v.as_str()).collect()),
        names(Voice::ALL.iter().map(|v| v.as_str()).collect()),
    )
}

pub fn ideas_prompt(text: &str) -> String {
    format!(
        "The notes below contain one or more video ideas written freely. Extract every distinct idea \
         as a short working title plus the supporting notes that belong to it. Do not invent ideas.\n\n\
         Notes:\n\"\"\"\n{text}\n\"\"\""
    )
}

pub const VALIDATION_PROMPT: &str = "test";

pub fn string_list_schema(field: &str, description: &str) -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            field: {
                "type": "ARRAY",
                "description": description,
                "items": { "type": "STRING" }
            }
        },
        "required": [field]
    })
}

pub fn visual_prompt_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "english": { "type": "STRING", "description": "The visual prompt in English." },
            "translation": { "type": "STRING", "description": "Translation of the prompt." }
        },
        "required": ["english", "translation"]
    })
}

pub fn all_visual_prompts_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "scene": { "type": "STRING", "description": "Original text of the script section." },
                "english": { "type": "STRING", "description": "The visual prompt in English." },
                "translation": { "type": "STRING", "description": "Translation of the prompt." }
            },
            "required": ["scene", "english", "translation"]
        }
    })
}

pub fn scene_summaries_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "partTitle": { "type": "STRING" },
                "scenes": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "sceneNumber": { "type": "INTEGER" },
                            "summary": { "type": "STRING" },
                            "visualPrompt": { "type": "STRING" }
                        },
                        "required": ["sceneNumber", "summary", "visualPrompt"]
                    }
                }
            },
            "required": ["partTitle", "scenes"]
        }
    })
}

pub fn style_schema() -> Value {
    let values = |all: Vec<&str>| json!(all);
    json!({
        "type": "OBJECT",
        "properties": {
            "tone": { "type": "STRING", "enum": values(Tone::ALL.iter().map(|v| v.as_str()).collect()) },
            "style": { "type": "STRING", "enum": values(Style::ALL.iter().map(|v| v.as_str()).collect()) },
            "voice": { "type": "STRING", "enum": values(Voice::ALL.iter().map(|v| v.as_str()).collect()) }
        },
        "required": ["tone", "style", "voice"]
    })
}

pub fn ideas_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "ideas": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "title": { "type": "STRING" },
                        "outline": { "type": "STRING" }
                    },
                    "required": ["title"]
                }
            }
        },
        "required": ["ideas"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{FormattingOptions, LengthSpec};

    #[test]
    fn podcast_prompt_mentions_speakers() {
        let params = GenerationParameters::new("Coffee history")
            .with_script_type(ScriptType::Podcast)
            .with_speakers(SpeakerCount::Fixed(3))
            .with_language("English");
        let prompt = direct_script_prompt(&params);
        assert!(prompt.contains("exactly 3 speakers"));
        assert!(prompt.contains("in English"));
    }

    #[test]
    fn direct_prompt_uses_converted_length() {
        let params = GenerationParameters::new("Coffee history")
            .with_length(LengthSpec::Minutes(4))
            .with_formatting(FormattingOptions {
                headings: false,
                ..Default::default()
            });
        let prompt = direct_script_prompt(&params);
        assert!(prompt.contains("approximately 600 words"));
        assert!(prompt.contains("Do not use special headings."));
    }

    #[test]
    fn part_prompt_carries_context_and_budget() {
        let params = GenerationParameters::new("Coffee").with_keywords("arabica, roast");
        let prompt = part_prompt(&PartRequest {
            full_outline: "## A\n## B",
            previous_script: "## A\nbeans",
            current_part: "## B",
            target_words: 333,
            params: &params,
        });
        assert!(prompt.contains("close to 333 words"));
        assert!(prompt.contains("## A\nbeans"));
        assert!(prompt.contains("arabica, roast"));
    }

    #[test]
    fn style_schema_lists_closed_sets() {
        let schema = style_schema();
        assert_eq!(schema["properties"]["tone"]["enum"].as_array().unwrap().len(), 7);
    }
}
