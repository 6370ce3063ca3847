//! Long-form video and podcast script generation.
//!
//! [`ScriptSession`] owns one script document: it decides between direct and
//! outline-first generation, drives part-by-part generation with continuity
//! context, and keeps a cache of artifacts derived from the current script.
//! All model calls go through [`GenerationClient`].

pub mod busy;
pub mod cache;
pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod library;
pub mod models;
pub mod outline;
pub mod params;
pub mod prompts;
pub mod providers;
pub mod scenes;
pub mod sequence;
pub mod session;

pub use busy::{BusyGate, BusyGuard, Feature};
pub use cache::{ArtifactCache, CachedArtifacts, SceneTextCache};
pub use client::GenerationClient;
pub use config::StudioConfig;
pub use credentials::{CredentialSource, CredentialStore};
pub use error::{ProviderError, Result, ScriptError};
pub use library::{IdeaBook, Library, LibraryItem, Theme};
pub use models::{Idea, SceneVisualPrompt, ScriptPartSummary, StyleSuggestion, VisualPrompt};
pub use outline::{decide_generation_mode, split_outline_into_parts, GenerationMode, ScriptState};
pub use params::{
    FormattingOptions, GenerationParameters, LengthSpec, PartCount, ScriptType, SpeakerCount,
    Style, StyleOptions, Tone, Voice,
};
pub use providers::{LlmProvider, MockProvider};
pub use sequence::{SequenceProgress, SequenceState};
pub use session::ScriptSession;
pub use tokio_util::sync::CancellationToken;

use tracing_subscriber::EnvFilter;

/// Install a `RUST_LOG`-driven fmt subscriber. Safe to call more than once.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}
