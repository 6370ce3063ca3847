use crate::busy::Feature;
use thiserror::Error;

/// Failures of a single call to the language-model provider.
///
/// Every variant except `CredentialMissing` carries a message that is ready
/// to be shown next to the feature that failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("API key not found. Add an API key in the settings.")]
    CredentialMissing,

    #[error("{0}")]
    CredentialInvalid(String),

    #[error("{0}")]
    QuotaExceeded(String),

    #[error("{0}")]
    ContentBlocked(String),

    #[error("{0}")]
    MalformedResponse(String),

    #[error("{0}")]
    Transport(String),
}

impl ProviderError {
    /// Map an HTTP status and provider message into a user-facing error kind.
    pub fn classify(operation: &str, status: Option<u16>, detail: &str) -> Self {
        let lower = detail.to_lowercase();
        if matches!(status, Some(401) | Some(403))
            || lower.contains("api key not valid")
            || lower.contains("api_key_invalid")
        {
            ProviderError::CredentialInvalid(format!(
                "Could not {operation}. The API key is invalid. Check it in the settings."
            ))
        } else if status == Some(429)
            || lower.contains("quota")
            || lower.contains("resource_exhausted")
        {
            ProviderError::QuotaExceeded(format!(
                "Could not {operation}. You have reached the request limit. Please try again later."
            ))
        } else if lower.contains("safety") || lower.contains("blocked") {
            Self::blocked(operation)
        } else {
            let detail = match status {
                Some(code) => format!("HTTP {code}: {}", detail.trim()),
                None => detail.trim().to_string(),
            };
            ProviderError::Transport(format!("Could not {operation}. Details: {detail}"))
        }
    }

    pub fn blocked(operation: &str) -> Self {
        ProviderError::ContentBlocked(format!(
            "Could not {operation}. The request was blocked for safety reasons. Adjust the topic or keywords."
        ))
    }

    pub fn malformed(operation: &str, detail: impl std::fmt::Display) -> Self {
        ProviderError::MalformedResponse(format!(
            "Could not {operation}. The model returned data in an unexpected format ({detail})."
        ))
    }

    pub fn timed_out(operation: &str, secs: u64) -> Self {
        ProviderError::Transport(format!(
            "Could not {operation}. Details: no response within {secs}s."
        ))
    }

    /// Whether retrying later with the same credential can succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ProviderError::QuotaExceeded(_) | ProviderError::Transport(_)
        )
    }
}

/// Everything a [`crate::ScriptSession`] operation can fail with.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("there is no outline to process")]
    NoOutline,

    #[error("the outline is invalid: {0}")]
    InvalidOutline(String),

    #[error("there is no script to process")]
    NothingToProcess,

    #[error("generation was cancelled")]
    Cancelled,

    #[error("{0} is already running")]
    Busy(Feature),

    #[error("sequential generation is not running")]
    NotRunning,

    #[error("storage error: {0}")]
    Storage(String),
}

impl ScriptError {
    pub fn provider(&self) -> Option<&ProviderError> {
        match self {
            ScriptError::Provider(err) => Some(err),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for ScriptError {
    fn from(err: anyhow::Error) -> Self {
        ScriptError::Storage(format!("{err:#}"))
    }
}

pub type Result<T> = std::result::Result<T, ScriptError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_by_status() {
        assert!(matches!(
            ProviderError::classify("revise script", Some(403), "forbidden"),
            ProviderError::CredentialInvalid(_)
        ));
        assert!(matches!(
            ProviderError::classify("revise script", Some(429), "slow down"),
            ProviderError::QuotaExceeded(_)
        ));
    }

    #[test]
    fn classify_by_message() {
        let err = ProviderError::classify(
            "generate script",
            Some(400),
            "API key not valid. Please pass a valid API key.",
        );
        assert!(matches!(err, ProviderError::CredentialInvalid(_)));
        assert!(err.to_string().starts_with("Could not generate script."));

        let err = ProviderError::classify("generate outline", None, "RESOURCE_EXHAUSTED: quota");
        assert!(matches!(err, ProviderError::QuotaExceeded(_)));
        assert!(err.is_transient());

        let err =
            ProviderError::classify("generate outline", Some(400), "Response blocked: SAFETY");
        assert!(matches!(err, ProviderError::ContentBlocked(_)));
        assert!(!err.is_transient());
    }

    #[test]
    fn unknown_failures_keep_details() {
        let err = ProviderError::classify("extract dialogue", Some(500), " backend exploded ");
        assert_eq!(
            err,
            ProviderError::Transport(
                "Could not extract dialogue. Details: HTTP 500: backend exploded".to_string()
            )
        );
    }
}
