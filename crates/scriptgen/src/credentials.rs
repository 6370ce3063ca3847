use crate::busy::{BusyGate, Feature};
use crate::client::GenerationClient;
use crate::error::{Result, ScriptError};
use parking_lot::RwLock;
use std::sync::Arc;
use store::{load_json, save_json, KeyValueStore, CREDENTIALS_KEY};

/// Where the client gets the key for its next call.
pub trait CredentialSource: Send + Sync {
    /// The active credential, or `None` when none is configured.
    fn active_credential(&self) -> Option<String>;
}

const MASK: &str = "••••••••••";

/// Show only the last six characters of a key.
pub fn mask_credential(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let tail: String = chars[chars.len().saturating_sub(6)..].iter().collect();
    format!("{MASK}{tail}")
}

/// Ordered list of API keys. The first entry is the active one.
pub struct CredentialStore {
    keys: RwLock<Vec<String>>,
    store: Option<Arc<dyn KeyValueStore>>,
    busy: BusyGate,
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self {
            keys: RwLock::new(Vec::new()),
            store: None,
            busy: BusyGate::new(),
        }
    }
}

impl CredentialStore {
    /// Unpersisted store, mostly for tests.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the key list saved under [`CREDENTIALS_KEY`]; later changes are written back.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let keys: Vec<String> = load_json(store.as_ref(), CREDENTIALS_KEY)?.unwrap_or_default();
        tracing::debug!(target: "scriptgen", count = keys.len(), "loaded credentials");
        Ok(Self {
            keys: RwLock::new(keys),
            store: Some(store),
            busy: BusyGate::new(),
        })
    }

    /// Share a busy gate so validation shows up with the other features.
    pub fn with_busy_gate(mut self, busy: BusyGate) -> Self {
        self.busy = busy;
        self
    }

    pub fn keys(&self) -> Vec<String> {
        self.keys.read().clone()
    }

    pub fn masked(&self) -> Vec<String> {
        self.keys.read().iter().map(|k| mask_credential(k)).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.read().is_empty()
    }

    /// Validate `candidate` with one provider call, then make it the active key.
    pub async fn add(&self, candidate: &str, client: &GenerationClient) -> Result<()> {
        let key = candidate.trim();
        if key.is_empty() {
            return Err(ScriptError::InvalidParameters(
                "the API key cannot be empty".to_string(),
            ));
        }
        if self.contains(key) {
            return Err(ScriptError::InvalidParameters(
                "this API key already exists".to_string(),
            ));
        }
        let _guard = self.busy.try_acquire(Feature::CredentialValidation)?;
        client.validate_credential(key).await?;

        let snapshot = {
            let mut keys = self.keys.write();
            if keys.iter().any(|k| k == key) {
                return Err(ScriptError::InvalidParameters(
                    "this API key already exists".to_string(),
                ));
            }
            keys.insert(0, key.to_string());
            keys.clone()
        };
        self.persist(&snapshot)?;
        tracing::info!(target: "scriptgen", key = %mask_credential(key), "API key added");
        Ok(())
    }

    /// Returns whether the key was present.
    pub fn remove(&self, key: &str) -> Result<bool> {
        let snapshot = {
            let mut keys = self.keys.write();
            let before = keys.len();
            keys.retain(|k| k != key);
            if keys.len() == before {
                return Ok(false);
            }
            keys.clone()
        };
        self.persist(&snapshot)?;
        Ok(true)
    }

    fn contains(&self, key: &str) -> bool {
        self.keys.read().iter().any(|k| k == key)
    }

    fn persist(&self, keys: &[String]) -> Result<()> {
        if let Some(store) = &self.store {
            save_json(store.as_ref(), CREDENTIALS_KEY, keys)?;
        }
        Ok(())
    }
}

impl CredentialSource for CredentialStore {
    fn active_credential(&self) -> Option<String> {
        self.keys.read().first().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_keeps_last_six() {
        assert_eq!(mask_credential("AIzaSyABCDEF123456"), "••••••••••123456");
        assert_eq!(mask_credential("abc"), "••••••••••abc");
    }

    #[test]
    fn remove_reports_presence() {
        let creds = CredentialStore::new();
        creds.keys.write().extend(["a".to_string(), "b".to_string()]);
        assert!(creds.remove("a").unwrap());
        assert!(!creds.remove("a").unwrap());
        assert_eq!(creds.active_credential().as_deref(), Some("b"));
    }
}
