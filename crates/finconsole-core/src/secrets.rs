use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::env;

/// Trait for retrieving secrets, abstracting the source (Env, Vault, etc.)
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Retrieve a secret by key. Empty values count as missing.
    async fn get_secret(&self, key: &str) -> Result<String>;
}

/// Implementation that reads from environment variables.
#[derive(Clone, Default)]
pub struct EnvSecretStore;

#[async_trait]
impl SecretStore for EnvSecretStore {
    async fn get_secret(&self, key: &str) -> Result<String> {
        env::var(key)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("Secret '{}' not found in environment", key))
    }
}

/// Fixed in-memory secrets.
#[derive(Clone, Default)]
pub struct StaticSecretStore {
    secrets: HashMap<String, String>,
}

impl StaticSecretStore {
    pub fn with_secret(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.secrets.insert(key.into(), value.into());
        self
    }
}

#[async_trait]
impl SecretStore for StaticSecretStore {
    async fn get_secret(&self, key: &str) -> Result<String> {
        self.secrets
            .get(key)
            .filter(|v| !v.trim().is_empty())
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Secret '{}' not configured", key))
    }
}

/// Returns the first key that resolves, trying them in order.
pub async fn first_secret(store: &dyn SecretStore, keys: &[&str]) -> Option<String> {
    for key in keys {
        match store.get_secret(key).await {
            Ok(value) => return Some(value),
            Err(e) => tracing::debug!(key = %key, error = %e, "Secret lookup missed"),
        }
    }
    None
}
