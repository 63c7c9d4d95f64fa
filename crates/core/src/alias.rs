//! Alias management
//!
//! Aliases are named references to upload endpoints, including the base URL,
//! an optional bearer token, and the retry policy to apply around transfers.
//! They are persisted as TOML under the platform config directory, or under
//! `UL_CONFIG_DIR` when set.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Retry policy applied by callers around transfer operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first)
    pub max_attempts: u32,
    /// Initial backoff in milliseconds
    pub initial_backoff_ms: u64,
    /// Backoff ceiling in milliseconds
    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 100,
            max_backoff_ms: 10000,
        }
    }
}

/// A named upload endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alias {
    /// Base URL of the endpoint, e.g. `https://upload.example.com`
    pub endpoint: String,

    /// Bearer token sent with every request, if the endpoint requires one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Retry policy for transfers through this endpoint
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Alias {
    /// Create an alias for the given endpoint with default retry policy
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            token: None,
            retry: RetryConfig::default(),
        }
    }

    /// Validate the endpoint URL
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.endpoint)
            .map_err(|e| Error::Config(format!("invalid endpoint '{}': {e}", self.endpoint)))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(Error::Config(format!(
                "endpoint must be http or https, got '{}'",
                url.scheme()
            )));
        }
        Ok(())
    }
}

/// On-disk alias file layout
#[derive(Debug, Default, Serialize, Deserialize)]
struct AliasFile {
    #[serde(default)]
    aliases: BTreeMap<String, Alias>,
}

/// Loads, stores, and resolves aliases
#[derive(Debug)]
pub struct AliasManager {
    path: PathBuf,
    file: AliasFile,
}

impl AliasManager {
    /// Load aliases from the default config location
    ///
    /// Respects `UL_CONFIG_DIR` for test isolation and non-standard setups.
    pub fn new() -> Result<Self> {
        let dir = match std::env::var_os("UL_CONFIG_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => dirs::config_dir()
                .ok_or_else(|| Error::Config("cannot determine config directory".to_string()))?
                .join("uplink"),
        };
        Self::with_dir(dir)
    }

    /// Load aliases from an explicit config directory
    pub fn with_dir(dir: impl Into<PathBuf>) -> Result<Self> {
        let path = dir.into().join("aliases.toml");
        let file = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            toml::from_str(&raw)
                .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))?
        } else {
            AliasFile::default()
        };
        Ok(Self { path, file })
    }

    /// Look up an alias by name
    pub fn get(&self, name: &str) -> Result<Alias> {
        self.file
            .aliases
            .get(name)
            .cloned()
            .ok_or_else(|| Error::AliasNotFound(name.to_string()))
    }

    /// Add or replace an alias and persist the change
    pub fn set(&mut self, name: impl Into<String>, alias: Alias) -> Result<()> {
        alias.validate()?;
        self.file.aliases.insert(name.into(), alias);
        self.save()
    }

    /// Remove an alias and persist the change
    pub fn remove(&mut self, name: &str) -> Result<()> {
        if self.file.aliases.remove(name).is_none() {
            return Err(Error::AliasNotFound(name.to_string()));
        }
        self.save()
    }

    /// All configured aliases, sorted by name
    pub fn list(&self) -> Vec<(String, Alias)> {
        self.file
            .aliases
            .iter()
            .map(|(name, alias)| (name.clone(), alias.clone()))
            .collect()
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = toml::to_string_pretty(&self.file)
            .map_err(|e| Error::Config(format!("failed to serialize aliases: {e}")))?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_set_get_remove_roundtrip() {
        let dir = TempDir::new().unwrap();
        let mut manager = AliasManager::with_dir(dir.path()).unwrap();

        let mut alias = Alias::new("https://upload.example.com");
        alias.token = Some("secret".to_string());
        manager.set("play", alias.clone()).unwrap();

        // Reload from disk and verify persistence
        let reloaded = AliasManager::with_dir(dir.path()).unwrap();
        assert_eq!(reloaded.get("play").unwrap(), alias);

        let mut manager = AliasManager::with_dir(dir.path()).unwrap();
        manager.remove("play").unwrap();
        assert!(matches!(
            manager.get("play"),
            Err(Error::AliasNotFound(name)) if name == "play"
        ));
    }

    #[test]
    fn test_get_missing_alias() {
        let dir = TempDir::new().unwrap();
        let manager = AliasManager::with_dir(dir.path()).unwrap();
        assert!(matches!(manager.get("nope"), Err(Error::AliasNotFound(_))));
    }

    #[test]
    fn test_set_rejects_invalid_endpoint() {
        let dir = TempDir::new().unwrap();
        let mut manager = AliasManager::with_dir(dir.path()).unwrap();
        let result = manager.set("bad", Alias::new("ftp://example.com"));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_list_sorted() {
        let dir = TempDir::new().unwrap();
        let mut manager = AliasManager::with_dir(dir.path()).unwrap();
        manager
            .set("zeta", Alias::new("https://z.example.com"))
            .unwrap();
        manager
            .set("alpha", Alias::new("https://a.example.com"))
            .unwrap();

        let names: Vec<String> = manager.list().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_retry_config_defaults() {
        let retry = RetryConfig::default();
        assert_eq!(retry.max_attempts, 3);
        assert_eq!(retry.initial_backoff_ms, 100);
        assert_eq!(retry.max_backoff_ms, 10000);
    }
}
