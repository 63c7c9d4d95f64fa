//! Path parsing and resolution
//!
//! Upload destinations are written as `alias/bucket/key`, where the alias
//! names a configured endpoint. Anything that does not look like a remote
//! destination is treated as a local filesystem path.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A parsed remote destination: `alias/bucket/key`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemotePath {
    /// Alias naming the configured endpoint
    pub alias: String,
    /// Bucket at the endpoint
    pub bucket: String,
    /// Object key within the bucket (may be empty for bucket-level paths)
    pub key: String,
}

impl RemotePath {
    /// Create a remote path from its parts
    pub fn new(
        alias: impl Into<String>,
        bucket: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            alias: alias.into(),
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl std::fmt::Display for RemotePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.key.is_empty() {
            write!(f, "{}/{}", self.alias, self.bucket)
        } else {
            write!(f, "{}/{}/{}", self.alias, self.bucket, self.key)
        }
    }
}

/// Result of parsing a user-supplied path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedPath {
    /// A local filesystem path
    Local(std::path::PathBuf),
    /// A remote `alias/bucket/key` destination
    Remote(RemotePath),
}

/// Parse a user-supplied path into a local or remote form
///
/// Paths starting with `/`, `./`, `..` or `~` are local. Everything else is
/// interpreted as `alias/bucket[/key]`.
pub fn parse_path(input: &str) -> Result<ParsedPath> {
    if input.is_empty() {
        return Err(Error::InvalidPath("empty path".to_string()));
    }

    if input.starts_with('/')
        || input.starts_with("./")
        || input.starts_with("..")
        || input.starts_with('~')
    {
        return Ok(ParsedPath::Local(std::path::PathBuf::from(input)));
    }

    let mut parts = input.splitn(3, '/');
    let alias = parts.next().unwrap_or_default();
    let bucket = parts.next().unwrap_or_default();
    let key = parts.next().unwrap_or_default();

    if alias.is_empty() || bucket.is_empty() {
        return Err(Error::InvalidPath(format!(
            "expected alias/bucket[/key], got '{input}'"
        )));
    }

    Ok(ParsedPath::Remote(RemotePath::new(alias, bucket, key)))
}
