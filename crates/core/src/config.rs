//! Upload configuration
//!
//! Describes the destination and shape of an upload. The configuration is
//! supplied once when a channel is opened, sent to the endpoint as part of
//! session creation, and never interpreted by the channel itself.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::path::RemotePath;

/// Immutable description of an upload target
///
/// Built once via [`UploadConfiguration::builder`] and carried unchanged for
/// the life of the upload session, including through capture/restore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadConfiguration {
    /// Destination object: `alias/bucket/key`
    pub destination: RemotePath,

    /// MIME type recorded on the finalized object
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    /// User metadata attached to the finalized object
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,

    /// Whether an existing object at the destination may be replaced
    #[serde(default)]
    pub overwrite: bool,
}

impl UploadConfiguration {
    /// Start building a configuration for the given destination
    pub fn builder(destination: RemotePath) -> UploadConfigurationBuilder {
        UploadConfigurationBuilder {
            destination,
            content_type: None,
            metadata: BTreeMap::new(),
            overwrite: false,
        }
    }
}

/// Builder for [`UploadConfiguration`]
#[derive(Debug, Clone)]
pub struct UploadConfigurationBuilder {
    destination: RemotePath,
    content_type: Option<String>,
    metadata: BTreeMap<String, String>,
    overwrite: bool,
}

impl UploadConfigurationBuilder {
    /// Set the MIME type for the finalized object
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Attach a user metadata entry
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Allow replacing an existing object at the destination
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Finish building
    pub fn build(self) -> UploadConfiguration {
        UploadConfiguration {
            destination: self.destination,
            content_type: self.content_type,
            metadata: self.metadata,
            overwrite: self.overwrite,
        }
    }
}
