use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::publish::service::PublishedService;

/// Identifier of a catalog node. Stable for the node's lifetime and unique
/// across the entire catalog, not just within a sibling set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Mints a fresh identifier.
    pub fn mint() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The root folder sentinel. Not backed by a real node.
    pub fn root() -> Self {
        Self("root".to_string())
    }

    pub fn is_root(&self) -> bool {
        self.0 == "root"
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Whether a node is a folder or a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Folder,
    File,
}

/// Content-type tag. Meaningful only for file nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Image,
    Archive,
    Tabular,
    Markup,
    Raster,
}

/// One catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceNode {
    pub id: NodeId,
    /// Display name, mutable via rename.
    pub name: String,
    /// Containing folder, or the root sentinel.
    pub parent_id: NodeId,
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_type: Option<FileType>,
    /// Descriptive metadata, not used in matching.
    #[serde(default)]
    pub size: u64,
    pub modified_at: DateTime<Utc>,
    /// Structured satellite metadata, used exclusively by matching.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub satellite_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    /// Persisted services, most recent first. The synthetic direct-view
    /// entry is never part of this list.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub published_services: Vec<PublishedService>,
    /// Inline payload for previewable file types.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl ResourceNode {
    /// Creates a folder node with a fresh id.
    pub fn folder(name: &str, parent_id: NodeId) -> Self {
        Self {
            id: NodeId::mint(),
            name: name.to_string(),
            parent_id,
            kind: NodeKind::Folder,
            file_type: None,
            size: 0,
            modified_at: Utc::now(),
            satellite_type: None,
            sensor: None,
            code: None,
            resolution: None,
            published_services: vec![],
            content: None,
        }
    }

    /// Creates a file node with a fresh id.
    pub fn file(name: &str, parent_id: NodeId, file_type: FileType) -> Self {
        Self {
            id: NodeId::mint(),
            name: name.to_string(),
            parent_id,
            kind: NodeKind::File,
            file_type: Some(file_type),
            size: 0,
            modified_at: Utc::now(),
            satellite_type: None,
            sensor: None,
            code: None,
            resolution: None,
            published_services: vec![],
            content: None,
        }
    }

    pub fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }

    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }
}
