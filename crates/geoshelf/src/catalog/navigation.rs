//! Breadcrumb path stack for browsing surfaces.

use serde::{Deserialize, Serialize};

use crate::catalog::node::{NodeId, ResourceNode};

/// One breadcrumb segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathSegment {
    pub id: NodeId,
    pub name: String,
}

/// Non-empty ordered path, always starting at the root sentinel. The
/// current folder is the last segment.
#[derive(Debug, Clone)]
pub struct NavigationStack {
    segments: Vec<PathSegment>,
}

impl NavigationStack {
    pub fn new(root_label: &str) -> Self {
        Self {
            segments: vec![PathSegment {
                id: NodeId::root(),
                name: root_label.to_string(),
            }],
        }
    }

    /// Appends a folder segment. Non-folder nodes are rejected.
    pub fn enter(&mut self, node: &ResourceNode) -> bool {
        if !node.is_folder() {
            log::warn!("Refusing to navigate into non-folder '{}'", node.name);
            return false;
        }
        self.segments.push(PathSegment {
            id: node.id.clone(),
            name: node.name.clone(),
        });
        true
    }

    /// Breadcrumb jump: drops everything after `index`. Out-of-range
    /// indices are clamped to the full path.
    pub fn truncate_to(&mut self, index: usize) {
        let keep = (index + 1).min(self.segments.len());
        self.segments.truncate(keep);
    }

    /// Restores the single root segment.
    pub fn reset(&mut self) {
        self.segments.truncate(1);
    }

    pub fn current(&self) -> &PathSegment {
        self.segments.last().expect("path stack is never empty")
    }

    pub fn current_folder_id(&self) -> &NodeId {
        &self.current().id
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }
}
