//! Flat catalog collection: arena of nodes plus a derived parent index.
//!
//! Every mutation is synchronous and followed by a full flush of the whole
//! collection to the backend. No partial or delta writes.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;

use crate::catalog::node::{FileType, NodeId, ResourceNode};
use crate::error::{StorageError, ValidationError};
use crate::publish::service::PublishedService;
use crate::storage::CatalogBackend;

pub struct ResourceStore {
    backend: Arc<dyn CatalogBackend>,
    key: String,
    /// Arena: stable id -> node map. Parent/child links are ids, never
    /// object references.
    nodes: HashMap<NodeId, ResourceNode>,
    /// Catalog iteration order (insertion order, not sorted).
    order: Vec<NodeId>,
    /// Derived parent -> children index, rebuilt on mutation.
    children: HashMap<NodeId, Vec<NodeId>>,
}

impl ResourceStore {
    /// Opens a store for one key, loading the full collection. Independent
    /// surfaces open their own store: no cache reuse across surfaces.
    pub fn open(backend: Arc<dyn CatalogBackend>, key: &str) -> Result<Self, StorageError> {
        let mut store = Self {
            backend,
            key: key.to_string(),
            nodes: HashMap::new(),
            order: vec![],
            children: HashMap::new(),
        };
        store.reload()?;
        Ok(store)
    }

    /// Re-reads the full collection from the backend, discarding local state.
    pub fn reload(&mut self) -> Result<(), StorageError> {
        let list = self.backend.load(&self.key)?;
        self.nodes.clear();
        self.order.clear();
        for node in list {
            if self.nodes.insert(node.id.clone(), node.clone()).is_none() {
                self.order.push(node.id);
            } else {
                log::warn!("Duplicate node id '{}' in snapshot, keeping last", node.id);
            }
        }
        self.rebuild_children();
        Ok(())
    }

    fn rebuild_children(&mut self) {
        self.children.clear();
        for id in &self.order {
            if let Some(node) = self.nodes.get(id) {
                self.children
                    .entry(node.parent_id.clone())
                    .or_default()
                    .push(id.clone());
            }
        }
    }

    /// Full overwrite of the backing store.
    fn flush(&self) -> Result<(), StorageError> {
        let snapshot = self.snapshot();
        self.backend.save(&self.key, &snapshot)
    }

    /// The full collection in catalog iteration order.
    pub fn snapshot(&self) -> Vec<ResourceNode> {
        self.order
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .cloned()
            .collect()
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, id: &NodeId) -> Option<&ResourceNode> {
        self.nodes.get(id)
    }

    /// Direct children of a folder, in insertion order.
    pub fn children_of(&self, folder_id: &NodeId) -> Vec<ResourceNode> {
        self.children
            .get(folder_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.nodes.get(id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// File nodes of the whole catalog, in insertion order.
    pub fn all_files(&self) -> Vec<ResourceNode> {
        self.order
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .filter(|n| n.is_file())
            .cloned()
            .collect()
    }

    /// Case-insensitive substring search over the entire catalog. Global by
    /// design: not scoped to the currently browsed folder.
    pub fn search(&self, needle: &str) -> Vec<ResourceNode> {
        let needle = needle.to_lowercase();
        self.order
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .filter(|n| n.name.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    /// Inserts a node, or replaces the node with the same id in place.
    pub fn upsert(&mut self, node: ResourceNode) -> Result<(), StorageError> {
        if self.nodes.insert(node.id.clone(), node.clone()).is_none() {
            self.order.push(node.id);
        }
        self.rebuild_children();
        self.flush()
    }

    /// Removes a node. Folder removal does not cascade: descendants keep
    /// their parent id and become unreachable through browsing.
    pub fn remove(&mut self, id: &NodeId) -> Result<Option<ResourceNode>, StorageError> {
        let removed = self.nodes.remove(id);
        if removed.is_some() {
            self.order.retain(|n| n != id);
            self.rebuild_children();
            self.flush()?;
        }
        Ok(removed)
    }

    /// Renames a node. No-op on a blank name.
    pub fn rename(&mut self, id: &NodeId, new_name: &str) -> Result<(), StorageError> {
        if new_name.trim().is_empty() {
            log::debug!("Ignoring blank rename for node '{}'", id);
            return Ok(());
        }
        if let Some(node) = self.nodes.get_mut(id) {
            node.name = new_name.trim().to_string();
            node.modified_at = Utc::now();
            self.flush()?;
        } else {
            log::warn!("Rename target '{}' not found", id);
        }
        Ok(())
    }

    /// Creates a folder under `parent_id`. A blank name is rejected before
    /// any state change.
    pub fn create_folder(
        &mut self,
        parent_id: &NodeId,
        name: &str,
    ) -> crate::Result<NodeId> {
        if name.trim().is_empty() {
            return Err(ValidationError::BlankFolderName.into());
        }
        self.check_parent(parent_id)?;

        let folder = ResourceNode::folder(name.trim(), parent_id.clone());
        let id = folder.id.clone();
        self.upsert(folder)?;
        Ok(id)
    }

    /// Registers an uploaded file under `parent_id` with a fresh id.
    pub fn upload_file(
        &mut self,
        parent_id: &NodeId,
        name: &str,
        file_type: FileType,
        size: u64,
        content: Option<String>,
    ) -> crate::Result<NodeId> {
        self.check_parent(parent_id)?;

        let mut file = ResourceNode::file(name, parent_id.clone(), file_type);
        file.size = size;
        file.content = content;
        let id = file.id.clone();
        self.upsert(file)?;
        Ok(id)
    }

    /// Replaces a node's persisted service list and flushes. Unknown ids
    /// are logged and ignored.
    pub fn update_services(
        &mut self,
        id: &NodeId,
        services: Vec<PublishedService>,
    ) -> Result<(), StorageError> {
        match self.nodes.get_mut(id) {
            Some(node) => {
                node.published_services = services;
                self.flush()
            }
            None => {
                log::warn!("update_services: node '{}' not found", id);
                Ok(())
            }
        }
    }

    /// Overlays satellite metadata onto an existing node without changing
    /// identity. Used by match-driven bulk enrichment.
    pub fn apply_enrichment(&mut self, enriched: &[ResourceNode]) -> Result<(), StorageError> {
        let mut changed = false;
        for source in enriched {
            if let Some(node) = self.nodes.get_mut(&source.id) {
                node.satellite_type = source.satellite_type.clone();
                node.sensor = source.sensor.clone();
                node.code = source.code.clone();
                node.resolution = source.resolution.clone();
                changed = true;
            }
        }
        if changed {
            self.flush()?;
        }
        Ok(())
    }

    /// A valid parent is the root sentinel or an existing folder node.
    fn check_parent(&self, parent_id: &NodeId) -> crate::Result<()> {
        if parent_id.is_root() {
            return Ok(());
        }
        match self.nodes.get(parent_id) {
            Some(node) if node.is_folder() => Ok(()),
            Some(_) => Err(ValidationError::NotAFolder(parent_id.clone()).into()),
            None => Err(ValidationError::FolderNotFound(parent_id.clone()).into()),
        }
    }
}
