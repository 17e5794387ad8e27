//! Resource browsing surface: wires the store, navigation, matching and
//! selection together behind the selector contract (`open` / `confirm` /
//! `close`).

use std::sync::Arc;

use crate::catalog::navigation::{NavigationStack, PathSegment};
use crate::catalog::node::{NodeId, ResourceNode};
use crate::catalog::store::ResourceStore;
use crate::error::ValidationError;
use crate::matcher::{ConfigId, ConfigLibrary, FreeformRule, MatchEngine, SatelliteConfig};
use crate::selection::{SelectionMode, SelectionSet};
use crate::storage::{CatalogBackend, CATALOG_KEY};

/// What the surface lets the user pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickTarget {
    File,
    Folder,
    All,
}

#[derive(Clone)]
pub struct BrowserConfig {
    pub title: String,
    pub mode: PickTarget,
    pub storage_key: String,
    pub root_label: String,
    /// Previous-path restoration hint. Segments are re-validated against
    /// the freshly loaded catalog; the first stale segment and everything
    /// after it are dropped.
    pub restore_path: Option<Vec<PathSegment>>,
}

impl BrowserConfig {
    pub fn new(title: &str, mode: PickTarget) -> Self {
        Self {
            title: title.to_string(),
            mode,
            storage_key: CATALOG_KEY.to_string(),
            root_label: "Data".to_string(),
            restore_path: None,
        }
    }

    pub fn storage_key(mut self, key: &str) -> Self {
        self.storage_key = key.to_string();
        self
    }

    pub fn root_label(mut self, label: &str) -> Self {
        self.root_label = label.to_string();
        self
    }

    pub fn restore_path(mut self, path: Vec<PathSegment>) -> Self {
        self.restore_path = Some(path);
        self
    }
}

pub struct ResourceBrowser {
    config: BrowserConfig,
    store: ResourceStore,
    nav: NavigationStack,
    engine: MatchEngine,
    selection: SelectionSet,
    search: Option<String>,
    /// Active named rule, pinned across folder changes.
    active_config: Option<SatelliteConfig>,
}

impl ResourceBrowser {
    /// Opens a browsing surface: always re-loads the full collection from
    /// the backend, never reuses another surface's cache.
    pub fn open(backend: Arc<dyn CatalogBackend>, config: BrowserConfig) -> crate::Result<Self> {
        let store = ResourceStore::open(backend, &config.storage_key)?;
        let mut nav = NavigationStack::new(&config.root_label);

        if let Some(path) = &config.restore_path {
            for segment in path {
                if segment.id.is_root() {
                    continue;
                }
                match store.get(&segment.id) {
                    Some(node) if node.is_folder() => {
                        nav.enter(node);
                    }
                    _ => {
                        log::debug!("Dropping stale restore segment '{}'", segment.name);
                        break;
                    }
                }
            }
        }

        let mode = match config.mode {
            PickTarget::Folder => SelectionMode::SinglePick,
            PickTarget::File | PickTarget::All => SelectionMode::MultiCheck,
        };

        Ok(Self {
            config,
            store,
            nav,
            engine: MatchEngine::new(),
            selection: SelectionSet::new(mode),
            search: None,
            active_config: None,
        })
    }

    pub fn title(&self) -> &str {
        &self.config.title
    }

    pub fn path(&self) -> &[PathSegment] {
        self.nav.segments()
    }

    pub fn store(&self) -> &ResourceStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ResourceStore {
        &mut self.store
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn active_config(&self) -> Option<&SatelliteConfig> {
        self.active_config.as_ref()
    }

    /// The presented list: folders for navigation first, then the files
    /// that pass the active rule (or all files when no rule is pinned).
    pub fn visible_entries(&self) -> Vec<ResourceNode> {
        let entries = match &self.search {
            Some(needle) => self.store.search(needle),
            None => self.store.children_of(self.nav.current_folder_id()),
        };

        let mut presented: Vec<ResourceNode> =
            entries.iter().filter(|n| n.is_folder()).cloned().collect();
        presented.extend(self.visible_files(&entries));
        presented
    }

    fn visible_files(&self, entries: &[ResourceNode]) -> Vec<ResourceNode> {
        match &self.active_config {
            Some(config) => self.engine.match_by_single_config(entries, config),
            None => entries.iter().filter(|n| n.is_file()).cloned().collect(),
        }
    }

    fn visible_file_ids(&self) -> Vec<NodeId> {
        let entries = match &self.search {
            Some(needle) => self.store.search(needle),
            None => self.store.children_of(self.nav.current_folder_id()),
        };
        self.visible_files(&entries)
            .into_iter()
            .map(|n| n.id)
            .collect()
    }

    /// Descends into a folder. Clears the text search; the pinned rule
    /// stays and the selection is re-reconciled against the new listing.
    pub fn enter_folder(&mut self, id: &NodeId) -> crate::Result<()> {
        let node = self
            .store
            .get(id)
            .ok_or_else(|| ValidationError::FolderNotFound(id.clone()))?;
        if !node.is_folder() {
            return Err(ValidationError::NotAFolder(id.clone()).into());
        }
        let node = node.clone();
        self.nav.enter(&node);
        self.search = None;
        self.reconcile();
        Ok(())
    }

    /// Breadcrumb jump to a path index.
    pub fn jump_to(&mut self, index: usize) {
        self.nav.truncate_to(index);
        self.search = None;
        self.reconcile();
    }

    /// Sets the global name search. Blank input clears it.
    pub fn set_search(&mut self, needle: &str) {
        let needle = needle.trim();
        self.search = if needle.is_empty() {
            None
        } else {
            Some(needle.to_string())
        };
        self.reconcile();
    }

    /// Pins a named rule; the selection becomes exactly the matched set.
    pub fn activate_config(&mut self, config: SatelliteConfig) {
        self.active_config = Some(config);
        self.reconcile();
    }

    /// Unpins the rule; the selection is cleared, not restored.
    pub fn clear_config(&mut self) {
        self.active_config = None;
        self.selection.reconcile_cleared();
    }

    fn reconcile(&mut self) {
        if self.active_config.is_some() {
            let matched = self.visible_file_ids();
            self.selection.reconcile_with_match(&matched);
        }
    }

    pub fn toggle(&mut self, id: &NodeId) {
        self.selection.toggle(id);
    }

    pub fn select_all(&mut self) {
        let ids = self.visible_file_ids();
        self.selection.select_all(&ids);
    }

    pub fn select_none(&mut self) {
        self.selection.clear();
    }

    /// Header toggle state for the multi-check surface.
    pub fn header_checked(&self) -> bool {
        self.selection.all_selected(&self.visible_file_ids())
    }

    /// Evaluates one named rule against a folder's files.
    pub fn match_in_folder(
        &self,
        folder_id: &NodeId,
        library: &ConfigLibrary,
        config_id: &ConfigId,
    ) -> Vec<ResourceNode> {
        match library.get(config_id) {
            Some(config) => self
                .engine
                .match_by_single_config(&self.store.children_of(folder_id), config),
            None => {
                log::warn!("Unknown match config '{}'", config_id.as_str());
                vec![]
            }
        }
    }

    /// Scans all files irrespective of folder against a caller-ordered
    /// config list, first match wins.
    pub fn match_all_files(&self, configs: &[SatelliteConfig]) -> Vec<ResourceNode> {
        self.engine
            .match_by_multiple_configs(&self.store.all_files(), configs)
    }

    /// Id-based variant of the multi-config scan; order of the id list is
    /// the match precedence.
    pub fn match_all_files_by_ids(
        &self,
        library: &ConfigLibrary,
        config_ids: &[ConfigId],
    ) -> Vec<ResourceNode> {
        self.match_all_files(&library.resolve(config_ids))
    }

    /// Runs the multi-config scan and writes the matched metadata overlay
    /// back into the catalog in one action.
    pub fn apply_config_enrichment(
        &mut self,
        configs: &[SatelliteConfig],
    ) -> crate::Result<Vec<ResourceNode>> {
        let matched = self.match_all_files(configs);
        self.store.apply_enrichment(&matched)?;
        Ok(matched)
    }

    /// Ad-hoc field rules against one folder's files.
    pub fn match_freeform(&self, folder_id: &NodeId, rules: &[FreeformRule]) -> Vec<ResourceNode> {
        self.engine
            .match_by_freeform_rules(&self.store.children_of(folder_id), rules)
    }

    /// Confirms the selection: selected nodes in catalog order, filtered
    /// by the surface's pick target.
    pub fn confirm(&self) -> Vec<ResourceNode> {
        self.store
            .snapshot()
            .into_iter()
            .filter(|n| self.selection.is_selected(&n.id))
            .filter(|n| match self.config.mode {
                PickTarget::File => n.is_file(),
                PickTarget::Folder => n.is_folder(),
                PickTarget::All => true,
            })
            .collect()
    }

    pub fn close(self) {}
}
