//! Published service records and the derived direct-view entry.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::node::{NodeId, ResourceNode};
use crate::catalog::store::ResourceStore;
use crate::error::{GeoshelfError, ServiceError};

/// Reserved id of the synthetic direct-view entry.
const DIRECT_VIEW_ID: &str = "direct-view";

/// Fixed label shown for the synthetic direct-view entry.
const DIRECT_VIEW_LABEL: &str = "Direct view (original data)";

/// Identifier of a published service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceId(String);

impl ServiceId {
    pub fn mint() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The reserved synthetic direct-view id. Never persisted.
    pub fn direct_view() -> Self {
        Self(DIRECT_VIEW_ID.to_string())
    }

    pub fn is_direct_view(&self) -> bool {
        self.0 == DIRECT_VIEW_ID
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ServiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ServiceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Service protocol tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    /// Pre-rendered tile service.
    TileService,
    /// Dynamic rendering service.
    DynamicService,
    /// Vector feature service.
    VectorService,
    /// Standard tiling service.
    Wmts,
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::TileService => "tile_service",
            ServiceType::DynamicService => "dynamic_service",
            ServiceType::VectorService => "vector_service",
            ServiceType::Wmts => "wmts",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "tile_service" => Some(ServiceType::TileService),
            "dynamic_service" => Some(ServiceType::DynamicService),
            "vector_service" => Some(ServiceType::VectorService),
            "wmts" => Some(ServiceType::Wmts),
            other => {
                log::warn!("Unknown service type '{}'", other);
                None
            }
        }
    }
}

impl std::fmt::Display for ServiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed enumeration of rendering presets accepted by the publish form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StylePreset {
    Default,
    Terrain,
    Vivid,
    Grayscale,
}

/// One addressable service bound to a resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedService {
    pub id: ServiceId,
    pub name: String,
    pub service_type: ServiceType,
    pub url: String,
    pub visible: bool,
    pub created_at: DateTime<Utc>,
}

impl PublishedService {
    /// Builds the synthetic direct-view entry for a resource. Derived at
    /// read time, never written to the persisted list.
    fn direct_view(resource_id: &NodeId, visible: bool) -> Self {
        Self {
            id: ServiceId::direct_view(),
            name: DIRECT_VIEW_LABEL.to_string(),
            service_type: ServiceType::TileService,
            url: format!("preview://{}", resource_id),
            visible,
            created_at: Utc::now(),
        }
    }
}

/// Maintains the direct-view invariant: a resource whose persisted service
/// list is empty presents exactly one synthetic entry; the entry disappears
/// as soon as a real service exists.
#[derive(Default)]
pub struct ServiceRegistry {
    /// Transient visibility of the synthetic entry, per resource. Never
    /// written through the backend.
    synthetic_visibility: HashMap<NodeId, bool>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the service list as presented to the user.
    pub fn presented_services(&self, node: &ResourceNode) -> Vec<PublishedService> {
        if node.published_services.is_empty() {
            let visible = self
                .synthetic_visibility
                .get(&node.id)
                .copied()
                .unwrap_or(true);
            vec![PublishedService::direct_view(&node.id, visible)]
        } else {
            node.published_services.clone()
        }
    }

    /// Toggles a service's visibility. Real services persist the flip; the
    /// synthetic entry keeps it transient and is regenerated on read.
    pub fn toggle_visibility(
        &mut self,
        store: &mut ResourceStore,
        node_id: &NodeId,
        service_id: &ServiceId,
    ) -> Result<bool, GeoshelfError> {
        if service_id.is_direct_view() {
            let entry = self
                .synthetic_visibility
                .entry(node_id.clone())
                .or_insert(true);
            *entry = !*entry;
            return Ok(*entry);
        }

        let node = store
            .get(node_id)
            .ok_or_else(|| crate::error::PublishError::UnknownResource(node_id.clone()))?;

        let mut services = node.published_services.clone();
        let service = services
            .iter_mut()
            .find(|s| &s.id == service_id)
            .ok_or_else(|| ServiceError::UnknownService(service_id.clone()))?;
        service.visible = !service.visible;
        let new_state = service.visible;

        store.update_services(node_id, services)?;
        Ok(new_state)
    }

    /// Deletes a real service. Destructive, so the caller must pass an
    /// explicit confirmation; the synthetic entry is always rejected.
    pub fn delete_service(
        &mut self,
        store: &mut ResourceStore,
        node_id: &NodeId,
        service_id: &ServiceId,
        confirmed: bool,
    ) -> Result<(), GeoshelfError> {
        if service_id.is_direct_view() {
            return Err(ServiceError::DirectViewUndeletable.into());
        }
        if !confirmed {
            return Err(ServiceError::ConfirmationRequired.into());
        }

        let node = store
            .get(node_id)
            .ok_or_else(|| crate::error::PublishError::UnknownResource(node_id.clone()))?;

        let before = node.published_services.len();
        let services: Vec<PublishedService> = node
            .published_services
            .iter()
            .filter(|s| &s.id != service_id)
            .cloned()
            .collect();
        if services.len() == before {
            return Err(ServiceError::UnknownService(service_id.clone()).into());
        }

        store.update_services(node_id, services)?;
        Ok(())
    }
}

/// Prepends a real service to the resource's persisted list and flushes.
/// Keeps service ids unique within the list.
pub fn attach_service(
    store: &mut ResourceStore,
    node_id: &NodeId,
    service: PublishedService,
) -> Result<(), GeoshelfError> {
    let node = store
        .get(node_id)
        .ok_or_else(|| crate::error::PublishError::UnknownResource(node_id.clone()))?;

    let mut services: Vec<PublishedService> = node
        .published_services
        .iter()
        .filter(|s| s.id != service.id)
        .cloned()
        .collect();
    services.insert(0, service);

    store.update_services(node_id, services)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::node::FileType;

    fn real_service(name: &str) -> PublishedService {
        PublishedService {
            id: ServiceId::mint(),
            name: name.to_string(),
            service_type: ServiceType::DynamicService,
            url: "https://services.local/dynamic_service/x".to_string(),
            visible: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_list_presents_exactly_one_synthetic_entry() {
        let registry = ServiceRegistry::new();
        let node = ResourceNode::file("scene.tif", NodeId::root(), FileType::Raster);

        let presented = registry.presented_services(&node);
        assert_eq!(presented.len(), 1);
        assert!(presented[0].id.is_direct_view());
        assert!(presented[0].visible);
    }

    #[test]
    fn test_real_services_hide_synthetic_entry() {
        let registry = ServiceRegistry::new();
        let mut node = ResourceNode::file("scene.tif", NodeId::root(), FileType::Raster);
        node.published_services.push(real_service("scene-wms"));

        let presented = registry.presented_services(&node);
        assert_eq!(presented.len(), 1);
        assert!(!presented[0].id.is_direct_view());
    }

    #[test]
    fn test_service_type_parse_round_trip() {
        for ty in [
            ServiceType::TileService,
            ServiceType::DynamicService,
            ServiceType::VectorService,
            ServiceType::Wmts,
        ] {
            assert_eq!(ServiceType::parse(ty.as_str()), Some(ty));
        }
        assert_eq!(ServiceType::parse("ftp"), None);
    }
}
