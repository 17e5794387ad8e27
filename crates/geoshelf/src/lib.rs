pub mod browser;
pub mod catalog;
pub mod error;
pub mod matcher;
pub mod publish;
pub mod selection;
pub mod storage;

pub use browser::{BrowserConfig, PickTarget, ResourceBrowser};
pub use catalog::{
    FileType, NavigationStack, NodeId, NodeKind, PathSegment, ResourceNode, ResourceStore,
};
pub use error::{
    GeoshelfError, PublishError, Result, ServiceError, StorageError, ValidationError,
};
pub use matcher::{ConfigId, ConfigLibrary, FreeformRule, MatchEngine, SatelliteConfig};
pub use publish::{
    PublishEvent, PublishRequest, PublishState, PublishWorkflow, PublishedService, ServiceId,
    ServiceRegistry, ServiceType, StylePreset,
};
pub use selection::{SelectionMode, SelectionSet};
pub use storage::{CatalogBackend, JsonFileBackend, MemoryBackend, CATALOG_KEY, OUTPUT_CATALOG_KEY};
