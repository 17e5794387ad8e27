pub mod navigation;
pub mod node;
pub mod seed;
pub mod store;

pub use navigation::{NavigationStack, PathSegment};
pub use node::{FileType, NodeId, NodeKind, ResourceNode};
pub use store::ResourceStore;
