use std::path::PathBuf;
use thiserror::Error;

use crate::catalog::node::NodeId;
use crate::publish::service::ServiceId;

#[derive(Error, Debug)]
pub enum GeoshelfError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),

    #[error("Service error: {0}")]
    Service(#[from] ServiceError),
}

/// Rejected before any state change, surfaced inline. Non-fatal.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Service name must not be blank")]
    BlankServiceName,

    #[error("Folder name must not be blank")]
    BlankFolderName,

    #[error("Folder '{0}' does not exist")]
    FolderNotFound(NodeId),

    #[error("'{0}' is not a folder")]
    NotAFolder(NodeId),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to read store file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write store file '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create store directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode catalog snapshot for key '{key}': {source}")]
    DecodeSnapshot {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode catalog snapshot for key '{key}': {source}")]
    EncodeSnapshot {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Unknown resource '{0}'")]
    UnknownResource(NodeId),

    #[error("Invalid publish transition '{action}' from state {from:?}")]
    InvalidTransition {
        from: crate::publish::workflow::PublishState,
        action: &'static str,
    },

    #[error("The publish dialog cannot be closed while a job is running")]
    CloseWhilePublishing,
}

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("The direct view service cannot be deleted")]
    DirectViewUndeletable,

    #[error("Deleting a service requires confirmation")]
    ConfirmationRequired,

    #[error("Unknown service '{0}'")]
    UnknownService(ServiceId),
}

pub type Result<T> = std::result::Result<T, GeoshelfError>;
