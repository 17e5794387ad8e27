pub mod service;
pub mod workflow;

pub use service::{
    attach_service, PublishedService, ServiceId, ServiceRegistry, ServiceType, StylePreset,
};
pub use workflow::{
    FixedOutcome, FixedProgress, JobOutcome, OutcomeOracle, ProgressPolicy, PublishEvent,
    PublishRequest, PublishState, PublishWorkflow, RandomOutcome, RandomProgress,
};
