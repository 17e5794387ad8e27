//! Publish job state machine.
//!
//! One job at a time: `idle -> publishing -> success | error`, with
//! `error -> publishing` (retry) and `success -> idle` (start another) as
//! the only re-entries. Progress stepping and the terminal outcome are
//! injectable policies so tests drive the machine deterministically.

use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::catalog::node::NodeId;
use crate::catalog::store::ResourceStore;
use crate::error::{PublishError, ValidationError};
use crate::publish::service::{
    attach_service, PublishedService, ServiceId, ServiceType, StylePreset,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishState {
    Idle,
    Publishing,
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Succeeded,
    Failed,
}

/// Per-tick progress increment policy.
pub trait ProgressPolicy: Send {
    fn next_step(&mut self, current: u8) -> u8;
}

/// Random stepping, the production default.
pub struct RandomProgress;

impl ProgressPolicy for RandomProgress {
    fn next_step(&mut self, _current: u8) -> u8 {
        rand::thread_rng().gen_range(7..=23)
    }
}

/// Fixed stepping for tests.
pub struct FixedProgress(pub u8);

impl ProgressPolicy for FixedProgress {
    fn next_step(&mut self, _current: u8) -> u8 {
        self.0
    }
}

/// Decides how a job resolves once progress reaches 100.
pub trait OutcomeOracle: Send {
    fn decide(&mut self) -> JobOutcome;
}

/// Production default: fails roughly one run in ten.
pub struct RandomOutcome {
    failure_chance: f64,
}

impl Default for RandomOutcome {
    fn default() -> Self {
        Self {
            failure_chance: 0.1,
        }
    }
}

impl OutcomeOracle for RandomOutcome {
    fn decide(&mut self) -> JobOutcome {
        if rand::thread_rng().gen_bool(self.failure_chance) {
            JobOutcome::Failed
        } else {
            JobOutcome::Succeeded
        }
    }
}

/// Forced outcome for tests.
pub struct FixedOutcome(pub JobOutcome);

impl OutcomeOracle for FixedOutcome {
    fn decide(&mut self) -> JobOutcome {
        self.0
    }
}

/// The submitted publish form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishRequest {
    pub target_resource_id: NodeId,
    pub service_name: String,
    pub style_name: StylePreset,
    pub service_type: ServiceType,
}

/// State change notifications for hosting surfaces.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum PublishEvent {
    Started { resource_id: NodeId },
    Progress { percent: u8 },
    Succeeded { service: PublishedService },
    Failed,
}

pub struct PublishWorkflow {
    state: PublishState,
    progress: u8,
    request: Option<PublishRequest>,
    progress_policy: Box<dyn ProgressPolicy>,
    oracle: Box<dyn OutcomeOracle>,
    events: broadcast::Sender<PublishEvent>,
}

impl PublishWorkflow {
    pub fn new() -> Self {
        Self::with_policies(Box::new(RandomProgress), Box::new(RandomOutcome::default()))
    }

    pub fn with_policies(
        progress_policy: Box<dyn ProgressPolicy>,
        oracle: Box<dyn OutcomeOracle>,
    ) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            state: PublishState::Idle,
            progress: 0,
            request: None,
            progress_policy,
            oracle,
            events,
        }
    }

    pub fn state(&self) -> PublishState {
        self.state
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    /// The host dialog may close in every state except `publishing`.
    pub fn can_close(&self) -> bool {
        self.state != PublishState::Publishing
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PublishEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: PublishEvent) {
        // No active receivers is fine
        let _ = self.events.send(event);
    }

    /// Starts a job. A no-op while one is already running; blank service
    /// names and unknown resources are rejected before any state change.
    pub fn start(&mut self, store: &ResourceStore, request: PublishRequest) -> crate::Result<()> {
        if self.state == PublishState::Publishing {
            log::debug!("Publish already running, ignoring start");
            return Ok(());
        }
        if request.service_name.trim().is_empty() {
            return Err(ValidationError::BlankServiceName.into());
        }
        if store.get(&request.target_resource_id).is_none() {
            return Err(PublishError::UnknownResource(request.target_resource_id).into());
        }

        tracing::info!(
            resource = %request.target_resource_id,
            service_type = %request.service_type,
            "Starting publish job"
        );
        self.progress = 0;
        self.state = PublishState::Publishing;
        self.emit(PublishEvent::Started {
            resource_id: request.target_resource_id.clone(),
        });
        self.request = Some(request);
        Ok(())
    }

    /// Re-enters `publishing` from `error` with the same form.
    pub fn retry(&mut self) -> crate::Result<()> {
        if self.state != PublishState::Error {
            return Err(PublishError::InvalidTransition {
                from: self.state,
                action: "retry",
            }
            .into());
        }
        let resource_id = match &self.request {
            Some(request) => request.target_resource_id.clone(),
            None => {
                return Err(PublishError::InvalidTransition {
                    from: self.state,
                    action: "retry",
                }
                .into())
            }
        };

        tracing::info!(resource = %resource_id, "Retrying publish job");
        self.progress = 0;
        self.state = PublishState::Publishing;
        self.emit(PublishEvent::Started { resource_id });
        Ok(())
    }

    /// Returns to `idle` after a terminal state: start-another from
    /// `success`, abandon from `error`. Rejected while `publishing`.
    pub fn reset(&mut self) -> crate::Result<()> {
        if self.state == PublishState::Publishing {
            return Err(PublishError::CloseWhilePublishing.into());
        }
        self.state = PublishState::Idle;
        self.progress = 0;
        self.request = None;
        Ok(())
    }

    /// Advances the job by one timer tick. Outside `publishing` this does
    /// nothing. On reaching 100 the outcome oracle resolves the job; on
    /// success the new service is prepended to the resource and flushed.
    pub fn tick(&mut self, store: &mut ResourceStore) -> crate::Result<PublishState> {
        if self.state != PublishState::Publishing {
            return Ok(self.state);
        }

        let step = self.progress_policy.next_step(self.progress);
        self.progress = self.progress.saturating_add(step).min(100);
        self.emit(PublishEvent::Progress {
            percent: self.progress,
        });
        if self.progress < 100 {
            return Ok(self.state);
        }

        match self.oracle.decide() {
            JobOutcome::Succeeded => {
                let request = match &self.request {
                    Some(request) => request.clone(),
                    None => {
                        // Publishing without a stored form is a broken
                        // invariant; resolve to the retryable error state.
                        log::error!("Publish job finished without a stored request");
                        self.state = PublishState::Error;
                        self.emit(PublishEvent::Failed);
                        return Ok(self.state);
                    }
                };

                let service = PublishedService {
                    id: ServiceId::mint(),
                    name: request.service_name.trim().to_string(),
                    service_type: request.service_type,
                    url: format!(
                        "https://services.local/{}/{}",
                        request.service_type.as_str(),
                        request.target_resource_id
                    ),
                    visible: true,
                    created_at: Utc::now(),
                };

                if let Err(e) = attach_service(store, &request.target_resource_id, service.clone())
                {
                    log::error!("Failed to attach published service: {}", e);
                    self.state = PublishState::Error;
                    self.emit(PublishEvent::Failed);
                    return Err(e);
                }

                tracing::info!(resource = %request.target_resource_id, "Publish succeeded");
                self.state = PublishState::Success;
                self.emit(PublishEvent::Succeeded { service });
            }
            JobOutcome::Failed => {
                tracing::warn!("Publish job failed, retry available");
                self.state = PublishState::Error;
                self.emit(PublishEvent::Failed);
            }
        }
        Ok(self.state)
    }

    /// Drives a running job to a terminal state on a fixed interval. The
    /// timer lives only inside this call, so it can never be left running
    /// after a terminal state is reached.
    pub async fn run(
        &mut self,
        store: &mut ResourceStore,
        period: Duration,
    ) -> crate::Result<PublishState> {
        if self.state != PublishState::Publishing {
            return Ok(self.state);
        }

        let mut timer = tokio::time::interval(period);
        // The first tick of a fresh interval fires immediately; consume it
        // so every real tick sits one period apart.
        timer.tick().await;
        loop {
            timer.tick().await;
            let state = self.tick(store)?;
            if state != PublishState::Publishing {
                return Ok(state);
            }
        }
    }
}

impl Default for PublishWorkflow {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::node::FileType;
    use crate::storage::{MemoryBackend, CATALOG_KEY};
    use std::sync::Arc;

    fn store_with_file() -> (ResourceStore, NodeId) {
        let backend = Arc::new(MemoryBackend::empty());
        let mut store = ResourceStore::open(backend, CATALOG_KEY).unwrap();
        let id = store
            .upload_file(&NodeId::root(), "scene.tif", FileType::Raster, 0, None)
            .unwrap();
        (store, id)
    }

    fn request(target: &NodeId) -> PublishRequest {
        PublishRequest {
            target_resource_id: target.clone(),
            service_name: "scene-service".to_string(),
            style_name: StylePreset::Default,
            service_type: ServiceType::TileService,
        }
    }

    fn forced(outcome: JobOutcome, step: u8) -> PublishWorkflow {
        PublishWorkflow::with_policies(Box::new(FixedProgress(step)), Box::new(FixedOutcome(outcome)))
    }

    #[test]
    fn test_success_prepends_exactly_one_service() {
        let (mut store, target) = store_with_file();
        let mut workflow = forced(JobOutcome::Succeeded, 40);

        workflow.start(&store, request(&target)).unwrap();
        assert_eq!(workflow.state(), PublishState::Publishing);
        assert_eq!(workflow.progress(), 0);

        // 40, 80, 100 (clamped)
        workflow.tick(&mut store).unwrap();
        workflow.tick(&mut store).unwrap();
        assert_eq!(workflow.progress(), 80);
        let state = workflow.tick(&mut store).unwrap();

        assert_eq!(state, PublishState::Success);
        assert_eq!(workflow.progress(), 100);
        let services = &store.get(&target).unwrap().published_services;
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].name, "scene-service");
        assert!(services[0].visible);
        assert!(services[0].url.contains("tile_service"));
        assert!(services[0].url.contains(target.as_str()));
    }

    #[test]
    fn test_new_service_goes_to_head() {
        let (mut store, target) = store_with_file();
        let mut workflow = forced(JobOutcome::Succeeded, 100);

        workflow.start(&store, request(&target)).unwrap();
        workflow.tick(&mut store).unwrap();
        workflow.reset().unwrap();

        let mut second = request(&target);
        second.service_name = "second-service".to_string();
        workflow.start(&store, second).unwrap();
        workflow.tick(&mut store).unwrap();

        let services = &store.get(&target).unwrap().published_services;
        assert_eq!(services.len(), 2);
        assert_eq!(services[0].name, "second-service");
    }

    #[test]
    fn test_failure_creates_no_service_and_allows_retry() {
        let (mut store, target) = store_with_file();
        let mut workflow = forced(JobOutcome::Failed, 100);

        workflow.start(&store, request(&target)).unwrap();
        let state = workflow.tick(&mut store).unwrap();
        assert_eq!(state, PublishState::Error);
        assert!(store.get(&target).unwrap().published_services.is_empty());

        // Retry re-enters publishing from the same form
        workflow.retry().unwrap();
        assert_eq!(workflow.state(), PublishState::Publishing);
        assert_eq!(workflow.progress(), 0);
    }

    #[test]
    fn test_start_while_publishing_is_noop() {
        let (mut store, target) = store_with_file();
        let mut workflow = forced(JobOutcome::Succeeded, 10);

        workflow.start(&store, request(&target)).unwrap();
        workflow.tick(&mut store).unwrap();
        let progress_before = workflow.progress();

        // Second start leaves state and progress unchanged
        workflow.start(&store, request(&target)).unwrap();
        assert_eq!(workflow.state(), PublishState::Publishing);
        assert_eq!(workflow.progress(), progress_before);

        // And no second service shows up when the first job finishes
        while workflow.state() == PublishState::Publishing {
            workflow.tick(&mut store).unwrap();
        }
        assert_eq!(store.get(&target).unwrap().published_services.len(), 1);
    }

    #[test]
    fn test_blank_service_name_rejected_before_state_change() {
        let (store, target) = store_with_file();
        let mut workflow = forced(JobOutcome::Succeeded, 50);

        let mut bad = request(&target);
        bad.service_name = "   ".to_string();
        assert!(workflow.start(&store, bad).is_err());
        assert_eq!(workflow.state(), PublishState::Idle);
    }

    #[test]
    fn test_unknown_resource_rejected() {
        let (store, _) = store_with_file();
        let mut workflow = forced(JobOutcome::Succeeded, 50);
        assert!(workflow
            .start(&store, request(&NodeId::from("missing")))
            .is_err());
        assert_eq!(workflow.state(), PublishState::Idle);
    }

    #[test]
    fn test_close_guard() {
        let (mut store, target) = store_with_file();
        let mut workflow = forced(JobOutcome::Succeeded, 100);
        assert!(workflow.can_close());

        workflow.start(&store, request(&target)).unwrap();
        assert!(!workflow.can_close());
        assert!(workflow.reset().is_err());

        workflow.tick(&mut store).unwrap();
        assert!(workflow.can_close());
        workflow.reset().unwrap();
        assert_eq!(workflow.state(), PublishState::Idle);
    }

    #[test]
    fn test_retry_outside_error_state_is_rejected() {
        let mut workflow = forced(JobOutcome::Succeeded, 100);
        assert!(workflow.retry().is_err());
    }

    #[test]
    fn test_tick_outside_publishing_is_noop() {
        let (mut store, _) = store_with_file();
        let mut workflow = forced(JobOutcome::Succeeded, 100);
        assert_eq!(workflow.tick(&mut store).unwrap(), PublishState::Idle);
        assert_eq!(workflow.progress(), 0);
    }

    #[test]
    fn test_progress_clamps_at_exactly_100() {
        let (mut store, target) = store_with_file();
        let mut workflow = forced(JobOutcome::Succeeded, 97);

        workflow.start(&store, request(&target)).unwrap();
        workflow.tick(&mut store).unwrap();
        assert_eq!(workflow.progress(), 97);
        workflow.tick(&mut store).unwrap();
        assert_eq!(workflow.progress(), 100);
    }

    #[test]
    fn test_events_are_broadcast() {
        let (mut store, target) = store_with_file();
        let mut workflow = forced(JobOutcome::Succeeded, 100);
        let mut rx = workflow.subscribe();

        workflow.start(&store, request(&target)).unwrap();
        workflow.tick(&mut store).unwrap();

        assert!(matches!(rx.try_recv().unwrap(), PublishEvent::Started { .. }));
        assert!(matches!(
            rx.try_recv().unwrap(),
            PublishEvent::Progress { percent: 100 }
        ));
        match rx.try_recv().unwrap() {
            PublishEvent::Succeeded { service } => assert_eq!(service.name, "scene-service"),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_run_drives_job_to_terminal_state() {
        let (mut store, target) = store_with_file();
        let mut workflow = forced(JobOutcome::Succeeded, 35);

        workflow.start(&store, request(&target)).unwrap();
        let state = workflow
            .run(&mut store, Duration::from_millis(1))
            .await
            .unwrap();

        assert_eq!(state, PublishState::Success);
        assert_eq!(store.get(&target).unwrap().published_services.len(), 1);
    }
}
