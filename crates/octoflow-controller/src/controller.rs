//! The reconciliation controller.
//!
//! Tracks changes to integration records and processes them so that each
//! record's current status converges on its desired status. All record
//! reads, writes and handler invocations are funneled through a single
//! worker task; a subscription task forwards change notifications without
//! blocking, and a scheduler task re-enqueues fixed-delay re-checks.

use std::sync::Arc;

use octoflow_core::events::{EventBroadcaster, Kind};
use octoflow_core::{Integration, IntegrationStatus, RevisionState};
use octoflow_storage::{IntegrationStore, StorageError};
use thiserror::Error;
use time::OffsetDateTime;
use tokio::sync::{Mutex, broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::ControllerConfig;
use crate::handler::{StatusChangeHandler, StatusUpdate};
use crate::registry::HandlerRegistry;
use crate::scheduler::{ScheduleRequest, run_scheduler};
use crate::tracker::InFlightTracker;

/// Errors surfaced by the controller's persistence paths.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Work items processed by the single worker task.
#[derive(Debug)]
pub(crate) enum Command {
    /// Event-driven check; suppressed when the record's desired status is
    /// already in flight.
    GuardedCheck { id: String },
    /// Timer-driven re-check; bypasses the in-flight guard.
    Recheck { id: String },
    /// One-time recovery scan over all records.
    Sweep,
}

/// Background task handles held while the controller runs.
struct ControllerRuntime {
    worker: JoinHandle<()>,
    scheduler: JoinHandle<()>,
    subscription: JoinHandle<()>,
}

/// The reconciliation controller.
///
/// Create with [`IntegrationController::new`], then call
/// [`start`](IntegrationController::start). `start` subscribes to the
/// change broadcaster, spawns the worker and scheduler tasks, and performs
/// the one-time startup sweep that recovers state after a restart.
///
/// # Example
///
/// ```ignore
/// let controller = IntegrationController::new(
///     store,
///     broadcaster,
///     HandlerRegistry::new(vec![activate_handler, teardown_handler]),
///     ControllerConfig::default(),
/// );
/// controller.start().await;
/// // ...
/// controller.stop().await;
/// ```
pub struct IntegrationController {
    inner: Arc<ControllerInner>,
    runtime: Mutex<Option<ControllerRuntime>>,
}

struct ControllerInner {
    store: Arc<dyn IntegrationStore>,
    broadcaster: Arc<EventBroadcaster>,
    handlers: HandlerRegistry,
    in_flight: InFlightTracker,
    config: ControllerConfig,
}

impl IntegrationController {
    /// Create a controller over the given store and notification channel.
    pub fn new(
        store: Arc<dyn IntegrationStore>,
        broadcaster: Arc<EventBroadcaster>,
        handlers: HandlerRegistry,
        config: ControllerConfig,
    ) -> Self {
        Self {
            inner: Arc::new(ControllerInner {
                store,
                broadcaster,
                handlers,
                in_flight: InFlightTracker::new(),
                config,
            }),
            runtime: Mutex::new(None),
        }
    }

    /// Start the controller: spawn the worker, scheduler and subscription
    /// tasks and enqueue the startup sweep. A second call while running is
    /// a no-op.
    pub async fn start(&self) {
        let mut runtime = self.runtime.lock().await;
        if runtime.is_some() {
            debug!("Controller already started");
            return;
        }

        let (worker_tx, worker_rx) = mpsc::unbounded_channel();
        let (schedule_tx, schedule_rx) = mpsc::unbounded_channel();

        let subscription = tokio::spawn(run_subscription(
            self.inner.broadcaster.subscribe(),
            worker_tx.clone(),
        ));
        let scheduler = tokio::spawn(run_scheduler(schedule_rx, worker_tx.clone()));
        let worker = tokio::spawn(run_worker(self.inner.clone(), worker_rx, schedule_tx));

        if self.inner.config.sweep_on_start {
            // Recovers state after a crash or restart; notifications that
            // happened while we were down are gone.
            let _ = worker_tx.send(Command::Sweep);
        }

        *runtime = Some(ControllerRuntime {
            worker,
            scheduler,
            subscription,
        });
        info!("Integration controller started");
    }

    /// Stop the controller: unsubscribe and shut down the worker and
    /// scheduler. Queued-but-not-started work is discarded; in-progress
    /// work is abandoned, not waited for.
    pub async fn stop(&self) {
        if let Some(runtime) = self.runtime.lock().await.take() {
            runtime.subscription.abort();
            runtime.scheduler.abort();
            runtime.worker.abort();
            info!("Integration controller stopped");
        }
    }

    /// The in-flight tracker. Markers appear here while a transition is
    /// underway and disappear once the record is observed converged.
    pub fn in_flight(&self) -> &InFlightTracker {
        &self.inner.in_flight
    }
}

/// Forward relevant change events to the worker queue.
///
/// Runs on a context shared with the notification transport: it must never
/// block or perform I/O, so it only filters on the record kind and hands
/// the id off with an unbounded send.
async fn run_subscription(
    mut events: broadcast::Receiver<octoflow_core::ChangeEvent>,
    worker: mpsc::UnboundedSender<Command>,
) {
    loop {
        match events.recv().await {
            Ok(event) => {
                if !event.is_kind(Kind::Integration) {
                    continue;
                }
                if worker.send(Command::GuardedCheck { id: event.id }).is_err() {
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                // The sweep and the fixed-delay re-checks cover whatever
                // we missed.
                warn!(missed, "Change event subscription lagged");
            }
            Err(broadcast::error::RecvError::Closed) => {
                info!("Change event channel closed, stopping subscription");
                break;
            }
        }
    }
}

/// Drain the worker queue. The only place record state is mutated.
async fn run_worker(
    inner: Arc<ControllerInner>,
    mut commands: mpsc::UnboundedReceiver<Command>,
    schedule: mpsc::UnboundedSender<ScheduleRequest>,
) {
    while let Some(command) = commands.recv().await {
        match command {
            Command::Sweep => inner.sweep(&schedule).await,
            Command::GuardedCheck { id } => inner.guarded_check(&id, &schedule).await,
            Command::Recheck { id } => inner.recheck(&id, &schedule).await,
        }
    }
}

impl ControllerInner {
    /// Check every record once; recovers from restarts where buffered
    /// notifications were lost.
    async fn sweep(&self, schedule: &mpsc::UnboundedSender<ScheduleRequest>) {
        info!("Checking integrations for their status");
        match self.store.fetch_all().await {
            Ok(records) => {
                for record in records {
                    self.check_status(record, schedule).await;
                }
            }
            Err(e) => error!(error = %e, "Startup sweep failed to list integrations"),
        }
    }

    /// Event-driven entry point: skip when a check for this record's
    /// desired status is already underway.
    async fn guarded_check(&self, id: &str, schedule: &mpsc::UnboundedSender<ScheduleRequest>) {
        let record = match self.store.fetch(id).await {
            Ok(Some(record)) => record,
            Ok(None) => return,
            Err(e) => {
                error!(integration_id = %id, error = %e, "Failed to fetch integration");
                return;
            }
        };

        if let Some(desired) = record.desired_status {
            let key = InFlightTracker::key(desired, id);
            if self.in_flight.contains(&key) {
                debug!(integration_id = %id, desired = %desired, "Check already in progress");
                return;
            }
        }

        self.check_status(record, schedule).await;
    }

    /// Timer-driven entry point: no in-flight guard, by design — this is
    /// the path that clears or re-drives work a failure left marked.
    async fn recheck(&self, id: &str, schedule: &mpsc::UnboundedSender<ScheduleRequest>) {
        match self.store.fetch(id).await {
            Ok(Some(record)) => self.check_status(record, schedule).await,
            Ok(None) => {}
            Err(e) => {
                error!(integration_id = %id, error = %e, "Failed to fetch integration for re-check")
            }
        }
    }

    /// Compare desired and current status and dispatch when they differ.
    async fn check_status(
        &self,
        record: Integration,
        schedule: &mpsc::UnboundedSender<ScheduleRequest>,
    ) {
        if record.is_converged() {
            // Fixed point reached: remove the marker so the next change
            // triggers a check again. Doesn't harm when no such key exists.
            if let (Some(desired), Some(id)) = (record.desired_status, record.id.as_deref()) {
                self.in_flight.finish(&InFlightTracker::key(desired, id));
            }
            return;
        }

        let Some(desired) = record.desired_status else {
            return;
        };
        let Some(id) = record.id.clone() else {
            return;
        };

        // No handler registered for this status: nothing to do yet.
        if let Some(handler) = self.handlers.get(desired) {
            info!(
                integration_id = %id,
                desired = %desired,
                current = record.current_status.map(|s| s.as_str()).unwrap_or("[none]"),
                "Desired status differs from current status, calling status change handler"
            );
            self.dispatch(handler, &id, desired, schedule).await;
        }
    }

    /// Run a handler against a freshly fetched copy of the record and
    /// persist the outcome.
    async fn dispatch(
        &self,
        handler: Arc<dyn StatusChangeHandler>,
        id: &str,
        target: IntegrationStatus,
        schedule: &mpsc::UnboundedSender<ScheduleRequest>,
    ) {
        // Re-fetch so we never act on the snapshot that triggered us.
        let record = match self.store.fetch(id).await {
            Ok(record) => record,
            Err(e) => {
                error!(integration_id = %id, error = %e, "Failed to fetch integration for dispatch");
                return;
            }
        };

        let marker = InFlightTracker::key(target, id);
        self.in_flight.begin(marker.clone());

        let Some(record) = record else {
            // Record vanished between notification and dispatch.
            self.in_flight.finish(&marker);
            return;
        };

        if stale(handler.as_ref(), &record, target) {
            debug!(integration_id = %id, desired = %target, "Dropping stale dispatch");
            self.in_flight.finish(&marker);
            return;
        }

        info!(integration_id = %id, handler = handler.name(), "Start processing integration");
        match handler.execute(&record).await {
            Ok(Some(update)) => {
                if let Err(e) = self.apply_update(id, &record, &update).await {
                    error!(integration_id = %id, error = %e, "Failed to persist status update");
                }
            }
            Ok(None) => {
                debug!(integration_id = %id, "Handler reported no change needed");
            }
            Err(e) => {
                error!(integration_id = %id, error = %e, "Error while processing integration status");
                // Note the failure on the record. The marker stays set; the
                // timer-driven re-check owns the retry.
                if let Err(persist_err) = self.record_failure(id, &e.to_string()).await {
                    error!(integration_id = %id, error = %persist_err, "Failed to persist failure message");
                }
            }
        }

        // Safety-net re-check for this record, regardless of outcome.
        self.reschedule(id, schedule);
    }

    /// Merge a successful status update onto a fresh copy of the record,
    /// recompute its revisions, and persist.
    async fn apply_update(
        &self,
        id: &str,
        snapshot: &Integration,
        update: &StatusUpdate,
    ) -> Result<(), ControllerError> {
        // The handler may have blocked for a while; refresh our copy before
        // merging so concurrent external edits are not thrown away.
        let Some(fresh) = self.store.fetch(id).await? else {
            debug!(integration_id = %id, "Integration vanished before the update could be persisted");
            return Ok(());
        };

        let now = OffsetDateTime::now_utc();
        let mut updated = fresh;
        updated.current_status = Some(update.status);
        updated.status_message = update.status_message.clone();
        updated.steps_done = update.steps_performed;
        if update.status == IntegrationStatus::Activated {
            // Marks the most recent successful activation, not record
            // creation.
            updated.created_date = now;
        }
        updated.last_updated = now;
        // Revisions derive from the snapshot the handler actually ran
        // against.
        updated.revisions = snapshot.recompute_revisions(RevisionState::from(update.status));

        self.store.update(updated).await?;
        info!(
            integration_id = %id,
            status = %update.status,
            message = update.status_message.as_deref().unwrap_or(""),
            "Status persisted"
        );
        Ok(())
    }

    /// Persist only a failure message; statuses are left untouched.
    async fn record_failure(&self, id: &str, details: &str) -> Result<(), ControllerError> {
        let Some(fresh) = self.store.fetch(id).await? else {
            return Ok(());
        };
        let mut noted = fresh;
        noted.status_message = Some(format!("Error: {details}"));
        noted.touch();
        self.store.update(noted).await?;
        Ok(())
    }

    /// Enqueue the fixed-delay re-check.
    fn reschedule(&self, id: &str, schedule: &mpsc::UnboundedSender<ScheduleRequest>) {
        let request = ScheduleRequest {
            id: id.to_string(),
            delay: self.config.reschedule_interval,
        };
        if schedule.send(request).is_err() {
            debug!(integration_id = %id, "Scheduler gone, dropping re-check");
        }
    }
}

/// Whether the world changed between enqueue and execution: the dispatch is
/// dropped when the record converged meanwhile, is chasing a different
/// desired status, or the handler no longer covers it.
fn stale(handler: &dyn StatusChangeHandler, record: &Integration, target: IntegrationStatus) -> bool {
    record.desired_status != Some(target)
        || record.is_converged()
        || !handler.trigger_statuses().contains(&target)
}
