//! Fixed-delay re-check scheduling.
//!
//! A single background task owns a deadline-ordered queue of pending
//! re-checks. When a deadline expires the task re-enqueues the record onto
//! the controller's worker queue; it never touches the store or runs
//! handler logic itself.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::controller::Command;

/// A request to re-check a record after a delay.
#[derive(Debug)]
pub(crate) struct ScheduleRequest {
    pub id: String,
    pub delay: Duration,
}

/// Run the scheduler loop until the request channel closes or the worker
/// queue goes away.
///
/// Expired entries are forwarded as [`Command::Recheck`], the path that
/// deliberately bypasses the in-flight guard.
pub(crate) async fn run_scheduler(
    mut requests: mpsc::UnboundedReceiver<ScheduleRequest>,
    worker: mpsc::UnboundedSender<Command>,
) {
    let mut pending: BinaryHeap<Reverse<(Instant, String)>> = BinaryHeap::new();

    loop {
        let next_deadline = pending.peek().map(|Reverse((at, _))| *at);

        match next_deadline {
            Some(deadline) => {
                tokio::select! {
                    request = requests.recv() => match request {
                        Some(request) => {
                            debug!(integration_id = %request.id, delay = ?request.delay, "Scheduled re-check");
                            pending.push(Reverse((Instant::now() + request.delay, request.id)));
                        }
                        None => break,
                    },
                    _ = tokio::time::sleep_until(deadline) => {
                        if let Some(Reverse((_, id))) = pending.pop() {
                            debug!(integration_id = %id, "Re-check due");
                            if worker.send(Command::Recheck { id }).is_err() {
                                break;
                            }
                        }
                    }
                }
            }
            None => match requests.recv().await {
                Some(request) => {
                    debug!(integration_id = %request.id, delay = ?request.delay, "Scheduled re-check");
                    pending.push(Reverse((Instant::now() + request.delay, request.id)));
                }
                None => break,
            },
        }
    }

    info!("Scheduler stopped");
}
