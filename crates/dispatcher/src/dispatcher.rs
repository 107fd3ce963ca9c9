//! Dispatcher - fixed-size worker pool for reaction calls
//!
//! Callers resolve the module and entry point synchronously and enqueue a
//! job; a worker runs the call on the blocking pool so a slow or crashing
//! module never stalls the receive loop.

use std::sync::Arc;
use std::time::Duration;

use async_channel::{Receiver, Sender, TrySendError};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use contracts::{Binding, ContractError, DEFAULT_WORKER_POOL_SIZE, ReactionSink};
use observability::ReactionStatus;

use crate::metrics::DispatchMetrics;
use crate::registry::ModuleRegistry;

/// Dispatcher configuration
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Number of concurrent reaction calls
    pub worker_count: usize,
    /// How long `shutdown` waits for queued jobs
    pub shutdown_grace: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKER_POOL_SIZE,
            shutdown_grace: Duration::from_secs(2),
        }
    }
}

impl DispatcherConfig {
    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }
}

/// Resolved module entry point
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReactionEntry {
    /// Dedicated entry point named by the binding
    Specific(String),
    /// Generic `handle_event`
    Fallback,
}

impl ReactionEntry {
    /// Resolve the entry point for `reaction_type` on `module`
    pub fn resolve(module: &dyn ReactionSink, reaction_type: &str) -> Option<Self> {
        if module.supports(reaction_type) {
            Some(Self::Specific(reaction_type.to_string()))
        } else if module.has_fallback() {
            Some(Self::Fallback)
        } else {
            None
        }
    }
}

/// Result of a dispatch request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchStatus {
    /// Job accepted into the queue
    Queued(ReactionEntry),
    /// No module registered under the binding's module name
    ModuleNotFound,
    /// Module has neither the reaction nor a fallback
    ReactionNotFound,
    /// Dispatcher is shutting down
    Closed,
}

impl DispatchStatus {
    pub fn is_queued(&self) -> bool {
        matches!(self, Self::Queued(_))
    }
}

struct DispatchJob {
    module: Arc<dyn ReactionSink>,
    entry: ReactionEntry,
    binding: Arc<Binding>,
    intensity: f64,
}

impl DispatchJob {
    fn reaction(&self) -> &str {
        match &self.entry {
            ReactionEntry::Specific(reaction) => reaction,
            ReactionEntry::Fallback => &self.binding.reaction_type,
        }
    }

    fn run(&self) -> Result<(), ContractError> {
        match &self.entry {
            ReactionEntry::Specific(reaction) => {
                self.module.react(reaction, &self.binding, self.intensity)
            }
            ReactionEntry::Fallback => self.module.handle_event(&self.binding, self.intensity),
        }
    }
}

/// Bounded worker pool executing reactions
pub struct Dispatcher {
    tx: Sender<DispatchJob>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    metrics: Arc<DispatchMetrics>,
    config: DispatcherConfig,
}

impl Dispatcher {
    /// Start `config.worker_count` workers (at least one)
    ///
    /// Must be called from within a tokio runtime.
    #[instrument(name = "dispatcher_spawn", skip(config), fields(workers = config.worker_count))]
    pub fn spawn(config: DispatcherConfig) -> Self {
        let (tx, rx) = async_channel::unbounded();
        let metrics = Arc::new(DispatchMetrics::new());
        let worker_count = config.worker_count.max(1);

        let workers = (0..worker_count)
            .map(|worker_id| {
                let rx = rx.clone();
                let metrics = Arc::clone(&metrics);
                tokio::spawn(async move {
                    dispatch_worker(worker_id, rx, metrics).await;
                })
            })
            .collect();

        info!(workers = worker_count, "Dispatcher started");

        Self {
            tx,
            workers: Mutex::new(workers),
            metrics,
            config,
        }
    }

    /// Resolve the module and entry point for `binding`, then enqueue
    ///
    /// Never blocks; safe to call from a listener callback.
    pub fn dispatch(
        &self,
        modules: &ModuleRegistry,
        binding: Arc<Binding>,
        intensity: f64,
    ) -> DispatchStatus {
        let Some(module) = modules.get(&binding.module_name) else {
            self.metrics.inc_unresolved_count();
            warn!(
                module = %binding.module_name,
                contact_id = %binding.contact_id,
                "Module not found"
            );
            return DispatchStatus::ModuleNotFound;
        };

        let Some(entry) = ReactionEntry::resolve(module.as_ref(), &binding.reaction_type) else {
            self.metrics.inc_unresolved_count();
            warn!(
                module = %binding.module_name,
                reaction = %binding.reaction_type,
                contact_id = %binding.contact_id,
                "Module has no entry point for reaction"
            );
            return DispatchStatus::ReactionNotFound;
        };

        let job = DispatchJob {
            module: Arc::clone(module),
            entry: entry.clone(),
            binding,
            intensity,
        };

        match self.tx.try_send(job) {
            Ok(()) => {
                self.metrics.inc_submitted_count();
                self.metrics.set_queue_len(self.tx.len());
                observability::record_dispatch_queue_depth(self.tx.len());
                DispatchStatus::Queued(entry)
            }
            Err(TrySendError::Closed(job) | TrySendError::Full(job)) => {
                debug!(
                    module = %job.binding.module_name,
                    reaction = %job.reaction(),
                    "Dispatcher closed, job dropped"
                );
                DispatchStatus::Closed
            }
        }
    }

    pub fn metrics(&self) -> &Arc<DispatchMetrics> {
        &self.metrics
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Stop accepting jobs and wait for queued ones
    ///
    /// Workers still busy after the grace period are aborted.
    #[instrument(name = "dispatcher_shutdown", skip(self))]
    pub async fn shutdown(&self) {
        self.tx.close();
        let mut workers = std::mem::take(&mut *self.workers.lock());

        let drained = tokio::time::timeout(self.config.shutdown_grace, async {
            for worker in workers.iter_mut() {
                if let Err(e) = worker.await {
                    error!(error = ?e, "Dispatch worker task failed");
                }
            }
        })
        .await;

        if drained.is_err() {
            warn!(
                grace_ms = self.config.shutdown_grace.as_millis() as u64,
                pending = self.tx.len(),
                "Shutdown grace elapsed, aborting workers"
            );
            for worker in &workers {
                worker.abort();
            }
        }

        info!(
            completed = self.metrics.completed_count(),
            failed = self.metrics.failure_count(),
            panicked = self.metrics.panic_count(),
            "Dispatcher shutdown complete"
        );
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.tx.close();
    }
}

/// Worker task that consumes jobs until the queue is closed and drained
#[instrument(name = "dispatch_worker_loop", skip(rx, metrics))]
async fn dispatch_worker(worker_id: usize, rx: Receiver<DispatchJob>, metrics: Arc<DispatchMetrics>) {
    debug!(worker_id, "Dispatch worker started");

    while let Ok(job) = rx.recv().await {
        metrics.set_queue_len(rx.len());

        let module = job.module.name().to_string();
        let reaction = job.reaction().to_string();
        let contact_id = job.binding.contact_id.clone();
        let device_id = job.binding.device_id.clone();

        let status = match tokio::task::spawn_blocking(move || job.run()).await {
            Ok(Ok(())) => {
                metrics.inc_completed_count();
                ReactionStatus::Success
            }
            Ok(Err(e)) => {
                metrics.inc_failure_count();
                error!(
                    module = %module,
                    reaction = %reaction,
                    contact_id = %contact_id,
                    device_id = %device_id,
                    error = %e,
                    "Reaction failed"
                );
                ReactionStatus::Failure
            }
            Err(e) if e.is_panic() => {
                metrics.inc_panic_count();
                error!(
                    module = %module,
                    reaction = %reaction,
                    contact_id = %contact_id,
                    device_id = %device_id,
                    "Reaction panicked"
                );
                ReactionStatus::Panic
            }
            Err(e) => {
                metrics.inc_failure_count();
                error!(module = %module, reaction = %reaction, error = %e, "Reaction task cancelled");
                ReactionStatus::Failure
            }
        };

        observability::record_reaction(&module, &reaction, status);
    }

    debug!(worker_id, "Dispatch worker stopped");
}
