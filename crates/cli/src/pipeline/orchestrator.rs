//! Pipeline orchestrator - wires listener, router and dispatcher together.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use contracts::BridgeConfig;
use dispatcher::{Dispatcher, DispatcherConfig};
use ingestion::OscListener;
use router::{Router, RoutingTable};
use tracing::{info, warn};

use super::PipelineStats;
use crate::error::Result;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// The loaded user configuration
    pub config: BridgeConfig,

    /// Run timeout (None = until shutdown signal)
    pub timeout: Option<Duration>,

    /// Periodic statistics logging (None = disabled)
    pub stats_interval: Option<Duration>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run until `shutdown` resolves or the timeout elapses
    pub async fn run<F>(self, shutdown: F) -> Result<PipelineStats>
    where
        F: Future<Output = ()>,
    {
        let start_time = Instant::now();
        let config = &self.config.config;
        let settings = &config.app_settings;

        // Register output modules
        info!(modules = config.modules.len(), "Registering output modules...");
        let registry = dispatcher::create_registry(&config.modules)?;

        let mut devices = 0usize;
        for (module, result) in registry.scan_all() {
            match result {
                Ok(found) => devices += found.len(),
                Err(e) => warn!(module = %module, error = %e, "Device scan failed, continuing"),
            }
        }
        let active_modules = registry.len();

        // Routing table
        let table = Arc::new(RoutingTable::new());
        table.update(config.contacts.clone(), config.bindings.clone())?;
        table.update_modules(registry);

        warn_unroutable_bindings(config, &table);

        // Dispatcher
        let dispatcher = Arc::new(Dispatcher::spawn(
            DispatcherConfig::default().with_worker_count(settings.worker_pool_size),
        ));
        let router = Arc::new(Router::new(Arc::clone(&table), Arc::clone(&dispatcher)));

        // Listener
        let mut listener = OscListener::new();
        listener.add_listener(router.listener_callback())?;
        let local_addr = listener.start(settings.osc_port).await?;

        info!(
            addr = %local_addr,
            contacts = config.contacts.len(),
            bindings = config.bindings.len(),
            modules = active_modules,
            workers = settings.worker_pool_size,
            "Bridge running"
        );

        self.wait(shutdown, &router).await;

        // Shutdown: stop intake first, then drain the pool
        info!("Shutting down bridge...");
        listener.stop().await?;
        dispatcher.shutdown().await;

        let stats = PipelineStats {
            duration: start_time.elapsed(),
            active_modules,
            devices,
            ingestion: listener.metrics().snapshot(),
            routing: router.stats(),
            dispatch: dispatcher.metrics().snapshot(),
        };

        info!(
            duration_secs = stats.duration.as_secs_f64(),
            events = stats.routing.total_events,
            dispatched = stats.routing.dispatched_reactions,
            "Bridge shutdown complete"
        );

        Ok(stats)
    }

    async fn wait<F>(&self, shutdown: F, router: &Router)
    where
        F: Future<Output = ()>,
    {
        let timeout = async {
            match self.config.timeout {
                Some(timeout) => tokio::time::sleep(timeout).await,
                None => std::future::pending::<()>().await,
            }
        };

        let report = async {
            let Some(interval) = self.config.stats_interval else {
                return std::future::pending::<()>().await;
            };
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let summary = router.stats();
                let dispatch = router.dispatcher().metrics().snapshot();
                info!(
                    events = summary.total_events,
                    routed = summary.routed_events,
                    suppressed = summary.suppressed_events,
                    unmatched = summary.unmatched_events,
                    queued = dispatch.queue_len,
                    completed = dispatch.completed_count,
                    failed = dispatch.failure_count + dispatch.panic_count,
                    "Bridge statistics"
                );
            }
        };

        tokio::select! {
            _ = shutdown => warn!("Received shutdown signal, stopping bridge..."),
            _ = timeout => info!("Run timeout reached"),
            _ = report => {}
        }
    }
}

/// Bindings whose contact or module cannot be resolved never fire
fn warn_unroutable_bindings(config: &BridgeConfig, table: &RoutingTable) {
    let modules = table.modules();
    for binding in &config.bindings {
        if modules.get(&binding.module_name).is_none() {
            warn!(
                contact_id = %binding.contact_id,
                module = %binding.module_name,
                "Binding references a module that is not registered"
            );
        }
    }
}
