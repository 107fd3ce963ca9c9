//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::info;

use contracts::BridgeConfig;

use super::shutdown_signal;
use crate::cli::RunArgs;
use crate::error::load_config;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_bridge(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    let mut config = load_config(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Apply CLI overrides
    if let Some(port) = args.port {
        info!(port, "Overriding OSC port from CLI");
        config.app_settings.osc_port = port;
    }
    if let Some(workers) = args.workers {
        anyhow::ensure!(workers > 0, "--workers must be greater than 0");
        info!(workers, "Overriding worker pool size from CLI");
        config.app_settings.worker_pool_size = workers;
    }
    if let Some(port) = args.metrics_port {
        config.app_settings.metrics_port = Some(port);
    }

    info!(
        port = config.app_settings.osc_port,
        contacts = config.contacts.len(),
        bindings = config.bindings.len(),
        modules = config.modules.len(),
        "Configuration loaded"
    );

    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&config);
        return Ok(());
    }

    if let Some(port) = config.app_settings.metrics_port {
        observability::init_metrics_only(port)?;
    }

    let pipeline = Pipeline::new(PipelineConfig {
        config,
        timeout: (args.timeout > 0).then(|| Duration::from_secs(args.timeout)),
        stats_interval: (args.stats_interval > 0).then(|| Duration::from_secs(args.stats_interval)),
    });

    info!("Starting bridge...");

    let stats = pipeline
        .run(shutdown_signal())
        .await
        .context("Bridge execution failed")?;
    stats.print_summary();

    info!("Haptic Bridge finished");
    Ok(())
}

/// Print configuration summary for dry-run mode
fn print_config_summary(config: &BridgeConfig) {
    println!("\n=== Configuration Summary ===\n");
    println!("Listener:");
    println!("  OSC port: {}", config.app_settings.osc_port);
    println!("  Workers: {}", config.app_settings.worker_pool_size);

    println!("\nContacts ({}):", config.contacts.len());
    for contact in &config.contacts {
        let bindings = config
            .bindings
            .iter()
            .filter(|b| b.contact_id == contact.id)
            .count();
        println!(
            "  - {} ({}) - {} bindings, cooldown {}s",
            contact.id, contact.name, bindings, contact.cooldown
        );
    }

    if !config.modules.is_empty() {
        println!("\nModules ({}):", config.modules.len());
        for module in &config.modules {
            let state = if module.enabled { "" } else { " [disabled]" };
            println!("  - {} ({:?}){}", module.name, module.module_type, state);
        }
    }

    println!();
}
