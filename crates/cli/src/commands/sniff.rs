//! `sniff` command implementation.
//!
//! Shows which OSC addresses arrive on the sniff port and their latest
//! values, to help fill in contact ids and paths.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use contracts::DEFAULT_SNIFF_PORT;
use ingestion::{AddressSample, AddressTracker, AddressUpdate, OscListener};

use super::shutdown_signal;
use crate::cli::SniffArgs;
use crate::error::load_config;

/// Execute the `sniff` command
pub async fn run_sniff(args: &SniffArgs) -> Result<()> {
    let port = match (args.port, &args.config) {
        (Some(port), _) => port,
        (None, Some(path)) => {
            load_config(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?
                .app_settings
                .sniff_port
        }
        (None, None) => DEFAULT_SNIFF_PORT,
    };

    let tracker = Arc::new(AddressTracker::new());
    let mut listener = OscListener::new();
    let listener_id = listener.add_listener(tracker.callback())?;
    let addr = listener.start(port).await?;

    info!(addr = %addr, "Sniffing OSC traffic (Ctrl+C to stop)");
    println!("Listening on {addr}\n");

    let deadline = async {
        match args.duration {
            0 => std::future::pending::<()>().await,
            secs => tokio::time::sleep(Duration::from_secs(secs)).await,
        }
    };
    tokio::pin!(deadline);
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    let mut ticker = tokio::time::interval(Duration::from_millis(args.interval_ms.max(10)));
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = &mut deadline => break,
            _ = ticker.tick() => {
                for update in tracker.drain_updates() {
                    if matches_filter(&update.sample, args.filter.as_deref()) {
                        println!("{}", format_update(&update));
                    }
                }
            }
        }
    }

    listener.remove_listener(listener_id);
    listener.stop().await?;

    let mut samples: Vec<AddressSample> = tracker
        .addresses()
        .into_iter()
        .filter(|s| matches_filter(s, args.filter.as_deref()))
        .collect();
    samples.sort_by(|a, b| a.address.cmp(&b.address));
    print_summary(&samples);

    let metrics = listener.metrics().snapshot();
    info!(
        datagrams = metrics.datagrams_received,
        decode_errors = metrics.decode_errors,
        addresses = samples.len(),
        "Sniffer stopped"
    );
    Ok(())
}

fn matches_filter(sample: &AddressSample, filter: Option<&str>) -> bool {
    filter.is_none_or(|f| sample.address.contains(f))
}

fn format_value(sample: &AddressSample) -> String {
    match &sample.value {
        Some(value) => format!("{} ({})", value, value.type_name()),
        None => "(no arguments)".to_string(),
    }
}

fn format_update(update: &AddressUpdate) -> String {
    let marker = if update.is_new { "NEW" } else { "   " };
    format!("{} {} = {}", marker, update.sample.address, format_value(&update.sample))
}

fn print_summary(samples: &[AddressSample]) {
    println!("\n=== Addresses seen ({}) ===", samples.len());
    for sample in samples {
        println!(
            "  {} = {} x{}",
            sample.address,
            format_value(sample),
            sample.count
        );
    }
    println!();
}
