//! Run statistics.

use std::time::Duration;

use dispatcher::MetricsSnapshot as DispatchSnapshot;
use ingestion::MetricsSnapshot as IngestionSnapshot;
use observability::RouteSummary;

/// Statistics from a bridge run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Total duration of the run
    pub duration: Duration,

    /// Registered output modules
    pub active_modules: usize,

    /// Devices reported by the startup scan
    pub devices: usize,

    /// Listener counters
    pub ingestion: IngestionSnapshot,

    /// Router aggregate
    pub routing: RouteSummary,

    /// Worker pool counters
    pub dispatch: DispatchSnapshot,
}

impl PipelineStats {
    /// Events per second
    pub fn events_per_sec(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.routing.total_events as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Failed or panicked reactions as a percentage of finished ones
    pub fn failure_rate(&self) -> f64 {
        let failed = self.dispatch.failure_count + self.dispatch.panic_count;
        let total = self.dispatch.completed_count + failed;
        if total > 0 {
            (failed as f64 / total as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n=== Bridge Statistics ===\n");

        println!("Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Events/s: {:.2}", self.events_per_sec());
        println!("   ├─ Modules: {}", self.active_modules);
        println!("   └─ Devices: {}", self.devices);

        println!("\nListener");
        println!("   ├─ Datagrams: {}", self.ingestion.datagrams_received);
        println!("   ├─ Events decoded: {}", self.ingestion.events_decoded);
        println!("   ├─ Decode errors: {}", self.ingestion.decode_errors);
        println!("   ├─ Listener failures: {}", self.ingestion.listener_failures);
        println!("   └─ Dropped (queue full): {}", self.ingestion.events_dropped);

        println!("\n{}", self.routing);

        println!("Dispatch");
        println!("   ├─ Submitted: {}", self.dispatch.submitted_count);
        println!("   ├─ Completed: {}", self.dispatch.completed_count);
        println!("   ├─ Failed: {}", self.dispatch.failure_count);
        println!("   ├─ Panicked: {}", self.dispatch.panic_count);
        println!("   ├─ Unresolved: {}", self.dispatch.unresolved_count);
        println!("   └─ Failure rate: {:.2}%", self.failure_rate());

        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rates() {
        let mut stats = PipelineStats {
            duration: Duration::from_secs(2),
            ..Default::default()
        };
        stats.routing.total_events = 10;
        stats.dispatch.completed_count = 3;
        stats.dispatch.failure_count = 1;

        assert!((stats.events_per_sec() - 5.0).abs() < 1e-10);
        assert!((stats.failure_rate() - 25.0).abs() < 1e-10);
        assert_eq!(PipelineStats::default().failure_rate(), 0.0);
    }
}
