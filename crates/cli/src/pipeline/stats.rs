//! Pipeline statistics and metrics.

use std::time::Duration;

use observability::NavMetricsAggregator;

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Overlay updates forwarded to the dispatcher
    pub updates_forwarded: u64,

    /// Direction segments drawn
    pub lines_drawn: u64,

    /// Clear updates emitted
    pub clears: u64,

    /// Byte chunks received on the position channel
    pub chunks_received: u64,

    /// Total duration of the pipeline run
    pub duration: Duration,

    /// Number of configured overlay backends
    pub active_overlays: usize,

    /// Navigation metrics aggregator
    pub nav_metrics: NavMetricsAggregator,
}

impl PipelineStats {
    /// Overlay updates per second
    pub fn updates_per_sec(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.updates_forwarded as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Pipeline Statistics                       ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Overlay updates: {}", self.updates_forwarded);
        println!("   ├─ Updates/s: {:.2}", self.updates_per_sec());
        println!("   ├─ Segments drawn: {}", self.lines_drawn);
        println!("   ├─ Clears: {}", self.clears);
        println!("   └─ Active overlays: {}", self.active_overlays);

        let summary = self.nav_metrics.summary();

        println!("\n📈 Navigation Metrics");
        println!("   ├─ Chunks received: {}", self.chunks_received);
        println!("   ├─ Lines dropped: {}", summary.lines_dropped);
        println!(
            "   ├─ Fixes: {} accepted, {} rejected ({:.2}%)",
            summary.fixes_accepted, summary.fixes_rejected, summary.reject_rate
        );
        println!(
            "   ├─ Fusions: {} ok, {} degenerate ({:.2}%)",
            summary.fusions, summary.fusions_degenerate, summary.degenerate_rate
        );
        println!(
            "   ├─ Projections: {} lines, {} empty",
            summary.projections, summary.projections_empty
        );
        println!("   └─ Heading (deg): {}", summary.heading_degrees);

        println!();
    }
}
