use std::time::Instant;
use tracing::info;

/// Formatting of monitor counters for progress and summary lines
pub trait MonitorMetrics {
    /// One-line summary, e.g. "TFs: 12 | Records: 4096"
    fn format_custom_metrics(&self) -> String;
}

/// Wall-clock tracker that rate-limits progress output
pub struct ProgressTracker {
    start_time: Instant,
    last_report: Instant,
    report_interval_ms: u128,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::with_interval_ms(500)
    }
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_interval_ms(report_interval_ms: u64) -> Self {
        let now = Instant::now();
        Self {
            start_time: now,
            last_report: now,
            report_interval_ms: report_interval_ms as u128,
        }
    }

    /// True at most once per interval
    pub fn should_report(&mut self) -> bool {
        let now = Instant::now();
        if now.duration_since(self.last_report).as_millis() > self.report_interval_ms {
            self.last_report = now;
            true
        } else {
            false
        }
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }
}

pub struct ProgressReporter;

impl ProgressReporter {
    /// Human-readable duration: "12.5s", "3m 5s (185.0s)", "2h 0m 1s (7201.0s)"
    pub fn format_elapsed_time(elapsed_secs: f64) -> String {
        if elapsed_secs < 60.0 {
            return format!("{:.1}s", elapsed_secs);
        }

        let hours = (elapsed_secs / 3600.0).floor();
        let minutes = ((elapsed_secs % 3600.0) / 60.0).floor();
        let seconds = elapsed_secs % 60.0;
        if hours < 1.0 {
            format!("{}m {:.0}s ({:.1}s)", minutes, seconds, elapsed_secs)
        } else {
            format!(
                "{}h {}m {:.0}s ({:.1}s)",
                hours, minutes, seconds, elapsed_secs
            )
        }
    }

    pub fn report_completion(operation: &str, metrics: &dyn MonitorMetrics, elapsed: f64) {
        info!("=== {} Completed ===", operation);
        info!("  {}", metrics.format_custom_metrics());
        info!(
            "  Time elapsed: {}",
            Self::format_elapsed_time(elapsed)
        );
    }
}
