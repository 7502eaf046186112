pub mod aggregator;
pub mod report;
pub mod task;

pub use aggregator::{AggregationState, Aggregator};
pub use report::{MonitorMetrics, ProgressReporter, ProgressTracker};
pub use task::{MonitorTask, RateMonitorTask, TaskSettings, TaskState};
