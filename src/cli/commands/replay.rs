use crate::config::AppConfig;
use crate::decoder::{read_capture, CsvRecordDecoder, InputSpec, TimeFrameRows};
use crate::errors::{AppError, AppResult};
use crate::geometry::FixedGeometry;
use crate::processor::{
    MonitorMetrics, MonitorTask, ProgressReporter, ProgressTracker, RateMonitorTask,
};
use crate::publish::JsonLinesPublisher;
use crate::types::Activity;
use clap::Args;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

type ReplayTask = RateMonitorTask<CsvRecordDecoder, FixedGeometry, JsonLinesPublisher<BufWriter<File>>>;

#[derive(Args)]
#[command(author, version, about, long_about = None)]
pub struct ReplayCommand {
    /// Capture CSV file, or a glob pattern matching several captures
    #[arg(long)]
    capture: String,

    /// Snapshot output file (overrides publishing.output)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Configuration file (defaults to ./config.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Time frames per monitoring cycle (overrides publishing.cycle_size)
    #[arg(long)]
    cycle_size: Option<usize>,

    /// Orbits per time frame (overrides timing.orbits_per_time_frame)
    #[arg(long)]
    orbits_per_time_frame: Option<u32>,

    /// Reference input name (overrides inputs.reference_input)
    #[arg(long)]
    reference_input: Option<String>,

    /// Only decode rows from these origins (repeatable)
    #[arg(long = "origin")]
    origins: Vec<String>,

    /// Activity (run) number recorded in the snapshots
    #[arg(long, default_value_t = 1)]
    activity_id: u64,

    /// Activity name
    #[arg(long, default_value = "replay")]
    activity_name: String,
}

/// Outcome of a replay
#[derive(Debug, Clone, PartialEq)]
pub struct ReplaySummary {
    pub captures: usize,
    pub time_frames: u64,
    pub cycles: u64,
    pub records_seen: u64,
    pub bc_out_of_range: u64,
    pub live_time_ms: f64,
}

impl MonitorMetrics for ReplaySummary {
    fn format_custom_metrics(&self) -> String {
        format!(
            "Captures: {} | TFs: {} | Cycles: {} | Records: {} | BC out of range: {}",
            self.captures, self.time_frames, self.cycles, self.records_seen, self.bc_out_of_range
        )
    }
}

impl ReplayCommand {
    pub fn run(&self) -> AppResult<()> {
        info!("=== Trigger Rate Monitor - Replay ===");

        let mut config = AppConfig::load_from(self.config.as_deref())?;
        if let Some(output) = &self.output {
            config.publishing.output = output.clone();
        }
        if let Some(cycle_size) = self.cycle_size {
            config.publishing.cycle_size = cycle_size;
        }
        if let Some(orbits) = self.orbits_per_time_frame {
            config.timing.orbits_per_time_frame = orbits;
        }
        if let Some(reference) = &self.reference_input {
            config.inputs.reference_input = reference.clone();
        }
        config.validate()?;

        let captures = expand_captures(&self.capture)?;
        let filter: Vec<InputSpec> = self
            .origins
            .iter()
            .map(|origin| InputSpec::new("replay", origin.as_str()))
            .collect();
        let activity = Activity::new(self.activity_id, self.activity_name.as_str());

        let summary = replay_captures(&config, &captures, &filter, &activity)?;

        println!("\n=== REPLAY COMPLETE ===");
        println!("Captures replayed: {}", summary.captures);
        println!("Time frames: {}", summary.time_frames);
        println!("Cycles published: {}", summary.cycles);
        println!(
            "Records: {} ({} with bunch crossing out of range)",
            summary.records_seen, summary.bc_out_of_range
        );
        println!(
            "Live time: {}",
            ProgressReporter::format_elapsed_time(summary.live_time_ms / 1000.0)
        );
        println!("Snapshots written to: {}", config.publishing.output.display());
        Ok(())
    }
}

/// Resolve a capture argument to a sorted list of files
pub fn expand_captures(pattern: &str) -> AppResult<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in glob::glob(pattern)? {
        paths.push(entry?);
    }
    paths.sort();

    if paths.is_empty() {
        return Err(AppError::Config(format!(
            "no capture file matches '{}'",
            pattern
        )));
    }
    Ok(paths)
}

/// Drive one activity over every time frame of `captures`, publishing a
/// snapshot to `config.publishing.output` after each cycle
pub fn replay_captures(
    config: &AppConfig,
    captures: &[PathBuf],
    filter: &[InputSpec],
    activity: &Activity,
) -> AppResult<ReplaySummary> {
    let output = &config.publishing.output;
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let writer = BufWriter::new(File::create(output)?);

    let mut settings = config.task_settings();
    settings.filter = filter.to_vec();
    let mut task: ReplayTask = RateMonitorTask::new(
        settings,
        CsvRecordDecoder::new(),
        FixedGeometry::new(config.timing.orbits_per_time_frame)?,
        JsonLinesPublisher::new(writer, config.input_table()?),
        Box::new(config.input_table()?),
    );

    task.initialize()?;
    task.start_of_activity(activity)?;

    let mut tracker = ProgressTracker::new();
    let mut time_frames = 0u64;
    for capture in captures {
        let frames = read_capture(capture)?;
        if frames.is_empty() {
            warn!("Capture {} has no time frames", capture.display());
            continue;
        }
        time_frames += replay_frames(&mut task, &frames, config.publishing.cycle_size)?;

        if tracker.should_report() {
            if let Some(state) = task.aggregation_state() {
                info!("{}: {}", display_name(capture), state.format_custom_metrics());
            }
        }
    }

    task.end_of_activity(activity)?;

    let state = task.aggregation_state().cloned().unwrap_or_default();
    let summary = ReplaySummary {
        captures: captures.len(),
        time_frames,
        cycles: task.cycles_completed(),
        records_seen: state.records_seen,
        bc_out_of_range: state.bc_out_of_range,
        live_time_ms: state.live_time_ms,
    };
    ProgressReporter::report_completion("Replay", &summary, tracker.elapsed_seconds());
    Ok(summary)
}

fn replay_frames(
    task: &mut ReplayTask,
    frames: &[TimeFrameRows],
    cycle_size: usize,
) -> AppResult<u64> {
    let mut processed = 0u64;
    for cycle in frames.chunks(cycle_size.max(1)) {
        task.start_of_cycle()?;
        for frame in cycle {
            task.monitor_data(frame)?;
            processed += 1;
        }
        task.end_of_cycle()?;
        task.publish_cycle()?;
    }
    Ok(processed)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
