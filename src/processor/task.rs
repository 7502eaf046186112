//! Lifecycle driver for the rate monitor
//!
//! The host calls the hooks of [`MonitorTask`] in the order
//!
//! ```text
//! initialize -> start_of_activity -> { start_of_cycle -> monitor_data* -> end_of_cycle }*
//!            -> end_of_activity -> reset?
//! ```
//!
//! and, between cycles, [`RateMonitorTask::publish_cycle`] to hand the current
//! histogram state to the publisher. Any hook other than `initialize` called
//! before `initialize` fails with [`AppError::Lifecycle`].

use super::aggregator::{AggregationState, Aggregator};
use super::report::{MonitorMetrics, ProgressReporter};
use crate::decoder::{Decoder, InputSpec};
use crate::errors::{AppError, AppResult};
use crate::geometry::TimeFrameGeometry;
use crate::histogram::{HistogramId, HistogramSet};
use crate::publish::{CycleInfo, Publisher};
use crate::types::{Activity, InputNameResolver, LuminosityInfo, ORBIT_LENGTH_MS};
use tracing::{debug, info, warn};

/// Lifecycle hooks invoked by the host framework
pub trait MonitorTask {
    type Source: ?Sized;

    fn initialize(&mut self) -> AppResult<()>;

    fn start_of_activity(&mut self, activity: &Activity) -> AppResult<()>;

    fn start_of_cycle(&mut self) -> AppResult<()>;

    fn monitor_data(&mut self, source: &Self::Source) -> AppResult<()>;

    fn end_of_cycle(&mut self) -> AppResult<()>;

    fn end_of_activity(&mut self, activity: &Activity) -> AppResult<()>;

    fn reset(&mut self) -> AppResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Uninitialized,
    Initialized,
    Active,
    Ended,
}

/// Parameters fixed at construction
#[derive(Debug, Clone, PartialEq)]
pub struct TaskSettings {
    /// Name of the input whose bunch-crossing distribution is recorded
    pub reference_input: String,
    pub orbit_length_ms: f64,
    /// Origins handed to the decoder; empty selects everything
    pub filter: Vec<InputSpec>,
}

impl Default for TaskSettings {
    fn default() -> Self {
        Self {
            reference_input: "MTVX".to_string(),
            orbit_length_ms: ORBIT_LENGTH_MS,
            filter: Vec::new(),
        }
    }
}

/// Trigger rate monitor bound to its collaborators
pub struct RateMonitorTask<D, G, P> {
    settings: TaskSettings,
    decoder: D,
    geometry: G,
    publisher: P,
    resolver: Box<dyn InputNameResolver>,
    aggregator: Option<Aggregator>,
    /// Histograms the publisher has accepted so far
    registered: Vec<HistogramId>,
    state: TaskState,
    in_cycle: bool,
    cycles_completed: u64,
    activity: Option<Activity>,
    last_luminosity: Vec<LuminosityInfo>,
}

impl<D, G, P> RateMonitorTask<D, G, P>
where
    D: Decoder,
    G: TimeFrameGeometry,
    P: Publisher,
{
    pub fn new(
        settings: TaskSettings,
        decoder: D,
        geometry: G,
        publisher: P,
        resolver: Box<dyn InputNameResolver>,
    ) -> Self {
        Self {
            settings,
            decoder,
            geometry,
            publisher,
            resolver,
            aggregator: None,
            registered: Vec::new(),
            state: TaskState::Uninitialized,
            in_cycle: false,
            cycles_completed: 0,
            activity: None,
            last_luminosity: Vec::new(),
        }
    }

    fn aggregator_mut(&mut self, hook: &str) -> AppResult<&mut Aggregator> {
        self.aggregator
            .as_mut()
            .ok_or_else(|| not_initialized(hook))
    }

    fn ensure_initialized(&self, hook: &str) -> AppResult<()> {
        match self.aggregator {
            Some(_) => Ok(()),
            None => Err(not_initialized(hook)),
        }
    }

    /// Hand the current histograms to the publisher.
    ///
    /// Called by the host between cycles; the histograms are read as they are,
    /// so rates reflect the last `end_of_cycle`.
    pub fn publish_cycle(&mut self) -> AppResult<()> {
        let aggregator = self
            .aggregator
            .as_ref()
            .ok_or_else(|| not_initialized("publish_cycle"))?;
        let info = CycleInfo {
            activity_id: self.activity.as_ref().map_or(0, |activity| activity.id),
            cycle: self.cycles_completed,
            processed_time_frames: aggregator.state().processed_time_frames,
            live_time_ms: aggregator.state().live_time_ms,
        };
        self.publisher.publish_cycle(aggregator.histograms(), &info)
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    pub fn in_cycle(&self) -> bool {
        self.in_cycle
    }

    pub fn cycles_completed(&self) -> u64 {
        self.cycles_completed
    }

    pub fn histograms(&self) -> Option<&HistogramSet> {
        self.aggregator.as_ref().map(Aggregator::histograms)
    }

    pub fn aggregation_state(&self) -> Option<&AggregationState> {
        self.aggregator.as_ref().map(Aggregator::state)
    }

    /// Bit resolved for the reference input, once initialised
    pub fn reference_input(&self) -> Option<usize> {
        self.aggregator.as_ref().map(Aggregator::reference_input)
    }

    /// Luminosity points decoded with the most recent batch
    pub fn last_luminosity(&self) -> &[LuminosityInfo] {
        &self.last_luminosity
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    pub fn decoder_mut(&mut self) -> &mut D {
        &mut self.decoder
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    pub fn into_publisher(self) -> P {
        self.publisher
    }
}

impl<D, G, P> MonitorTask for RateMonitorTask<D, G, P>
where
    D: Decoder,
    G: TimeFrameGeometry,
    P: Publisher,
{
    type Source = D::Source;

    fn initialize(&mut self) -> AppResult<()> {
        if self.aggregator.is_some() {
            return Err(AppError::Lifecycle(
                "initialize called on an already initialised task".to_string(),
            ));
        }

        let name = self.settings.reference_input.as_str();
        let reference = self.resolver.resolve_input_index(name).ok_or_else(|| {
            AppError::Config(format!("unknown reference input '{}'", name))
        })?;
        let aggregator = Aggregator::new(reference, self.settings.orbit_length_ms)?;

        // A failed registration leaves earlier ones in place; a retry skips them
        for id in HistogramId::ALL {
            if self.registered.contains(&id) {
                continue;
            }
            self.publisher.start_publishing(id.descriptor())?;
            self.registered.push(id);
        }

        self.decoder.set_do_lumi(true);
        self.decoder.set_do_digits(true);

        info!(
            "Rate monitor initialised: reference input {} -> bit {}, orbit length {:.7} ms",
            name, reference, self.settings.orbit_length_ms
        );
        self.aggregator = Some(aggregator);
        self.state = TaskState::Initialized;
        Ok(())
    }

    fn start_of_activity(&mut self, activity: &Activity) -> AppResult<()> {
        let aggregator = self.aggregator_mut("start_of_activity")?;
        aggregator.reset_histograms();
        aggregator.reset_state();

        info!("Start of activity {} ({})", activity.id, activity.name);
        self.activity = Some(activity.clone());
        self.cycles_completed = 0;
        self.in_cycle = false;
        self.last_luminosity.clear();
        self.state = TaskState::Active;
        Ok(())
    }

    fn start_of_cycle(&mut self) -> AppResult<()> {
        self.ensure_initialized("start_of_cycle")?;
        if self.in_cycle {
            warn!("start_of_cycle called while a cycle is already open");
        }
        debug!("Start of cycle {}", self.cycles_completed + 1);
        self.in_cycle = true;
        Ok(())
    }

    fn monitor_data(&mut self, source: &Self::Source) -> AppResult<()> {
        self.ensure_initialized("monitor_data")?;

        let orbits = self.geometry.orbits_per_time_frame()?;
        let batch = self.decoder.decode(source, &self.settings.filter)?;

        self.aggregator_mut("monitor_data")?
            .on_record_batch(&batch.records, orbits);
        self.last_luminosity = batch.luminosity;
        Ok(())
    }

    fn end_of_cycle(&mut self) -> AppResult<()> {
        let aggregator = self.aggregator_mut("end_of_cycle")?;
        aggregator.normalize();
        let metrics = aggregator.state().format_custom_metrics();

        self.in_cycle = false;
        self.cycles_completed += 1;
        debug!("End of cycle {}: {}", self.cycles_completed, metrics);
        Ok(())
    }

    fn end_of_activity(&mut self, activity: &Activity) -> AppResult<()> {
        self.ensure_initialized("end_of_activity")?;
        if let Some(state) = self.aggregation_state() {
            ProgressReporter::report_completion(
                &format!("Activity {}", activity.id),
                state,
                state.live_time_ms / 1000.0,
            );
        }
        self.in_cycle = false;
        self.state = TaskState::Ended;
        Ok(())
    }

    fn reset(&mut self) -> AppResult<()> {
        self.aggregator_mut("reset")?.reset_histograms();
        info!("Rate monitor histograms reset");
        Ok(())
    }
}

fn not_initialized(hook: &str) -> AppError {
    AppError::Lifecycle(format!("{} called before initialize", hook))
}
