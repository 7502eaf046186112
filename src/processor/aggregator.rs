//! Per-batch histogram aggregation
//!
//! One call to [`Aggregator::on_record_batch`] corresponds to one time frame.
//! Every set input and class bit bumps its bin, the reference input also
//! records its bunch-crossing position, and the batch itself contributes one
//! entry to the overflow ("total") bins plus its live time to the rate
//! denominator.

use crate::errors::{AppError, AppResult};
use crate::histogram::HistogramSet;
use crate::processor::report::MonitorMetrics;
use crate::types::{DecisionRecord, NUM_CLASSES, NUM_INPUTS};
use crate::utils::bitmask::BitmaskScanner;
use crate::utils::math::live_time_ms;
use tracing::{debug, trace};

/// Counters accumulated across batches since the last activity start
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregationState {
    pub processed_time_frames: u64,
    /// Orbit count used for the most recent batch
    pub orbits_per_time_frame: u32,
    pub live_time_ms: f64,
    pub records_seen: u64,
    /// Records whose bunch crossing lies past the end of the orbit
    pub bc_out_of_range: u64,
}

impl AggregationState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl MonitorMetrics for AggregationState {
    fn format_custom_metrics(&self) -> String {
        format!(
            "TFs: {} | Records: {} | BC out of range: {} | Live time: {:.3} ms",
            self.processed_time_frames, self.records_seen, self.bc_out_of_range, self.live_time_ms
        )
    }
}

/// Owns the histogram arena and folds record batches into it
#[derive(Debug, Clone)]
pub struct Aggregator {
    histograms: HistogramSet,
    state: AggregationState,
    reference_input: usize,
    orbit_length_ms: f64,
}

impl Aggregator {
    /// Create an aggregator with freshly allocated histograms.
    ///
    /// `reference_input` is the 0-based input bit whose bunch-crossing
    /// distribution is recorded.
    pub fn new(reference_input: usize, orbit_length_ms: f64) -> AppResult<Self> {
        if reference_input >= NUM_INPUTS {
            return Err(AppError::Config(format!(
                "reference input bit {} is outside the {} input bits",
                reference_input, NUM_INPUTS
            )));
        }
        if !orbit_length_ms.is_finite() || orbit_length_ms <= 0.0 {
            return Err(AppError::Config(format!(
                "orbit length must be a positive number of milliseconds, got {}",
                orbit_length_ms
            )));
        }

        Ok(Self {
            histograms: HistogramSet::allocate(),
            state: AggregationState::default(),
            reference_input,
            orbit_length_ms,
        })
    }

    /// Fold one time frame's records into the histograms
    pub fn on_record_batch(&mut self, records: &[DecisionRecord], orbits_per_time_frame: u32) {
        let reference = self.reference_input;
        let HistogramSet {
            inputs,
            classes,
            reference_bc,
            input_ratios,
            class_ratios,
        } = &mut self.histograms;

        for record in records {
            self.state.records_seen += 1;

            // Out-of-orbit positions land in the reference histogram's overflow
            if !record.has_valid_bunch_crossing() {
                self.state.bc_out_of_range += 1;
                debug!(
                    orbit = record.orbit,
                    bc = record.bunch_crossing_id,
                    "bunch crossing outside the orbit"
                );
            }
            let bc = record.bunch_crossing_id as usize;

            if BitmaskScanner::has_any(&record.input_mask, NUM_INPUTS) {
                BitmaskScanner::for_each_set_bit(&record.input_mask, NUM_INPUTS, |bit| {
                    inputs.accumulate(bit, 1.0);
                    input_ratios.fill(bit);
                    if bit == reference {
                        reference_bc.fill(bc);
                    }
                });
            }

            if BitmaskScanner::has_any(&record.class_mask, NUM_CLASSES) {
                BitmaskScanner::for_each_set_bit(&record.class_mask, NUM_CLASSES, |bit| {
                    classes.fill(bit);
                    class_ratios.fill(bit);
                });
            }
        }

        // Overflow bins count time frames, not hits
        inputs.accumulate(NUM_INPUTS, 1.0);
        classes.fill(NUM_CLASSES);

        let duration = live_time_ms(self.orbit_length_ms, orbits_per_time_frame);
        inputs.accumulate_duration(duration);

        self.state.processed_time_frames += 1;
        self.state.orbits_per_time_frame = orbits_per_time_frame;
        self.state.live_time_ms += duration;

        trace!(
            records = records.len(),
            orbits = orbits_per_time_frame,
            duration_ms = duration,
            "batch aggregated"
        );
    }

    /// Recompute the input rates from the accumulated counts and live time
    pub fn normalize(&mut self) {
        self.histograms.inputs.normalize();
    }

    /// Clear histogram contents, keeping axes and counters
    pub fn reset_histograms(&mut self) {
        self.histograms.reset();
    }

    pub fn reset_state(&mut self) {
        self.state.reset();
    }

    pub fn histograms(&self) -> &HistogramSet {
        &self.histograms
    }

    pub fn state(&self) -> &AggregationState {
        &self.state
    }

    pub fn reference_input(&self) -> usize {
        self.reference_input
    }

    pub fn orbit_length_ms(&self) -> f64 {
        self.orbit_length_ms
    }
}
