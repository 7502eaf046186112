//! Common Test Utilities
//!
//! Record builders, capture file writers and stand-in collaborators shared by
//! the unit and integration suites.

#![allow(dead_code)]

use std::cell::Cell;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;
use trigger_rate_monitor::decoder::{
    DecodedBatch, Decoder, DecoderError, DecoderResult, InputSpec,
};
use trigger_rate_monitor::errors::{AppError, AppResult};
use trigger_rate_monitor::geometry::{FixedGeometry, TimeFrameGeometry};
use trigger_rate_monitor::histogram::{HistogramDescriptor, HistogramSet};
use trigger_rate_monitor::processor::{RateMonitorTask, TaskSettings};
use trigger_rate_monitor::publish::{CycleInfo, Publisher};
use trigger_rate_monitor::types::{DecisionRecord, InputsConfiguration, LuminosityInfo};

/// Header line of the CSV capture format
pub const CAPTURE_HEADER: &str = "time_frame,kind,origin,orbit,bc,inputs,classes,counts,input_index";

/// Record at `bc` with the given input and class bits set
pub fn record(bc: u16, inputs: &[usize], classes: &[usize]) -> DecisionRecord {
    DecisionRecord::new(1, bc)
        .with_inputs(inputs)
        .with_classes(classes)
}

/// Write a capture file with the standard header followed by `rows`
pub fn write_capture(dir: &TempDir, name: &str, rows: &[&str]) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = File::create(&path).expect("Failed to create capture");
    writeln!(file, "# trigger capture").expect("Failed to write comment");
    writeln!(file, "{}", CAPTURE_HEADER).expect("Failed to write header");
    for row in rows {
        writeln!(file, "{}", row).expect("Failed to write row");
    }
    path
}

/// Batch passed straight through as decoded records
#[derive(Debug, Clone, Default)]
pub struct Batch {
    pub records: Vec<DecisionRecord>,
    pub luminosity: Vec<LuminosityInfo>,
}

impl Batch {
    pub fn of(records: Vec<DecisionRecord>) -> Self {
        Self {
            records,
            luminosity: Vec::new(),
        }
    }
}

/// Decoder that hands back pre-built batches, or fails when told to
#[derive(Debug, Default)]
pub struct StubDecoder {
    pub digits: bool,
    pub lumi: bool,
    pub fail_with_kind: Option<String>,
    pub filters_seen: Vec<Vec<InputSpec>>,
}

impl Decoder for StubDecoder {
    type Source = Batch;

    fn set_do_digits(&mut self, enabled: bool) {
        self.digits = enabled;
    }

    fn set_do_lumi(&mut self, enabled: bool) {
        self.lumi = enabled;
    }

    fn decode(&mut self, source: &Batch, filter: &[InputSpec]) -> DecoderResult<DecodedBatch> {
        self.filters_seen.push(filter.to_vec());
        if let Some(kind) = &self.fail_with_kind {
            return Err(DecoderError::UnknownKind {
                time_frame: 5,
                kind: kind.clone(),
            });
        }
        Ok(DecodedBatch {
            records: if self.digits {
                source.records.clone()
            } else {
                Vec::new()
            },
            luminosity: if self.lumi {
                source.luminosity.clone()
            } else {
                Vec::new()
            },
        })
    }
}

/// Geometry returning a fixed sequence of orbit counts, repeating the last
#[derive(Debug)]
pub struct SequenceGeometry {
    orbits: Vec<u32>,
    next: Cell<usize>,
}

impl SequenceGeometry {
    pub fn new(orbits: Vec<u32>) -> Self {
        Self {
            orbits,
            next: Cell::new(0),
        }
    }
}

impl TimeFrameGeometry for SequenceGeometry {
    fn orbits_per_time_frame(&self) -> AppResult<u32> {
        let index = self.next.get();
        self.next.set(index + 1);
        self.orbits
            .get(index)
            .or_else(|| self.orbits.last())
            .copied()
            .ok_or_else(|| AppError::Geometry("no orbit count available".to_string()))
    }
}

/// Publisher that remembers what it was given
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    pub registered: Vec<HistogramDescriptor>,
    pub cycles: Vec<CycleInfo>,
    pub input_totals: Vec<f64>,
    /// Reject the registration made when this many histograms are registered, once
    pub fail_registration_at: Option<usize>,
}

impl Publisher for RecordingPublisher {
    fn start_publishing(&mut self, descriptor: HistogramDescriptor) -> AppResult<()> {
        if self.fail_registration_at == Some(self.registered.len()) {
            self.fail_registration_at = None;
            return Err(AppError::InvalidData(format!(
                "cannot register {}",
                descriptor.name
            )));
        }
        self.registered.push(descriptor);
        Ok(())
    }

    fn publish_cycle(&mut self, histograms: &HistogramSet, cycle: &CycleInfo) -> AppResult<()> {
        self.cycles.push(cycle.clone());
        self.input_totals
            .push(histograms.inputs().numerators().iter().sum());
        Ok(())
    }
}

pub type StubTask<G> = RateMonitorTask<StubDecoder, G, RecordingPublisher>;

/// Task with stub collaborators, the default input table and `orbits` per TF
pub fn stub_task(settings: TaskSettings, orbits: u32) -> StubTask<FixedGeometry> {
    RateMonitorTask::new(
        settings,
        StubDecoder::default(),
        FixedGeometry::new(orbits).expect("valid geometry"),
        RecordingPublisher::default(),
        Box::new(InputsConfiguration::default()),
    )
}

/// Settings with the given reference input and orbit length
pub fn settings(reference_input: &str, orbit_length_ms: f64) -> TaskSettings {
    TaskSettings {
        reference_input: reference_input.to_string(),
        orbit_length_ms,
        filter: Vec::new(),
    }
}
