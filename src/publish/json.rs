use super::{snapshot_histogram, CycleInfo, CycleSnapshot, Publisher};
use crate::errors::{AppError, AppResult};
use crate::histogram::{HistogramDescriptor, HistogramSet};
use crate::types::InputsConfiguration;
use chrono::Utc;
use std::io::Write;
use tracing::{debug, warn};

/// Writes one JSON document per published cycle
pub struct JsonLinesPublisher<W: Write> {
    writer: W,
    inputs: InputsConfiguration,
    registered: Vec<HistogramDescriptor>,
    cycles_written: u64,
}

impl<W: Write> JsonLinesPublisher<W> {
    pub fn new(writer: W, inputs: InputsConfiguration) -> Self {
        Self {
            writer,
            inputs,
            registered: Vec::new(),
            cycles_written: 0,
        }
    }

    pub fn registered(&self) -> &[HistogramDescriptor] {
        &self.registered
    }

    pub fn cycles_written(&self) -> u64 {
        self.cycles_written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Publisher for JsonLinesPublisher<W> {
    fn start_publishing(&mut self, descriptor: HistogramDescriptor) -> AppResult<()> {
        if self.registered.iter().any(|d| d.id == descriptor.id) {
            warn!("Histogram {} already published, ignoring", descriptor.name);
            return Ok(());
        }
        debug!("Publishing histogram {}", descriptor.name);
        self.registered.push(descriptor);
        Ok(())
    }

    fn publish_cycle(&mut self, histograms: &HistogramSet, cycle: &CycleInfo) -> AppResult<()> {
        let snapshot = CycleSnapshot {
            published_at: Utc::now(),
            cycle: cycle.clone(),
            histograms: self
                .registered
                .iter()
                .map(|descriptor| {
                    snapshot_histogram(descriptor, histograms.view(descriptor.id), &self.inputs)
                })
                .collect(),
        };

        serde_json::to_writer(&mut self.writer, &snapshot)?;
        self.writer.write_all(b"\n").map_err(AppError::Io)?;
        self.writer.flush().map_err(AppError::Io)?;
        self.cycles_written += 1;
        Ok(())
    }
}
