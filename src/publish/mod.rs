//! Histogram publication
//!
//! The monitor registers each histogram once at initialisation. After each
//! cycle the host asks the publisher to read the current histogram state; the
//! monitor itself never pushes data.

pub mod json;

pub use json::JsonLinesPublisher;

use crate::errors::AppResult;
use crate::histogram::{HistogramDescriptor, HistogramSet, HistogramView};
use crate::types::{InputsConfiguration, NUM_INPUTS};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Receives histogram registrations and reads histogram state between cycles
pub trait Publisher {
    fn start_publishing(&mut self, descriptor: HistogramDescriptor) -> AppResult<()>;

    fn publish_cycle(&mut self, histograms: &HistogramSet, cycle: &CycleInfo) -> AppResult<()>;
}

/// Bookkeeping attached to each published cycle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleInfo {
    pub activity_id: u64,
    pub cycle: u64,
    pub processed_time_frames: u64,
    pub live_time_ms: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HistogramContent {
    Ratio {
        labels: Vec<String>,
        numerator: Vec<f64>,
        denominator: f64,
        ratio: Vec<f64>,
        stale: bool,
    },
    Count {
        bins: Vec<f64>,
        out_of_range: f64,
        entries: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramSnapshot {
    pub name: &'static str,
    pub title: &'static str,
    #[serde(flatten)]
    pub content: HistogramContent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleSnapshot {
    pub published_at: DateTime<Utc>,
    #[serde(flatten)]
    pub cycle: CycleInfo,
    pub histograms: Vec<HistogramSnapshot>,
}

/// Display label for an input-rate bin: the input name, or `total` for the
/// time frame counter bin
pub fn input_label(inputs: &InputsConfiguration, bit: usize) -> String {
    match inputs.name_of(bit) {
        Some(name) => name.to_string(),
        None if bit == NUM_INPUTS => "total".to_string(),
        None => bit.to_string(),
    }
}

/// Copy the current state of one histogram
pub fn snapshot_histogram(
    descriptor: &HistogramDescriptor,
    view: HistogramView<'_>,
    inputs: &InputsConfiguration,
) -> HistogramSnapshot {
    let content = match view {
        HistogramView::Ratio(histogram) => HistogramContent::Ratio {
            labels: histogram
                .labels()
                .iter()
                .map(|&bit| input_label(inputs, bit))
                .collect(),
            numerator: histogram.numerators().to_vec(),
            denominator: histogram.denominator(),
            ratio: histogram.ratios().to_vec(),
            stale: histogram.is_stale(),
        },
        HistogramView::Count(histogram) => HistogramContent::Count {
            bins: histogram.bins().to_vec(),
            out_of_range: histogram.out_of_range(),
            entries: histogram.entries(),
        },
    };
    HistogramSnapshot {
        name: descriptor.name,
        title: descriptor.title,
        content,
    }
}
