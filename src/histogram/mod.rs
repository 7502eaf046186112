//! Histogram storage for the rate monitor
//!
//! All histograms live in a single [`HistogramSet`] arena indexed by
//! [`HistogramId`]. The aggregator owns the set; publishers only ever see
//! read-only [`HistogramView`]s.

pub mod count;
pub mod ratio;

pub use count::CountHistogram;
pub use ratio::RatioHistogram;

use crate::types::{NUM_CLASSES, NUM_INPUTS, ORBIT_LENGTH};
use serde::Serialize;

/// Identifies one histogram in the set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HistogramId {
    /// Input rate: per-input counts over accumulated live time
    Inputs,
    /// Class counts
    Classes,
    /// Bunch-crossing position of the reference input
    ReferenceBc,
    /// Input counts on an extendable axis
    InputRatios,
    /// Class counts feeding the class ratio display
    ClassRatios,
}

impl HistogramId {
    /// Every histogram, in registration order
    pub const ALL: [HistogramId; 5] = [
        HistogramId::Inputs,
        HistogramId::Classes,
        HistogramId::ClassRatios,
        HistogramId::InputRatios,
        HistogramId::ReferenceBc,
    ];

    pub fn descriptor(self) -> HistogramDescriptor {
        let (name, title) = match self {
            HistogramId::Inputs => ("inputs", "Inputs distribution;;rate (kHz)"),
            HistogramId::Classes => ("classes", "Classes distribution"),
            HistogramId::ReferenceBc => ("bcReference", "BC position of reference input"),
            HistogramId::InputRatios => ("inputRatio", "Input Ratio distribution"),
            HistogramId::ClassRatios => ("classRatio", "Class Ratio distribution"),
        };
        HistogramDescriptor {
            id: self,
            name,
            title,
        }
    }
}

/// Publication metadata for one histogram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HistogramDescriptor {
    pub id: HistogramId,
    pub name: &'static str,
    pub title: &'static str,
}

/// Read-only handle on one histogram of the set
#[derive(Debug, Clone, Copy)]
pub enum HistogramView<'a> {
    Ratio(&'a RatioHistogram<usize>),
    Count(&'a CountHistogram),
}

/// The full set of monitor histograms
#[derive(Debug, Clone)]
pub struct HistogramSet {
    pub(crate) inputs: RatioHistogram<usize>,
    pub(crate) classes: CountHistogram,
    pub(crate) reference_bc: CountHistogram,
    pub(crate) input_ratios: CountHistogram,
    pub(crate) class_ratios: CountHistogram,
}

impl HistogramSet {
    /// Allocate every histogram with its initial axis.
    ///
    /// Input and class axes carry one extra bin past the last real bit,
    /// used to count processed time frames.
    pub fn allocate() -> Self {
        Self {
            inputs: RatioHistogram::with_labels(0..=NUM_INPUTS),
            classes: CountHistogram::new(NUM_CLASSES + 1),
            reference_bc: CountHistogram::new(ORBIT_LENGTH),
            input_ratios: CountHistogram::extendable(NUM_INPUTS + 1),
            class_ratios: CountHistogram::new(NUM_CLASSES + 1),
        }
    }

    pub fn view(&self, id: HistogramId) -> HistogramView<'_> {
        match id {
            HistogramId::Inputs => HistogramView::Ratio(&self.inputs),
            HistogramId::Classes => HistogramView::Count(&self.classes),
            HistogramId::ReferenceBc => HistogramView::Count(&self.reference_bc),
            HistogramId::InputRatios => HistogramView::Count(&self.input_ratios),
            HistogramId::ClassRatios => HistogramView::Count(&self.class_ratios),
        }
    }

    pub fn inputs(&self) -> &RatioHistogram<usize> {
        &self.inputs
    }

    pub fn classes(&self) -> &CountHistogram {
        &self.classes
    }

    pub fn reference_bc(&self) -> &CountHistogram {
        &self.reference_bc
    }

    pub fn input_ratios(&self) -> &CountHistogram {
        &self.input_ratios
    }

    pub fn class_ratios(&self) -> &CountHistogram {
        &self.class_ratios
    }

    /// Zero every histogram, keeping all axes
    pub fn reset(&mut self) {
        self.inputs.reset();
        self.classes.reset();
        self.class_ratios.reset();
        self.input_ratios.reset();
        self.reference_bc.reset();
    }
}
