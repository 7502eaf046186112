//! Record decoding interface
//!
//! The monitor never parses raw readout itself: a [`Decoder`] turns one time
//! frame's worth of source data into decision records plus luminosity points.
//! Errors reported by the decoder reach the host unchanged.

pub mod capture;
pub mod error;

pub use capture::{read_capture, CaptureRow, CsvRecordDecoder, TimeFrameRows};
pub use error::{DecoderError, DecoderResult};

use crate::types::{DecisionRecord, LuminosityInfo};

/// Selects which origins a decoder should look at. An empty filter selects all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSpec {
    pub binding: String,
    pub origin: String,
}

impl InputSpec {
    pub fn new(binding: impl Into<String>, origin: impl Into<String>) -> Self {
        Self {
            binding: binding.into(),
            origin: origin.into(),
        }
    }
}

/// Output of decoding one time frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedBatch {
    pub records: Vec<DecisionRecord>,
    pub luminosity: Vec<LuminosityInfo>,
}

/// Turns source data for one time frame into decoded records
pub trait Decoder {
    type Source: ?Sized;

    /// Enable or disable decision record output
    fn set_do_digits(&mut self, enabled: bool);

    /// Enable or disable luminosity output
    fn set_do_lumi(&mut self, enabled: bool);

    fn decode(&mut self, source: &Self::Source, filter: &[InputSpec])
        -> DecoderResult<DecodedBatch>;
}

/// Whether `origin` passes `filter`
pub(crate) fn origin_selected(filter: &[InputSpec], origin: &str) -> bool {
    filter.is_empty() || filter.iter().any(|spec| spec.origin == origin)
}
