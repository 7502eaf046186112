//! CSV capture format and its decoder
//!
//! A capture is a CSV file of already-decoded trigger rows, one per line:
//!
//! ```text
//! time_frame,kind,origin,orbit,bc,inputs,classes,counts,input_index
//! 1,digit,CTP,100,42,0x000000000004,0x0000000000000020,,
//! 1,lumi,CTP,100,,,,17,2
//! ```
//!
//! Masks are hex words (optional `0x` prefix, most significant digit first).
//! Rows are grouped by `time_frame`; each group is one monitor batch.

use super::{origin_selected, DecodedBatch, Decoder, DecoderError, DecoderResult, InputSpec};
use crate::errors::{AppError, AppResult};
use crate::types::{DecisionRecord, LuminosityInfo, NUM_CLASSES, NUM_INPUTS};
use crate::utils::bitmask::{class_mask_from_u64, input_mask_from_u64};
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, info};

/// Origin assumed for rows that leave the column empty
pub const DEFAULT_ORIGIN: &str = "CTP";

/// One line of a capture file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureRow {
    pub time_frame: u64,
    pub kind: String,
    pub origin: Option<String>,
    pub orbit: u32,
    pub bc: Option<u16>,
    pub inputs: Option<String>,
    pub classes: Option<String>,
    pub counts: Option<u64>,
    pub input_index: Option<usize>,
}

impl CaptureRow {
    pub fn origin(&self) -> &str {
        self.origin.as_deref().unwrap_or(DEFAULT_ORIGIN)
    }
}

/// All rows of one time frame, in file order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeFrameRows {
    pub time_frame: u64,
    pub rows: Vec<CaptureRow>,
}

/// Read a capture file and group its rows by time frame, ascending
pub fn read_capture(path: &Path) -> AppResult<Vec<TimeFrameRows>> {
    let file = File::open(path).map_err(AppError::Io)?;
    let mut reader = ReaderBuilder::new()
        .comment(Some(b'#'))
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(BufReader::new(file));

    let mut grouped: BTreeMap<u64, Vec<CaptureRow>> = BTreeMap::new();
    let mut total_rows = 0usize;
    for result in reader.deserialize::<CaptureRow>() {
        let row = result.map_err(AppError::Csv)?;
        grouped.entry(row.time_frame).or_default().push(row);
        total_rows += 1;
    }

    info!(
        "Capture {}: {} rows in {} time frames",
        path.display(),
        total_rows,
        grouped.len()
    );

    Ok(grouped
        .into_iter()
        .map(|(time_frame, rows)| TimeFrameRows { time_frame, rows })
        .collect())
}

/// Decodes capture rows into decision records and luminosity points
#[derive(Debug, Default)]
pub struct CsvRecordDecoder {
    do_digits: bool,
    do_lumi: bool,
}

impl CsvRecordDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    fn decode_digit(row: &CaptureRow) -> DecoderResult<DecisionRecord> {
        let bc = row.bc.ok_or(DecoderError::MissingField {
            time_frame: row.time_frame,
            kind: "digit",
            field: "bc",
        })?;
        let inputs = parse_mask(row.time_frame, row.inputs.as_deref(), NUM_INPUTS)?;
        let classes = parse_mask(row.time_frame, row.classes.as_deref(), NUM_CLASSES)?;

        let mut record = DecisionRecord::new(row.orbit, bc);
        record.input_mask = input_mask_from_u64(inputs);
        record.class_mask = class_mask_from_u64(classes);
        Ok(record)
    }

    fn decode_lumi(row: &CaptureRow) -> DecoderResult<LuminosityInfo> {
        let counts = row.counts.ok_or(DecoderError::MissingField {
            time_frame: row.time_frame,
            kind: "lumi",
            field: "counts",
        })?;
        let input_index = row.input_index.ok_or(DecoderError::MissingField {
            time_frame: row.time_frame,
            kind: "lumi",
            field: "input_index",
        })?;
        Ok(LuminosityInfo {
            orbit: row.orbit,
            counts,
            input_index,
        })
    }
}

impl Decoder for CsvRecordDecoder {
    type Source = TimeFrameRows;

    fn set_do_digits(&mut self, enabled: bool) {
        self.do_digits = enabled;
    }

    fn set_do_lumi(&mut self, enabled: bool) {
        self.do_lumi = enabled;
    }

    fn decode(&mut self, source: &TimeFrameRows, filter: &[InputSpec]) -> DecoderResult<DecodedBatch> {
        let mut batch = DecodedBatch::default();

        for row in source
            .rows
            .iter()
            .filter(|row| origin_selected(filter, row.origin()))
        {
            match row.kind.as_str() {
                "digit" => {
                    if self.do_digits {
                        batch.records.push(Self::decode_digit(row)?);
                    }
                }
                "lumi" => {
                    if self.do_lumi {
                        batch.luminosity.push(Self::decode_lumi(row)?);
                    }
                }
                other => {
                    return Err(DecoderError::UnknownKind {
                        time_frame: row.time_frame,
                        kind: other.to_string(),
                    })
                }
            }
        }

        debug!(
            time_frame = source.time_frame,
            records = batch.records.len(),
            lumi = batch.luminosity.len(),
            "decoded time frame"
        );
        Ok(batch)
    }
}

/// Parse a hex mask word, rejecting bits at or beyond `width`
fn parse_mask(time_frame: u64, text: Option<&str>, width: usize) -> DecoderResult<u64> {
    let raw = match text.map(str::trim) {
        None | Some("") => return Ok(0),
        Some(raw) => raw,
    };
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw);

    let padded = if digits.len() % 2 == 1 {
        format!("0{}", digits)
    } else {
        digits.to_string()
    };
    let bytes = hex::decode(&padded).map_err(|e| DecoderError::InvalidMask {
        time_frame,
        value: raw.to_string(),
        reason: e.to_string(),
    })?;

    let significant: Vec<u8> = bytes.into_iter().skip_while(|&b| b == 0).collect();
    if significant.len() > 8 {
        return Err(DecoderError::MaskTooWide {
            time_frame,
            value: raw.to_string(),
            width,
        });
    }
    let value = significant
        .iter()
        .fold(0u64, |acc, &byte| (acc << 8) | byte as u64);

    if width < 64 && value >> width != 0 {
        return Err(DecoderError::MaskTooWide {
            time_frame,
            value: raw.to_string(),
            width,
        });
    }
    Ok(value)
}
