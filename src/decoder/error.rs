//! Decoder-specific error types

/// Result type for decoder operations
pub type DecoderResult<T> = Result<T, DecoderError>;

/// Decoder-specific error types
#[derive(Debug, thiserror::Error)]
pub enum DecoderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unknown record kind '{kind}' in time frame {time_frame}")]
    UnknownKind { time_frame: u64, kind: String },

    #[error("Missing {field} for {kind} record in time frame {time_frame}")]
    MissingField {
        time_frame: u64,
        kind: &'static str,
        field: &'static str,
    },

    #[error("Invalid hex mask '{value}' in time frame {time_frame}: {reason}")]
    InvalidMask {
        time_frame: u64,
        value: String,
        reason: String,
    },

    #[error("Mask '{value}' in time frame {time_frame} sets bits beyond {width}")]
    MaskTooWide {
        time_frame: u64,
        value: String,
        width: usize,
    },
}
