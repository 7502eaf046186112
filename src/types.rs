//! Core trigger data types and detector geometry constants
//!
//! Decision records carry two fixed-width bitmasks (inputs and classes) plus the
//! bunch-crossing position inside the orbit. Masks are `bitvec` arrays whose
//! backing storage may be wider than the logical width, so consumers always scan
//! with an explicit width (see [`crate::utils::bitmask`]).

use bitvec::prelude::*;
use serde::{Deserialize, Serialize};

pub mod inputs;

pub use inputs::{InputNameResolver, InputsConfiguration};

/// Number of trigger inputs carried in an input mask
pub const NUM_INPUTS: usize = 48;

/// Number of trigger classes carried in a class mask
pub const NUM_CLASSES: usize = 64;

/// Number of bunch-crossing slots in one orbit
pub const ORBIT_LENGTH: usize = 3564;

/// Accelerator RF frequency in Hz
pub const LHC_RF_FREQUENCY_HZ: f64 = 400.789e6;

/// Bunch spacing in nanoseconds (ten RF buckets)
pub const BUNCH_SPACING_NS: f64 = 10.0 * 1.0e9 / LHC_RF_FREQUENCY_HZ;

/// Orbit length in nanoseconds
pub const ORBIT_LENGTH_NS: f64 = ORBIT_LENGTH as f64 * BUNCH_SPACING_NS;

/// Orbit length in milliseconds, the time unit rates are normalised by
pub const ORBIT_LENGTH_MS: f64 = ORBIT_LENGTH_NS * 1.0e-6;

/// Input bitmask; storage is rounded up to whole words
pub type InputMask = BitArr!(for NUM_INPUTS, in u64, Lsb0);

/// Class bitmask
pub type ClassMask = BitArr!(for NUM_CLASSES, in u64, Lsb0);

/// One decoded trigger decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionRecord {
    pub orbit: u32,
    pub bunch_crossing_id: u16,
    pub input_mask: InputMask,
    pub class_mask: ClassMask,
}

impl DecisionRecord {
    /// Create a record with empty masks
    pub fn new(orbit: u32, bunch_crossing_id: u16) -> Self {
        Self {
            orbit,
            bunch_crossing_id,
            input_mask: InputMask::ZERO,
            class_mask: ClassMask::ZERO,
        }
    }

    /// Set the given input bits; bits at or beyond `NUM_INPUTS` are ignored
    pub fn with_inputs(mut self, bits: &[usize]) -> Self {
        for &bit in bits {
            if bit < NUM_INPUTS {
                self.input_mask.set(bit, true);
            }
        }
        self
    }

    /// Set the given class bits; bits at or beyond `NUM_CLASSES` are ignored
    pub fn with_classes(mut self, bits: &[usize]) -> Self {
        for &bit in bits {
            if bit < NUM_CLASSES {
                self.class_mask.set(bit, true);
            }
        }
        self
    }

    /// Whether the bunch-crossing id lies inside the orbit
    pub fn has_valid_bunch_crossing(&self) -> bool {
        (self.bunch_crossing_id as usize) < ORBIT_LENGTH
    }
}

/// Luminosity point produced alongside decision records.
///
/// The aggregator never reads these; they are handed back to the host as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LuminosityInfo {
    pub orbit: u32,
    pub counts: u64,
    pub input_index: usize,
}

/// A run/activity as seen by the lifecycle hooks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: u64,
    pub name: String,
}

impl Activity {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}
