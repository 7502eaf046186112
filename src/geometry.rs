//! Time frame geometry
//!
//! Live time per batch depends on how many orbits a time frame spans. The value
//! comes from an external provider and may change between time frames, so the
//! monitor asks for it on every batch.

use crate::errors::{AppError, AppResult};

/// Supplies the number of orbits in the current time frame
pub trait TimeFrameGeometry {
    fn orbits_per_time_frame(&self) -> AppResult<u32>;
}

/// Geometry with a constant orbit count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedGeometry {
    orbits_per_time_frame: u32,
}

impl FixedGeometry {
    pub fn new(orbits_per_time_frame: u32) -> AppResult<Self> {
        if orbits_per_time_frame == 0 {
            return Err(AppError::Config(
                "orbits per time frame must be greater than 0".to_string(),
            ));
        }
        Ok(Self {
            orbits_per_time_frame,
        })
    }
}

impl TimeFrameGeometry for FixedGeometry {
    fn orbits_per_time_frame(&self) -> AppResult<u32> {
        Ok(self.orbits_per_time_frame)
    }
}
