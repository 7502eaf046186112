pub mod bitmask;
pub mod math;
