//! Mathematical utility functions for rate normalisation
//!
//! This module provides division helpers with explicit zero-denominator
//! handling for use across the histogram module.

/// Divide safely, returning 0.0 if the denominator is zero.
///
/// A zero denominator means no live time has been accumulated yet; the
/// resulting rate is reported as 0.0 rather than NaN or infinity.
///
/// # Arguments
/// * `numerator` - Accumulated count (or weight)
/// * `denominator` - Accumulated live time
///
/// # Examples
/// ```
/// use trigger_rate_monitor::utils::math::safe_ratio;
///
/// assert_eq!(safe_ratio(1.0, 8.0), 0.125);
/// assert_eq!(safe_ratio(3.0, 0.0), 0.0);  // Zero-division guard
/// ```
#[inline]
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Live time in milliseconds covered by `orbits` orbits of `orbit_length_ms`.
///
/// # Examples
/// ```
/// use trigger_rate_monitor::utils::math::live_time_ms;
///
/// assert_eq!(live_time_ms(2.0, 4), 8.0);
/// ```
#[inline]
pub fn live_time_ms(orbit_length_ms: f64, orbits: u32) -> f64 {
    orbit_length_ms * orbits as f64
}
