//! Numeric helpers centralizing the casts and curves used by the simulator.

use num_traits::cast::cast;

/// Map a raw `u32` draw into the open unit interval.
#[must_use]
pub fn unit_from_u32(sample: u32) -> f64 {
    let denom = f64::from(u32::MAX) + 1.0;
    ((f64::from(sample) + 0.5) / denom).clamp(0.0, 1.0)
}

/// Standard logistic curve. Non-finite input collapses to the midpoint.
#[must_use]
pub fn logistic(x: f64) -> f64 {
    if !x.is_finite() {
        return 0.5;
    }
    1.0 / (1.0 + (-x).exp())
}

/// Shift a base probability by `delta` in log-odds space.
///
/// Positive `delta` always raises the probability and negative always lowers it,
/// which keeps every rating curve monotone.
#[must_use]
pub fn shift_probability(base: f64, delta: f64) -> f64 {
    let p = base.clamp(0.001, 0.999);
    let logit = (p / (1.0 - p)).ln();
    logistic(logit + delta)
}

/// Round a f64 and clamp it to the i32 range, returning 0 for NaN values.
#[must_use]
pub fn round_f64_to_i32(value: f64) -> i32 {
    if value.is_nan() {
        return 0;
    }
    let min = cast::<i32, f64>(i32::MIN).unwrap_or(f64::MIN);
    let max = cast::<i32, f64>(i32::MAX).unwrap_or(f64::MAX);
    let clamped = value.clamp(min, max).round();
    cast::<f64, i32>(clamped).unwrap_or(0)
}

/// Round a f64 into the `0..=99` rating scale.
#[must_use]
pub fn round_to_rating(value: f64) -> u8 {
    let rounded = round_f64_to_i32(value).clamp(0, 99);
    u8::try_from(rounded).unwrap_or(0)
}

/// Round a non-negative f64 into a `u16`, saturating at the bounds.
#[must_use]
pub fn round_to_u16(value: f64) -> u16 {
    let rounded = round_f64_to_i32(value).clamp(0, i32::from(u16::MAX));
    u16::try_from(rounded).unwrap_or(0)
}

/// Convert a count into f64 while allowing precision loss in a single location.
#[must_use]
pub fn count_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_sample_stays_open() {
        assert!(unit_from_u32(0) > 0.0);
        assert!(unit_from_u32(u32::MAX) < 1.0);
    }

    #[test]
    fn shifted_probability_is_monotone() {
        let base = 0.6;
        let lower = shift_probability(base, -0.5);
        let same = shift_probability(base, 0.0);
        let higher = shift_probability(base, 0.5);
        assert!(lower < same && same < higher);
        assert!((same - base).abs() < 1e-9);
    }

    #[test]
    fn logistic_handles_non_finite() {
        assert!((logistic(f64::NAN) - 0.5).abs() < f64::EPSILON);
        assert!(logistic(40.0) > 0.999);
    }

    #[test]
    fn rating_rounding_clamps() {
        assert_eq!(round_to_rating(120.0), 99);
        assert_eq!(round_to_rating(-3.0), 0);
        assert_eq!(round_to_rating(71.6), 72);
        assert_eq!(round_to_u16(f64::NAN), 0);
    }
}
