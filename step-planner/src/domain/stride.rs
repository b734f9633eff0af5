//! Stride model: converting between body height, steps and distance.

use super::error::DomainError;

/// Ratio of stride length to body height (average of 0.413 and 0.415).
pub const STRIDE_HEIGHT_RATIO: f64 = 0.414;

/// Relative tolerance under which a step quotient snaps to the nearest
/// integer before flooring.
const SNAP_TOLERANCE: f64 = 1e-9;

/// Stride length in metres for a body height in centimetres.
///
/// # Examples
///
/// ```
/// use step_planner::domain::stride_length;
///
/// let stride = stride_length(180.0).unwrap();
/// assert!((stride - 0.7452).abs() < 1e-12);
///
/// assert!(stride_length(0.0).is_err());
/// ```
pub fn stride_length(height_cm: f64) -> Result<f64, DomainError> {
    if !height_cm.is_finite() || height_cm <= 0.0 {
        return Err(DomainError::InvalidHeight(height_cm));
    }
    Ok(height_cm / 100.0 * STRIDE_HEIGHT_RATIO)
}

/// Whole steps needed to cover `distance_m` with the given stride.
///
/// Floors the quotient, except that a quotient within floating-point noise
/// of an integer counts as that integer. Non-positive or non-finite inputs
/// yield zero steps.
pub fn steps_for_distance(distance_m: f64, stride_m: f64) -> u64 {
    if !(distance_m > 0.0) || !(stride_m > 0.0) || !distance_m.is_finite() {
        return 0;
    }
    let quotient = distance_m / stride_m;
    let nearest = quotient.round();
    if (quotient - nearest).abs() <= SNAP_TOLERANCE * nearest.max(1.0) {
        nearest as u64
    } else {
        quotient.floor() as u64
    }
}

/// Distance in metres covered by `steps` strides.
pub fn distance_for_steps(steps: u64, stride_m: f64) -> f64 {
    steps as f64 * stride_m
}

/// A walker's stride, computed once per session and reused for every
/// step/distance conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrideProfile {
    stride_length_m: f64,
}

impl StrideProfile {
    /// Derive a profile from a body height in centimetres.
    pub fn from_height_cm(height_cm: f64) -> Result<Self, DomainError> {
        stride_length(height_cm).map(|stride_length_m| Self { stride_length_m })
    }

    /// Use a directly measured stride length in metres.
    pub fn from_stride_m(stride_length_m: f64) -> Result<Self, DomainError> {
        if !stride_length_m.is_finite() || stride_length_m <= 0.0 {
            return Err(DomainError::InvalidStride(stride_length_m));
        }
        Ok(Self { stride_length_m })
    }

    /// Stride length in metres (always > 0).
    pub fn stride_m(&self) -> f64 {
        self.stride_length_m
    }

    pub fn steps_for_distance(&self, distance_m: f64) -> u64 {
        steps_for_distance(distance_m, self.stride_length_m)
    }

    pub fn distance_for_steps(&self, steps: u64) -> f64 {
        distance_for_steps(steps, self.stride_length_m)
    }
}
