//! Domain error types.
//!
//! These errors represent validation failures on user-supplied inputs.
//! They are raised before any network call is made and are distinct from
//! API/IO errors.

/// Domain-level errors for input validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    /// Height must be a finite, strictly positive number of centimetres
    #[error("invalid height: {0} cm (must be > 0)")]
    InvalidHeight(f64),

    /// Stride must be a finite, strictly positive number of metres
    #[error("invalid stride length: {0} m (must be > 0)")]
    InvalidStride(f64),

    /// Latitude outside [-90, 90] or not finite
    #[error("invalid latitude: {0}")]
    InvalidLatitude(f64),

    /// Longitude outside [-180, 180] or not finite
    #[error("invalid longitude: {0}")]
    InvalidLongitude(f64),
}
