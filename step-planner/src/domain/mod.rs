//! Domain types for the step-target planner.
//!
//! This module contains the core value types: validated coordinates, the
//! stride model, itineraries as returned by the journey service, and the
//! emission table. Validated types enforce their invariants at construction
//! time, so code that receives them can trust their validity.

mod emission;
mod error;
mod geo;
mod itinerary;
mod stride;

pub use emission::{CAR_MODE, EmissionTable, EmissionTableError};
pub use error::DomainError;
pub use geo::{Coordinate, EARTH_RADIUS_M, haversine_distance};
pub use itinerary::{
    Endpoint, Itinerary, Place, Section, Span, StationCandidate, TransitLeg, mode_token,
};
pub use stride::{
    STRIDE_HEIGHT_RATIO, StrideProfile, distance_for_steps, steps_for_distance, stride_length,
};
