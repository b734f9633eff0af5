//! Step-target itinerary planner.
//!
//! Finds the public-transport itinerary between two points whose walking
//! comes closest to a number of steps, then summarizes it with distances
//! and CO2 estimates.

pub mod domain;
pub mod navitia;
pub mod planner;
pub mod settings;
pub mod summary;
