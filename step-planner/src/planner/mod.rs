//! Step-target route search.
//!
//! This module implements the optimizer that answers: "which way of taking
//! transit between these two points makes me walk closest to N steps?"
//!
//! The search picks candidate stations around both endpoints, queries the
//! journey service for every selected pair, and keeps the itinerary whose
//! walking distance is nearest the target.

mod config;
mod providers;
mod search;
mod select;

#[cfg(test)]
mod search_tests;

pub use config::{SearchConfig, search_radius_m};
pub use search::{
    JourneyQuery, JourneyService, Planner, SearchError, SearchOutcome, SearchRequest,
    SearchResult, SearchStats, TransitDirectory,
};
pub use select::{SelectionMode, select_candidates, sort_by_distance};
