//! Search configuration for the step-target planner.

use std::time::Duration;

use chrono::NaiveDateTime;

use crate::domain::StrideProfile;

/// Configuration parameters for a step-target search.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// How many candidate stations to keep per endpoint.
    /// At most `max_stations²` journey queries are issued.
    pub max_stations: usize,

    /// Step targets above this switch selection from the closest to the
    /// farthest candidate stations.
    pub high_step_threshold: u32,

    /// Maximum number of places requested from the transit directory.
    pub places_cap: usize,

    /// Number of itineraries requested per journey query.
    pub journey_count: u32,

    /// Maximum number of journey queries in flight at once.
    pub max_concurrent: usize,

    /// Per-query timeout. A query that times out is skipped.
    pub call_timeout: Duration,

    /// Stop issuing queries once an itinerary hits the target exactly.
    pub stop_on_exact_match: bool,

    /// Departure time passed to the journey service (`None` = now).
    pub departure: Option<NaiveDateTime>,
}

impl SearchConfig {
    /// Set the number of candidate stations per endpoint.
    pub fn with_max_stations(mut self, n: usize) -> Self {
        self.max_stations = n;
        self
    }

    /// Set the number of concurrent journey queries.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set the per-query timeout.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Set the departure time.
    pub fn with_departure(mut self, departure: NaiveDateTime) -> Self {
        self.departure = Some(departure);
        self
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_stations: 10,
            high_step_threshold: 3000,
            places_cap: 100,
            journey_count: 20,
            max_concurrent: 4,
            call_timeout: Duration::from_secs(30),
            stop_on_exact_match: true,
            departure: None,
        }
    }
}

/// Station search radius for a step target: the distance covered by half
/// the target steps.
pub fn search_radius_m(target_steps: u32, stride: &StrideProfile) -> f64 {
    stride.distance_for_steps(u64::from(target_steps / 2))
}
