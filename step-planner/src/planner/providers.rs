//! Navitia-backed implementations of the planner's collaborators.

use crate::domain::{Coordinate, Itinerary, StationCandidate};
use crate::navitia::NavitiaClient;

use super::search::{JourneyQuery, JourneyService, SearchError, TransitDirectory};

impl TransitDirectory for NavitiaClient {
    async fn stations_near(
        &self,
        center: Coordinate,
        radius_m: f64,
        cap: usize,
    ) -> Result<Vec<StationCandidate>, SearchError> {
        self.places_nearby(center, radius_m, cap)
            .await
            .map_err(|e| SearchError::DirectoryError {
                center,
                message: e.to_string(),
            })
    }
}

impl JourneyService for NavitiaClient {
    async fn journeys(&self, query: &JourneyQuery) -> Result<Vec<Itinerary>, SearchError> {
        NavitiaClient::journeys(self, query.from, query.to, query.departure, query.count)
            .await
            .map_err(|e| SearchError::JourneyError {
                message: e.to_string(),
            })
    }
}
