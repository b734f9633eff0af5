//! Step-target route search.
//!
//! Finds the itinerary whose total walking distance comes closest to the
//! distance a walker wants to cover. The search gathers candidate stations
//! around both trip endpoints, queries the journey service for every pair
//! of selected candidates, and keeps the best-scoring itinerary.
//!
//! Journey queries run as a bounded, ordered fan-out: at most
//! `max_concurrent` are in flight, and results reach the reducer in pair
//! order, so ties resolve exactly as a sequential loop would.

use std::time::Duration;

use chrono::NaiveDateTime;
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::domain::{Coordinate, Itinerary, StationCandidate, StrideProfile};

use super::config::{SearchConfig, search_radius_m};
use super::select::{SelectionMode, select_candidates, sort_by_distance};

/// Error from route search or one of its collaborators.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SearchError {
    /// Failed to fetch stations from the transit directory
    #[error("failed to fetch stations near {center}: {message}")]
    DirectoryError { center: Coordinate, message: String },

    /// A journey query failed
    #[error("journey query failed: {message}")]
    JourneyError { message: String },

    /// A journey query exceeded its timeout
    #[error("journey query timed out after {0:?}")]
    Timeout(Duration),

    /// Invalid search request
    #[error("invalid search request: {0}")]
    InvalidRequest(String),
}

/// Query sent to the journey service.
#[derive(Debug, Clone, PartialEq)]
pub struct JourneyQuery {
    pub from: Coordinate,
    pub to: Coordinate,
    pub departure: Option<NaiveDateTime>,
    pub count: u32,
}

/// Source of stop points around a coordinate.
///
/// This abstraction allows the planner to be tested with stub data.
pub trait TransitDirectory {
    /// Stop points within `radius_m` of `center`, at most `cap` of them,
    /// in no particular order.
    async fn stations_near(
        &self,
        center: Coordinate,
        radius_m: f64,
        cap: usize,
    ) -> Result<Vec<StationCandidate>, SearchError>;
}

/// Source of itineraries between two coordinates.
pub trait JourneyService {
    /// Candidate itineraries for the query, possibly none.
    async fn journeys(&self, query: &JourneyQuery) -> Result<Vec<Itinerary>, SearchError>;
}

/// Request for a step-target search.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub origin: Coordinate,
    pub destination: Coordinate,

    /// Number of steps the walker wants the trip to contain.
    pub target_steps: u32,

    pub stride: StrideProfile,

    /// Radius around each endpoint in which to look for stations.
    pub radius_m: f64,
}

impl SearchRequest {
    /// Create a request with an explicit station search radius.
    pub fn new(
        origin: Coordinate,
        destination: Coordinate,
        target_steps: u32,
        stride: StrideProfile,
        radius_m: f64,
    ) -> Self {
        Self {
            origin,
            destination,
            target_steps,
            stride,
            radius_m,
        }
    }

    /// Create a request whose radius covers half the target steps.
    pub fn with_derived_radius(
        origin: Coordinate,
        destination: Coordinate,
        target_steps: u32,
        stride: StrideProfile,
    ) -> Self {
        let radius_m = search_radius_m(target_steps, &stride);
        Self::new(origin, destination, target_steps, stride, radius_m)
    }

    /// Validate the search request.
    pub fn validate(&self) -> Result<(), SearchError> {
        if !self.radius_m.is_finite() || self.radius_m < 0.0 {
            return Err(SearchError::InvalidRequest(format!(
                "search radius must be a non-negative number of metres, got {}",
                self.radius_m
            )));
        }
        Ok(())
    }

    /// Walking distance the target steps correspond to, in metres.
    pub fn target_distance_m(&self) -> f64 {
        self.stride.distance_for_steps(u64::from(self.target_steps))
    }
}

/// Counters describing the work a search did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Journey queries issued (including failed ones).
    pub pairs_queried: usize,
    /// Journey queries that failed or timed out and were skipped.
    pub failed_calls: usize,
    /// Itineraries scored across all successful queries.
    pub itineraries_scored: usize,
}

/// The winning itinerary of a search.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub itinerary: Itinerary,

    /// Total walking distance of the itinerary, in metres.
    pub walking_distance_m: f64,

    /// `|walking_distance_m - target_distance_m|`; lower is better.
    pub score: f64,

    pub target_distance_m: f64,

    /// Station the query started from.
    pub boarding: StationCandidate,

    /// Station the query ended at.
    pub alighting: StationCandidate,

    pub stats: SearchStats,
}

/// How a search ended.
#[derive(Debug, Clone)]
pub enum SearchOutcome {
    /// A best itinerary was found.
    Found(Box<SearchResult>),

    /// No stations within the radius of one or both endpoints. The journey
    /// service was not called.
    NoStations {
        origin_candidates: usize,
        destination_candidates: usize,
        radius_m: f64,
    },

    /// Stations were found but no query produced an itinerary.
    NoRoute(SearchStats),
}

impl SearchOutcome {
    /// The result, if a route was found.
    pub fn found(&self) -> Option<&SearchResult> {
        match self {
            SearchOutcome::Found(result) => Some(result.as_ref()),
            _ => None,
        }
    }
}

/// Best-so-far itinerary. Only replaced by a strictly lower score, so the
/// first of several equal scores wins.
struct Best<'c> {
    itinerary: Itinerary,
    walking_distance_m: f64,
    score: f64,
    boarding: &'c StationCandidate,
    alighting: &'c StationCandidate,
}

#[derive(Default)]
struct BestTracker<'c> {
    best: Option<Best<'c>>,
}

impl<'c> BestTracker<'c> {
    /// Offer a scored itinerary. Returns true if it became the new best.
    fn offer(&mut self, candidate: Best<'c>) -> bool {
        let better = self
            .best
            .as_ref()
            .is_none_or(|best| candidate.score < best.score);
        if better {
            self.best = Some(candidate);
        }
        better
    }

    fn best_score(&self) -> Option<f64> {
        self.best.as_ref().map(|b| b.score)
    }
}

/// Step-target planner.
pub struct Planner<'a, D: TransitDirectory, J: JourneyService> {
    directory: &'a D,
    journeys: &'a J,
    config: &'a SearchConfig,
}

impl<'a, D: TransitDirectory, J: JourneyService> Planner<'a, D, J> {
    /// Create a new planner.
    pub fn new(directory: &'a D, journeys: &'a J, config: &'a SearchConfig) -> Self {
        Self {
            directory,
            journeys,
            config,
        }
    }

    /// Search for the itinerary whose walking distance best matches the
    /// request's step target.
    ///
    /// Individual journey query failures are logged and skipped. Only an
    /// invalid request is returned as an error.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchOutcome, SearchError> {
        request.validate()?;

        let target_distance_m = request.target_distance_m();

        let (mut from_stations, mut to_stations) = futures::join!(
            self.fetch_stations(request.origin, request.radius_m),
            self.fetch_stations(request.destination, request.radius_m),
        );

        info!(
            origin = from_stations.len(),
            destination = to_stations.len(),
            radius_m = request.radius_m,
            "Found candidate stations"
        );

        if from_stations.is_empty() || to_stations.is_empty() {
            return Ok(SearchOutcome::NoStations {
                origin_candidates: from_stations.len(),
                destination_candidates: to_stations.len(),
                radius_m: request.radius_m,
            });
        }

        sort_by_distance(&mut from_stations, request.origin);
        sort_by_distance(&mut to_stations, request.destination);

        let mode = SelectionMode::for_target(request.target_steps, self.config.high_step_threshold);
        let selected_from = select_candidates(&from_stations, mode, self.config.max_stations);
        let selected_to = select_candidates(&to_stations, mode, self.config.max_stations);

        info!(
            %mode,
            max_stations = self.config.max_stations,
            pairs = selected_from.len() * selected_to.len(),
            target_distance_m,
            "Evaluating routes"
        );

        let pairs: Vec<(&StationCandidate, &StationCandidate)> = selected_from
            .iter()
            .flat_map(|from| selected_to.iter().map(move |to| (from, to)))
            .collect();

        let mut stats = SearchStats::default();
        let mut tracker = BestTracker::default();

        let mut results = stream::iter(pairs)
            .map(|(from, to)| async move {
                let result = self.query_pair(request, from, to).await;
                (from, to, result)
            })
            .buffered(self.config.max_concurrent.max(1));

        while let Some((from, to, result)) = results.next().await {
            stats.pairs_queried += 1;

            let itineraries = match result {
                Ok(itineraries) => itineraries,
                Err(e) => {
                    stats.failed_calls += 1;
                    warn!(
                        from = %from.id,
                        to = %to.id,
                        error = %e,
                        "Skipping route after journey query failure"
                    );
                    continue;
                }
            };

            for itinerary in itineraries {
                stats.itineraries_scored += 1;
                let walking_distance_m = itinerary.walking_distance_m();
                let score = (walking_distance_m - target_distance_m).abs();

                let improved = tracker.offer(Best {
                    itinerary,
                    walking_distance_m,
                    score,
                    boarding: from,
                    alighting: to,
                });
                if improved {
                    info!(
                        walking_m = walking_distance_m.round(),
                        target_m = target_distance_m.round(),
                        from = %from.name,
                        to = %to.name,
                        "Found better route"
                    );
                }
            }

            if self.config.stop_on_exact_match && tracker.best_score() == Some(0.0) {
                debug!("Exact match found, cancelling remaining queries");
                break;
            }
        }

        Ok(match tracker.best {
            Some(best) => SearchOutcome::Found(Box::new(SearchResult {
                itinerary: best.itinerary,
                walking_distance_m: best.walking_distance_m,
                score: best.score,
                target_distance_m,
                boarding: best.boarding.clone(),
                alighting: best.alighting.clone(),
                stats,
            })),
            None => SearchOutcome::NoRoute(stats),
        })
    }

    /// Fetch stations around a point, treating failures as "none found".
    async fn fetch_stations(&self, center: Coordinate, radius_m: f64) -> Vec<StationCandidate> {
        match self
            .directory
            .stations_near(center, radius_m, self.config.places_cap)
            .await
        {
            Ok(stations) => stations,
            Err(e) => {
                warn!(%center, error = %e, "Station lookup failed, using no stations");
                Vec::new()
            }
        }
    }

    /// Issue one journey query between two candidate stations, bounded by
    /// the configured timeout.
    async fn query_pair(
        &self,
        request: &SearchRequest,
        from: &StationCandidate,
        to: &StationCandidate,
    ) -> Result<Vec<Itinerary>, SearchError> {
        debug!(
            walk_to_first_km = request.origin.distance_to(&from.coord) / 1000.0,
            walk_from_last_km = to.coord.distance_to(&request.destination) / 1000.0,
            from = %from.id,
            to = %to.id,
            "Evaluating route"
        );

        let query = JourneyQuery {
            from: from.coord,
            to: to.coord,
            departure: self.config.departure,
            count: self.config.journey_count,
        };

        tokio::time::timeout(self.config.call_timeout, self.journeys.journeys(&query))
            .await
            .map_err(|_| SearchError::Timeout(self.config.call_timeout))?
    }
}
