//! Unit tests for the step-target search.

use super::*;
use crate::domain::{
    Coordinate, EARTH_RADIUS_M, Endpoint, Itinerary, Place, Section, Span, StationCandidate,
    StrideProfile,
};
use std::sync::Mutex;
use std::time::Duration;

/// Metres per degree of latitude on the haversine sphere.
const METRES_PER_DEGREE: f64 = EARTH_RADIUS_M * std::f64::consts::PI / 180.0;

fn coord(lat: f64, lon: f64) -> Coordinate {
    Coordinate::new(lat, lon).unwrap()
}

fn origin() -> Coordinate {
    coord(48.843890, 2.306979)
}

fn destination() -> Coordinate {
    coord(48.925073, 2.236467)
}

/// `n` stations spread north of `center`, nearest first.
fn stations_around(prefix: &str, center: Coordinate, n: usize) -> Vec<StationCandidate> {
    (0..n)
        .map(|i| {
            StationCandidate::new(
                format!("{prefix}{i}"),
                format!("Station {prefix}{i}"),
                coord(center.latitude() + 0.001 * (i + 1) as f64, center.longitude()),
            )
        })
        .collect()
}

/// An itinerary with a single walk of roughly `metres`.
fn walk_itinerary(metres: f64) -> Itinerary {
    let start = coord(48.0, 2.0);
    let end = coord(48.0 + metres / METRES_PER_DEGREE, 2.0);
    Itinerary::new(
        vec![Section::Walking {
            span: Span::new(
                Endpoint::Address(Place::new("start", start)),
                Endpoint::StopPoint(Place::new("end", end)),
            ),
            duration_s: (metres / 1.3) as u64,
        }],
        (metres / 1.3) as u64,
    )
}

/// An itinerary with no walking at all.
fn no_walk_itinerary() -> Itinerary {
    Itinerary::new(vec![Section::Waiting { duration_s: 60 }], 60)
}

fn stride() -> StrideProfile {
    StrideProfile::from_stride_m(0.7).unwrap()
}

/// 2000 steps of 0.7 m: a 1400 m target.
fn request(target_steps: u32) -> SearchRequest {
    SearchRequest::new(origin(), destination(), target_steps, stride(), 1000.0)
}

/// Stub transit directory keyed by search centre.
struct StubDirectory {
    stations: Vec<(Coordinate, Result<Vec<StationCandidate>, SearchError>)>,
    calls: Mutex<usize>,
}

impl StubDirectory {
    fn new() -> Self {
        Self {
            stations: Vec::new(),
            calls: Mutex::new(0),
        }
    }

    fn with(mut self, center: Coordinate, stations: Vec<StationCandidate>) -> Self {
        self.stations.push((center, Ok(stations)));
        self
    }

    fn failing(mut self, center: Coordinate) -> Self {
        self.stations.push((
            center,
            Err(SearchError::DirectoryError {
                center,
                message: "connection reset".into(),
            }),
        ));
        self
    }

    fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl TransitDirectory for StubDirectory {
    async fn stations_near(
        &self,
        center: Coordinate,
        _radius_m: f64,
        _cap: usize,
    ) -> Result<Vec<StationCandidate>, SearchError> {
        *self.calls.lock().unwrap() += 1;
        self.stations
            .iter()
            .find(|(c, _)| *c == center)
            .map(|(_, r)| r.clone())
            .unwrap_or(Ok(Vec::new()))
    }
}

/// Canned journey service answer.
#[derive(Clone)]
enum Reply {
    Itineraries(Vec<Itinerary>),
    Delayed(Duration, Vec<Itinerary>),
    Fail,
    Hang,
}

/// Stub journey service keyed by (from, to) coordinates.
struct StubJourneys {
    replies: Vec<(Coordinate, Coordinate, Reply)>,
    fallback: Reply,
    calls: Mutex<Vec<(Coordinate, Coordinate)>>,
}

impl StubJourneys {
    fn new() -> Self {
        Self {
            replies: Vec::new(),
            fallback: Reply::Itineraries(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn reply(mut self, from: &StationCandidate, to: &StationCandidate, reply: Reply) -> Self {
        self.replies.push((from.coord, to.coord, reply));
        self
    }

    fn otherwise(mut self, reply: Reply) -> Self {
        self.fallback = reply;
        self
    }

    fn calls(&self) -> Vec<(Coordinate, Coordinate)> {
        self.calls.lock().unwrap().clone()
    }
}

impl JourneyService for StubJourneys {
    async fn journeys(&self, query: &JourneyQuery) -> Result<Vec<Itinerary>, SearchError> {
        self.calls.lock().unwrap().push((query.from, query.to));

        let reply = self
            .replies
            .iter()
            .find(|(f, t, _)| *f == query.from && *t == query.to)
            .map(|(_, _, r)| r.clone())
            .unwrap_or_else(|| self.fallback.clone());

        match reply {
            Reply::Itineraries(itineraries) => Ok(itineraries),
            Reply::Delayed(delay, itineraries) => {
                tokio::time::sleep(delay).await;
                Ok(itineraries)
            }
            Reply::Fail => Err(SearchError::JourneyError {
                message: "HTTP error: 502 Bad Gateway".into(),
            }),
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(Vec::new())
            }
        }
    }
}

fn found(outcome: SearchOutcome) -> SearchResult {
    match outcome {
        SearchOutcome::Found(result) => *result,
        other => panic!("expected a route, got {other:?}"),
    }
}

#[tokio::test]
async fn picks_walking_distance_closest_to_target() {
    let from = stations_around("o", origin(), 1);
    let to = stations_around("d", destination(), 1);

    let directory = StubDirectory::new()
        .with(origin(), from.clone())
        .with(destination(), to.clone());
    let journeys = StubJourneys::new().reply(
        &from[0],
        &to[0],
        Reply::Itineraries(vec![
            walk_itinerary(500.0),
            walk_itinerary(1500.0),
            walk_itinerary(2600.0),
        ]),
    );
    let config = SearchConfig::default();

    let planner = Planner::new(&directory, &journeys, &config);
    let result = found(planner.search(&request(2000)).await.unwrap());

    assert!((result.target_distance_m - 1400.0).abs() < 1e-6);
    assert!((result.walking_distance_m - 1500.0).abs() < 1e-3);
    assert!((result.score - 100.0).abs() < 1e-3);
    assert_eq!(result.stats.itineraries_scored, 3);
}

#[tokio::test]
async fn best_is_tracked_across_pairs() {
    let from = stations_around("o", origin(), 1);
    let to = stations_around("d", destination(), 3);

    let directory = StubDirectory::new()
        .with(origin(), from.clone())
        .with(destination(), to.clone());
    let journeys = StubJourneys::new()
        .reply(&from[0], &to[0], Reply::Itineraries(vec![walk_itinerary(500.0)]))
        .reply(&from[0], &to[1], Reply::Itineraries(vec![walk_itinerary(1500.0)]))
        .reply(&from[0], &to[2], Reply::Itineraries(vec![walk_itinerary(2600.0)]));
    let config = SearchConfig::default();

    let planner = Planner::new(&directory, &journeys, &config);
    let result = found(planner.search(&request(2000)).await.unwrap());

    assert_eq!(result.boarding.id, "o0");
    assert_eq!(result.alighting.id, "d1");
    assert_eq!(result.stats.pairs_queried, 3);
}

#[tokio::test]
async fn empty_origin_stations_skip_journey_service() {
    let directory = StubDirectory::new()
        .with(origin(), Vec::new())
        .with(destination(), stations_around("d", destination(), 4));
    let journeys = StubJourneys::new();
    let config = SearchConfig::default();

    let planner = Planner::new(&directory, &journeys, &config);
    let outcome = planner.search(&request(2000)).await.unwrap();

    match outcome {
        SearchOutcome::NoStations {
            origin_candidates,
            destination_candidates,
            radius_m,
        } => {
            assert_eq!(origin_candidates, 0);
            assert_eq!(destination_candidates, 4);
            assert_eq!(radius_m, 1000.0);
        }
        other => panic!("expected NoStations, got {other:?}"),
    }
    assert!(journeys.calls().is_empty());
}

#[tokio::test]
async fn empty_destination_stations_skip_journey_service() {
    let directory = StubDirectory::new().with(origin(), stations_around("o", origin(), 4));
    let journeys = StubJourneys::new();
    let config = SearchConfig::default();

    let planner = Planner::new(&directory, &journeys, &config);
    let outcome = planner.search(&request(2000)).await.unwrap();

    assert!(matches!(outcome, SearchOutcome::NoStations { .. }));
    assert!(journeys.calls().is_empty());
    assert_eq!(directory.call_count(), 2);
}

#[tokio::test]
async fn directory_failure_counts_as_no_stations() {
    let directory = StubDirectory::new()
        .failing(origin())
        .with(destination(), stations_around("d", destination(), 2));
    let journeys = StubJourneys::new();
    let config = SearchConfig::default();

    let planner = Planner::new(&directory, &journeys, &config);
    let outcome = planner.search(&request(2000)).await.unwrap();

    assert!(matches!(outcome, SearchOutcome::NoStations { .. }));
    assert!(journeys.calls().is_empty());
}

#[tokio::test]
async fn single_failure_does_not_abort_search() {
    let from = stations_around("o", origin(), 1);
    let to = stations_around("d", destination(), 3);

    let directory = StubDirectory::new()
        .with(origin(), from.clone())
        .with(destination(), to.clone());
    let journeys = StubJourneys::new()
        .reply(&from[0], &to[0], Reply::Itineraries(vec![walk_itinerary(400.0)]))
        .reply(&from[0], &to[1], Reply::Fail)
        .reply(&from[0], &to[2], Reply::Itineraries(vec![walk_itinerary(1300.0)]));
    let config = SearchConfig::default();

    let planner = Planner::new(&directory, &journeys, &config);
    let result = found(planner.search(&request(2000)).await.unwrap());

    assert_eq!(result.alighting.id, "d2");
    assert_eq!(result.stats.pairs_queried, 3);
    assert_eq!(result.stats.failed_calls, 1);
    assert_eq!(result.stats.itineraries_scored, 2);
}

#[tokio::test]
async fn timed_out_query_is_skipped() {
    let from = stations_around("o", origin(), 1);
    let to = stations_around("d", destination(), 2);

    let directory = StubDirectory::new()
        .with(origin(), from.clone())
        .with(destination(), to.clone());
    let journeys = StubJourneys::new()
        .reply(&from[0], &to[0], Reply::Hang)
        .reply(&from[0], &to[1], Reply::Itineraries(vec![walk_itinerary(900.0)]));
    let config = SearchConfig::default().with_call_timeout(Duration::from_millis(50));

    let planner = Planner::new(&directory, &journeys, &config);
    let result = found(planner.search(&request(2000)).await.unwrap());

    assert_eq!(result.alighting.id, "d1");
    assert_eq!(result.stats.failed_calls, 1);
}

#[tokio::test]
async fn all_failures_give_no_route() {
    let directory = StubDirectory::new()
        .with(origin(), stations_around("o", origin(), 2))
        .with(destination(), stations_around("d", destination(), 2));
    let journeys = StubJourneys::new().otherwise(Reply::Fail);
    let config = SearchConfig::default();

    let planner = Planner::new(&directory, &journeys, &config);
    let outcome = planner.search(&request(2000)).await.unwrap();

    match outcome {
        SearchOutcome::NoRoute(stats) => {
            assert_eq!(stats.pairs_queried, 4);
            assert_eq!(stats.failed_calls, 4);
            assert_eq!(stats.itineraries_scored, 0);
        }
        other => panic!("expected NoRoute, got {other:?}"),
    }
}

#[tokio::test]
async fn zero_itineraries_give_no_route() {
    let directory = StubDirectory::new()
        .with(origin(), stations_around("o", origin(), 2))
        .with(destination(), stations_around("d", destination(), 3));
    let journeys = StubJourneys::new();
    let config = SearchConfig::default();

    let planner = Planner::new(&directory, &journeys, &config);
    let outcome = planner.search(&request(2000)).await.unwrap();

    assert!(outcome.found().is_none());
    match outcome {
        SearchOutcome::NoRoute(stats) => {
            assert_eq!(stats.pairs_queried, 6);
            assert_eq!(stats.failed_calls, 0);
        }
        other => panic!("expected NoRoute, got {other:?}"),
    }
}

#[tokio::test]
async fn ties_keep_first_pair_even_when_it_answers_last() {
    let from = stations_around("o", origin(), 1);
    let to = stations_around("d", destination(), 2);

    let directory = StubDirectory::new()
        .with(origin(), from.clone())
        .with(destination(), to.clone());
    let journeys = StubJourneys::new()
        .reply(
            &from[0],
            &to[0],
            Reply::Delayed(Duration::from_millis(30), vec![walk_itinerary(1000.0)]),
        )
        .reply(&from[0], &to[1], Reply::Itineraries(vec![walk_itinerary(1000.0)]));
    let config = SearchConfig::default().with_max_concurrent(4);

    let planner = Planner::new(&directory, &journeys, &config);
    let result = found(planner.search(&request(2000)).await.unwrap());

    assert_eq!(result.alighting.id, "d0");
}

#[tokio::test]
async fn high_step_target_uses_farthest_stations() {
    let from = stations_around("o", origin(), 12);
    let to = stations_around("d", destination(), 12);

    // Hand the directory an unsorted list; the planner must rank it.
    let mut shuffled = from.clone();
    shuffled.reverse();

    let directory = StubDirectory::new()
        .with(origin(), shuffled)
        .with(destination(), to.clone());
    let journeys = StubJourneys::new();
    let config = SearchConfig::default().with_max_stations(2);

    let planner = Planner::new(&directory, &journeys, &config);
    planner.search(&request(3001)).await.unwrap();

    let calls = journeys.calls();
    assert_eq!(calls.len(), 4);
    let far_from = [from[10].coord, from[11].coord];
    let far_to = [to[10].coord, to[11].coord];
    for (f, t) in calls {
        assert!(far_from.contains(&f));
        assert!(far_to.contains(&t));
    }
}

#[tokio::test]
async fn step_target_at_threshold_uses_closest_stations() {
    let from = stations_around("o", origin(), 12);
    let to = stations_around("d", destination(), 12);

    let directory = StubDirectory::new()
        .with(origin(), from.clone())
        .with(destination(), to.clone());
    let journeys = StubJourneys::new();
    let config = SearchConfig::default().with_max_stations(2);

    let planner = Planner::new(&directory, &journeys, &config);
    planner.search(&request(3000)).await.unwrap();

    let calls = journeys.calls();
    assert_eq!(calls.len(), 4);
    let near_from = [from[0].coord, from[1].coord];
    let near_to = [to[0].coord, to[1].coord];
    for (f, t) in calls {
        assert!(near_from.contains(&f));
        assert!(near_to.contains(&t));
    }
}

#[tokio::test]
async fn pair_count_is_bounded_by_max_stations_squared() {
    let directory = StubDirectory::new()
        .with(origin(), stations_around("o", origin(), 30))
        .with(destination(), stations_around("d", destination(), 30));
    let journeys = StubJourneys::new();
    let config = SearchConfig::default();

    let planner = Planner::new(&directory, &journeys, &config);
    planner.search(&request(2000)).await.unwrap();

    assert_eq!(journeys.calls().len(), 100);
}

#[tokio::test]
async fn exact_match_stops_remaining_queries() {
    let directory = StubDirectory::new()
        .with(origin(), stations_around("o", origin(), 3))
        .with(destination(), stations_around("d", destination(), 3));
    let journeys = StubJourneys::new().otherwise(Reply::Itineraries(vec![no_walk_itinerary()]));
    let config = SearchConfig::default().with_max_concurrent(1);

    let planner = Planner::new(&directory, &journeys, &config);
    let result = found(planner.search(&request(0)).await.unwrap());

    assert_eq!(result.score, 0.0);
    assert_eq!(result.stats.pairs_queried, 1);
    assert_eq!(journeys.calls().len(), 1);
}

#[tokio::test]
async fn exact_match_search_continues_when_disabled() {
    let directory = StubDirectory::new()
        .with(origin(), stations_around("o", origin(), 2))
        .with(destination(), stations_around("d", destination(), 2));
    let journeys = StubJourneys::new().otherwise(Reply::Itineraries(vec![no_walk_itinerary()]));
    let config = SearchConfig {
        stop_on_exact_match: false,
        ..SearchConfig::default()
    };

    let planner = Planner::new(&directory, &journeys, &config);
    let result = found(planner.search(&request(0)).await.unwrap());

    assert_eq!(result.stats.pairs_queried, 4);
    assert_eq!(result.alighting.id, "d0");
    assert_eq!(result.boarding.id, "o0");
}

#[tokio::test]
async fn invalid_request_makes_no_calls() {
    let directory = StubDirectory::new();
    let journeys = StubJourneys::new();
    let config = SearchConfig::default();

    let planner = Planner::new(&directory, &journeys, &config);
    let bad = SearchRequest::new(origin(), destination(), 2000, stride(), -5.0);
    let result = planner.search(&bad).await;

    assert!(matches!(result, Err(SearchError::InvalidRequest(_))));
    assert_eq!(directory.call_count(), 0);
    assert!(journeys.calls().is_empty());
}

#[tokio::test]
async fn queries_carry_config_departure_and_count() {
    struct Recording(Mutex<Vec<JourneyQuery>>);

    impl JourneyService for Recording {
        async fn journeys(&self, query: &JourneyQuery) -> Result<Vec<Itinerary>, SearchError> {
            self.0.lock().unwrap().push(query.clone());
            Ok(Vec::new())
        }
    }

    let departure = chrono::NaiveDate::from_ymd_opt(2024, 3, 15)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap();
    let directory = StubDirectory::new()
        .with(origin(), stations_around("o", origin(), 1))
        .with(destination(), stations_around("d", destination(), 1));
    let journeys = Recording(Mutex::new(Vec::new()));
    let config = SearchConfig::default().with_departure(departure);

    let planner = Planner::new(&directory, &journeys, &config);
    planner.search(&request(2000)).await.unwrap();

    let queries = journeys.0.lock().unwrap();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].departure, Some(departure));
    assert_eq!(queries[0].count, 20);
}
