//! Navitia HTTP client.
//!
//! Provides async methods for the two navitia endpoints the planner needs:
//! `places_nearby` (stop points around a coordinate) and `journeys`
//! (itineraries between two coordinates). Handles authentication,
//! concurrency limiting, and conversion to domain types.

use std::sync::Arc;

use chrono::NaiveDateTime;
use reqwest::header::{ACCEPT, HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;
use tracing::trace;

use crate::domain::{Coordinate, Itinerary, StationCandidate};

use super::convert::{convert_journeys, convert_places_nearby};
use super::error::NavitiaError;
use super::types::{JourneysResponse, PlacesNearbyResponse};

/// Default base URL for the Île-de-France Mobilités navitia marketplace.
const DEFAULT_BASE_URL: &str = "https://prim.iledefrance-mobilites.fr/marketplace/v2/navitia";

/// Default coverage region.
const DEFAULT_COVERAGE: &str = "fr-idf";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 5;

/// Format navitia expects for the `datetime` parameter.
const DATETIME_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Configuration for the navitia client.
#[derive(Debug, Clone)]
pub struct NavitiaConfig {
    /// API key, sent in the `apiKey` header
    pub api_key: String,
    /// Base URL for the API
    pub base_url: String,
    /// Coverage region used for `places_nearby`
    pub coverage: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Lower bound on journeys navitia should try to return
    pub min_nb_journeys: Option<u32>,
    /// Upper bound on journeys navitia may return
    pub max_nb_journeys: Option<u32>,
}

impl NavitiaConfig {
    /// Create a new config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            coverage: DEFAULT_COVERAGE.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 30,
            min_nb_journeys: Some(10),
            max_nb_journeys: Some(20),
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the coverage region.
    pub fn with_coverage(mut self, coverage: impl Into<String>) -> Self {
        self.coverage = coverage.into();
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the journey count bounds (`None` omits the parameter).
    pub fn with_journey_bounds(mut self, min: Option<u32>, max: Option<u32>) -> Self {
        self.min_nb_journeys = min;
        self.max_nb_journeys = max;
        self
    }
}

/// Navitia API client.
///
/// Uses a semaphore to limit concurrent requests and avoid rate limiting.
#[derive(Debug, Clone)]
pub struct NavitiaClient {
    http: reqwest::Client,
    base_url: String,
    coverage: String,
    min_nb_journeys: Option<u32>,
    max_nb_journeys: Option<u32>,
    semaphore: Arc<Semaphore>,
}

impl NavitiaClient {
    /// Create a new navitia client with the given configuration.
    pub fn new(config: NavitiaConfig) -> Result<Self, NavitiaError> {
        let mut headers = HeaderMap::new();

        let api_key =
            HeaderValue::from_str(&config.api_key).map_err(|_| NavitiaError::InvalidApiKey)?;
        headers.insert(HeaderName::from_static("apikey"), api_key);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
            coverage: config.coverage,
            min_nb_journeys: config.min_nb_journeys,
            max_nb_journeys: config.max_nb_journeys,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
        })
    }

    /// Find stop points within `radius_m` of `center`.
    ///
    /// # Arguments
    ///
    /// * `center` - Search centre
    /// * `radius_m` - Search radius in metres (truncated to whole metres)
    /// * `count` - Maximum number of places to return
    pub async fn places_nearby(
        &self,
        center: Coordinate,
        radius_m: f64,
        count: usize,
    ) -> Result<Vec<StationCandidate>, NavitiaError> {
        let url = places_nearby_url(&self.base_url, &self.coverage, center);
        let query = vec![
            ("count", count.to_string()),
            ("distance", (radius_m.max(0.0) as u64).to_string()),
            ("type[]", "stop_point".to_string()),
        ];

        let response: PlacesNearbyResponse = self.get_json(&url, &query).await?;
        Ok(convert_places_nearby(response))
    }

    /// Get candidate itineraries between two coordinates.
    ///
    /// An answer with no journeys (navitia's `no_solution`) is an empty
    /// list, not an error.
    pub async fn journeys(
        &self,
        from: Coordinate,
        to: Coordinate,
        departure: Option<NaiveDateTime>,
        count: u32,
    ) -> Result<Vec<Itinerary>, NavitiaError> {
        let url = format!("{}/journeys", self.base_url);
        let query = journeys_query(
            from,
            to,
            departure,
            count,
            self.min_nb_journeys,
            self.max_nb_journeys,
        );

        let response: JourneysResponse = self.get_json(&url, &query).await?;
        Ok(convert_journeys(&response))
    }

    async fn get_json<T: DeserializeOwned + Default>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, NavitiaError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| NavitiaError::Api {
                status: 0,
                message: "Semaphore closed".to_string(),
            })?;

        trace!(url, ?query, "navitia request");

        let response = self.http.get(url).query(query).send().await?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(NavitiaError::Unauthorized);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(NavitiaError::RateLimited);
        }

        let body = response.text().await?;

        if !status.is_success() {
            // navitia answers "no solution" with a 404 carrying a JSON error
            if status == reqwest::StatusCode::NOT_FOUND && body.contains("no_solution") {
                return Ok(T::default());
            }
            return Err(NavitiaError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        serde_json::from_str(&body).map_err(|e| NavitiaError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })
    }
}

/// Navitia expects coordinates as "lon;lat".
fn lon_lat(coord: Coordinate) -> String {
    format!("{};{}", coord.longitude(), coord.latitude())
}

fn places_nearby_url(base_url: &str, coverage: &str, center: Coordinate) -> String {
    format!(
        "{}/coverage/{}/coords/{}/places_nearby",
        base_url,
        coverage,
        lon_lat(center)
    )
}

fn journeys_query(
    from: Coordinate,
    to: Coordinate,
    departure: Option<NaiveDateTime>,
    count: u32,
    min_nb_journeys: Option<u32>,
    max_nb_journeys: Option<u32>,
) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("from", lon_lat(from)),
        ("to", lon_lat(to)),
        ("count", count.to_string()),
    ];
    if let Some(departure) = departure {
        query.push(("datetime", departure.format(DATETIME_FORMAT).to_string()));
    }
    if let Some(min) = min_nb_journeys {
        query.push(("min_nb_journeys", min.to_string()));
    }
    if let Some(max) = max_nb_journeys {
        query.push(("max_nb_journeys", max.to_string()));
    }
    query
}
