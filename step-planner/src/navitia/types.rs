//! Navitia API response DTOs.
//!
//! These types map directly to the navitia JSON responses for `/journeys`
//! and `/places_nearby`. They use `Option` and `#[serde(default)]`
//! liberally because navitia omits fields rather than sending nulls, and
//! coordinates arrive as strings.

use serde::{Deserialize, Deserializer};

/// Response from `/journeys`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JourneysResponse {
    /// Candidate journeys, best first.
    #[serde(default)]
    pub journeys: Vec<JourneyDto>,

    /// Present when navitia could not answer (e.g. `no_solution`).
    pub error: Option<ApiErrorDto>,
}

/// Error object embedded in a navitia response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDto {
    pub id: Option<String>,
    pub message: Option<String>,
}

/// A single journey.
#[derive(Debug, Clone, Deserialize)]
pub struct JourneyDto {
    /// Total duration in seconds.
    #[serde(default, deserialize_with = "lenient_seconds")]
    pub duration: u64,

    #[serde(default)]
    pub sections: Vec<SectionDto>,
}

/// One section of a journey.
#[derive(Debug, Clone, Deserialize)]
pub struct SectionDto {
    /// "public_transport", "street_network", "waiting", "transfer", ...
    #[serde(rename = "type")]
    pub section_type: String,

    /// Street-network mode: "walking", "bike", "car", ...
    pub mode: Option<String>,

    #[serde(default, deserialize_with = "lenient_seconds")]
    pub duration: u64,

    pub from: Option<PlaceDto>,

    pub to: Option<PlaceDto>,

    pub display_informations: Option<DisplayInformationsDto>,
}

/// Display details of a public-transport section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DisplayInformationsDto {
    /// e.g. "RER", "Métro", "Bus"
    #[serde(default)]
    pub physical_mode: String,

    /// Line code, e.g. "A" or "91".
    #[serde(default)]
    pub code: String,
}

/// A place: the tagged union navitia uses for section endpoints and
/// nearby places.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceDto {
    pub id: Option<String>,

    pub name: Option<String>,

    /// "address", "stop_point", "stop_area", ...
    pub embedded_type: Option<String>,

    pub address: Option<EmbeddedPlaceDto>,

    pub stop_point: Option<EmbeddedPlaceDto>,
}

/// The embedded object of a place.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddedPlaceDto {
    pub id: Option<String>,
    pub name: Option<String>,
    pub coord: Option<CoordDto>,
}

/// A navitia coordinate. Values are usually strings ("48.8566").
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct CoordDto {
    #[serde(deserialize_with = "lenient_f64")]
    pub lat: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub lon: f64,
}

/// Response from `/places_nearby`.
///
/// Places are kept as raw JSON so each candidate can carry its original
/// payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlacesNearbyResponse {
    #[serde(default)]
    pub places_nearby: Vec<serde_json::Value>,
}

/// Accept a float encoded either as a JSON number or a JSON string.
fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        String(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Accept a duration in whole seconds sent as an integer, a float or a
/// string. Fractional seconds are rounded.
fn lenient_seconds<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let seconds = lenient_f64(deserializer)?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(serde::de::Error::custom(format!(
            "invalid duration: {seconds}"
        )));
    }
    Ok(seconds.round() as u64)
}
