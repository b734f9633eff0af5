//! Conversion from navitia DTOs to domain types.
//!
//! Payload shape is not under our control, so conversion is forgiving:
//! a section endpoint that cannot be resolved becomes `None` (and later a
//! zero-distance fallback), and a nearby place without a stop-point
//! coordinate is skipped. Both are logged.

use tracing::{debug, warn};

use crate::domain::{
    Coordinate, DomainError, Endpoint, Itinerary, Place, Section, Span, StationCandidate,
};

use super::types::{JourneyDto, JourneysResponse, PlaceDto, PlacesNearbyResponse, SectionDto};

/// Error during DTO to domain conversion.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    /// Missing required field
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Coordinate out of range
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(#[from] DomainError),

    /// Place payload doesn't match the expected shape
    #[error("malformed place: {0}")]
    MalformedPlace(String),
}

/// Convert a `/journeys` response into itineraries, preserving order.
pub fn convert_journeys(response: &JourneysResponse) -> Vec<Itinerary> {
    if response.journeys.is_empty()
        && let Some(error) = &response.error
    {
        debug!(
            id = error.id.as_deref().unwrap_or(""),
            message = error.message.as_deref().unwrap_or(""),
            "navitia returned no journeys"
        );
    }

    response.journeys.iter().map(convert_journey).collect()
}

/// Convert a single journey.
pub fn convert_journey(journey: &JourneyDto) -> Itinerary {
    let sections = journey.sections.iter().map(convert_section).collect();
    Itinerary::new(sections, journey.duration)
}

/// Classify and convert one section.
pub fn convert_section(section: &SectionDto) -> Section {
    match (section.section_type.as_str(), section.mode.as_deref()) {
        ("public_transport", _) => {
            let info = section.display_informations.clone().unwrap_or_default();
            Section::PublicTransport {
                span: convert_span(section),
                physical_mode: info.physical_mode,
                line_code: info.code,
                duration_s: section.duration,
            }
        }
        ("street_network", Some("walking")) => Section::Walking {
            span: convert_span(section),
            duration_s: section.duration,
        },
        ("waiting", _) => Section::Waiting {
            duration_s: section.duration,
        },
        (kind, _) => Section::Other {
            kind: kind.to_string(),
            duration_s: section.duration,
        },
    }
}

fn convert_span(section: &SectionDto) -> Span {
    Span {
        from: section.from.as_ref().and_then(|p| endpoint_or_warn(p, "from")),
        to: section.to.as_ref().and_then(|p| endpoint_or_warn(p, "to")),
    }
}

fn endpoint_or_warn(place: &PlaceDto, side: &'static str) -> Option<Endpoint> {
    match convert_endpoint(place) {
        Ok(endpoint) => Some(endpoint),
        Err(e) => {
            warn!(
                side,
                place = place.name.as_deref().unwrap_or("?"),
                error = %e,
                "unresolvable section endpoint"
            );
            None
        }
    }
}

/// Resolve a section endpoint.
///
/// `embedded_type == "address"` selects the address coordinate; anything
/// else selects the stop-point coordinate.
pub fn convert_endpoint(place: &PlaceDto) -> Result<Endpoint, ConversionError> {
    let is_address = place.embedded_type.as_deref() == Some("address");

    let embedded = if is_address {
        place
            .address
            .as_ref()
            .ok_or(ConversionError::MissingField("address"))?
    } else {
        place
            .stop_point
            .as_ref()
            .ok_or(ConversionError::MissingField("stop_point"))?
    };

    let coord = embedded
        .coord
        .ok_or(ConversionError::MissingField("coord"))?;
    let coord = Coordinate::new(coord.lat, coord.lon)?;

    let name = place
        .name
        .clone()
        .or_else(|| embedded.name.clone())
        .unwrap_or_default();

    let place = Place::new(name, coord);
    Ok(if is_address {
        Endpoint::Address(place)
    } else {
        Endpoint::StopPoint(place)
    })
}

/// Convert a `/places_nearby` response into station candidates.
///
/// Places without a usable stop-point coordinate are skipped.
pub fn convert_places_nearby(response: PlacesNearbyResponse) -> Vec<StationCandidate> {
    let mut results = Vec::with_capacity(response.places_nearby.len());

    for raw in response.places_nearby {
        match convert_place_candidate(raw) {
            Ok(candidate) => results.push(candidate),
            Err(e) => debug!(error = %e, "skipping nearby place"),
        }
    }

    results
}

/// Convert one raw nearby place into a station candidate.
pub fn convert_place_candidate(raw: serde_json::Value) -> Result<StationCandidate, ConversionError> {
    let place: PlaceDto = serde_json::from_value(raw.clone())
        .map_err(|e| ConversionError::MalformedPlace(e.to_string()))?;

    let stop_point = place
        .stop_point
        .as_ref()
        .ok_or(ConversionError::MissingField("stop_point"))?;
    let coord = stop_point
        .coord
        .ok_or(ConversionError::MissingField("stop_point.coord"))?;
    let coord = Coordinate::new(coord.lat, coord.lon)?;

    let id = place
        .id
        .clone()
        .or_else(|| stop_point.id.clone())
        .ok_or(ConversionError::MissingField("id"))?;
    let name = place
        .name
        .clone()
        .or_else(|| stop_point.name.clone())
        .unwrap_or_default();

    Ok(StationCandidate {
        id,
        name,
        coord,
        raw,
    })
}
