//! Navitia client.
//!
//! HTTP client for the navitia journey-planning API as exposed by the
//! Île-de-France Mobilités PRIM marketplace. It backs both collaborators the
//! planner needs: the transit directory (`places_nearby`) and the journey
//! service (`journeys`).
//!
//! Key characteristics of navitia:
//! - Coordinates are passed as "lon;lat" and returned as strings
//! - Section endpoints are a tagged union (`embedded_type`) of address or
//!   stop point
//! - "No solution" comes back as an error object, not an empty list

mod client;
mod convert;
mod error;
mod types;

pub use client::{NavitiaClient, NavitiaConfig};
pub use convert::{
    ConversionError, convert_endpoint, convert_journeys, convert_place_candidate,
    convert_places_nearby, convert_section,
};
pub use error::NavitiaError;
pub use types::{
    CoordDto, DisplayInformationsDto, EmbeddedPlaceDto, JourneyDto, JourneysResponse, PlaceDto,
    PlacesNearbyResponse, SectionDto,
};
