//! Itinerary model: sections, endpoints and candidate stations.
//!
//! Itineraries are produced by the journey service and treated as
//! immutable once received. Walking and riding distances are never stored;
//! they are derived from endpoint coordinates on demand.

use tracing::warn;

use super::geo::{Coordinate, haversine_distance};

/// A named place with a resolved coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub name: String,
    pub coord: Coordinate,
}

impl Place {
    pub fn new(name: impl Into<String>, coord: Coordinate) -> Self {
        Self {
            name: name.into(),
            coord,
        }
    }
}

/// One end of a section: either a street address or a transit stop point.
///
/// Both variants carry exactly one coordinate, so resolution never has to
/// guess which shape it is looking at.
#[derive(Debug, Clone, PartialEq)]
pub enum Endpoint {
    Address(Place),
    StopPoint(Place),
}

impl Endpoint {
    /// The coordinate of this endpoint.
    pub fn coordinate(&self) -> Coordinate {
        match self {
            Endpoint::Address(place) | Endpoint::StopPoint(place) => place.coord,
        }
    }

    /// Display name of this endpoint.
    pub fn name(&self) -> &str {
        match self {
            Endpoint::Address(place) | Endpoint::StopPoint(place) => &place.name,
        }
    }
}

/// Start and end of a moving section.
///
/// An end is `None` when the upstream payload carried neither an address
/// nor a stop-point coordinate for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub from: Option<Endpoint>,
    pub to: Option<Endpoint>,
}

impl Span {
    pub fn new(from: Endpoint, to: Endpoint) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    /// Great-circle length of the span in metres.
    ///
    /// Returns `None` when either end is unresolved.
    pub fn distance_m(&self) -> Option<f64> {
        match (&self.from, &self.to) {
            (Some(from), Some(to)) => Some(haversine_distance(from.coordinate(), to.coordinate())),
            _ => None,
        }
    }

    /// Length in metres, and whether it fell back to zero because an end
    /// is unresolved. The fallback is logged.
    pub fn distance_with_fallback(&self) -> (f64, bool) {
        match self.distance_m() {
            Some(d) => (d, false),
            None => {
                warn!(
                    from = self.from_name(),
                    to = self.to_name(),
                    "Section endpoint has no coordinate, counting zero distance"
                );
                (0.0, true)
            }
        }
    }

    pub fn from_name(&self) -> &str {
        self.from.as_ref().map(Endpoint::name).unwrap_or("?")
    }

    pub fn to_name(&self) -> &str {
        self.to.as_ref().map(Endpoint::name).unwrap_or("?")
    }
}

/// One step of an itinerary.
#[derive(Debug, Clone, PartialEq)]
pub enum Section {
    /// A ride on a transit vehicle.
    PublicTransport {
        span: Span,
        /// Physical mode as reported upstream, e.g. "RER" or "Bus".
        physical_mode: String,
        /// Line code, e.g. "A" or "91".
        line_code: String,
        duration_s: u64,
    },

    /// A walk on the street network.
    Walking { span: Span, duration_s: u64 },

    /// Waiting at a stop.
    Waiting { duration_s: u64 },

    /// Any other section (transfers, bike, crow-fly, ...). Only its duration
    /// is kept.
    Other { kind: String, duration_s: u64 },
}

impl Section {
    pub fn duration_s(&self) -> u64 {
        match self {
            Section::PublicTransport { duration_s, .. }
            | Section::Walking { duration_s, .. }
            | Section::Waiting { duration_s }
            | Section::Other { duration_s, .. } => *duration_s,
        }
    }

    /// Walking distance contributed by this section, in metres.
    ///
    /// Zero for anything that isn't a walk.
    pub fn walking_distance_m(&self) -> f64 {
        match self {
            Section::Walking { span, .. } => span.distance_with_fallback().0,
            _ => 0.0,
        }
    }
}

/// A public-transport leg of an itinerary.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitLeg<'a> {
    pub from: Option<&'a Endpoint>,
    pub to: Option<&'a Endpoint>,
    /// First whitespace-delimited token of the physical mode.
    pub mode: &'a str,
    pub line_code: &'a str,
}

/// An ordered sequence of sections with a total duration.
#[derive(Debug, Clone, PartialEq)]
pub struct Itinerary {
    pub sections: Vec<Section>,
    pub duration_s: u64,
}

impl Itinerary {
    pub fn new(sections: Vec<Section>, duration_s: u64) -> Self {
        Self {
            sections,
            duration_s,
        }
    }

    /// Total walking distance over all walking sections, in metres.
    pub fn walking_distance_m(&self) -> f64 {
        self.sections.iter().map(Section::walking_distance_m).sum()
    }

    /// The public-transport legs in travel order.
    pub fn transit_legs(&self) -> Vec<TransitLeg<'_>> {
        self.sections
            .iter()
            .filter_map(|section| match section {
                Section::PublicTransport {
                    span,
                    physical_mode,
                    line_code,
                    ..
                } => Some(TransitLeg {
                    from: span.from.as_ref(),
                    to: span.to.as_ref(),
                    mode: mode_token(physical_mode),
                    line_code,
                }),
                _ => None,
            })
            .collect()
    }
}

/// First whitespace-delimited token of a physical mode name ("RER A" → "RER").
pub fn mode_token(physical_mode: &str) -> &str {
    physical_mode.split_whitespace().next().unwrap_or("")
}

/// A stop point returned by the transit directory.
#[derive(Debug, Clone, PartialEq)]
pub struct StationCandidate {
    pub id: String,
    pub name: String,
    pub coord: Coordinate,
    /// Raw directory payload for this place.
    pub raw: serde_json::Value,
}

impl StationCandidate {
    pub fn new(id: impl Into<String>, name: impl Into<String>, coord: Coordinate) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            coord,
            raw: serde_json::Value::Null,
        }
    }
}
