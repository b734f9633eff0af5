//! Command-line run settings read from the environment.

use std::path::PathBuf;

use crate::domain::{Coordinate, DomainError, StrideProfile};

pub const API_KEY_VAR: &str = "PRIM_API_KEY";
pub const HEIGHT_VAR: &str = "STEP_HEIGHT_CM";
pub const TARGET_VAR: &str = "STEP_TARGET";
pub const FROM_VAR: &str = "STEP_FROM";
pub const TO_VAR: &str = "STEP_TO";
pub const EMISSIONS_VAR: &str = "STEP_EMISSIONS";

/// Sample trip used when no endpoints are given.
const DEFAULT_FROM: (f64, f64) = (48.843890, 2.306979);
const DEFAULT_TO: (f64, f64) = (48.925073, 2.236467);

/// Error reading run settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// A required variable is not set
    #[error("{0} is not set")]
    Missing(&'static str),

    /// A variable could not be parsed
    #[error("{var}: cannot parse {value:?}: {reason}")]
    Parse {
        var: &'static str,
        value: String,
        reason: String,
    },

    /// Step targets count steps, so they cannot be negative
    #[error("STEP_TARGET must not be negative, got {0}")]
    NegativeTarget(i64),

    /// A value parsed but is out of range
    #[error("{var}: {source}")]
    Invalid {
        var: &'static str,
        #[source]
        source: DomainError,
    },
}

/// Everything one run needs.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: String,
    pub stride: StrideProfile,
    pub target_steps: u32,
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub emissions_path: Option<PathBuf>,
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read settings through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SettingsError> {
        let api_key = lookup(API_KEY_VAR)
            .filter(|key| !key.trim().is_empty())
            .ok_or(SettingsError::Missing(API_KEY_VAR))?;

        let height_cm: f64 = parse(HEIGHT_VAR, &required(&lookup, HEIGHT_VAR)?)?;
        let stride = StrideProfile::from_height_cm(height_cm).map_err(|source| {
            SettingsError::Invalid {
                var: HEIGHT_VAR,
                source,
            }
        })?;

        let target: i64 = parse(TARGET_VAR, &required(&lookup, TARGET_VAR)?)?;
        if target < 0 {
            return Err(SettingsError::NegativeTarget(target));
        }
        let target_steps = u32::try_from(target).map_err(|e| SettingsError::Parse {
            var: TARGET_VAR,
            value: target.to_string(),
            reason: e.to_string(),
        })?;

        let origin = match lookup(FROM_VAR) {
            Some(value) => parse_coordinate(FROM_VAR, &value)?,
            None => default_coordinate(FROM_VAR, DEFAULT_FROM)?,
        };
        let destination = match lookup(TO_VAR) {
            Some(value) => parse_coordinate(TO_VAR, &value)?,
            None => default_coordinate(TO_VAR, DEFAULT_TO)?,
        };

        Ok(Self {
            api_key,
            stride,
            target_steps,
            origin,
            destination,
            emissions_path: lookup(EMISSIONS_VAR).map(PathBuf::from),
        })
    }
}

fn required(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<String, SettingsError> {
    lookup(var).ok_or(SettingsError::Missing(var))
}

fn parse<T>(var: &'static str, value: &str) -> Result<T, SettingsError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| SettingsError::Parse {
        var,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Parse a "lat,lon" pair.
fn parse_coordinate(var: &'static str, value: &str) -> Result<Coordinate, SettingsError> {
    let Some((lat, lon)) = value.split_once(',') else {
        return Err(SettingsError::Parse {
            var,
            value: value.to_string(),
            reason: "expected \"lat,lon\"".into(),
        });
    };
    let lat: f64 = parse(var, lat)?;
    let lon: f64 = parse(var, lon)?;
    Coordinate::new(lat, lon).map_err(|source| SettingsError::Invalid { var, source })
}

fn default_coordinate(var: &'static str, (lat, lon): (f64, f64)) -> Result<Coordinate, SettingsError> {
    Coordinate::new(lat, lon).map_err(|source| SettingsError::Invalid { var, source })
}
