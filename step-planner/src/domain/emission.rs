//! CO2 emission factors per physical mode.
//!
//! The table is immutable once built and is injected into the summary
//! step, so tests can swap factors without touching globals. Unknown modes
//! emit nothing rather than failing.

use std::collections::HashMap;
use std::path::Path;

use super::itinerary::mode_token;

/// Mode key used for the car-equivalent comparison.
pub const CAR_MODE: &str = "Car";

/// Default factors in grams of CO2 per passenger-kilometre.
const DEFAULT_FACTORS: [(&str, f64); 6] = [
    ("RER", 3.8),
    ("Metro", 3.2),
    ("Bus", 95.3),
    ("Tramway", 3.3),
    ("Train", 3.8),
    (CAR_MODE, 206.0),
];

/// Errors loading an emission table.
#[derive(Debug, thiserror::Error)]
pub enum EmissionTableError {
    /// Reading the table file failed
    #[error("failed to read emission table: {0}")]
    Io(#[from] std::io::Error),

    /// The table file is not a JSON object of numbers
    #[error("emission table JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// A factor is negative or not finite
    #[error("invalid emission factor for {mode}: {value}")]
    InvalidFactor { mode: String, value: f64 },
}

/// Mapping from physical-mode name to grams of CO2 per passenger-km.
#[derive(Debug, Clone, PartialEq)]
pub struct EmissionTable {
    factors: HashMap<String, f64>,
}

impl EmissionTable {
    /// Build a table from explicit factors.
    pub fn from_factors(
        factors: impl IntoIterator<Item = (String, f64)>,
    ) -> Result<Self, EmissionTableError> {
        let factors: HashMap<String, f64> = factors.into_iter().collect();
        for (mode, value) in &factors {
            check_factor(mode, *value)?;
        }
        Ok(Self { factors })
    }

    /// Parse a JSON object such as `{"Bus": 95.3, "Car": 206.0}`.
    pub fn from_json_str(json: &str) -> Result<Self, EmissionTableError> {
        let factors: HashMap<String, f64> = serde_json::from_str(json)?;
        Self::from_factors(factors)
    }

    /// Load a JSON table from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EmissionTableError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Return a copy of this table with one factor replaced or added.
    pub fn with_factor(
        mut self,
        mode: impl Into<String>,
        grams_per_km: f64,
    ) -> Result<Self, EmissionTableError> {
        let mode = mode.into();
        check_factor(&mode, grams_per_km)?;
        self.factors.insert(mode, grams_per_km);
        Ok(self)
    }

    /// Factor for a physical mode, looked up by its first word.
    ///
    /// "RER A" resolves to the "RER" entry. Unknown modes give 0.
    pub fn factor(&self, physical_mode: &str) -> f64 {
        self.factors
            .get(mode_token(physical_mode))
            .copied()
            .unwrap_or(0.0)
    }

    /// Factor used for the driving comparison.
    pub fn car_factor(&self) -> f64 {
        self.factor(CAR_MODE)
    }

    pub fn len(&self) -> usize {
        self.factors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }
}

/// Factors must be finite and non-negative.
fn check_factor(mode: &str, value: f64) -> Result<(), EmissionTableError> {
    if !value.is_finite() || value < 0.0 {
        return Err(EmissionTableError::InvalidFactor {
            mode: mode.to_string(),
            value,
        });
    }
    Ok(())
}

impl Default for EmissionTable {
    fn default() -> Self {
        Self {
            factors: DEFAULT_FACTORS
                .iter()
                .map(|(mode, value)| ((*mode).to_string(), *value))
                .collect(),
        }
    }
}
