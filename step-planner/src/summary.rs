//! Itinerary summaries.
//!
//! Walks the sections of a chosen itinerary and totals walking, riding and
//! emissions. The summary renders as a plain-text report via `Display`.

use std::fmt;

use crate::domain::{EmissionTable, Itinerary, Section, StrideProfile};

/// One rendered line of a summary, in section order.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionLine {
    Ride {
        /// Physical mode as reported, e.g. "RER A".
        mode: String,
        line_code: String,
        from: String,
        to: String,
        duration_s: u64,
        distance_km: f64,
        /// Emissions for this ride in grams of CO2.
        co2_g: f64,
        /// An endpoint had no coordinate; the distance counted as zero.
        fallback: bool,
    },
    Walk {
        duration_s: u64,
        /// Steps for this walk alone.
        steps: u64,
        distance_m: f64,
        fallback: bool,
    },
    Wait {
        duration_s: u64,
    },
}

impl SectionLine {
    pub fn is_fallback(&self) -> bool {
        match self {
            SectionLine::Ride { fallback, .. } | SectionLine::Walk { fallback, .. } => *fallback,
            SectionLine::Wait { .. } => false,
        }
    }
}

/// Totals for one itinerary.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total_duration_s: u64,

    /// Steps for the total walking distance, floored once.
    pub total_steps: u64,

    pub total_walking_distance_m: f64,
    pub total_transit_distance_km: f64,
    pub co2_transit_g: f64,
    pub co2_car_equivalent_g: f64,
    pub co2_saved_g: f64,
    pub lines: Vec<SectionLine>,

    /// Indices into the itinerary's sections whose distance fell back to
    /// zero.
    pub fallback_sections: Vec<usize>,
}

/// Build the summary of an itinerary.
///
/// Sections other than rides, walks and waits only count towards the
/// total duration, which is taken from the itinerary itself.
pub fn summarize(itinerary: &Itinerary, stride: &StrideProfile, emissions: &EmissionTable) -> Summary {
    let mut total_walking_distance_m = 0.0;
    let mut total_transit_distance_km = 0.0;
    let mut co2_transit_g = 0.0;
    let mut lines = Vec::with_capacity(itinerary.sections.len());
    let mut fallback_sections = Vec::new();

    for (index, section) in itinerary.sections.iter().enumerate() {
        match section {
            Section::PublicTransport {
                span,
                physical_mode,
                line_code,
                duration_s,
            } => {
                let (distance_m, fallback) = span.distance_with_fallback();
                let distance_km = distance_m / 1000.0;
                let co2_g = distance_km * emissions.factor(physical_mode);

                total_transit_distance_km += distance_km;
                co2_transit_g += co2_g;
                if fallback {
                    fallback_sections.push(index);
                }

                lines.push(SectionLine::Ride {
                    mode: physical_mode.clone(),
                    line_code: line_code.clone(),
                    from: span.from_name().to_string(),
                    to: span.to_name().to_string(),
                    duration_s: *duration_s,
                    distance_km,
                    co2_g,
                    fallback,
                });
            }
            Section::Walking { span, duration_s } => {
                let (distance_m, fallback) = span.distance_with_fallback();

                total_walking_distance_m += distance_m;
                if fallback {
                    fallback_sections.push(index);
                }

                lines.push(SectionLine::Walk {
                    duration_s: *duration_s,
                    steps: stride.steps_for_distance(distance_m),
                    distance_m,
                    fallback,
                });
            }
            Section::Waiting { duration_s } => {
                lines.push(SectionLine::Wait {
                    duration_s: *duration_s,
                });
            }
            Section::Other { .. } => {}
        }
    }

    let co2_car_equivalent_g = total_transit_distance_km * emissions.car_factor();

    Summary {
        total_duration_s: itinerary.duration_s,
        total_steps: stride.steps_for_distance(total_walking_distance_m),
        total_walking_distance_m,
        total_transit_distance_km,
        co2_transit_g,
        co2_car_equivalent_g,
        co2_saved_g: co2_car_equivalent_g - co2_transit_g,
        lines,
        fallback_sections,
    }
}

const RULE: &str = "------------------------------";

/// Marker appended to lines whose distance is a fallback.
const FALLBACK_MARK: &str = " [distance unknown]";

fn minutes(duration_s: u64) -> u64 {
    duration_s / 60
}

impl fmt::Display for SectionLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SectionLine::Ride {
                mode,
                line_code,
                from,
                to,
                duration_s,
                distance_km,
                ..
            } => write!(
                f,
                "- Take {mode} {line_code} from {from} to {to} ({} min, {distance_km:.1} km)",
                minutes(*duration_s)
            )?,
            SectionLine::Walk {
                duration_s,
                steps,
                distance_m,
                ..
            } => write!(
                f,
                "- Walk for {} minutes ({steps} steps, {:.1} km)",
                minutes(*duration_s),
                distance_m / 1000.0
            )?,
            SectionLine::Wait { duration_s } => {
                write!(f, "- Wait for {} minutes", minutes(*duration_s))?
            }
        }
        if self.is_fallback() {
            f.write_str(FALLBACK_MARK)?;
        }
        Ok(())
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Optimal Itinerary:")?;
        writeln!(f, "{RULE}")?;
        writeln!(f, "Duration: {} minutes", minutes(self.total_duration_s))?;
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }

        writeln!(f)?;
        writeln!(f, "Summary:")?;
        writeln!(f, "{RULE}")?;
        writeln!(f, "Total steps: {}", self.total_steps)?;
        writeln!(
            f,
            "Total walking distance: {:.1} km",
            self.total_walking_distance_m / 1000.0
        )?;
        writeln!(
            f,
            "Total journey distance: {:.1} km",
            self.total_transit_distance_km
        )?;
        writeln!(f, "CO2 emissions (public transport): {:.1}g", self.co2_transit_g)?;
        writeln!(f, "CO2 emissions (if by car): {:.1}g", self.co2_car_equivalent_g)?;
        write!(f, "CO2 saved: {:.1}g", self.co2_saved_g)?;

        if !self.fallback_sections.is_empty() {
            let indices: Vec<String> = self
                .fallback_sections
                .iter()
                .map(|i| (i + 1).to_string())
                .collect();
            writeln!(f)?;
            write!(
                f,
                "Sections with unknown distance: {}",
                indices.join(", ")
            )?;
        }
        Ok(())
    }
}
