//! Candidate station selection.
//!
//! Candidates are ranked by distance to their trip endpoint, then either
//! the closest or the farthest few are kept. Large step targets take the
//! farthest ones: boarding farther away forces longer walks to and from
//! transit. This is a heuristic and carries no optimality guarantee.

use std::fmt;

use crate::domain::{Coordinate, StationCandidate};

/// Which end of the ranked candidate list to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    Closest,
    Farthest,
}

impl SelectionMode {
    /// Pick the mode for a step target.
    ///
    /// Targets strictly above `threshold` select the farthest candidates;
    /// a target equal to the threshold still selects the closest.
    pub fn for_target(target_steps: u32, threshold: u32) -> Self {
        if target_steps > threshold {
            SelectionMode::Farthest
        } else {
            SelectionMode::Closest
        }
    }
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionMode::Closest => f.write_str("closest"),
            SelectionMode::Farthest => f.write_str("farthest"),
        }
    }
}

/// Sort candidates by great-circle distance to `anchor`, nearest first.
///
/// The sort is stable: equidistant candidates keep directory order.
pub fn sort_by_distance(candidates: &mut [StationCandidate], anchor: Coordinate) {
    candidates.sort_by(|a, b| {
        a.coord
            .distance_to(&anchor)
            .total_cmp(&b.coord.distance_to(&anchor))
    });
}

/// Keep at most `max` candidates from a list sorted nearest first.
///
/// `Closest` keeps the head of the list, `Farthest` keeps the tail. The
/// returned slice stays in ascending distance order.
pub fn select_candidates(
    sorted: &[StationCandidate],
    mode: SelectionMode,
    max: usize,
) -> &[StationCandidate] {
    match mode {
        SelectionMode::Closest => &sorted[..max.min(sorted.len())],
        SelectionMode::Farthest => &sorted[sorted.len().saturating_sub(max)..],
    }
}
