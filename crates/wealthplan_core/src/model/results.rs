//! Outputs of the projection and alignment engines

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::events::UnknownVariant;

/// Year-end value of a projection
///
/// `flow` carries the net cash flow applied in that year and is only present
/// on the yearly path with events.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub year: i16,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow: Option<f64>,
}

impl SeriesPoint {
    pub fn new(year: i16, value: f64) -> Self {
        Self {
            year,
            value,
            flow: None,
        }
    }

    pub fn with_flow(year: i16, value: f64, flow: f64) -> Self {
        Self {
            year,
            value,
            flow: Some(flow),
        }
    }
}

/// Value of the last point, if any
pub fn last_value(series: &[SeriesPoint]) -> Option<f64> {
    series.last().map(|p| p.value)
}

/// How far the current allocation has drifted from the plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlignmentCategory {
    /// Overlap above 90%
    OnTrack,
    /// Overlap in [70%, 90%]
    MildDrift,
    /// Overlap in [50%, 70%)
    ModerateDrift,
    /// Overlap below 50%
    OffTrack,
}

impl AlignmentCategory {
    pub fn from_overlap(overlap: f64) -> Self {
        if overlap > 0.90 {
            AlignmentCategory::OnTrack
        } else if overlap >= 0.70 {
            AlignmentCategory::MildDrift
        } else if overlap >= 0.50 {
            AlignmentCategory::ModerateDrift
        } else {
            AlignmentCategory::OffTrack
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AlignmentCategory::OnTrack => "ON_TRACK",
            AlignmentCategory::MildDrift => "MILD_DRIFT",
            AlignmentCategory::ModerateDrift => "MODERATE_DRIFT",
            AlignmentCategory::OffTrack => "OFF_TRACK",
        }
    }
}

impl FromStr for AlignmentCategory {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ON_TRACK" => Ok(AlignmentCategory::OnTrack),
            "MILD_DRIFT" => Ok(AlignmentCategory::MildDrift),
            "MODERATE_DRIFT" => Ok(AlignmentCategory::ModerateDrift),
            "OFF_TRACK" => Ok(AlignmentCategory::OffTrack),
            other => Err(UnknownVariant {
                kind: "alignment category",
                value: other.to_string(),
            }),
        }
    }
}

/// Outcome of comparing current and plan allocations
///
/// All three fields are `None` together when there is no usable baseline.
/// `aligned_value` is derived on every evaluation and never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AlignmentResult {
    pub percent: Option<f64>,
    pub category: Option<AlignmentCategory>,
    pub aligned_value: Option<f64>,
}

impl AlignmentResult {
    /// The null triple
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn is_available(&self) -> bool {
        self.percent.is_some()
    }
}
