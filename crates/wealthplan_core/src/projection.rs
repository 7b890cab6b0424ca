//! Annual projections
//!
//! Two resolutions are offered. The monthly path runs the full
//! [`simulate_wealth_curve`] and honours intra-year event timing. The yearly
//! path compounds once per year and adds each year's aggregated net flow at
//! year end; it is an approximation of the monthly path that ignores when in
//! the year money arrives, traded for a loop that is twelve times shorter and
//! independent of event count.

use serde::{Deserialize, Serialize};

use crate::error::SimulationError;
use crate::flows::{YearlyFlows, aggregate_yearly_flows};
use crate::model::{CashFlowEvent, SeriesPoint};
use crate::money::round2;
use crate::simulation::{
    FlowTiming, WealthCurveConfig, check_years, simulate_wealth_curve, validate_rate,
};

/// Time resolution of a projection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionMode {
    #[default]
    Monthly,
    Yearly,
}

impl ProjectionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectionMode::Monthly => "monthly",
            ProjectionMode::Yearly => "yearly",
        }
    }
}

/// Pure compounding with no flows
///
/// The start year carries the seed value; each later year is the previous
/// value grown by `annual_rate` and rounded to cents.
pub fn project_compound(
    initial_value: f64,
    annual_rate: f64,
    start_year: i16,
    horizon_year: i16,
) -> Result<Vec<SeriesPoint>, SimulationError> {
    check_years(start_year, horizon_year)?;
    validate_rate(annual_rate)?;

    let mut value = round2(initial_value);
    let mut series = vec![SeriesPoint::new(start_year, value)];
    for year in start_year.saturating_add(1)..=horizon_year {
        value = round2(value * (1.0 + annual_rate));
        series.push(SeriesPoint::new(year, value));
    }
    Ok(series)
}

/// Yearly compounding with each year's net flow added after growth
pub fn project_with_flows(
    initial_value: f64,
    annual_rate: f64,
    start_year: i16,
    horizon_year: i16,
    flows: &YearlyFlows,
) -> Result<Vec<SeriesPoint>, SimulationError> {
    check_years(start_year, horizon_year)?;
    validate_rate(annual_rate)?;

    let mut value = initial_value;
    let span = i32::from(horizon_year) - i32::from(start_year);
    let mut series = Vec::with_capacity(usize::try_from(span).unwrap_or(0) + 1);
    for year in start_year..=horizon_year {
        value = round2(value * (1.0 + annual_rate));
        let flow = round2(flows.get(year));
        value = round2(value + flow);
        series.push(SeriesPoint::with_flow(year, value, flow));
    }
    Ok(series)
}

/// Everything needed to pick and run one of the projection paths
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionRequest {
    pub initial_value: f64,
    pub annual_rate: f64,
    pub start_year: i16,
    /// First simulated month on the monthly path; ignored on the yearly path
    pub start_month: i8,
    pub horizon_year: i16,
    pub mode: ProjectionMode,
    pub include_events: bool,
}

/// Run the projection selected by `request.mode` and `request.include_events`
///
/// | mode    | events | path                                   |
/// |---------|--------|----------------------------------------|
/// | monthly | yes    | monthly simulator with `events`        |
/// | monthly | no     | monthly simulator with no events       |
/// | yearly  | yes    | [`project_with_flows`] over aggregates |
/// | yearly  | no     | [`project_compound`]                   |
pub fn project(
    request: &ProjectionRequest,
    events: &[CashFlowEvent],
) -> Result<Vec<SeriesPoint>, SimulationError> {
    match (request.mode, request.include_events) {
        (ProjectionMode::Monthly, include) => {
            let config = WealthCurveConfig::new(
                request.initial_value,
                request.annual_rate,
                request.start_year,
                request.horizon_year,
            )
            .starting_in(request.start_month)
            .timing(FlowTiming::End);
            let events = if include { events } else { &[] };
            simulate_wealth_curve(&config, events)
        }
        (ProjectionMode::Yearly, true) => {
            check_years(request.start_year, request.horizon_year)?;
            let flows = aggregate_yearly_flows(events, request.start_year, request.horizon_year);
            project_with_flows(
                request.initial_value,
                request.annual_rate,
                request.start_year,
                request.horizon_year,
                &flows,
            )
        }
        (ProjectionMode::Yearly, false) => project_compound(
            request.initial_value,
            request.annual_rate,
            request.start_year,
            request.horizon_year,
        ),
    }
}
