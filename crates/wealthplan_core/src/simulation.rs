//! Month-by-month wealth simulation
//!
//! The balance compounds at the monthly equivalent of the annual rate and
//! absorbs the net flow of whichever events fire that month. Every
//! arithmetic step is rounded to cents, so two runs over the same inputs
//! produce bit-identical series.

use serde::{Deserialize, Serialize};

use crate::date_math::{MonthIndex, index_to_year_month, month_index_of};
use crate::error::SimulationError;
use crate::model::{CashFlowEvent, SeriesPoint};
use crate::money::{monthly_rate_from_annual, round2};
use crate::occurrence::EventSchedule;

/// Whether a month's cash flow lands before or after that month's growth
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowTiming {
    /// Flow is added first and participates in the month's growth
    Start,
    /// Growth is applied first, then the flow is added
    #[default]
    End,
}

/// Year bounds of the civil calendar
pub const MIN_YEAR: i16 = -9999;
pub const MAX_YEAR: i16 = 9999;

fn default_start_month() -> i8 {
    1
}

/// Inputs of a monthly wealth-curve run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WealthCurveConfig {
    pub initial_value: f64,
    pub annual_rate: f64,
    pub start_year: i16,
    #[serde(default = "default_start_month")]
    pub start_month: i8,
    pub horizon_year: i16,
    #[serde(default)]
    pub flow_timing: FlowTiming,
    /// Floor the balance at zero (no borrowing)
    #[serde(default)]
    pub clamp_zero: bool,
}

impl WealthCurveConfig {
    pub fn new(initial_value: f64, annual_rate: f64, start_year: i16, horizon_year: i16) -> Self {
        Self {
            initial_value,
            annual_rate,
            start_year,
            start_month: 1,
            horizon_year,
            flow_timing: FlowTiming::End,
            clamp_zero: false,
        }
    }

    pub fn starting_in(mut self, month: i8) -> Self {
        self.start_month = month;
        self
    }

    pub fn timing(mut self, flow_timing: FlowTiming) -> Self {
        self.flow_timing = flow_timing;
        self
    }

    pub fn clamped(mut self) -> Self {
        self.clamp_zero = true;
        self
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        check_years(self.start_year, self.horizon_year)?;
        if !(1..=12).contains(&self.start_month) {
            return Err(SimulationError::InvalidStartMonth(self.start_month));
        }
        validate_rate(self.annual_rate)
    }
}

/// Both years must be civil years and in order
pub(crate) fn check_years(start_year: i16, horizon_year: i16) -> Result<(), SimulationError> {
    for year in [start_year, horizon_year] {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(SimulationError::YearOutOfRange(year));
        }
    }
    if horizon_year < start_year {
        return Err(SimulationError::InvalidHorizon {
            start_year,
            horizon_year,
        });
    }
    Ok(())
}

pub(crate) fn validate_rate(annual_rate: f64) -> Result<(), SimulationError> {
    if annual_rate.is_finite() && annual_rate > -1.0 {
        Ok(())
    } else {
        Err(SimulationError::InvalidRate(annual_rate))
    }
}

/// Resumable monthly compounding state
///
/// The next month to process is `month`. Callers that need balances at
/// several increasing horizons can keep stepping the same instance instead of
/// restarting from the baseline.
#[derive(Debug, Clone)]
pub struct MonthlySimulation {
    value: f64,
    monthly_rate: f64,
    month: MonthIndex,
    schedule: EventSchedule,
    timing: FlowTiming,
    clamp_zero: bool,
}

impl MonthlySimulation {
    pub fn new(
        initial_value: f64,
        annual_rate: f64,
        start: MonthIndex,
        events: &[CashFlowEvent],
        timing: FlowTiming,
        clamp_zero: bool,
    ) -> Self {
        Self {
            value: round2(initial_value),
            monthly_rate: monthly_rate_from_annual(annual_rate),
            month: start,
            schedule: EventSchedule::new(events),
            timing,
            clamp_zero,
        }
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Next month that [`step`](Self::step) will process
    #[inline]
    pub fn next_month(&self) -> MonthIndex {
        self.month
    }

    /// Process one month and return its index together with the closing balance
    pub fn step(&mut self) -> (MonthIndex, f64) {
        let month = self.month;
        let flow = self.schedule.net_flow(month);

        match self.timing {
            FlowTiming::Start => {
                self.value = round2(self.value + flow);
                self.clamp();
                self.value = round2(self.value * (1.0 + self.monthly_rate));
            }
            FlowTiming::End => {
                self.value = round2(self.value * (1.0 + self.monthly_rate));
                self.value = round2(self.value + flow);
                self.clamp();
            }
        }

        self.month += 1;
        (month, self.value)
    }

    /// Step through `last` inclusive and return the balance at its close
    pub fn run_through(&mut self, last: MonthIndex) -> f64 {
        while self.month <= last {
            self.step();
        }
        self.value
    }

    #[inline]
    fn clamp(&mut self) {
        if self.clamp_zero && self.value < 0.0 {
            self.value = 0.0;
        }
    }
}

/// Simulate month by month and report the balance at the end of every December
///
/// The run covers the start month through December of the horizon year.
pub fn simulate_wealth_curve(
    config: &WealthCurveConfig,
    events: &[CashFlowEvent],
) -> Result<Vec<SeriesPoint>, SimulationError> {
    config.validate()?;

    let first = month_index_of(config.start_year, config.start_month);
    let last = month_index_of(config.horizon_year, 12);

    let mut sim = MonthlySimulation::new(
        config.initial_value,
        config.annual_rate,
        first,
        events,
        config.flow_timing,
        config.clamp_zero,
    );

    let years = usize::try_from(i32::from(config.horizon_year) - i32::from(config.start_year))
        .unwrap_or(0)
        + 1;
    let mut series = Vec::with_capacity(years);
    while sim.next_month() <= last {
        let (month, value) = sim.step();
        let (year, calendar_month) = index_to_year_month(month);
        if calendar_month == 12 {
            series.push(SeriesPoint::new(year, value));
        }
    }

    Ok(series)
}
