//! Per-year net cash flow, without month-by-month simulation

use crate::date_math::month_index_of;
use crate::model::{CashFlowEvent, Frequency};

/// Net signed flow for each calendar year of a closed range
#[derive(Debug, Clone, PartialEq)]
pub struct YearlyFlows {
    start_year: i16,
    totals: Vec<f64>,
}

impl YearlyFlows {
    fn zeroed(start_year: i16, horizon_year: i16) -> Self {
        let len = usize::try_from(i32::from(horizon_year) - i32::from(start_year) + 1).unwrap_or(0);
        Self {
            start_year,
            totals: vec![0.0; len],
        }
    }

    /// Flow for `year`, 0 outside the aggregated range
    pub fn get(&self, year: i16) -> f64 {
        usize::try_from(i32::from(year) - i32::from(self.start_year))
            .ok()
            .and_then(|i| self.totals.get(i).copied())
            .unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (i16, f64)> + '_ {
        (self.start_year..).zip(self.totals.iter().copied())
    }

    fn add(&mut self, year: i16, amount: f64) {
        let slot = usize::try_from(i32::from(year) - i32::from(self.start_year))
            .ok()
            .and_then(|i| self.totals.get_mut(i));
        if let Some(total) = slot {
            *total += amount;
        }
    }
}

/// Calendar months of `year` that overlap the event's active window
///
/// Partial months count as whole months.
fn active_months_in_year(event: &CashFlowEvent, year: i16) -> i32 {
    let first = month_index_of(year, 1).max(event.start_index());
    let last = match event.end_index() {
        Some(end) => month_index_of(year, 12).min(end),
        None => month_index_of(year, 12),
    };
    (last - first + 1).max(0)
}

/// Aggregate events into one net flow per year in `[start_year, horizon_year]`
///
/// One-time events count in their start year. Yearly events count once in
/// every year between their start and end years regardless of execution
/// month. Monthly events count once per overlapping calendar month.
pub fn aggregate_yearly_flows(
    events: &[CashFlowEvent],
    start_year: i16,
    horizon_year: i16,
) -> YearlyFlows {
    let mut flows = YearlyFlows::zeroed(start_year, horizon_year);

    for event in events {
        let signed = event.signed_amount();
        match event.frequency {
            Frequency::OneTime => flows.add(event.start.year(), signed),
            Frequency::Yearly => {
                let first = event.start.year().max(start_year);
                let last = event.end.map_or(horizon_year, |e| e.year().min(horizon_year));
                for year in first..=last {
                    flows.add(year, signed);
                }
            }
            Frequency::Monthly => {
                for year in start_year..=horizon_year {
                    let months = active_months_in_year(event, year);
                    if months > 0 {
                        flows.add(year, signed * f64::from(months));
                    }
                }
            }
        }
    }

    flows
}

