//! Event occurrence at month resolution
//!
//! [`occurs`] is the reference predicate. [`EventSchedule`] precomputes the
//! month indices of a batch of events once so the simulator's inner loop is
//! a handful of integer comparisons per event.

use crate::date_math::{MonthIndex, index_to_year_month};
use crate::model::{CashFlowEvent, Frequency};
use crate::money::round2;

/// Whether `event` fires in the calendar month `month`
pub fn occurs(event: &CashFlowEvent, month: MonthIndex) -> bool {
    ScheduledEvent::from_event(event).fires_in(month)
}

#[derive(Debug, Clone, Copy)]
struct ScheduledEvent {
    start: MonthIndex,
    end: MonthIndex,
    frequency: Frequency,
    execution_month: i8,
    signed_amount: f64,
}

impl ScheduledEvent {
    fn from_event(event: &CashFlowEvent) -> Self {
        Self {
            start: event.start_index(),
            end: event.end_index().unwrap_or(MonthIndex::MAX),
            frequency: event.frequency,
            execution_month: event.effective_execution_month(),
            signed_amount: event.signed_amount(),
        }
    }

    #[inline]
    fn fires_in(&self, month: MonthIndex) -> bool {
        if month < self.start || month > self.end {
            return false;
        }
        match self.frequency {
            Frequency::OneTime => month == self.start,
            Frequency::Monthly => true,
            Frequency::Yearly => index_to_year_month(month).1 == self.execution_month,
        }
    }
}

/// Precompiled view over a set of events
#[derive(Debug, Clone, Default)]
pub struct EventSchedule {
    events: Vec<ScheduledEvent>,
}

impl EventSchedule {
    pub fn new(events: &[CashFlowEvent]) -> Self {
        Self {
            events: events.iter().map(ScheduledEvent::from_event).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Sum of signed amounts of every event firing in `month`, rounded to cents
    pub fn net_flow(&self, month: MonthIndex) -> f64 {
        let total: f64 = self
            .events
            .iter()
            .filter(|e| e.fires_in(month))
            .map(|e| e.signed_amount)
            .sum();
        round2(total)
    }
}
