//! Scheduled cash-flow events
//!
//! An event moves money into or out of the subject's portfolio on a
//! schedule. The engine only ever reads events; creating and editing them is
//! the storage layer's job.

use std::fmt;
use std::str::FromStr;

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::date_math::{MonthIndex, month_index};

/// What an event does to the portfolio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    Deposit,
    Withdrawal,
    Contribution,
    Expense,
}

impl EventKind {
    /// `+1` for money coming in, `-1` for money going out
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            EventKind::Deposit | EventKind::Contribution => 1.0,
            EventKind::Withdrawal | EventKind::Expense => -1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Deposit => "DEPOSIT",
            EventKind::Withdrawal => "WITHDRAWAL",
            EventKind::Contribution => "CONTRIBUTION",
            EventKind::Expense => "EXPENSE",
        }
    }
}

/// How often an event repeats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Frequency {
    OneTime,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::OneTime => "ONE_TIME",
            Frequency::Monthly => "MONTHLY",
            Frequency::Yearly => "YEARLY",
        }
    }
}

/// Error returned when parsing a stored enum label fails
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} '{}'", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

impl FromStr for EventKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DEPOSIT" => Ok(EventKind::Deposit),
            "WITHDRAWAL" => Ok(EventKind::Withdrawal),
            "CONTRIBUTION" => Ok(EventKind::Contribution),
            "EXPENSE" => Ok(EventKind::Expense),
            other => Err(UnknownVariant {
                kind: "event kind",
                value: other.to_string(),
            }),
        }
    }
}

impl FromStr for Frequency {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ONE_TIME" => Ok(Frequency::OneTime),
            "MONTHLY" => Ok(Frequency::Monthly),
            "YEARLY" => Ok(Frequency::Yearly),
            other => Err(UnknownVariant {
                kind: "frequency",
                value: other.to_string(),
            }),
        }
    }
}

/// A scheduled movement of money
///
/// `amount` is always positive; the direction comes from `kind`.
/// `execution_day` is kept for the record but has no effect at month
/// resolution. `execution_month` only matters for yearly events and falls
/// back to the start month when unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowEvent {
    pub kind: EventKind,
    pub frequency: Frequency,
    pub amount: f64,
    pub start: Date,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<Date>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_day: Option<i8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_month: Option<i8>,
}

impl CashFlowEvent {
    pub fn new(kind: EventKind, frequency: Frequency, amount: f64, start: Date) -> Self {
        Self {
            kind,
            frequency,
            amount,
            start,
            end: None,
            execution_day: None,
            execution_month: None,
        }
    }

    /// Set the last date on which the event is active
    pub fn until(mut self, end: Date) -> Self {
        self.end = Some(end);
        self
    }

    /// Set the calendar month in which a yearly event fires
    pub fn in_month(mut self, month: i8) -> Self {
        self.execution_month = Some(month);
        self
    }

    #[inline]
    pub fn signed_amount(&self) -> f64 {
        self.kind.sign() * self.amount
    }

    /// Month the event becomes active
    #[inline]
    pub fn start_index(&self) -> MonthIndex {
        month_index(self.start)
    }

    /// Last active month, `None` for open-ended events
    #[inline]
    pub fn end_index(&self) -> Option<MonthIndex> {
        self.end.map(month_index)
    }

    /// Calendar month in which a yearly event fires
    #[inline]
    pub fn effective_execution_month(&self) -> i8 {
        self.execution_month.unwrap_or(self.start.month())
    }
}
