use std::fmt;

use crate::model::ClientId;

/// Errors raised when a simulation or projection is asked for a degenerate run
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    InvalidHorizon { start_year: i16, horizon_year: i16 },
    /// Year outside the civil calendar range
    YearOutOfRange(i16),
    InvalidStartMonth(i8),
    /// Annual rate at or below -100%, or not a finite number
    InvalidRate(f64),
    InvalidRoundStep(u32),
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::InvalidHorizon {
                start_year,
                horizon_year,
            } => write!(
                f,
                "horizon year {horizon_year} must be >= start year {start_year}"
            ),
            SimulationError::YearOutOfRange(year) => {
                write!(f, "year {year} must be in -9999..=9999")
            }
            SimulationError::InvalidStartMonth(month) => {
                write!(f, "start month {month} must be in 1..=12")
            }
            SimulationError::InvalidRate(rate) => {
                write!(f, "annual rate {rate} must be a finite number above -1")
            }
            SimulationError::InvalidRoundStep(step) => {
                write!(f, "round step {step} must be a positive integer")
            }
        }
    }
}

impl std::error::Error for SimulationError {}

/// Failures reported by the storage collaborator
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// Backend could not be reached or refused the operation
    Unavailable(String),
    /// Stored data could not be decoded into engine types
    Corrupt(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Unavailable(msg) => write!(f, "store unavailable: {msg}"),
            StoreError::Corrupt(msg) => write!(f, "corrupt stored data: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

#[derive(Debug, Clone, PartialEq)]
pub enum AdvisoryError {
    /// The subject has no Current allocation snapshot to start from
    NoBaseline(ClientId),
    Store(StoreError),
    Simulation(SimulationError),
}

impl fmt::Display for AdvisoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdvisoryError::NoBaseline(client) => {
                write!(f, "no current snapshot found for client {client}")
            }
            AdvisoryError::Store(e) => write!(f, "{e}"),
            AdvisoryError::Simulation(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for AdvisoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AdvisoryError::NoBaseline(_) => None,
            AdvisoryError::Store(e) => Some(e),
            AdvisoryError::Simulation(e) => Some(e),
        }
    }
}

impl From<StoreError> for AdvisoryError {
    fn from(err: StoreError) -> Self {
        AdvisoryError::Store(err)
    }
}

impl From<SimulationError> for AdvisoryError {
    fn from(err: SimulationError) -> Self {
        AdvisoryError::Simulation(err)
    }
}
