//! Wealth projection and advisory engine
//!
//! This crate computes, for one advisory client at a time:
//! - Month-resolution wealth curves with compound growth and scheduled cash flows
//! - A faster year-resolution projection over aggregated yearly flows
//! - Alignment of the current allocation against the plan allocation
//! - Contribution and rebalancing suggestions for the client's goals
//!
//! All computation is synchronous and pure over already-loaded data. Reads and
//! the alignment write-back go through the [`store::AdvisoryStore`] trait.
//!
//! ```ignore
//! use wealthplan_core::simulation::{WealthCurveConfig, simulate_wealth_curve};
//!
//! let config = WealthCurveConfig::new(100_000.0, 0.05, 2025, 2035);
//! let series = simulate_wealth_curve(&config, &events)?;
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod alignment;
pub mod date_math;
pub mod error;
pub mod flows;
pub mod money;
pub mod occurrence;
pub mod projection;
pub mod simulation;
pub mod store;
pub mod suggestions;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod config;
pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use config::EngineDefaults;
pub use error::{AdvisoryError, SimulationError, StoreError};
pub use store::{AdvisoryStore, MemoryStore};
