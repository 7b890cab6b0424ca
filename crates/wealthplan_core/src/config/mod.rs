//! Engine defaults
//!
//! `EngineDefaults` holds the assumptions applied when a caller leaves a
//! parameter out. It deserializes with every field optional so a
//! configuration file only needs to mention what it overrides.

use serde::{Deserialize, Serialize};

use crate::error::SimulationError;

fn default_annual_rate() -> f64 {
    0.04
}

fn default_until_year() -> i16 {
    2060
}

fn default_round_step() -> u32 {
    10
}

fn default_target_met_threshold() -> f64 {
    0.5
}

fn default_rebalance_threshold() -> f64 {
    0.9
}

fn default_alignment_tolerance() -> f64 {
    0.01
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineDefaults {
    /// Real annual growth rate, e.g. `0.04` for 4%
    #[serde(default = "default_annual_rate")]
    pub annual_rate: f64,

    /// Last year projected when the caller gives no horizon
    #[serde(default = "default_until_year")]
    pub until_year: i16,

    /// Suggested contributions are rounded up to a multiple of this
    #[serde(default = "default_round_step")]
    pub round_step: u32,

    /// Required monthly amounts at or below this count as "target met"
    #[serde(default = "default_target_met_threshold")]
    pub target_met_threshold: f64,

    /// Overlap fraction below which a rebalance is suggested
    #[serde(default = "default_rebalance_threshold")]
    pub rebalance_threshold: f64,

    /// Allowed distance of an allocation's percent sum from 100
    #[serde(default = "default_alignment_tolerance")]
    pub alignment_tolerance: f64,
}

impl Default for EngineDefaults {
    fn default() -> Self {
        Self {
            annual_rate: default_annual_rate(),
            until_year: default_until_year(),
            round_step: default_round_step(),
            target_met_threshold: default_target_met_threshold(),
            rebalance_threshold: default_rebalance_threshold(),
            alignment_tolerance: default_alignment_tolerance(),
        }
    }
}

impl EngineDefaults {
    pub fn validate(&self) -> Result<(), SimulationError> {
        crate::simulation::validate_rate(self.annual_rate)?;
        if self.round_step == 0 {
            return Err(SimulationError::InvalidRoundStep(self.round_step));
        }
        Ok(())
    }
}
