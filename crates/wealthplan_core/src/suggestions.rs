//! Goal-driven advice
//!
//! For each goal the subject's wealth is simulated from the Current snapshot
//! to the goal month (flows at month end, no borrowing). Any shortfall is
//! turned into a level monthly contribution by inverting the future value of
//! an annuity at the monthly-equivalent rate. A single rebalancing hint is
//! appended when the allocation has drifted from the plan.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::alignment::{AllocationDiff, plan_distance};
use crate::config::EngineDefaults;
use crate::date_math::{end_of_month, month_index, months_between_inclusive};
use crate::error::{AdvisoryError, SimulationError};
use crate::model::{ClientId, Goal, GoalId, SnapshotKind};
use crate::money::{annuity_factor, ceil_to_step, monthly_rate_from_annual};
use crate::simulation::{FlowTiming, MonthlySimulation, validate_rate};
use crate::store::{AdvisoryStore, DateWindow};

const NO_BASELINE_REASON: &str = "No CURRENT snapshot";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SuggestionKind {
    Contribution,
    Rebalance,
}

/// Structured payload behind a suggestion's message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SuggestionDetails {
    /// Existing plan already reaches the target; no action
    TargetMet {
        goal_id: GoalId,
        target: f64,
        projected: f64,
        months: i32,
    },
    Contribution {
        goal_id: GoalId,
        target: f64,
        months: i32,
        projected_at_goal: f64,
        required_monthly: f64,
        suggested_monthly: f64,
        annual_rate: f64,
    },
    /// The annuity factor was non-positive or non-finite
    Infeasible {
        goal_id: GoalId,
        target: f64,
        projected: f64,
        months: i32,
    },
    Rebalance {
        overlap: f64,
        diffs: Vec<AllocationDiff>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    pub message: String,
    pub details: SuggestionDetails,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SuggestionOptions {
    pub annual_rate: f64,
    pub round_step: u32,
    pub target_met_threshold: f64,
    pub rebalance_threshold: f64,
}

impl Default for SuggestionOptions {
    fn default() -> Self {
        Self::from(&EngineDefaults::default())
    }
}

impl From<&EngineDefaults> for SuggestionOptions {
    fn from(defaults: &EngineDefaults) -> Self {
        Self {
            annual_rate: defaults.annual_rate,
            round_step: defaults.round_step,
            target_met_threshold: defaults.target_met_threshold,
            rebalance_threshold: defaults.rebalance_threshold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SuggestionMeta {
    Baseline {
        annual_rate: f64,
        start_date: Date,
        initial_value: f64,
    },
    Unavailable {
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionReport {
    pub suggestions: Vec<Suggestion>,
    pub meta: SuggestionMeta,
}

impl SuggestionReport {
    fn without_baseline() -> Self {
        Self {
            suggestions: Vec::new(),
            meta: SuggestionMeta::Unavailable {
                reason: NO_BASELINE_REASON.to_string(),
            },
        }
    }
}

/// Contribution outcome for one goal given its projected value
fn goal_suggestion(
    goal: &Goal,
    projected: f64,
    months: i32,
    options: &SuggestionOptions,
) -> Suggestion {
    let target = goal.target_value;
    let shortfall = (target - projected).max(0.0);
    let factor = annuity_factor(monthly_rate_from_annual(options.annual_rate), months);

    let target_met = || Suggestion {
        kind: SuggestionKind::Contribution,
        message: format!(
            "Goal \"{}\": current projection already reaches the target. No extra contribution needed.",
            goal.name
        ),
        details: SuggestionDetails::TargetMet {
            goal_id: goal.goal_id,
            target,
            projected,
            months,
        },
    };

    if shortfall <= 0.0 {
        return target_met();
    }

    if !factor.is_finite() || factor <= 0.0 {
        return Suggestion {
            kind: SuggestionKind::Contribution,
            message: format!(
                "Goal \"{}\": the required contribution cannot be determined over {} months.",
                goal.name, months
            ),
            details: SuggestionDetails::Infeasible {
                goal_id: goal.goal_id,
                target,
                projected,
                months,
            },
        };
    }

    let required = shortfall / factor;
    if required <= options.target_met_threshold {
        return target_met();
    }

    let suggested = ceil_to_step(required, options.round_step);
    Suggestion {
        kind: SuggestionKind::Contribution,
        message: format!(
            "Increase monthly contributions by {suggested:.0} for {months} months to reach \"{}\" by {}.",
            goal.name,
            goal.target_date.year()
        ),
        details: SuggestionDetails::Contribution {
            goal_id: goal.goal_id,
            target,
            months,
            projected_at_goal: projected,
            required_monthly: required,
            suggested_monthly: suggested,
            annual_rate: options.annual_rate,
        },
    }
}

fn rebalance_suggestion(overlap: f64, diffs: Vec<AllocationDiff>) -> Suggestion {
    let tips = diffs
        .iter()
        .take(2)
        .map(|d| {
            if d.delta_percent > 0.0 {
                format!("increase {} by {:.1} pp", d.asset_class.label(), d.delta_percent)
            } else {
                format!("decrease {} by {:.1} pp", d.asset_class.label(), d.delta_percent.abs())
            }
        })
        .collect::<Vec<_>>()
        .join(" and ");

    Suggestion {
        kind: SuggestionKind::Rebalance,
        message: format!(
            "Rebalance the portfolio toward the plan ({:.1}% aligned): suggested {tips}.",
            overlap * 100.0
        ),
        details: SuggestionDetails::Rebalance { overlap, diffs },
    }
}

/// Build contribution suggestions for every goal, then at most one rebalance
///
/// Contribution entries come first, in ascending target-date order. Goals
/// whose month precedes the baseline month are skipped. A subject with no
/// Current snapshot gets an empty list and a reason in `meta`.
pub fn build_suggestions<S: AdvisoryStore + ?Sized>(
    store: &S,
    client: ClientId,
    options: &SuggestionOptions,
) -> Result<SuggestionReport, AdvisoryError> {
    validate_rate(options.annual_rate)?;
    if options.round_step == 0 {
        return Err(SimulationError::InvalidRoundStep(options.round_step).into());
    }

    let Some(baseline) = store.latest_snapshot(client, SnapshotKind::Current)? else {
        debug!(client = %client, "no baseline, skipping suggestions");
        return Ok(SuggestionReport::without_baseline());
    };
    let start_date = baseline.as_of_date;

    let mut goals = store.goals(client)?;
    goals.sort_by_key(|g| g.target_date);

    let events = match goals.last() {
        Some(last) => {
            let to = end_of_month(last.target_date.year(), last.target_date.month());
            store.events(client, Some(DateWindow::new(start_date, to)))?
        }
        None => Vec::new(),
    };

    // Goals are ascending, so one simulation can be advanced goal by goal.
    let mut sim = MonthlySimulation::new(
        baseline.total_value,
        options.annual_rate,
        month_index(start_date),
        &events,
        FlowTiming::End,
        true,
    );

    let mut suggestions = Vec::with_capacity(goals.len() + 1);
    for goal in &goals {
        let months = months_between_inclusive(start_date, goal.target_date);
        if months <= 0 {
            continue;
        }
        let projected = sim.run_through(month_index(goal.target_date));
        suggestions.push(goal_suggestion(goal, projected, months, options));
    }

    if let Some(plan) = store.latest_snapshot(client, SnapshotKind::Plan)? {
        let distance = plan_distance(&baseline, &plan);
        debug!(client = %client, overlap = distance.overlap, "plan distance");
        if distance.overlap < options.rebalance_threshold {
            suggestions.push(rebalance_suggestion(distance.overlap, distance.diffs));
        }
    }

    debug!(
        client = %client,
        goals = goals.len(),
        suggestions = suggestions.len(),
        "built suggestions"
    );

    Ok(SuggestionReport {
        suggestions,
        meta: SuggestionMeta::Baseline {
            annual_rate: options.annual_rate,
            start_date,
            initial_value: baseline.total_value,
        },
    })
}
