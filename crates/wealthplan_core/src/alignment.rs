//! Current vs. plan allocation comparison
//!
//! The overlap fraction is `Σ min(current%, plan%) / 100` over every asset
//! class present in either snapshot. It is the share of the current
//! portfolio already positioned as the plan asks, and always lies in `[0, 1]`
//! when both snapshots sum to 100.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::AdvisoryError;
use crate::model::{
    AlignmentCategory, AlignmentResult, AllocationSnapshot, AllocationTable, AssetClass, ClientId,
    SnapshotKind,
};
use crate::store::AdvisoryStore;

/// Per-class gap between what is held and what the plan asks for
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AllocationDiff {
    pub asset_class: AssetClass,
    pub current_percent: f64,
    pub target_percent: f64,
    /// `target - current`; positive means the class should grow
    pub delta_percent: f64,
}

/// Full comparison of a current snapshot against a plan snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDistance {
    pub overlap: f64,
    /// Sorted by absolute delta, largest first
    pub diffs: Vec<AllocationDiff>,
    pub current_total: f64,
    pub plan_total: f64,
}

pub fn overlap_fraction(current: &AllocationTable, plan: &AllocationTable) -> f64 {
    AssetClass::ALL
        .into_iter()
        .filter(|c| current.contains(*c) || plan.contains(*c))
        .map(|c| current.get(c).min(plan.get(c)))
        .sum::<f64>()
        / 100.0
}

pub fn plan_distance(current: &AllocationSnapshot, plan: &AllocationSnapshot) -> PlanDistance {
    let cur = current.table();
    let tgt = plan.table();

    let mut diffs: Vec<AllocationDiff> = AssetClass::ALL
        .into_iter()
        .filter(|c| cur.contains(*c) || tgt.contains(*c))
        .map(|c| AllocationDiff {
            asset_class: c,
            current_percent: cur.get(c),
            target_percent: tgt.get(c),
            delta_percent: tgt.get(c) - cur.get(c),
        })
        .collect();
    // Stable sort keeps enumeration order among equal deltas.
    diffs.sort_by(|a, b| b.delta_percent.abs().total_cmp(&a.delta_percent.abs()));

    PlanDistance {
        overlap: overlap_fraction(&cur, &tgt),
        diffs,
        current_total: current.total_value,
        plan_total: plan.total_value,
    }
}

/// Alignment of two snapshots, or the null triple if there is nothing to align
pub fn compute_alignment(
    current: Option<&AllocationSnapshot>,
    plan: Option<&AllocationSnapshot>,
) -> AlignmentResult {
    let (Some(current), Some(plan)) = (current, plan) else {
        return AlignmentResult::unavailable();
    };
    if current.total_value <= 0.0 {
        return AlignmentResult::unavailable();
    }

    let overlap = overlap_fraction(&current.table(), &plan.table());
    AlignmentResult {
        percent: Some(overlap),
        category: Some(AlignmentCategory::from_overlap(overlap)),
        aligned_value: Some(overlap * current.total_value),
    }
}

/// Recompute the subject's alignment and persist percent and category
///
/// The null state is persisted too, so a subject whose plan was removed does
/// not keep reporting a stale category.
pub fn evaluate_alignment<S: AdvisoryStore + ?Sized>(
    store: &S,
    client: ClientId,
) -> Result<AlignmentResult, AdvisoryError> {
    let current = store.latest_snapshot(client, SnapshotKind::Current)?;
    let plan = store.latest_snapshot(client, SnapshotKind::Plan)?;

    let result = compute_alignment(current.as_ref(), plan.as_ref());
    debug!(
        client = %client,
        overlap = ?result.percent,
        category = ?result.category,
        "evaluated alignment"
    );

    store.write_alignment(client, result.percent, result.category)?;
    Ok(result)
}

/// [`evaluate_alignment`] that never fails
///
/// Any store error is logged and the null triple returned instead.
pub fn evaluate_alignment_safe<S: AdvisoryStore + ?Sized>(
    store: &S,
    client: ClientId,
) -> AlignmentResult {
    match evaluate_alignment(store, client) {
        Ok(result) => result,
        Err(e) => {
            warn!(client = %client, error = %e, "alignment evaluation failed");
            AlignmentResult::unavailable()
        }
    }
}
