use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use super::ids::GoalId;

/// A target wealth level the subject wants to reach by a date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub goal_id: GoalId,
    pub name: String,
    pub target_value: f64,
    pub target_date: Date,
}
