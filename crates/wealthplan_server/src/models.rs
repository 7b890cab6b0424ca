use jiff::civil::Date;
use serde::{Deserialize, Deserializer, Serialize};
use wealthplan_core::model::{
    AlignmentCategory, AlignmentResult, Allocation, CashFlowEvent, ClientId, EventId, EventKind,
    Frequency, GoalId, SeriesPoint, SnapshotId, SnapshotKind,
};
use wealthplan_core::projection::ProjectionMode;
use wealthplan_core::simulation::WealthCurveConfig;

fn default_true() -> bool {
    true
}

fn default_simulation_mode() -> ProjectionMode {
    ProjectionMode::Yearly
}

/// Tell an explicit `null` (`Some(None)`) apart from a missing field (`None`)
///
/// Pair with `#[serde(default)]` so a missing field never reaches this.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ============================================================================
// Client Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct ClientRecord {
    pub id: ClientId,
    pub name: String,
    pub email: Option<String>,
    pub alignment_percent: Option<f64>,
    pub alignment_category: Option<AlignmentCategory>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateClientRequest {
    pub name: String,
    pub email: Option<String>,
}

// ============================================================================
// Event Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: EventId,
    pub client_id: ClientId,
    #[serde(flatten)]
    pub event: CashFlowEvent,
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    #[serde(alias = "clientId")]
    pub client_id: ClientId,
    #[serde(alias = "type")]
    pub kind: EventKind,
    pub frequency: Frequency,
    pub amount: f64,
    #[serde(alias = "startDate")]
    pub start: Date,
    #[serde(default, alias = "endDate")]
    pub end: Option<Date>,
    #[serde(default, alias = "executionDay")]
    pub execution_day: Option<i8>,
    #[serde(default, alias = "executionMonth")]
    pub execution_month: Option<i8>,
    pub description: Option<String>,
}

impl CreateEventRequest {
    pub fn to_event(&self) -> CashFlowEvent {
        CashFlowEvent {
            kind: self.kind,
            frequency: self.frequency,
            amount: self.amount,
            start: self.start,
            end: self.end,
            execution_day: self.execution_day,
            execution_month: self.execution_month,
        }
    }
}

/// Partial update; absent fields keep their stored value
///
/// The optional columns take an explicit `null` to clear them.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateEventRequest {
    #[serde(alias = "type")]
    pub kind: Option<EventKind>,
    pub frequency: Option<Frequency>,
    pub amount: Option<f64>,
    #[serde(alias = "startDate")]
    pub start: Option<Date>,
    #[serde(default, alias = "endDate", deserialize_with = "nullable")]
    pub end: Option<Option<Date>>,
    #[serde(default, alias = "executionDay", deserialize_with = "nullable")]
    pub execution_day: Option<Option<i8>>,
    #[serde(default, alias = "executionMonth", deserialize_with = "nullable")]
    pub execution_month: Option<Option<i8>>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
}

impl UpdateEventRequest {
    pub fn apply(&self, event: &mut CashFlowEvent) {
        if let Some(kind) = self.kind {
            event.kind = kind;
        }
        if let Some(frequency) = self.frequency {
            event.frequency = frequency;
        }
        if let Some(amount) = self.amount {
            event.amount = amount;
        }
        if let Some(start) = self.start {
            event.start = start;
        }
        if let Some(end) = self.end {
            event.end = end;
        }
        if let Some(day) = self.execution_day {
            event.execution_day = day;
        }
        if let Some(month) = self.execution_month {
            event.execution_month = month;
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventListQuery {
    pub client_id: ClientId,
    #[serde(rename = "type")]
    pub kind: Option<EventKind>,
    pub frequency: Option<Frequency>,
    /// Only events active on or after this date
    pub from: Option<Date>,
    /// Only events active on or before this date
    pub to: Option<Date>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

// ============================================================================
// Goal Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct GoalRecord {
    pub id: GoalId,
    pub client_id: ClientId,
    pub name: String,
    pub target_value: f64,
    pub target_date: Date,
    pub notes: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateGoalRequest {
    #[serde(alias = "clientId")]
    pub client_id: ClientId,
    pub name: String,
    #[serde(alias = "targetValue")]
    pub target_value: f64,
    #[serde(alias = "targetDate")]
    pub target_date: Date,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientScopedQuery {
    pub client_id: ClientId,
}

// ============================================================================
// Portfolio Snapshot Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub id: SnapshotId,
    pub client_id: ClientId,
    pub kind: SnapshotKind,
    pub as_of_date: Date,
    pub total_value: f64,
    pub allocations: Vec<Allocation>,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateSnapshotRequest {
    #[serde(alias = "clientId")]
    pub client_id: ClientId,
    pub kind: SnapshotKind,
    #[serde(alias = "asOfDate")]
    pub as_of_date: Date,
    #[serde(alias = "totalValue")]
    pub total_value: f64,
    pub allocations: Vec<Allocation>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SnapshotCreated {
    pub snapshot_id: SnapshotId,
    pub alignment: AlignmentResult,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotListQuery {
    pub client_id: ClientId,
    pub kind: Option<SnapshotKind>,
}

// ============================================================================
// Projection Types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionQuery {
    pub rate: Option<f64>,
    pub until_year: Option<i16>,
    pub start_year: Option<i16>,
    pub initial_value: Option<f64>,
    pub include_events: Option<bool>,
    /// `monthly` when absent
    pub mode: Option<ProjectionMode>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProjectionResponse {
    pub client_id: ClientId,
    pub rate: f64,
    pub start_year: i16,
    pub until_year: i16,
    pub initial_value: f64,
    pub mode: ProjectionMode,
    pub points: usize,
    pub last_value: f64,
    pub series: Vec<SeriesPoint>,
}

// ============================================================================
// Simulation History Types
// ============================================================================

/// Where a run's starting value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaselineSource {
    Override,
    Snapshot,
}

/// Resolved inputs stored alongside a run so it can be reproduced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationInputs {
    pub start_year: i16,
    pub initial_value_used: f64,
    pub include_events: bool,
    pub mode: ProjectionMode,
    pub source: BaselineSource,
    pub snapshot_year: Option<i16>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SimulationRun {
    pub id: String,
    pub client_id: ClientId,
    pub name: Option<String>,
    pub version: i64,
    pub rate: f64,
    pub until_year: i16,
    pub inputs: SimulationInputs,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<Vec<SeriesPoint>>,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateSimulationRequest {
    pub name: Option<String>,
    pub rate: f64,
    #[serde(alias = "untilYear")]
    pub until_year: i16,
    #[serde(default, alias = "startYear")]
    pub start_year: Option<i16>,
    #[serde(default, alias = "initialValue")]
    pub initial_value: Option<f64>,
    #[serde(default = "default_true", alias = "includeEvents")]
    pub include_events: bool,
    #[serde(default = "default_simulation_mode")]
    pub mode: ProjectionMode,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub with_series: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

// ============================================================================
// Stateless Simulation Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SimulateRequest {
    #[serde(flatten)]
    pub config: WealthCurveConfig,
    #[serde(default)]
    pub mode: ProjectionMode,
    #[serde(default)]
    pub events: Vec<CashFlowEvent>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SimulateResponse {
    pub points: usize,
    pub last_value: f64,
    pub series: Vec<SeriesPoint>,
}

// ============================================================================
// Advisory Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct AlignmentResponse {
    pub client_id: ClientId,
    pub percent: Option<f64>,
    pub category: Option<AlignmentCategory>,
    pub aligned_value: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionsQuery {
    pub rate: Option<f64>,
    pub round_step: Option<i64>,
}
