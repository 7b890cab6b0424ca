//! Deterministic projections for a stored client
//!
//! The same resolution of baseline, horizon and events backs both the
//! read-only projection endpoint and persisted simulation runs.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use jiff::{Timestamp, tz::TimeZone};
use rusqlite::Connection;
use wealthplan_core::EngineDefaults;
use wealthplan_core::date_math::end_of_month;
use wealthplan_core::model::{ClientId, SeriesPoint, last_value};
use wealthplan_core::projection::{ProjectionMode, ProjectionRequest, project};
use wealthplan_core::store::{AdvisoryStore, DateWindow, require_baseline};

use crate::db::{DbConn, SqliteStore};
use crate::error::{ApiError, ApiResult};
use crate::handlers::ensure_client;
use crate::models::{BaselineSource, ProjectionQuery, ProjectionResponse, SimulationInputs};
use crate::validation;

/// Caller-facing knobs of a projection, after defaults are applied
#[derive(Debug, Clone, Copy)]
pub(crate) struct ProjectionParams {
    pub rate: f64,
    pub until_year: i16,
    pub start_year: Option<i16>,
    pub initial_value: Option<f64>,
    pub include_events: bool,
    pub mode: ProjectionMode,
}

pub(crate) struct ComputedProjection {
    pub request: ProjectionRequest,
    pub inputs: SimulationInputs,
    pub series: Vec<SeriesPoint>,
}

impl ComputedProjection {
    pub fn last_value(&self) -> f64 {
        last_value(&self.series).unwrap_or(self.request.initial_value)
    }
}

/// Resolve the baseline and horizon for `client` and run the projection
///
/// The baseline is the explicit `initial_value` (anchored at the current
/// year) or else the latest Current snapshot. When the start year is left
/// to default to the snapshot's year, simulation starts in the snapshot's
/// month.
pub(crate) fn compute_projection(
    conn: &Connection,
    client: ClientId,
    params: ProjectionParams,
) -> ApiResult<ComputedProjection> {
    validation::validate_rate(params.rate)?;
    validation::validate_year("untilYear", params.until_year)?;
    ensure_client(conn, client)?;

    let store = SqliteStore::new(conn);
    let (initial_value, as_of_year, as_of_month, source, snapshot_year) =
        match params.initial_value {
            Some(value) => {
                if !value.is_finite() {
                    return Err(ApiError::validation(
                        "initialValue",
                        "initialValue must be a finite number",
                    ));
                }
                let year = Timestamp::now().to_zoned(TimeZone::UTC).year();
                (value, year, 1, BaselineSource::Override, None)
            }
            None => {
                let snapshot = require_baseline(&store, client)?;
                let date = snapshot.as_of_date;
                (
                    snapshot.total_value,
                    date.year(),
                    date.month(),
                    BaselineSource::Snapshot,
                    Some(date.year()),
                )
            }
        };

    let (start_year, start_month) = match params.start_year {
        Some(year) => (year, 1),
        None => (as_of_year, as_of_month),
    };
    validation::validate_year_range(start_year, params.until_year)?;

    let events = if params.include_events {
        let from = end_of_month(start_year, start_month).first_of_month();
        let to = end_of_month(params.until_year, 12);
        store.events(client, Some(DateWindow::new(from, to)))?
    } else {
        Vec::new()
    };

    let request = ProjectionRequest {
        initial_value,
        annual_rate: params.rate,
        start_year,
        start_month,
        horizon_year: params.until_year,
        mode: params.mode,
        include_events: params.include_events,
    };
    let series = project(&request, &events)?;

    Ok(ComputedProjection {
        inputs: SimulationInputs {
            start_year,
            initial_value_used: initial_value,
            include_events: params.include_events,
            mode: params.mode,
            source,
            snapshot_year,
        },
        request,
        series,
    })
}

/// `GET /clients/{id}/projection`
///
/// Query parameters: `rate`, `untilYear`, `startYear`, `initialValue`,
/// `includeEvents` (default `true`) and `mode`. `mode` defaults to
/// `monthly`, the month-by-month simulator; pass `mode=yearly` for the
/// aggregated once-a-year projection.
pub async fn get_projection(
    State(db): State<DbConn>,
    State(defaults): State<Arc<EngineDefaults>>,
    Path(client): Path<ClientId>,
    Query(query): Query<ProjectionQuery>,
) -> ApiResult<Json<ProjectionResponse>> {
    let params = ProjectionParams {
        rate: query.rate.unwrap_or(defaults.annual_rate),
        until_year: query.until_year.unwrap_or(defaults.until_year),
        start_year: query.start_year,
        initial_value: query.initial_value,
        include_events: query.include_events.unwrap_or(true),
        mode: query.mode.unwrap_or(ProjectionMode::Monthly),
    };

    let conn = db.lock()?;
    let computed = compute_projection(&conn, client, params)?;
    let last_value = computed.last_value();
    let ComputedProjection {
        request, series, ..
    } = computed;

    Ok(Json(ProjectionResponse {
        client_id: client,
        rate: request.annual_rate,
        start_year: request.start_year,
        until_year: request.horizon_year,
        initial_value: request.initial_value,
        mode: request.mode,
        points: series.len(),
        last_value,
        series,
    }))
}
