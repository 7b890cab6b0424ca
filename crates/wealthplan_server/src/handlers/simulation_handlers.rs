use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use rusqlite::{Row, params};
use uuid::Uuid;
use wealthplan_core::model::{ClientId, last_value};
use wealthplan_core::projection::{ProjectionMode, ProjectionRequest, project};
use wealthplan_core::simulation::simulate_wealth_curve;

use crate::db::{self, DbConn, is_constraint_violation, json_column};
use crate::error::{ApiError, ApiResult};
use crate::handlers::projection_handlers::{ProjectionParams, compute_projection};
use crate::handlers::{ensure_client, limit_offset};
use crate::models::{
    CreateSimulationRequest, Page, SimulateRequest, SimulateResponse, SimulationListQuery,
    SimulationRun,
};
use crate::validation;

// ============================================================================
// Simulation History Handlers
// ============================================================================

const RUN_COLUMNS: &str = "id, client_id, name, version, rate, until_year, inputs, series, created_at";

fn run_from_row(row: &Row<'_>, with_series: bool) -> rusqlite::Result<SimulationRun> {
    Ok(SimulationRun {
        id: row.get(0)?,
        client_id: ClientId(row.get(1)?),
        name: row.get(2)?,
        version: row.get(3)?,
        rate: row.get(4)?,
        until_year: row.get(5)?,
        inputs: json_column(row, 6)?,
        series: if with_series {
            Some(json_column(row, 7)?)
        } else {
            None
        },
        created_at: row.get(8)?,
    })
}

/// Run a projection and store it as the client's next version
pub async fn create_simulation(
    State(db): State<DbConn>,
    Path(client): Path<ClientId>,
    Json(req): Json<CreateSimulationRequest>,
) -> ApiResult<(StatusCode, Json<SimulationRun>)> {
    if let Some(name) = &req.name {
        if name.len() > 200 {
            return Err(ApiError::validation(
                "name",
                "Simulation name cannot exceed 200 characters",
            ));
        }
    }

    let params = ProjectionParams {
        rate: req.rate,
        until_year: req.until_year,
        start_year: req.start_year,
        initial_value: req.initial_value,
        include_events: req.include_events,
        mode: req.mode,
    };

    let mut conn = db.lock()?;
    let computed = compute_projection(&conn, client, params)?;

    let id = Uuid::new_v4().to_string();
    let now = db::now();
    let inputs_json = serde_json::to_string(&computed.inputs)?;
    let series_json = serde_json::to_string(&computed.series)?;

    let tx = conn.transaction()?;
    let version: i64 = tx.query_row(
        "SELECT COALESCE(MAX(version), 0) + 1 FROM simulations WHERE client_id = ?1",
        [client.0],
        |row| row.get(0),
    )?;
    tx.execute(
        &format!("INSERT INTO simulations ({RUN_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"),
        params![
            id,
            client.0,
            req.name,
            version,
            req.rate,
            req.until_year,
            inputs_json,
            series_json,
            now
        ],
    )
    .map_err(|e| {
        if is_constraint_violation(&e) {
            ApiError::VersionConflict
        } else {
            e.into()
        }
    })?;
    tx.commit()?;

    tracing::info!(client = %client, version, mode = req.mode.as_str(), "simulation stored");

    Ok((
        StatusCode::CREATED,
        Json(SimulationRun {
            id,
            client_id: client,
            name: req.name,
            version,
            rate: req.rate,
            until_year: req.until_year,
            inputs: computed.inputs,
            series: Some(computed.series),
            created_at: now,
        }),
    ))
}

pub async fn list_simulations(
    State(db): State<DbConn>,
    Path(client): Path<ClientId>,
    Query(query): Query<SimulationListQuery>,
) -> ApiResult<Json<Page<SimulationRun>>> {
    let (page, per_page) = validation::validate_pagination(query.page, query.per_page)?;
    let with_series = query.with_series.unwrap_or(false);

    let conn = db.lock()?;
    ensure_client(&conn, client)?;

    let total: i64 = conn.query_row(
        "SELECT COUNT(*) FROM simulations WHERE client_id = ?1",
        [client.0],
        |row| row.get(0),
    )?;

    let (limit, offset) = limit_offset(page, per_page);
    let mut stmt = conn.prepare(&format!(
        "SELECT {RUN_COLUMNS} FROM simulations WHERE client_id = ?1
         ORDER BY created_at DESC, version DESC LIMIT ?2 OFFSET ?3"
    ))?;
    let items = stmt
        .query_map(params![client.0, limit, offset], |row| {
            run_from_row(row, with_series)
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(Page {
        items,
        page,
        per_page,
        total,
    }))
}

pub async fn get_simulation(
    State(db): State<DbConn>,
    Path(id): Path<String>,
) -> ApiResult<Json<SimulationRun>> {
    let conn = db.lock()?;
    let run = conn
        .query_row(
            &format!("SELECT {RUN_COLUMNS} FROM simulations WHERE id = ?1"),
            [&id],
            |row| run_from_row(row, true),
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => ApiError::SimulationNotFound(id.clone()),
            other => other.into(),
        })?;

    Ok(Json(run))
}

// ============================================================================
// Stateless Simulation
// ============================================================================

/// Project an ad-hoc portfolio without touching storage
pub async fn simulate(Json(req): Json<SimulateRequest>) -> ApiResult<Json<SimulateResponse>> {
    let config = &req.config;
    validation::validate_rate(config.annual_rate)?;
    validation::validate_year_range(config.start_year, config.horizon_year)?;
    for event in &req.events {
        validation::validate_event(event)?;
    }

    let series = match req.mode {
        ProjectionMode::Monthly => simulate_wealth_curve(config, &req.events)?,
        ProjectionMode::Yearly => {
            let request = ProjectionRequest {
                initial_value: config.initial_value,
                annual_rate: config.annual_rate,
                start_year: config.start_year,
                start_month: config.start_month,
                horizon_year: config.horizon_year,
                mode: ProjectionMode::Yearly,
                include_events: !req.events.is_empty(),
            };
            project(&request, &req.events)?
        }
    };

    Ok(Json(SimulateResponse {
        points: series.len(),
        last_value: last_value(&series).unwrap_or(config.initial_value),
        series,
    }))
}
