use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use wealthplan_core::EngineDefaults;
use wealthplan_core::alignment::evaluate_alignment_safe;
use wealthplan_core::model::ClientId;
use wealthplan_core::suggestions::{SuggestionOptions, SuggestionReport, build_suggestions};

use crate::db::{DbConn, SqliteStore};
use crate::error::ApiResult;
use crate::handlers::client_handlers::load_client;
use crate::handlers::ensure_client;
use crate::models::{AlignmentResponse, SuggestionsQuery};
use crate::validation;

/// Recompute alignment, then report what was persisted
pub async fn get_alignment(
    State(db): State<DbConn>,
    Path(client): Path<ClientId>,
) -> ApiResult<Json<AlignmentResponse>> {
    let conn = db.lock()?;
    ensure_client(&conn, client)?;

    let result = evaluate_alignment_safe(&SqliteStore::new(&conn), client);
    let record = load_client(&conn, client)?;

    Ok(Json(AlignmentResponse {
        client_id: client,
        percent: record.alignment_percent,
        category: record.alignment_category,
        aligned_value: result.aligned_value,
    }))
}

pub async fn get_suggestions(
    State(db): State<DbConn>,
    State(defaults): State<Arc<EngineDefaults>>,
    Path(client): Path<ClientId>,
    Query(query): Query<SuggestionsQuery>,
) -> ApiResult<Json<SuggestionReport>> {
    let annual_rate = query.rate.unwrap_or(defaults.annual_rate);
    validation::validate_rate(annual_rate)?;
    let round_step =
        validation::validate_round_step(query.round_step.unwrap_or(i64::from(defaults.round_step)))?;

    let options = SuggestionOptions {
        annual_rate,
        round_step,
        ..SuggestionOptions::from(&*defaults)
    };

    let conn = db.lock()?;
    ensure_client(&conn, client)?;
    let report = build_suggestions(&SqliteStore::new(&conn), client, &options)?;

    Ok(Json(report))
}
