use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use rusqlite::params;
use wealthplan_core::model::{ClientId, GoalId};

use crate::db::{self, DbConn, parse_column};
use crate::error::ApiResult;
use crate::handlers::ensure_client;
use crate::models::{ClientScopedQuery, CreateGoalRequest, GoalRecord};
use crate::validation;

pub async fn list_goals(
    State(db): State<DbConn>,
    Query(query): Query<ClientScopedQuery>,
) -> ApiResult<Json<Vec<GoalRecord>>> {
    let conn = db.lock()?;
    ensure_client(&conn, query.client_id)?;

    let mut stmt = conn.prepare(
        "SELECT id, client_id, name, target_value, target_date, notes, created_at
         FROM goals WHERE client_id = ?1 ORDER BY target_date, id",
    )?;
    let goals = stmt
        .query_map([query.client_id.0], |row| {
            Ok(GoalRecord {
                id: GoalId(row.get(0)?),
                client_id: ClientId(row.get(1)?),
                name: row.get(2)?,
                target_value: row.get(3)?,
                target_date: parse_column(row, 4)?,
                notes: row.get(5)?,
                created_at: row.get(6)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(goals))
}

pub async fn create_goal(
    State(db): State<DbConn>,
    Json(req): Json<CreateGoalRequest>,
) -> ApiResult<(StatusCode, Json<GoalRecord>)> {
    validation::validate_goal(&req.name, req.target_value)?;

    let now = db::now();
    let conn = db.lock()?;
    ensure_client(&conn, req.client_id)?;

    conn.execute(
        "INSERT INTO goals (client_id, name, target_value, target_date, notes, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            req.client_id.0,
            req.name,
            req.target_value,
            req.target_date.to_string(),
            req.notes,
            now
        ],
    )?;

    Ok((
        StatusCode::CREATED,
        Json(GoalRecord {
            id: GoalId(conn.last_insert_rowid()),
            client_id: req.client_id,
            name: req.name,
            target_value: req.target_value,
            target_date: req.target_date,
            notes: req.notes,
            created_at: now,
        }),
    ))
}
