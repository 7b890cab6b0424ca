use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use rusqlite::{params, params_from_iter, types::Value};
use wealthplan_core::EngineDefaults;
use wealthplan_core::alignment::evaluate_alignment_safe;
use wealthplan_core::model::{ClientId, SnapshotId};

use crate::db::{self, DbConn, SqliteStore, parse_column, store::load_allocations};
use crate::error::ApiResult;
use crate::handlers::ensure_client;
use crate::models::{CreateSnapshotRequest, SnapshotCreated, SnapshotListQuery, SnapshotRecord};
use crate::validation;

/// Store a snapshot and recompute the client's alignment
///
/// A second snapshot for the same client, kind and as-of date replaces the
/// first one's value and allocations.
pub async fn create_snapshot(
    State(db): State<DbConn>,
    State(defaults): State<Arc<EngineDefaults>>,
    Json(req): Json<CreateSnapshotRequest>,
) -> ApiResult<(StatusCode, Json<SnapshotCreated>)> {
    validation::validate_total_value(req.total_value)?;
    validation::validate_allocations(&req.allocations, defaults.alignment_tolerance)?;

    let mut conn = db.lock()?;
    ensure_client(&conn, req.client_id)?;

    let tx = conn.transaction()?;
    let snapshot_id: i64 = tx.query_row(
        "INSERT INTO portfolio_snapshots (client_id, kind, as_of_date, total_value, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT (client_id, kind, as_of_date)
         DO UPDATE SET total_value = excluded.total_value, created_at = excluded.created_at
         RETURNING id",
        params![
            req.client_id.0,
            req.kind.as_str(),
            req.as_of_date.to_string(),
            req.total_value,
            db::now()
        ],
        |row| row.get(0),
    )?;
    tx.execute("DELETE FROM allocations WHERE snapshot_id = ?1", [snapshot_id])?;
    {
        let mut insert = tx.prepare(
            "INSERT INTO allocations (snapshot_id, asset_class, percent) VALUES (?1, ?2, ?3)",
        )?;
        for a in &req.allocations {
            insert.execute(params![snapshot_id, a.asset_class.as_str(), a.percent])?;
        }
    }
    tx.commit()?;

    let alignment = evaluate_alignment_safe(&SqliteStore::new(&conn), req.client_id);
    tracing::debug!(
        client = %req.client_id,
        snapshot = snapshot_id,
        kind = req.kind.as_str(),
        "snapshot stored"
    );

    Ok((
        StatusCode::CREATED,
        Json(SnapshotCreated {
            snapshot_id: SnapshotId(snapshot_id),
            alignment,
        }),
    ))
}

pub async fn list_snapshots(
    State(db): State<DbConn>,
    Query(query): Query<SnapshotListQuery>,
) -> ApiResult<Json<Vec<SnapshotRecord>>> {
    let conn = db.lock()?;
    ensure_client(&conn, query.client_id)?;

    let mut sql = String::from(
        "SELECT id, client_id, kind, as_of_date, total_value, created_at
         FROM portfolio_snapshots WHERE client_id = ?",
    );
    let mut args = vec![Value::Integer(query.client_id.0)];
    if let Some(kind) = query.kind {
        sql.push_str(" AND kind = ?");
        args.push(Value::Text(kind.as_str().to_string()));
    }
    sql.push_str(" ORDER BY as_of_date DESC, id DESC");

    let mut stmt = conn.prepare(&sql)?;
    let heads = stmt
        .query_map(params_from_iter(args), |row| {
            Ok(SnapshotRecord {
                id: SnapshotId(row.get(0)?),
                client_id: ClientId(row.get(1)?),
                kind: parse_column(row, 2)?,
                as_of_date: parse_column(row, 3)?,
                total_value: row.get(4)?,
                allocations: Vec::new(),
                created_at: row.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut snapshots = heads;
    for snapshot in &mut snapshots {
        snapshot.allocations = load_allocations(&conn, snapshot.id.0)?;
    }

    Ok(Json(snapshots))
}
