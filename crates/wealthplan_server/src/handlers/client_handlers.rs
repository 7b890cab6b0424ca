use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rusqlite::{Connection, Row, params};
use wealthplan_core::model::ClientId;

use crate::db::{self, DbConn, parse_optional_column};
use crate::error::{ApiError, ApiResult};
use crate::models::{ClientRecord, CreateClientRequest};
use crate::validation;

const CLIENT_COLUMNS: &str =
    "id, name, email, alignment_percent, alignment_category, created_at, updated_at";

fn client_from_row(row: &Row<'_>) -> rusqlite::Result<ClientRecord> {
    Ok(ClientRecord {
        id: ClientId(row.get(0)?),
        name: row.get(1)?,
        email: row.get(2)?,
        alignment_percent: row.get(3)?,
        alignment_category: parse_optional_column(row, 4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

pub(crate) fn load_client(conn: &Connection, id: ClientId) -> ApiResult<ClientRecord> {
    conn.query_row(
        &format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE id = ?1"),
        [id.0],
        client_from_row,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => ApiError::ClientNotFound(id),
        other => other.into(),
    })
}

pub async fn list_clients(State(db): State<DbConn>) -> ApiResult<Json<Vec<ClientRecord>>> {
    let conn = db.lock()?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {CLIENT_COLUMNS} FROM clients ORDER BY name, id"
    ))?;

    let clients = stmt
        .query_map([], client_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(clients))
}

pub async fn create_client(
    State(db): State<DbConn>,
    Json(req): Json<CreateClientRequest>,
) -> ApiResult<(StatusCode, Json<ClientRecord>)> {
    validation::validate_client_name(&req.name)?;

    let now = db::now();
    let conn = db.lock()?;
    conn.execute(
        "INSERT INTO clients (name, email, created_at, updated_at) VALUES (?1, ?2, ?3, ?4)",
        params![req.name, req.email, now, now],
    )?;
    let id = ClientId(conn.last_insert_rowid());
    tracing::debug!(client = %id, "client created");

    Ok((
        StatusCode::CREATED,
        Json(ClientRecord {
            id,
            name: req.name,
            email: req.email,
            alignment_percent: None,
            alignment_category: None,
            created_at: now.clone(),
            updated_at: now,
        }),
    ))
}

pub async fn get_client(
    State(db): State<DbConn>,
    Path(id): Path<ClientId>,
) -> ApiResult<Json<ClientRecord>> {
    let conn = db.lock()?;
    Ok(Json(load_client(&conn, id)?))
}
