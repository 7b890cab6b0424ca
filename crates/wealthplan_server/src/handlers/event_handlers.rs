use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use rusqlite::{Connection, Row, params, params_from_iter, types::Value};
use wealthplan_core::model::{CashFlowEvent, ClientId, EventId};

use crate::db::{self, DbConn, store::{EVENT_COLUMNS, event_from_row}};
use crate::error::{ApiError, ApiResult};
use crate::handlers::{ensure_client, limit_offset};
use crate::models::{CreateEventRequest, EventListQuery, EventRecord, Page, UpdateEventRequest};
use crate::validation;

fn event_select() -> String {
    format!("SELECT id, client_id, {EVENT_COLUMNS}, description, created_at, updated_at FROM events")
}

fn event_record_from_row(row: &Row<'_>) -> rusqlite::Result<EventRecord> {
    Ok(EventRecord {
        id: EventId(row.get(0)?),
        client_id: ClientId(row.get(1)?),
        event: event_from_row(row, 2)?,
        description: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

fn load_event(conn: &Connection, id: EventId) -> ApiResult<EventRecord> {
    conn.query_row(
        &format!("{} WHERE id = ?1", event_select()),
        [id.0],
        event_record_from_row,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => ApiError::EventNotFound(id),
        other => other.into(),
    })
}

fn event_params(event: &CashFlowEvent) -> [Value; 7] {
    [
        Value::Text(event.kind.as_str().to_string()),
        Value::Text(event.frequency.as_str().to_string()),
        Value::Real(event.amount),
        Value::Text(event.start.to_string()),
        event
            .end
            .map_or(Value::Null, |d| Value::Text(d.to_string())),
        event
            .execution_day
            .map_or(Value::Null, |d| Value::Integer(i64::from(d))),
        event
            .execution_month
            .map_or(Value::Null, |m| Value::Integer(i64::from(m))),
    ]
}

pub async fn list_events(
    State(db): State<DbConn>,
    Query(query): Query<EventListQuery>,
) -> ApiResult<Json<Page<EventRecord>>> {
    let (page, per_page) = validation::validate_pagination(query.page, query.per_page)?;
    if let (Some(from), Some(to)) = (query.from, query.to) {
        if from > to {
            return Err(ApiError::validation("from", "from must be on or before to"));
        }
    }

    let conn = db.lock()?;
    ensure_client(&conn, query.client_id)?;

    let mut filter = String::from(" WHERE client_id = ?");
    let mut args = vec![Value::Integer(query.client_id.0)];
    if let Some(kind) = query.kind {
        filter.push_str(" AND kind = ?");
        args.push(Value::Text(kind.as_str().to_string()));
    }
    if let Some(frequency) = query.frequency {
        filter.push_str(" AND frequency = ?");
        args.push(Value::Text(frequency.as_str().to_string()));
    }
    // Activity window: the event must overlap [from, to].
    if let Some(from) = query.from {
        filter.push_str(" AND (end_date IS NULL OR end_date >= ?)");
        args.push(Value::Text(from.to_string()));
    }
    if let Some(to) = query.to {
        filter.push_str(" AND start_date <= ?");
        args.push(Value::Text(to.to_string()));
    }

    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM events{filter}"),
        params_from_iter(args.iter()),
        |row| row.get(0),
    )?;

    let (limit, offset) = limit_offset(page, per_page);
    args.push(Value::Integer(limit));
    args.push(Value::Integer(offset));
    let mut stmt = conn.prepare(&format!(
        "{}{filter} ORDER BY start_date, id LIMIT ? OFFSET ?",
        event_select()
    ))?;
    let items = stmt
        .query_map(params_from_iter(args.iter()), event_record_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(Page {
        items,
        page,
        per_page,
        total,
    }))
}

pub async fn create_event(
    State(db): State<DbConn>,
    Json(req): Json<CreateEventRequest>,
) -> ApiResult<(StatusCode, Json<EventRecord>)> {
    let event = req.to_event();
    validation::validate_event(&event)?;

    let now = db::now();
    let conn = db.lock()?;
    ensure_client(&conn, req.client_id)?;

    let [kind, frequency, amount, start, end, day, month] = event_params(&event);
    conn.execute(
        "INSERT INTO events (client_id, kind, frequency, amount, start_date, end_date,
            execution_day, execution_month, description, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            req.client_id.0,
            kind,
            frequency,
            amount,
            start,
            end,
            day,
            month,
            req.description,
            now,
            now
        ],
    )?;
    let id = EventId(conn.last_insert_rowid());

    Ok((
        StatusCode::CREATED,
        Json(EventRecord {
            id,
            client_id: req.client_id,
            event,
            description: req.description,
            created_at: now.clone(),
            updated_at: now,
        }),
    ))
}

pub async fn get_event(
    State(db): State<DbConn>,
    Path(id): Path<EventId>,
) -> ApiResult<Json<EventRecord>> {
    let conn = db.lock()?;
    Ok(Json(load_event(&conn, id)?))
}

pub async fn update_event(
    State(db): State<DbConn>,
    Path(id): Path<EventId>,
    Json(req): Json<UpdateEventRequest>,
) -> ApiResult<Json<EventRecord>> {
    let conn = db.lock()?;
    let mut record = load_event(&conn, id)?;

    req.apply(&mut record.event);
    validation::validate_event(&record.event)?;
    if let Some(description) = req.description {
        record.description = description;
    }
    record.updated_at = db::now();

    let [kind, frequency, amount, start, end, day, month] = event_params(&record.event);
    conn.execute(
        "UPDATE events SET kind = ?1, frequency = ?2, amount = ?3, start_date = ?4,
            end_date = ?5, execution_day = ?6, execution_month = ?7, description = ?8,
            updated_at = ?9
         WHERE id = ?10",
        params![
            kind,
            frequency,
            amount,
            start,
            end,
            day,
            month,
            record.description,
            record.updated_at,
            id.0
        ],
    )?;

    Ok(Json(record))
}

pub async fn delete_event(
    State(db): State<DbConn>,
    Path(id): Path<EventId>,
) -> ApiResult<StatusCode> {
    let conn = db.lock()?;
    let affected = conn.execute("DELETE FROM events WHERE id = ?1", [id.0])?;

    if affected == 0 {
        Err(ApiError::EventNotFound(id))
    } else {
        Ok(StatusCode::NO_CONTENT)
    }
}
