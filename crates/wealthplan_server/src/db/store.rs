//! SQLite-backed [`AdvisoryStore`]

use jiff::civil::Date;
use rusqlite::{Connection, OptionalExtension, params, params_from_iter, types::Value};
use wealthplan_core::StoreError;
use wealthplan_core::model::{
    Allocation, AlignmentCategory, AllocationSnapshot, CashFlowEvent, ClientId, Goal, GoalId,
    SnapshotKind,
};
use wealthplan_core::store::{AdvisoryStore, DateWindow};

use super::{now, parse_column, parse_optional_column};

/// Borrowed view of an open connection
///
/// Handlers lock the shared connection once and hand this to the engine for
/// the duration of the request.
pub struct SqliteStore<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

fn store_error(err: rusqlite::Error) -> StoreError {
    match err {
        rusqlite::Error::FromSqlConversionFailure(..) | rusqlite::Error::InvalidColumnType(..) => {
            StoreError::Corrupt(err.to_string())
        }
        other => StoreError::Unavailable(other.to_string()),
    }
}

pub(crate) const EVENT_COLUMNS: &str =
    "kind, frequency, amount, start_date, end_date, execution_day, execution_month";

/// Map the seven [`EVENT_COLUMNS`] starting at `offset`
pub(crate) fn event_from_row(row: &rusqlite::Row<'_>, offset: usize) -> rusqlite::Result<CashFlowEvent> {
    Ok(CashFlowEvent {
        kind: parse_column(row, offset)?,
        frequency: parse_column(row, offset + 1)?,
        amount: row.get(offset + 2)?,
        start: parse_column(row, offset + 3)?,
        end: parse_optional_column(row, offset + 4)?,
        execution_day: row.get(offset + 5)?,
        execution_month: row.get(offset + 6)?,
    })
}

pub(crate) fn load_allocations(
    conn: &Connection,
    snapshot_id: i64,
) -> rusqlite::Result<Vec<Allocation>> {
    let mut stmt = conn.prepare(
        "SELECT asset_class, percent FROM allocations WHERE snapshot_id = ?1 ORDER BY rowid",
    )?;
    stmt.query_map([snapshot_id], |row| {
        Ok(Allocation {
            asset_class: parse_column(row, 0)?,
            percent: row.get(1)?,
        })
    })?
    .collect()
}

impl AdvisoryStore for SqliteStore<'_> {
    fn latest_snapshot(
        &self,
        client: ClientId,
        kind: SnapshotKind,
    ) -> Result<Option<AllocationSnapshot>, StoreError> {
        let head = self
            .conn
            .query_row(
                "SELECT id, as_of_date, total_value FROM portfolio_snapshots
                 WHERE client_id = ?1 AND kind = ?2
                 ORDER BY as_of_date DESC, id DESC LIMIT 1",
                params![client.0, kind.as_str()],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        parse_column::<Date>(row, 1)?,
                        row.get::<_, f64>(2)?,
                    ))
                },
            )
            .optional()
            .map_err(store_error)?;

        let Some((id, as_of_date, total_value)) = head else {
            return Ok(None);
        };
        let allocations = load_allocations(self.conn, id).map_err(store_error)?;
        Ok(Some(AllocationSnapshot {
            kind,
            as_of_date,
            total_value,
            allocations,
        }))
    }

    fn events(
        &self,
        client: ClientId,
        window: Option<DateWindow>,
    ) -> Result<Vec<CashFlowEvent>, StoreError> {
        let mut sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE client_id = ?1");
        let mut args: Vec<Value> = vec![Value::Integer(client.0)];
        if let Some(w) = window {
            // ISO dates compare correctly as text.
            sql.push_str(" AND start_date <= ?2 AND (end_date IS NULL OR end_date >= ?3)");
            args.push(Value::Text(w.to.to_string()));
            args.push(Value::Text(w.from.to_string()));
        }
        sql.push_str(" ORDER BY start_date, id");

        let mut stmt = self.conn.prepare(&sql).map_err(store_error)?;
        stmt.query_map(params_from_iter(args), |row| event_from_row(row, 0))
            .map_err(store_error)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(store_error)
    }

    fn goals(&self, client: ClientId) -> Result<Vec<Goal>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, name, target_value, target_date FROM goals
                 WHERE client_id = ?1 ORDER BY target_date, id",
            )
            .map_err(store_error)?;
        stmt.query_map([client.0], |row| {
            Ok(Goal {
                goal_id: GoalId(row.get(0)?),
                name: row.get(1)?,
                target_value: row.get(2)?,
                target_date: parse_column(row, 3)?,
            })
        })
        .map_err(store_error)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(store_error)
    }

    fn write_alignment(
        &self,
        client: ClientId,
        percent: Option<f64>,
        category: Option<AlignmentCategory>,
    ) -> Result<(), StoreError> {
        self.conn
            .execute(
                "UPDATE clients SET alignment_percent = ?1, alignment_category = ?2, updated_at = ?3
                 WHERE id = ?4",
                params![percent, category.map(|c| c.as_str()), now(), client.0],
            )
            .map_err(store_error)?;
        Ok(())
    }
}
