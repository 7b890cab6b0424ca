use std::str::FromStr;
use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row, types::Type};

pub(crate) mod store;

pub use store::SqliteStore;

pub type DbConn = Arc<Mutex<Connection>>;

pub fn init_db(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS clients (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT,
            alignment_percent REAL,
            alignment_category TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            client_id INTEGER NOT NULL,
            kind TEXT NOT NULL,
            frequency TEXT NOT NULL,
            amount REAL NOT NULL,
            start_date TEXT NOT NULL,
            end_date TEXT,
            execution_day INTEGER,
            execution_month INTEGER,
            description TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (client_id) REFERENCES clients(id) ON DELETE CASCADE
        );
        CREATE INDEX IF NOT EXISTS idx_events_client_start ON events(client_id, start_date);

        CREATE TABLE IF NOT EXISTS goals (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            client_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            target_value REAL NOT NULL,
            target_date TEXT NOT NULL,
            notes TEXT,
            created_at TEXT NOT NULL,
            FOREIGN KEY (client_id) REFERENCES clients(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS portfolio_snapshots (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            client_id INTEGER NOT NULL,
            kind TEXT NOT NULL,
            as_of_date TEXT NOT NULL,
            total_value REAL NOT NULL,
            created_at TEXT NOT NULL,
            UNIQUE (client_id, kind, as_of_date),
            FOREIGN KEY (client_id) REFERENCES clients(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS allocations (
            snapshot_id INTEGER NOT NULL,
            asset_class TEXT NOT NULL,
            percent REAL NOT NULL,
            PRIMARY KEY (snapshot_id, asset_class),
            FOREIGN KEY (snapshot_id) REFERENCES portfolio_snapshots(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS simulations (
            id TEXT PRIMARY KEY,
            client_id INTEGER NOT NULL,
            name TEXT,
            version INTEGER NOT NULL,
            rate REAL NOT NULL,
            until_year INTEGER NOT NULL,
            inputs TEXT NOT NULL,
            series TEXT NOT NULL,
            created_at TEXT NOT NULL,
            UNIQUE (client_id, version),
            FOREIGN KEY (client_id) REFERENCES clients(id) ON DELETE CASCADE
        );",
    )
}

/// Open (or create) the database at `path` and make sure the schema exists
///
/// `:memory:` gives a private in-memory database.
pub fn open(path: &str) -> Result<DbConn, rusqlite::Error> {
    let conn = Connection::open(path)?;
    init_db(&conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}

/// Read a TEXT column and parse it, reporting failures as conversion errors
pub(crate) fn parse_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn parse_optional_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| {
        s.parse()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}

pub(crate) fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

pub(crate) fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Read a TEXT column holding JSON
pub(crate) fn json_column<T: serde::de::DeserializeOwned>(
    row: &Row<'_>,
    idx: usize,
) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
