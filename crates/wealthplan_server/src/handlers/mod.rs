use rusqlite::{Connection, OptionalExtension};
use wealthplan_core::model::ClientId;

use crate::error::{ApiError, ApiResult};

pub mod advisory_handlers;
pub mod client_handlers;
pub mod event_handlers;
pub mod goal_handlers;
pub mod portfolio_handlers;
pub mod projection_handlers;
pub mod simulation_handlers;

pub use advisory_handlers::*;
pub use client_handlers::*;
pub use event_handlers::*;
pub use goal_handlers::*;
pub use portfolio_handlers::*;
pub use projection_handlers::*;
pub use simulation_handlers::*;

/// Fail with 404 unless `client` exists
pub(crate) fn ensure_client(conn: &Connection, client: ClientId) -> ApiResult<()> {
    conn.query_row("SELECT 1 FROM clients WHERE id = ?1", [client.0], |_| Ok(()))
        .optional()?
        .ok_or(ApiError::ClientNotFound(client))
}

/// SQL `LIMIT`/`OFFSET` pair for a validated page
pub(crate) fn limit_offset(page: u32, per_page: u32) -> (i64, i64) {
    let per_page = i64::from(per_page);
    (per_page, (i64::from(page) - 1) * per_page)
}
