use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use wealthplan_core::model::{ClientId, EventId};
use wealthplan_core::{AdvisoryError, SimulationError, StoreError};

/// Custom error types for the advisory API
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Client not found: {0}")]
    ClientNotFound(ClientId),

    #[error("Event not found: {0}")]
    EventNotFound(EventId),

    #[error("Simulation not found: {0}")]
    SimulationNotFound(String),

    #[error("No CURRENT snapshot found for client {0}")]
    BaselineNotFound(ClientId),

    #[error("Invalid parameter: {field} - {message}")]
    ValidationError { field: String, message: String },

    #[error("Version conflict, please retry")]
    VersionConflict,

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Mutex lock error")]
    LockError,
}

impl ApiError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<rusqlite::Error> for ApiError {
    fn from(err: rusqlite::Error) -> Self {
        ApiError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::SerializationError(err.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for ApiError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        ApiError::LockError
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::DatabaseError(err.to_string())
    }
}

impl From<SimulationError> for ApiError {
    fn from(err: SimulationError) -> Self {
        let field = match err {
            SimulationError::InvalidHorizon { .. } => "startYear",
            SimulationError::YearOutOfRange(_) => "untilYear",
            SimulationError::InvalidStartMonth(_) => "start_month",
            SimulationError::InvalidRate(_) => "rate",
            SimulationError::InvalidRoundStep(_) => "roundStep",
        };
        ApiError::validation(field, err.to_string())
    }
}

impl From<AdvisoryError> for ApiError {
    fn from(err: AdvisoryError) -> Self {
        match err {
            AdvisoryError::NoBaseline(client) => ApiError::BaselineNotFound(client),
            AdvisoryError::Store(e) => e.into(),
            AdvisoryError::Simulation(e) => e.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::ClientNotFound(_)
            | ApiError::EventNotFound(_)
            | ApiError::SimulationNotFound(_)
            | ApiError::BaselineNotFound(_) => {
                tracing::debug!("{self}");
                (StatusCode::NOT_FOUND, json!({ "error": self.to_string() }))
            }

            ApiError::ValidationError { field, message } => {
                tracing::debug!("{self}");
                (
                    StatusCode::BAD_REQUEST,
                    json!({ "errors": [{ "field": field, "message": message }] }),
                )
            }

            ApiError::VersionConflict => {
                (StatusCode::CONFLICT, json!({ "error": self.to_string() }))
            }

            ApiError::DatabaseError(_) => {
                tracing::error!("Database error: {self}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal database error" }),
                )
            }

            ApiError::SerializationError(_) | ApiError::LockError => {
                tracing::error!("Internal error: {self}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Helper type for API results
pub type ApiResult<T> = Result<T, ApiError>;
