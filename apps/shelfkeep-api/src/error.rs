//! # API Error Types
//!
//! What the dashboard sees when a request fails.
//!
//! ## Status Mapping
//! ```text
//! ┌──────────────────────────────────────────┬────────┬──────────────────────┐
//! │ Source                                   │ Status │ code                 │
//! ├──────────────────────────────────────────┼────────┼──────────────────────┤
//! │ ValidationError, bad JSON body           │ 400    │ VALIDATION_FAILED    │
//! │ missing / invalid principal headers      │ 401    │ UNAUTHORIZED         │
//! │ CoreError::Forbidden                     │ 403    │ FORBIDDEN            │
//! │ ProductNotFound, SaleNotFound, NotFound  │ 404    │ NOT_FOUND            │
//! │ UniqueViolation                          │ 409    │ DUPLICATE            │
//! │ Conflict / Busy after retries            │ 409    │ CONFLICT             │
//! │ IncompatibleUnit                         │ 422    │ INCOMPATIBLE_UNIT    │
//! │ InsufficientStock (+ available)          │ 422    │ INSUFFICIENT_STOCK   │
//! │ PriceNotConfigured                       │ 422    │ PRICE_NOT_CONFIGURED │
//! │ anything else                            │ 500    │ INTERNAL             │
//! └──────────────────────────────────────────┴────────┴──────────────────────┘
//! ```
//!
//! 500s are logged with their cause; the client only sees a generic message.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::error;

use shelfkeep_core::CoreError;
use shelfkeep_db::DbError;

/// Machine-readable error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationFailed,
    Unauthorized,
    Forbidden,
    NotFound,
    Duplicate,
    Conflict,
    IncompatibleUnit,
    InsufficientStock,
    PriceNotConfigured,
    Internal,
}

/// JSON error body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
    /// Stock on hand in the requested unit, for `INSUFFICIENT_STOCK`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<f64>,
}

/// An error ready to be sent as an HTTP response.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            status,
            body: ErrorBody {
                code,
                message: message.into(),
                available: None,
            },
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, ErrorCode::Unauthorized, message)
    }

    fn internal(cause: &dyn std::fmt::Display) -> Self {
        error!(error = %cause, "Request failed");
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::Internal,
            "Internal server error",
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::Validation(_) => {
                ApiError::new(StatusCode::BAD_REQUEST, ErrorCode::ValidationFailed, message)
            }
            CoreError::ProductNotFound(_) | CoreError::SaleNotFound(_) => {
                ApiError::new(StatusCode::NOT_FOUND, ErrorCode::NotFound, message)
            }
            CoreError::Forbidden { .. } => {
                ApiError::new(StatusCode::FORBIDDEN, ErrorCode::Forbidden, message)
            }
            CoreError::IncompatibleUnit { .. } => ApiError::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::IncompatibleUnit,
                message,
            ),
            CoreError::PriceNotConfigured { .. } => ApiError::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::PriceNotConfigured,
                message,
            ),
            CoreError::InsufficientStock { available, .. } => {
                let mut api = ApiError::new(
                    StatusCode::UNPROCESSABLE_ENTITY,
                    ErrorCode::InsufficientStock,
                    message,
                );
                api.body.available = Some(available);
                api
            }
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Domain(core) => core.into(),
            DbError::NotFound { .. } => {
                ApiError::new(StatusCode::NOT_FOUND, ErrorCode::NotFound, err.to_string())
            }
            DbError::UniqueViolation { .. } => {
                ApiError::new(StatusCode::CONFLICT, ErrorCode::Duplicate, err.to_string())
            }
            DbError::Conflict { .. } | DbError::Busy => ApiError::new(
                StatusCode::CONFLICT,
                ErrorCode::Conflict,
                "The record is busy; please try again",
            ),
            other => ApiError::internal(&other),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::new(
            StatusCode::BAD_REQUEST,
            ErrorCode::ValidationFailed,
            rejection.body_text(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelfkeep_core::{StockUnit, ValidationError};

    #[test]
    fn test_insufficient_stock_carries_available() {
        let err: ApiError = CoreError::InsufficientStock {
            product: "Marlboro Red".into(),
            available: 200.0,
            requested: 300.0,
            unit: StockUnit::Card,
        }
        .into();

        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.body.code, ErrorCode::InsufficientStock);
        assert_eq!(err.body.available, Some(200.0));

        let json = serde_json::to_value(&err.body).unwrap();
        assert_eq!(json["code"], "INSUFFICIENT_STOCK");
        assert_eq!(json["available"], 200.0);
    }

    #[test]
    fn test_status_mapping() {
        let cases: Vec<(ApiError, StatusCode)> = vec![
            (
                CoreError::Validation(ValidationError::Required { field: "name".into() }).into(),
                StatusCode::BAD_REQUEST,
            ),
            (CoreError::SaleNotFound("s-1".into()).into(), StatusCode::NOT_FOUND),
            (
                CoreError::IncompatibleUnit {
                    stock_type: StockUnit::Bottle,
                    sale_unit: StockUnit::Card,
                }
                .into(),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (DbError::duplicate("name", "X").into(), StatusCode::CONFLICT),
            (DbError::Busy.into(), StatusCode::CONFLICT),
            (
                DbError::Domain(CoreError::ProductNotFound("p-1".into())).into(),
                StatusCode::NOT_FOUND,
            ),
            (
                DbError::QueryFailed("disk I/O error".into()).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(err.status, status, "{:?}", err.body);
        }
    }

    #[test]
    fn test_internal_errors_are_opaque() {
        let err: ApiError = DbError::Internal("secret path /var/db".into()).into();
        assert_eq!(err.body.message, "Internal server error");
        assert!(err.body.available.is_none());
    }
}
