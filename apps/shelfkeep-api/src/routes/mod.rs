//! # HTTP Routes
//!
//! ```text
//! GET    /health            liveness + database check
//! POST   /products          create or restock          admin
//! GET    /products          list                       any role
//! GET    /products/{id}     get                        any role
//! PUT    /products/{id}     update                     admin
//! DELETE /products/{id}     delete                     admin
//! POST   /sales             record sale                storekeeper
//! GET    /sales             all sales                  admin
//! GET    /sales/today       today's sales              any role
//! GET    /sales/mine        caller's sales             storekeeper
//! GET    /sales/summary     daily/weekly/monthly       any role (own sales for storekeepers)
//! DELETE /sales/{id}        delete + restore stock     admin
//! ```
//!
//! Handlers extract the [`Caller`](crate::principal::Caller), authorize the
//! action, then delegate to `shelfkeep-db`. Every query is scoped to the
//! caller's tenant.

pub mod products;
pub mod sales;

use axum::extract::State;
use axum::http::{header, HeaderName, HeaderValue, Method, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::{ApiConfig, ConfigError};
use crate::principal::{TENANT_ID_HEADER, USER_ID_HEADER, USER_ROLE_HEADER};
use crate::state::AppState;

/// All routes, without middleware.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(products::routes())
        .merge(sales::routes())
        .with_state(state)
}

/// The served application: routes plus request tracing and CORS.
pub fn app(state: AppState, config: &ApiConfig) -> Result<Router, ConfigError> {
    let origin = HeaderValue::from_str(&config.cors_origin)
        .map_err(|_| ConfigError::InvalidValue("SHELFKEEP_CORS_ORIGIN".to_string()))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(USER_ID_HEADER),
            HeaderName::from_static(TENANT_ID_HEADER),
            HeaderName::from_static(USER_ROLE_HEADER),
        ]);

    Ok(router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors))
}

// =============================================================================
// Health
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationStatus {
    pub total: usize,
    pub applied: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub migrations: Option<MigrationStatus>,
}

async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = state.db.health_check().await;

    let migrations = match shelfkeep_db::migrations::migration_status(state.db.pool()).await {
        Ok((total, applied)) => Some(MigrationStatus { total, applied }),
        Err(e) => {
            warn!(error = %e, "Could not read migration status");
            None
        }
    };

    let healthy = database && migrations.as_ref().is_some_and(|m| m.total == m.applied);
    let (status, label) = if healthy {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status,
        Json(HealthResponse {
            status: label,
            database,
            migrations,
        }),
    )
}
