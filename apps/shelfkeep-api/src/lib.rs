//! # Shelfkeep API
//!
//! JSON/HTTP server for the Shelfkeep inventory dashboard.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Shelfkeep API                                   │
//! │                                                                         │
//! │  Dashboard ──► auth gateway ──► axum (5000) ──► routes ──► shelfkeep-db │
//! │                 (sets x-user-*)        │                       │        │
//! │                                        ▼                       ▼        │
//! │                               Caller extractor          LedgerService   │
//! │                               + role check              TracingObserver │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables (a `.env` file is honoured):
//! - `SHELFKEEP_HOST` - bind address (default: 0.0.0.0)
//! - `SHELFKEEP_PORT` - HTTP port (default: 5000)
//! - `SHELFKEEP_DB_PATH` - SQLite file (default: ./data/shelfkeep.db)
//! - `SHELFKEEP_DB_MAX_CONNECTIONS` - pool size (default: 5)
//! - `SHELFKEEP_CORS_ORIGIN` - dashboard origin (default: http://localhost:5173)
//! - `RUST_LOG` - log filter

pub mod config;
pub mod error;
pub mod observer;
pub mod principal;
pub mod routes;
pub mod state;

// Re-exports
pub use config::{ApiConfig, ConfigError};
pub use error::{ApiError, ErrorCode};
pub use principal::Caller;
pub use routes::{app, router};
pub use state::AppState;
