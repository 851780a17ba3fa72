//! # shelfkeep-db: Database Layer for Shelfkeep
//!
//! SQLite persistence for products and sales, plus the transactional
//! ledger service that records and reverses sales.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Shelfkeep Data Flow                              │
//! │                                                                         │
//! │  HTTP handler (POST /sales)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   shelfkeep-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │ LedgerService │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │  (ledger.rs)  │───►│ ProductRepo   │    │  (embedded)  │  │   │
//! │  │   │ one tx per    │    │ SaleRepo      │    │ 001_init.sql │  │   │
//! │  │   │ sale/reversal │    │               │    │              │  │   │
//! │  │   └───────┬───────┘    └───────┬───────┘    └──────────────┘  │   │
//! │  │           │ shelfkeep_core::ledger                              │   │
//! │  │           ▼                    ▼                                │   │
//! │  │   ┌─────────────────────────────────────────┐                  │   │
//! │  │   │ Database (pool.rs) - SqlitePool         │                  │   │
//! │  │   └─────────────────────────────────────────┘                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (./data/shelfkeep.db by default)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Product and sale repositories
//! - [`ledger`] - Atomic apply / reverse of sales
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shelfkeep_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./data/shelfkeep.db")).await?;
//!
//! let products = db.products().list(tenant_id).await?;
//! let recorded = db
//!     .ledger(Arc::new(NoOpObserver))
//!     .apply_sale(tenant_id, user_id, &product_id, 25.0, StockUnit::Card)
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod ledger;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use ledger::{LedgerService, RecordedSale, ReversedSale};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::product::{ProductRepository, UpsertOutcome};
pub use repository::sale::SaleRepository;
