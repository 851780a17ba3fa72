//! # shelfkeep-core: Pure Business Logic for Shelfkeep
//!
//! This crate holds every stock and sales rule as pure functions with zero
//! I/O dependencies. The database crate and the HTTP app call into it.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Shelfkeep Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Dashboard (admin / storekeeper)                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP + JSON                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    shelfkeep-api (axum)                         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ shelfkeep-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │  ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌─────────┐  │   │
//! │  │  │  types  │ │  units  │ │ ledger  │ │ catalog  │ │ summary │  │   │
//! │  │  │ Product │ │ factors │ │ apply / │ │  input   │ │ daily / │  │   │
//! │  │  │  Sale   │ │ prices  │ │ reverse │ │  checks  │ │ monthly │  │   │
//! │  │  └─────────┘ └─────────┘ └─────────┘ └──────────┘ └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 shelfkeep-db (Database Layer)                   │   │
//! │  │         SQLite repositories, transactional ledger service       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, StockProfile, Sale)
//! - [`units`] - Sale-unit to stock-unit conversion table and price lookup
//! - [`ledger`] - `apply_sale` / `reverse_sale` stock arithmetic
//! - [`catalog`] - Product input validation into tagged stock profiles
//! - [`access`] - Roles, principals and the access policy
//! - [`summary`] - Daily / weekly / monthly sales totals
//! - [`observer`] - Notification hook for ledger changes
//! - [`validation`] - Field-level validators
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use shelfkeep_core::types::{StockProfile, StockUnit};
//! use shelfkeep_core::units::conversion;
//!
//! let profile = StockProfile::Packet {
//!     cards_per_packet: 20,
//!     price_per_packet: 90.0,
//!     price_per_card: 5.0,
//! };
//!
//! // 25 cards out of a packet-denominated stock
//! let conv = conversion(&profile, StockUnit::Card).unwrap();
//! assert_eq!(conv.to_stock_units(25.0), 1.25);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod access;
pub mod catalog;
pub mod error;
pub mod ledger;
pub mod observer;
pub mod summary;
pub mod types;
pub mod units;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use access::{Action, Principal, Role};
pub use error::{CoreError, CoreResult, ValidationError};
pub use ledger::{Restoration, SaleQuote};
pub use observer::{LedgerObserver, NoOpObserver};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Tenant used when the gateway does not assert one.
///
/// The schema is multi-tenant; single-store deployments all live here.
pub const DEFAULT_TENANT_ID: &str = "00000000-0000-0000-0000-000000000001";

/// Rounding allowance of the availability check, in ulps of the available
/// quantity.
///
/// Stock is a real number, so `1 carton - 1/3 carton` leaves a balance that
/// converts back to `1.9999999999999998` packets. A request for exactly the
/// remaining `2` packets is honoured and the balance is clamped at zero.
/// The allowance scales with the balance, so empty stock has none.
pub const STOCK_TOLERANCE_ULPS: f64 = 4.0;

/// Maximum length of a product name.
pub const MAX_NAME_LEN: usize = 200;

/// Maximum length of a product category.
pub const MAX_CATEGORY_LEN: usize = 100;

/// Maximum length of a product description.
pub const MAX_DESCRIPTION_LEN: usize = 300;
