//! # Repository Module
//!
//! Database repository implementations for Shelfkeep.
//!
//! ## Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  HTTP handler                                                           │
//! │       │  db.products().create_or_restock(tenant, user, &input)         │
//! │       ▼                                                                 │
//! │  ProductRepository / SaleRepository      (pool-level, public)          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  product::fetch / write, sale::insert    (connection-level, crate)     │
//! │       ▲                                                                 │
//! │       │  same functions, inside one transaction                        │
//! │  LedgerService                                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every query is scoped by `tenant_id`; a row from another tenant is
//! indistinguishable from a missing one.
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Catalogue CRUD and restock
//! - [`SaleRepository`](sale::SaleRepository) - Sales queries

pub mod product;
pub mod sale;
