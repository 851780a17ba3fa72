//! Shared application state.

use std::sync::Arc;

use shelfkeep_db::{Database, LedgerService};

use crate::observer::TracingObserver;

/// Handles every request needs; cloned into each handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub ledger: LedgerService,
}

impl AppState {
    /// Wraps `db` with a ledger that logs every committed change.
    pub fn new(db: Database) -> Self {
        let ledger = db.ledger(Arc::new(TracingObserver));
        AppState { db, ledger }
    }
}
