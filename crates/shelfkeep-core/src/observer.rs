//! Notification hook for committed ledger changes.
//!
//! The database ledger service calls the observer after each transaction
//! commits. Implementations must not block; the HTTP app installs one that
//! writes structured log events.

use crate::types::{Product, Sale};

/// Receives ledger changes after they are durable.
pub trait LedgerObserver: Send + Sync {
    /// A sale was recorded and `product` is its post-sale state.
    fn sale_recorded(&self, sale: &Sale, product: &Product);

    /// A sale was deleted. `product` is `None` when the product no longer
    /// exists, and otherwise reflects any restored stock.
    fn sale_reversed(&self, sale: &Sale, product: Option<&Product>);
}

/// Observer that ignores every event. Used in tests.
pub struct NoOpObserver;

impl LedgerObserver for NoOpObserver {
    fn sale_recorded(&self, _sale: &Sale, _product: &Product) {}
    fn sale_reversed(&self, _sale: &Sale, _product: Option<&Product>) {}
}
