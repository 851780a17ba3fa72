//! Ledger observer that writes committed changes to the log.

use tracing::info;

use shelfkeep_core::{LedgerObserver, Product, Sale};

/// Emits one structured `info` event per committed ledger change.
pub struct TracingObserver;

impl LedgerObserver for TracingObserver {
    fn sale_recorded(&self, sale: &Sale, product: &Product) {
        info!(
            target: "shelfkeep::ledger",
            event = "sale_recorded",
            tenant_id = %sale.tenant_id,
            sale_id = %sale.id,
            product_id = %product.id,
            sold_by = %sale.sold_by,
            quantity = sale.quantity,
            sale_unit = %sale.sale_unit,
            total_price = sale.total_price,
            stock_quantity = product.stock_quantity,
            stock_type = %product.stock_type(),
            "Ledger change committed"
        );
    }

    fn sale_reversed(&self, sale: &Sale, product: Option<&Product>) {
        info!(
            target: "shelfkeep::ledger",
            event = "sale_reversed",
            tenant_id = %sale.tenant_id,
            sale_id = %sale.id,
            product_id = %sale.product_id,
            stock_quantity = product.map(|p| p.stock_quantity),
            "Ledger change committed"
        );
    }
}
