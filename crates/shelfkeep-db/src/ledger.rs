//! # Ledger Service
//!
//! Runs sales and sale reversals as atomic read-modify-write transactions.
//!
//! ## Sale Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  apply_sale(tenant, seller, product_id, quantity, unit)                 │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    product = SELECT ... WHERE id = ?          ─► ProductNotFound        │
//! │    quote   = ledger::apply_sale(&mut product) ─► Incompatible /         │
//! │                                                  Insufficient / Price   │
//! │    UPDATE products ... WHERE version = ?      ─► Conflict ─┐            │
//! │    INSERT INTO sales ...                                   │            │
//! │  COMMIT                                                    │            │
//! │    observer.sale_recorded(&sale, &product)                 │            │
//! │                                                            │            │
//! │  Conflict / Busy: roll back and start over ◄───────────────┘            │
//! │  (at most MAX_WRITE_ATTEMPTS attempts)                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A rejected sale rolls back before anything is written, so stock and the
//! sales table are left exactly as they were.

use std::sync::Arc;

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{info, warn};

use shelfkeep_core::ledger::{self, Restoration};
use shelfkeep_core::{CoreError, LedgerObserver, Product, Sale, StockUnit};

use crate::error::DbResult;
use crate::repository::{product, sale};

/// Attempts per write before a conflict is returned to the caller.
pub const MAX_WRITE_ATTEMPTS: u32 = 3;

/// A committed sale.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedSale {
    pub sale: Sale,
    /// The product after the sale.
    pub product: Product,
}

/// A committed sale deletion.
#[derive(Debug, Clone, PartialEq)]
pub struct ReversedSale {
    pub sale: Sale,
    /// The product after restoration; `None` if it no longer exists.
    pub updated_product: Option<Product>,
    /// Whether stock was added back.
    pub restored: bool,
}

/// Transactional sale recording and reversal.
///
/// Cheap to clone; clones share the pool and the observer.
#[derive(Clone)]
pub struct LedgerService {
    pool: SqlitePool,
    observer: Arc<dyn LedgerObserver>,
}

impl std::fmt::Debug for LedgerService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerService").finish_non_exhaustive()
    }
}

impl LedgerService {
    pub fn new(pool: SqlitePool, observer: Arc<dyn LedgerObserver>) -> Self {
        LedgerService { pool, observer }
    }

    /// Records a sale of `quantity` `sale_unit`s and decrements stock.
    ///
    /// ## Errors
    /// * `Domain(ProductNotFound)` - No such product in this tenant
    /// * `Domain(Validation)` - Quantity not a positive number
    /// * `Domain(IncompatibleUnit)` - Unit not sellable for this product
    /// * `Domain(InsufficientStock)` - More than is on hand
    /// * `Domain(PriceNotConfigured)` - No price for the sale unit
    /// * `Conflict` / `Busy` - Still contended after every attempt
    pub async fn apply_sale(
        &self,
        tenant_id: &str,
        sold_by: &str,
        product_id: &str,
        quantity: f64,
        sale_unit: StockUnit,
    ) -> DbResult<RecordedSale> {
        let mut attempt = 1;
        let recorded = loop {
            match self
                .try_apply_sale(tenant_id, sold_by, product_id, quantity, sale_unit)
                .await
            {
                Err(err) if err.is_retryable() && attempt < MAX_WRITE_ATTEMPTS => {
                    warn!(attempt, product_id = %product_id, error = %err, "Retrying sale");
                    attempt += 1;
                }
                outcome => break outcome?,
            }
        };

        info!(
            sale_id = %recorded.sale.id,
            product_id = %recorded.product.id,
            quantity = recorded.sale.quantity,
            sale_unit = %recorded.sale.sale_unit,
            total_price = recorded.sale.total_price,
            stock_quantity = recorded.product.stock_quantity,
            "Sale recorded"
        );
        self.observer.sale_recorded(&recorded.sale, &recorded.product);

        Ok(recorded)
    }

    async fn try_apply_sale(
        &self,
        tenant_id: &str,
        sold_by: &str,
        product_id: &str,
        quantity: f64,
        sale_unit: StockUnit,
    ) -> DbResult<RecordedSale> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let mut current = product::fetch(&mut tx, tenant_id, product_id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

        let quote = ledger::apply_sale(&mut current, quantity, sale_unit)?;
        current.updated_at = now;

        let stored = product::write(&mut tx, &current).await?;
        let recorded = quote.record(&stored, sold_by, now);
        sale::insert(&mut tx, &recorded).await?;

        tx.commit().await?;

        Ok(RecordedSale {
            sale: recorded,
            product: stored,
        })
    }

    /// Deletes a sale, adding its quantity back to the product if possible.
    ///
    /// Restoration is skipped, and the sale still deleted, when the product
    /// is gone or its current stock unit can no longer express the sale.
    ///
    /// ## Errors
    /// * `Domain(SaleNotFound)` - No such sale in this tenant
    /// * `Conflict` / `Busy` - Still contended after every attempt
    pub async fn reverse_sale(&self, tenant_id: &str, sale_id: &str) -> DbResult<ReversedSale> {
        let mut attempt = 1;
        let reversed = loop {
            match self.try_reverse_sale(tenant_id, sale_id).await {
                Err(err) if err.is_retryable() && attempt < MAX_WRITE_ATTEMPTS => {
                    warn!(attempt, sale_id = %sale_id, error = %err, "Retrying sale reversal");
                    attempt += 1;
                }
                outcome => break outcome?,
            }
        };

        info!(
            sale_id = %reversed.sale.id,
            product_id = %reversed.sale.product_id,
            restored = reversed.restored,
            "Sale deleted"
        );
        self.observer
            .sale_reversed(&reversed.sale, reversed.updated_product.as_ref());

        Ok(reversed)
    }

    async fn try_reverse_sale(&self, tenant_id: &str, sale_id: &str) -> DbResult<ReversedSale> {
        let mut tx = self.pool.begin().await?;

        let existing = sale::fetch(&mut tx, tenant_id, sale_id)
            .await?
            .ok_or_else(|| CoreError::SaleNotFound(sale_id.to_string()))?;

        let mut restored = false;
        let updated_product = match product::fetch(&mut tx, tenant_id, &existing.product_id).await? {
            Some(mut current) => match ledger::reverse_sale(&mut current, &existing) {
                Restoration::Restored { .. } => {
                    current.updated_at = Utc::now();
                    restored = true;
                    Some(product::write(&mut tx, &current).await?)
                }
                Restoration::Skipped { reason } => {
                    warn!(
                        sale_id = %existing.id,
                        product_id = %current.id,
                        reason = %reason,
                        "Stock not restored for deleted sale"
                    );
                    Some(current)
                }
            },
            None => {
                warn!(
                    sale_id = %existing.id,
                    product_id = %existing.product_id,
                    "Product no longer exists; deleting sale without restoring stock"
                );
                None
            }
        };

        sale::delete(&mut tx, tenant_id, sale_id).await?;
        tx.commit().await?;

        Ok(ReversedSale {
            sale: existing,
            updated_product,
            restored,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::{Database, DbConfig};
    use shelfkeep_core::catalog::ProductInput;
    use shelfkeep_core::{NoOpObserver, StockColumns, DEFAULT_TENANT_ID};
    use std::sync::Mutex;

    const SELLER: &str = "storekeeper-1";

    #[derive(Default)]
    struct RecordingObserver {
        recorded: Mutex<Vec<String>>,
        reversed: Mutex<Vec<(String, bool)>>,
    }

    impl LedgerObserver for RecordingObserver {
        fn sale_recorded(&self, sale: &Sale, _product: &Product) {
            self.recorded.lock().unwrap().push(sale.id.clone());
        }

        fn sale_reversed(&self, sale: &Sale, product: Option<&Product>) {
            self.reversed
                .lock()
                .unwrap()
                .push((sale.id.clone(), product.is_some()));
        }
    }

    async fn setup() -> (Database, LedgerService) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ledger = db.ledger(Arc::new(NoOpObserver));
        (db, ledger)
    }

    async fn create(db: &Database, input: ProductInput) -> Product {
        db.products()
            .create_or_restock(DEFAULT_TENANT_ID, Some("admin-1"), &input)
            .await
            .unwrap()
            .into_product()
    }

    fn input(name: &str, stock_type: StockUnit, stock_quantity: f64, columns: StockColumns) -> ProductInput {
        ProductInput {
            name: name.to_string(),
            category: "General".to_string(),
            stock_type: Some(stock_type),
            stock_quantity,
            columns,
            ..ProductInput::default()
        }
    }

    fn packet_columns() -> StockColumns {
        StockColumns {
            cards_per_packet: Some(20),
            price_per_packet: Some(90.0),
            price_per_card: Some(5.0),
            ..StockColumns::default()
        }
    }

    async fn stock_of(db: &Database, id: &str) -> f64 {
        db.products()
            .get_by_id(DEFAULT_TENANT_ID, id)
            .await
            .unwrap()
            .unwrap()
            .stock_quantity
    }

    #[tokio::test]
    async fn test_card_sale_from_packet_stock() {
        let (db, ledger) = setup().await;
        let product = create(&db, input("Marlboro Red", StockUnit::Packet, 10.0, packet_columns())).await;

        let recorded = ledger
            .apply_sale(DEFAULT_TENANT_ID, SELLER, &product.id, 25.0, StockUnit::Card)
            .await
            .unwrap();

        assert_eq!(recorded.product.stock_quantity, 8.75);
        assert_eq!(recorded.product.version, product.version + 1);
        assert_eq!(recorded.sale.unit_price, 5.0);
        assert_eq!(recorded.sale.total_price, 125.0);
        assert_eq!(recorded.sale.product_name, "Marlboro Red");
        assert_eq!(recorded.sale.sold_by, SELLER);
        assert_eq!(stock_of(&db, &product.id).await, 8.75);

        let stored = db
            .sales()
            .get_by_id(DEFAULT_TENANT_ID, &recorded.sale.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored, recorded.sale);
    }

    #[tokio::test]
    async fn test_oversell_writes_nothing() {
        let (db, ledger) = setup().await;
        let product = create(&db, input("Marlboro Red", StockUnit::Packet, 10.0, packet_columns())).await;

        let err = ledger
            .apply_sale(DEFAULT_TENANT_ID, SELLER, &product.id, 300.0, StockUnit::Card)
            .await
            .unwrap_err();

        match err {
            DbError::Domain(CoreError::InsufficientStock { available, .. }) => {
                assert_eq!(available, 200.0)
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(stock_of(&db, &product.id).await, 10.0);
        assert!(db.sales().list_all(DEFAULT_TENANT_ID).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bottle_sells_out() {
        let (db, ledger) = setup().await;
        let columns = StockColumns {
            price_per_bottle: Some(300.0),
            ..StockColumns::default()
        };
        let product = create(&db, input("Shisha Flavour", StockUnit::Bottle, 5.0, columns)).await;

        let recorded = ledger
            .apply_sale(DEFAULT_TENANT_ID, SELLER, &product.id, 5.0, StockUnit::Bottle)
            .await
            .unwrap();
        assert_eq!(recorded.product.stock_quantity, 0.0);
        assert_eq!(recorded.sale.total_price, 1500.0);

        let err = ledger
            .apply_sale(DEFAULT_TENANT_ID, SELLER, &product.id, 1.0, StockUnit::Bottle)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::InsufficientStock { .. })));
    }

    #[tokio::test]
    async fn test_delete_sale_restores_stock() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let observer = Arc::new(RecordingObserver::default());
        let ledger = db.ledger(observer.clone());
        let product = create(&db, input("Marlboro Red", StockUnit::Packet, 10.0, packet_columns())).await;

        let recorded = ledger
            .apply_sale(DEFAULT_TENANT_ID, SELLER, &product.id, 25.0, StockUnit::Card)
            .await
            .unwrap();
        let reversed = ledger
            .reverse_sale(DEFAULT_TENANT_ID, &recorded.sale.id)
            .await
            .unwrap();

        assert!(reversed.restored);
        assert_eq!(reversed.updated_product.unwrap().stock_quantity, 10.0);
        assert_eq!(stock_of(&db, &product.id).await, 10.0);
        assert!(db
            .sales()
            .get_by_id(DEFAULT_TENANT_ID, &recorded.sale.id)
            .await
            .unwrap()
            .is_none());

        assert_eq!(*observer.recorded.lock().unwrap(), vec![recorded.sale.id.clone()]);
        assert_eq!(*observer.reversed.lock().unwrap(), vec![(recorded.sale.id, true)]);
    }

    #[tokio::test]
    async fn test_delete_sale_of_deleted_product() {
        let (db, ledger) = setup().await;
        let product = create(&db, input("Marlboro Red", StockUnit::Packet, 10.0, packet_columns())).await;
        let recorded = ledger
            .apply_sale(DEFAULT_TENANT_ID, SELLER, &product.id, 1.0, StockUnit::Packet)
            .await
            .unwrap();

        db.products().delete(DEFAULT_TENANT_ID, &product.id).await.unwrap();

        // The sale outlives its product
        assert!(db
            .sales()
            .get_by_id(DEFAULT_TENANT_ID, &recorded.sale.id)
            .await
            .unwrap()
            .is_some());

        let reversed = ledger
            .reverse_sale(DEFAULT_TENANT_ID, &recorded.sale.id)
            .await
            .unwrap();
        assert!(!reversed.restored);
        assert!(reversed.updated_product.is_none());
        assert!(db.sales().list_all(DEFAULT_TENANT_ID).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_after_profile_change_skips_restoration() {
        let (db, ledger) = setup().await;
        let product = create(&db, input("Marlboro Red", StockUnit::Packet, 10.0, packet_columns())).await;
        let recorded = ledger
            .apply_sale(DEFAULT_TENANT_ID, SELLER, &product.id, 5.0, StockUnit::Card)
            .await
            .unwrap();

        // Now tracked in bottles, which cannot express a card sale
        let bottle = input(
            "Marlboro Red",
            StockUnit::Bottle,
            3.0,
            StockColumns {
                price_per_bottle: Some(10.0),
                ..StockColumns::default()
            },
        );
        db.products()
            .update(DEFAULT_TENANT_ID, &product.id, &bottle)
            .await
            .unwrap();

        let reversed = ledger
            .reverse_sale(DEFAULT_TENANT_ID, &recorded.sale.id)
            .await
            .unwrap();
        assert!(!reversed.restored);
        assert_eq!(reversed.updated_product.unwrap().stock_quantity, 3.0);
        assert_eq!(stock_of(&db, &product.id).await, 3.0);
        assert!(db.sales().list_all(DEFAULT_TENANT_ID).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reversal_uses_current_factors() {
        let (db, ledger) = setup().await;
        let product = create(&db, input("Marlboro Red", StockUnit::Packet, 10.0, packet_columns())).await;
        let recorded = ledger
            .apply_sale(DEFAULT_TENANT_ID, SELLER, &product.id, 20.0, StockUnit::Card)
            .await
            .unwrap();
        assert_eq!(recorded.product.stock_quantity, 9.0);

        let mut repacked = input("Marlboro Red", StockUnit::Packet, 9.0, packet_columns());
        repacked.columns.cards_per_packet = Some(10);
        db.products()
            .update(DEFAULT_TENANT_ID, &product.id, &repacked)
            .await
            .unwrap();

        let reversed = ledger
            .reverse_sale(DEFAULT_TENANT_ID, &recorded.sale.id)
            .await
            .unwrap();
        assert_eq!(reversed.updated_product.unwrap().stock_quantity, 11.0);
    }

    #[tokio::test]
    async fn test_unknown_ids() {
        let (_db, ledger) = setup().await;

        let err = ledger
            .apply_sale(DEFAULT_TENANT_ID, SELLER, "missing", 1.0, StockUnit::Card)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::ProductNotFound(_))));

        let err = ledger.reverse_sale(DEFAULT_TENANT_ID, "missing").await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::SaleNotFound(_))));
    }

    #[tokio::test]
    async fn test_tenants_are_isolated() {
        let (db, ledger) = setup().await;
        let product = create(&db, input("Marlboro Red", StockUnit::Packet, 10.0, packet_columns())).await;
        let other = "00000000-0000-0000-0000-000000000002";

        let err = ledger
            .apply_sale(other, SELLER, &product.id, 1.0, StockUnit::Packet)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::ProductNotFound(_))));

        let recorded = ledger
            .apply_sale(DEFAULT_TENANT_ID, SELLER, &product.id, 1.0, StockUnit::Packet)
            .await
            .unwrap();
        let err = ledger.reverse_sale(other, &recorded.sale.id).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::SaleNotFound(_))));
        assert!(db.sales().list_all(other).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sales_listings_and_summary() {
        let (db, ledger) = setup().await;
        let product = create(&db, input("Marlboro Red", StockUnit::Packet, 10.0, packet_columns())).await;

        ledger
            .apply_sale(DEFAULT_TENANT_ID, SELLER, &product.id, 2.0, StockUnit::Packet)
            .await
            .unwrap();
        ledger
            .apply_sale(DEFAULT_TENANT_ID, "storekeeper-2", &product.id, 4.0, StockUnit::Card)
            .await
            .unwrap();

        let sales = db.sales();
        let all = sales.list_all(DEFAULT_TENANT_ID).await.unwrap();
        let mut sellers: Vec<&str> = all.iter().map(|s| s.sold_by.as_str()).collect();
        sellers.sort_unstable();
        assert_eq!(sellers, [SELLER, "storekeeper-2"]);

        let mine = sales.list_by_seller(DEFAULT_TENANT_ID, SELLER).await.unwrap();
        assert_eq!(mine.len(), 1);

        let now = Utc::now();
        assert_eq!(sales.list_today(DEFAULT_TENANT_ID, now, None).await.unwrap().len(), 2);
        assert_eq!(
            sales.list_today(DEFAULT_TENANT_ID, now, Some(SELLER)).await.unwrap().len(),
            1
        );

        let summary = sales.summary(DEFAULT_TENANT_ID, now, None).await.unwrap();
        assert_eq!(summary.daily.count, 2);
        assert_eq!(summary.daily.revenue, 200.0);
        assert_eq!(summary.weekly.quantity, 6.0);

        let own = sales.summary(DEFAULT_TENANT_ID, now, Some(SELLER)).await.unwrap();
        assert_eq!(own.daily.count, 1);
        assert_eq!(own.monthly.revenue, 180.0);
    }

    #[tokio::test]
    async fn test_concurrent_sales_never_oversell() {
        let dir = std::env::temp_dir().join(format!("shelfkeep-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let db = Database::new(DbConfig::new(dir.join("ledger.db")).max_connections(4))
            .await
            .unwrap();
        let ledger = db.ledger(Arc::new(NoOpObserver));
        let columns = StockColumns {
            price_per_bottle: Some(300.0),
            ..StockColumns::default()
        };
        let product = create(&db, input("Shisha Flavour", StockUnit::Bottle, 5.0, columns)).await;

        let mut handles = Vec::new();
        for _ in 0..10 {
            let ledger = ledger.clone();
            let id = product.id.clone();
            handles.push(tokio::spawn(async move {
                ledger
                    .apply_sale(DEFAULT_TENANT_ID, SELLER, &id, 1.0, StockUnit::Bottle)
                    .await
            }));
        }

        let mut sold = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => sold += 1,
                Err(DbError::Domain(CoreError::InsufficientStock { .. }))
                | Err(DbError::Conflict { .. })
                | Err(DbError::Busy) => {}
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }

        let remaining = stock_of(&db, &product.id).await;
        let recorded = db.sales().list_all(DEFAULT_TENANT_ID).await.unwrap().len();
        assert!(sold <= 5);
        assert_eq!(recorded, sold);
        assert_eq!(remaining, 5.0 - sold as f64);

        db.close().await;
        let _ = std::fs::remove_dir_all(&dir);
    }
}
