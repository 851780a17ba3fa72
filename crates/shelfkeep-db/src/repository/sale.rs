//! # Sale Repository
//!
//! Read access to recorded sales.
//!
//! Sales are written only by [`LedgerService`](crate::ledger::LedgerService),
//! which inserts and deletes them in the same transaction as the stock
//! change. This repository exposes the listings and the summary.
//!
//! ## Listings
//! | Method            | Rows                                   |
//! |-------------------|----------------------------------------|
//! | `list_all`        | every sale in the tenant               |
//! | `list_by_seller`  | sales recorded by one user             |
//! | `list_today`      | sales in the current UTC day           |
//! | `list_between`    | sales in a half-open `[start, end)`    |
//!
//! All listings are newest first.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use shelfkeep_core::summary::{day_bounds, summarize, summary_window_start, SalesSummary};
use shelfkeep_core::Sale;

use crate::error::DbResult;

macro_rules! select_sales {
    ($tail:literal) => {
        concat!(
            "SELECT id, tenant_id, product_id, product_name, quantity, sale_unit, ",
            "unit_price, total_price, sold_by, created_at ",
            "FROM sales ",
            $tail
        )
    };
}

// =============================================================================
// Connection-level Operations
// =============================================================================

pub(crate) async fn fetch(conn: &mut SqliteConnection, tenant_id: &str, id: &str) -> DbResult<Option<Sale>> {
    let sale = sqlx::query_as::<_, Sale>(select_sales!("WHERE tenant_id = ?1 AND id = ?2"))
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(sale)
}

pub(crate) async fn insert(conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
    debug!(sale_id = %sale.id, product_id = %sale.product_id, "Inserting sale");

    sqlx::query(
        r#"
        INSERT INTO sales (
            id, tenant_id, product_id, product_name, quantity, sale_unit,
            unit_price, total_price, sold_by, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(&sale.id)
    .bind(&sale.tenant_id)
    .bind(&sale.product_id)
    .bind(&sale.product_name)
    .bind(sale.quantity)
    .bind(sale.sale_unit)
    .bind(sale.unit_price)
    .bind(sale.total_price)
    .bind(&sale.sold_by)
    .bind(sale.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub(crate) async fn delete(conn: &mut SqliteConnection, tenant_id: &str, id: &str) -> DbResult<bool> {
    let result = sqlx::query("DELETE FROM sales WHERE tenant_id = ?1 AND id = ?2")
        .bind(tenant_id)
        .bind(id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected() > 0)
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for sale queries.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, tenant_id: &str, id: &str) -> DbResult<Option<Sale>> {
        let mut conn = self.pool.acquire().await?;
        fetch(&mut conn, tenant_id, id).await
    }

    /// Every sale in the tenant, newest first.
    pub async fn list_all(&self, tenant_id: &str) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(select_sales!(
            "WHERE tenant_id = ?1 ORDER BY created_at DESC"
        ))
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        debug!(tenant_id = %tenant_id, count = sales.len(), "Listed all sales");
        Ok(sales)
    }

    /// Sales recorded by `sold_by`, newest first.
    pub async fn list_by_seller(&self, tenant_id: &str, sold_by: &str) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(select_sales!(
            "WHERE tenant_id = ?1 AND sold_by = ?2 ORDER BY created_at DESC"
        ))
        .bind(tenant_id)
        .bind(sold_by)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Sales with `start <= created_at < end`, optionally for one seller.
    pub async fn list_between(
        &self,
        tenant_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        sold_by: Option<&str>,
    ) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(select_sales!(
            "WHERE tenant_id = ?1 AND created_at >= ?2 AND created_at < ?3 \
             AND (?4 IS NULL OR sold_by = ?4) \
             ORDER BY created_at DESC"
        ))
        .bind(tenant_id)
        .bind(start)
        .bind(end)
        .bind(sold_by)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Sales in the UTC day containing `now`.
    pub async fn list_today(
        &self,
        tenant_id: &str,
        now: DateTime<Utc>,
        sold_by: Option<&str>,
    ) -> DbResult<Vec<Sale>> {
        let (start, end) = day_bounds(now);
        self.list_between(tenant_id, start, end, sold_by).await
    }

    /// Daily, weekly and monthly totals as of `now`.
    ///
    /// Loads only the rows that can fall in some window, then folds them
    /// with [`summarize`].
    pub async fn summary(
        &self,
        tenant_id: &str,
        now: DateTime<Utc>,
        sold_by: Option<&str>,
    ) -> DbResult<SalesSummary> {
        let start = summary_window_start(now);
        let sales = sqlx::query_as::<_, Sale>(select_sales!(
            "WHERE tenant_id = ?1 AND created_at >= ?2 AND created_at <= ?3 \
             AND (?4 IS NULL OR sold_by = ?4)"
        ))
        .bind(tenant_id)
        .bind(start)
        .bind(now)
        .bind(sold_by)
        .fetch_all(&self.pool)
        .await?;

        debug!(tenant_id = %tenant_id, rows = sales.len(), "Summarising sales");
        Ok(summarize(&sales, now))
    }
}
