//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - Create-or-restock by case-insensitive name
//! - CRUD operations
//! - Version-checked writes shared with the ledger service
//!
//! ## Version Check
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  read  ─► SELECT ... WHERE id = ?            (version = 7)              │
//! │  apply ─► mutate in memory                                              │
//! │  write ─► UPDATE ... SET version = 8                                    │
//! │           WHERE id = ? AND tenant_id = ? AND version = 7                │
//! │                                                                         │
//! │           rows_affected == 0 → DbError::Conflict → caller retries       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use shelfkeep_core::catalog::{profile_from_columns, ProductInput};
use shelfkeep_core::{name_key, CoreError, Product, StockColumns, StockUnit};

use crate::error::{DbError, DbResult};
use crate::ledger::MAX_WRITE_ATTEMPTS;

macro_rules! select_products {
    ($tail:literal) => {
        concat!(
            "SELECT id, tenant_id, name, category, description, image, ",
            "stock_type, stock_quantity, cards_per_packet, packets_per_carton, ",
            "price_per_card, price_per_packet, price_per_carton, price_per_bottle, ",
            "created_by, created_at, updated_at, version ",
            "FROM products ",
            $tail
        )
    };
}

// =============================================================================
// Row Mapping
// =============================================================================

/// A `products` row as stored.
#[derive(Debug, FromRow)]
pub(crate) struct ProductRow {
    id: String,
    tenant_id: String,
    name: String,
    category: String,
    description: Option<String>,
    image: String,
    stock_type: StockUnit,
    stock_quantity: f64,
    cards_per_packet: Option<u32>,
    packets_per_carton: Option<u32>,
    price_per_card: Option<f64>,
    price_per_packet: Option<f64>,
    price_per_carton: Option<f64>,
    price_per_bottle: Option<f64>,
    created_by: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: i64,
}

impl TryFrom<ProductRow> for Product {
    type Error = DbError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let columns = StockColumns {
            cards_per_packet: row.cards_per_packet,
            packets_per_carton: row.packets_per_carton,
            price_per_card: row.price_per_card,
            price_per_packet: row.price_per_packet,
            price_per_carton: row.price_per_carton,
            price_per_bottle: row.price_per_bottle,
        };

        let profile = profile_from_columns(row.stock_type, &columns).map_err(|e| DbError::Corrupt {
            entity: "Product".to_string(),
            id: row.id.clone(),
            reason: e.to_string(),
        })?;

        Ok(Product {
            id: row.id,
            tenant_id: row.tenant_id,
            name: row.name,
            category: row.category,
            description: row.description,
            image: row.image,
            profile,
            stock_quantity: row.stock_quantity,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
            version: row.version,
        })
    }
}

/// Maps the name index violation onto the product's display name.
fn name_taken(err: DbError, product: &Product) -> DbError {
    match err {
        DbError::UniqueViolation { .. } => DbError::duplicate("name", &product.name),
        other => other,
    }
}

// =============================================================================
// Connection-level Operations
// =============================================================================
// Shared by the repository and by LedgerService transactions.

pub(crate) async fn fetch(
    conn: &mut SqliteConnection,
    tenant_id: &str,
    id: &str,
) -> DbResult<Option<Product>> {
    sqlx::query_as::<_, ProductRow>(select_products!("WHERE tenant_id = ?1 AND id = ?2"))
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .map(Product::try_from)
        .transpose()
}

pub(crate) async fn fetch_by_name(
    conn: &mut SqliteConnection,
    tenant_id: &str,
    name: &str,
) -> DbResult<Option<Product>> {
    sqlx::query_as::<_, ProductRow>(select_products!("WHERE tenant_id = ?1 AND name_key = ?2"))
        .bind(tenant_id)
        .bind(name_key(name))
        .fetch_optional(&mut *conn)
        .await?
        .map(Product::try_from)
        .transpose()
}

pub(crate) async fn insert(conn: &mut SqliteConnection, product: &Product) -> DbResult<()> {
    debug!(product_id = %product.id, name = %product.name, "Inserting product");

    let cols = product.profile.columns();
    sqlx::query(
        r#"
        INSERT INTO products (
            id, tenant_id, name, name_key, category, description, image,
            stock_type, stock_quantity,
            cards_per_packet, packets_per_carton,
            price_per_card, price_per_packet, price_per_carton, price_per_bottle,
            created_by, created_at, updated_at, version
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6, ?7,
            ?8, ?9,
            ?10, ?11,
            ?12, ?13, ?14, ?15,
            ?16, ?17, ?18, ?19
        )
        "#,
    )
    .bind(&product.id)
    .bind(&product.tenant_id)
    .bind(&product.name)
    .bind(product.name_key())
    .bind(&product.category)
    .bind(&product.description)
    .bind(&product.image)
    .bind(product.stock_type())
    .bind(product.stock_quantity)
    .bind(cols.cards_per_packet)
    .bind(cols.packets_per_carton)
    .bind(cols.price_per_card)
    .bind(cols.price_per_packet)
    .bind(cols.price_per_carton)
    .bind(cols.price_per_bottle)
    .bind(&product.created_by)
    .bind(product.created_at)
    .bind(product.updated_at)
    .bind(product.version)
    .execute(&mut *conn)
    .await
    .map_err(|e| name_taken(e.into(), product))?;

    Ok(())
}

/// Writes every mutable field of `product`, guarded by its version.
///
/// Returns the product as stored, with its version bumped.
pub(crate) async fn write(conn: &mut SqliteConnection, product: &Product) -> DbResult<Product> {
    debug!(
        product_id = %product.id,
        version = product.version,
        stock_quantity = product.stock_quantity,
        "Writing product"
    );

    let cols = product.profile.columns();
    let result = sqlx::query(
        r#"
        UPDATE products SET
            name = ?4,
            name_key = ?5,
            category = ?6,
            description = ?7,
            image = ?8,
            stock_type = ?9,
            stock_quantity = ?10,
            cards_per_packet = ?11,
            packets_per_carton = ?12,
            price_per_card = ?13,
            price_per_packet = ?14,
            price_per_carton = ?15,
            price_per_bottle = ?16,
            updated_at = ?17,
            version = version + 1
        WHERE tenant_id = ?1 AND id = ?2 AND version = ?3
        "#,
    )
    .bind(&product.tenant_id)
    .bind(&product.id)
    .bind(product.version)
    .bind(&product.name)
    .bind(product.name_key())
    .bind(&product.category)
    .bind(&product.description)
    .bind(&product.image)
    .bind(product.stock_type())
    .bind(product.stock_quantity)
    .bind(cols.cards_per_packet)
    .bind(cols.packets_per_carton)
    .bind(cols.price_per_card)
    .bind(cols.price_per_packet)
    .bind(cols.price_per_carton)
    .bind(cols.price_per_bottle)
    .bind(product.updated_at)
    .execute(&mut *conn)
    .await
    .map_err(|e| name_taken(e.into(), product))?;

    if result.rows_affected() == 0 {
        return Err(DbError::conflict("Product", &product.id));
    }

    let mut stored = product.clone();
    stored.version += 1;
    Ok(stored)
}

pub(crate) async fn delete(conn: &mut SqliteConnection, tenant_id: &str, id: &str) -> DbResult<bool> {
    let result = sqlx::query("DELETE FROM products WHERE tenant_id = ?1 AND id = ?2")
        .bind(tenant_id)
        .bind(id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected() > 0)
}

// =============================================================================
// Repository
// =============================================================================

/// Outcome of [`ProductRepository::create_or_restock`].
#[derive(Debug, Clone, PartialEq)]
pub enum UpsertOutcome {
    /// No product had this name; a new one was inserted.
    Created(Product),
    /// A product with this name existed and was restocked.
    Restocked(Product),
}

impl UpsertOutcome {
    pub fn product(&self) -> &Product {
        match self {
            UpsertOutcome::Created(p) | UpsertOutcome::Restocked(p) => p,
        }
    }

    pub fn into_product(self) -> Product {
        match self {
            UpsertOutcome::Created(p) | UpsertOutcome::Restocked(p) => p,
        }
    }
}

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let outcome = repo.create_or_restock(tenant_id, Some(user_id), &input).await?;
/// let product = repo.get_by_id(tenant_id, &outcome.product().id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists the tenant's products, by name.
    pub async fn list(&self, tenant_id: &str) -> DbResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(select_products!(
            "WHERE tenant_id = ?1 ORDER BY name_key"
        ))
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        debug!(tenant_id = %tenant_id, count = rows.len(), "Listed products");
        rows.into_iter().map(Product::try_from).collect()
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - No such product in this tenant
    pub async fn get_by_id(&self, tenant_id: &str, id: &str) -> DbResult<Option<Product>> {
        let mut conn = self.pool.acquire().await?;
        fetch(&mut conn, tenant_id, id).await
    }

    /// Creates a product, or restocks the existing one with the same name.
    ///
    /// ## Matching
    /// Names match ignoring case and surrounding whitespace. A restock adds
    /// the form's quantity and takes its prices; see
    /// [`shelfkeep_core::catalog::ValidatedProduct::restock_into`].
    pub async fn create_or_restock(
        &self,
        tenant_id: &str,
        created_by: Option<&str>,
        input: &ProductInput,
    ) -> DbResult<UpsertOutcome> {
        let mut attempt = 1;
        loop {
            match self.try_create_or_restock(tenant_id, created_by, input).await {
                Err(err) if err.is_retryable() && attempt < MAX_WRITE_ATTEMPTS => {
                    warn!(attempt, error = %err, "Retrying create-or-restock");
                    attempt += 1;
                }
                outcome => return outcome,
            }
        }
    }

    async fn try_create_or_restock(
        &self,
        tenant_id: &str,
        created_by: Option<&str>,
        input: &ProductInput,
    ) -> DbResult<UpsertOutcome> {
        let validated = input.validate().map_err(CoreError::from)?;
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        let outcome = match fetch_by_name(&mut tx, tenant_id, &validated.name).await? {
            Some(mut existing) => {
                let added = validated.stock_quantity;
                validated
                    .restock_into(&mut existing, now)
                    .map_err(CoreError::from)?;
                let stored = write(&mut tx, &existing).await?;
                info!(
                    product_id = %stored.id,
                    added,
                    stock_quantity = stored.stock_quantity,
                    "Product restocked"
                );
                UpsertOutcome::Restocked(stored)
            }
            None => {
                let product = validated.into_product(tenant_id, created_by, now);
                // A concurrent create of the same name wins the index;
                // retrying turns this request into a restock.
                insert(&mut tx, &product).await.map_err(|e| match e {
                    DbError::UniqueViolation { .. } => DbError::conflict("Product", &product.name),
                    other => other,
                })?;
                info!(product_id = %product.id, name = %product.name, "Product created");
                UpsertOutcome::Created(product)
            }
        };

        tx.commit().await?;
        Ok(outcome)
    }

    /// Replaces every editable field of a product.
    ///
    /// ## Errors
    /// * `Domain(ProductNotFound)` - No such product in this tenant
    /// * `UniqueViolation` - Another product already has the new name
    pub async fn update(&self, tenant_id: &str, id: &str, input: &ProductInput) -> DbResult<Product> {
        let mut attempt = 1;
        loop {
            match self.try_update(tenant_id, id, input).await {
                Err(err) if err.is_retryable() && attempt < MAX_WRITE_ATTEMPTS => {
                    warn!(attempt, product_id = %id, error = %err, "Retrying product update");
                    attempt += 1;
                }
                outcome => return outcome,
            }
        }
    }

    async fn try_update(&self, tenant_id: &str, id: &str, input: &ProductInput) -> DbResult<Product> {
        let validated = input.validate().map_err(CoreError::from)?;

        let mut tx = self.pool.begin().await?;

        let mut product = fetch(&mut tx, tenant_id, id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()))?;

        validated.apply_update(&mut product, Utc::now());
        let stored = write(&mut tx, &product).await?;

        tx.commit().await?;

        info!(product_id = %stored.id, version = stored.version, "Product updated");
        Ok(stored)
    }

    /// Hard-deletes a product. Its sales are kept.
    pub async fn delete(&self, tenant_id: &str, id: &str) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;

        if !delete(&mut conn, tenant_id, id).await? {
            return Err(CoreError::ProductNotFound(id.to_string()).into());
        }

        info!(product_id = %id, "Product deleted");
        Ok(())
    }

    /// Counts the tenant's products.
    pub async fn count(&self, tenant_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE tenant_id = ?1")
            .bind(tenant_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use shelfkeep_core::{StockProfile, ValidationError, DEFAULT_TENANT_ID};

    const OTHER_TENANT: &str = "00000000-0000-0000-0000-000000000002";

    fn packet_input(name: &str, quantity: f64) -> ProductInput {
        ProductInput {
            name: name.to_string(),
            category: "Cigarettes".to_string(),
            stock_type: Some(StockUnit::Packet),
            stock_quantity: quantity,
            columns: StockColumns {
                cards_per_packet: Some(20),
                price_per_packet: Some(90.0),
                price_per_card: Some(5.0),
                ..StockColumns::default()
            },
            ..ProductInput::default()
        }
    }

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let db = db().await;
        let outcome = db
            .products()
            .create_or_restock(DEFAULT_TENANT_ID, Some("admin-1"), &packet_input("Marlboro Red", 10.0))
            .await
            .unwrap();

        let UpsertOutcome::Created(created) = outcome else {
            panic!("expected a new product");
        };
        assert_eq!(created.version, 1);
        assert_eq!(created.created_by.as_deref(), Some("admin-1"));

        let fetched = db
            .products()
            .get_by_id(DEFAULT_TENANT_ID, &created.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.name, "Marlboro Red");
        assert_eq!(fetched.stock_quantity, 10.0);
        assert_eq!(
            fetched.profile,
            StockProfile::Packet {
                cards_per_packet: 20,
                price_per_packet: 90.0,
                price_per_card: 5.0,
            }
        );
    }

    #[tokio::test]
    async fn test_same_name_restocks() {
        let db = db().await;
        let repo = db.products();
        let first = repo
            .create_or_restock(DEFAULT_TENANT_ID, None, &packet_input("Marlboro Red", 10.0))
            .await
            .unwrap()
            .into_product();

        let outcome = repo
            .create_or_restock(DEFAULT_TENANT_ID, None, &packet_input("  MARLBORO red ", 4.5))
            .await
            .unwrap();

        let UpsertOutcome::Restocked(restocked) = outcome else {
            panic!("expected a restock");
        };
        assert_eq!(restocked.id, first.id);
        assert_eq!(restocked.name, "Marlboro Red");
        assert_eq!(restocked.stock_quantity, 14.5);
        assert_eq!(restocked.version, 2);
        assert_eq!(repo.count(DEFAULT_TENANT_ID).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_names_are_per_tenant() {
        let db = db().await;
        let repo = db.products();
        repo.create_or_restock(DEFAULT_TENANT_ID, None, &packet_input("Marlboro Red", 10.0))
            .await
            .unwrap();
        let outcome = repo
            .create_or_restock(OTHER_TENANT, None, &packet_input("Marlboro Red", 3.0))
            .await
            .unwrap();

        assert!(matches!(outcome, UpsertOutcome::Created(_)));
        assert!(repo
            .get_by_id(DEFAULT_TENANT_ID, &outcome.product().id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_invalid_input_is_domain_error() {
        let db = db().await;
        let mut input = packet_input("Marlboro Red", 10.0);
        input.columns.cards_per_packet = None;

        let err = db
            .products()
            .create_or_restock(DEFAULT_TENANT_ID, None, &input)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::Validation(ValidationError::Required { .. }))
        ));
    }

    #[tokio::test]
    async fn test_update_and_rename_conflict() {
        let db = db().await;
        let repo = db.products();
        let red = repo
            .create_or_restock(DEFAULT_TENANT_ID, None, &packet_input("Marlboro Red", 10.0))
            .await
            .unwrap()
            .into_product();
        repo.create_or_restock(DEFAULT_TENANT_ID, None, &packet_input("Marlboro Gold", 5.0))
            .await
            .unwrap();

        let updated = repo
            .update(DEFAULT_TENANT_ID, &red.id, &packet_input("Marlboro Red 20s", 7.0))
            .await
            .unwrap();
        assert_eq!(updated.name, "Marlboro Red 20s");
        assert_eq!(updated.stock_quantity, 7.0);
        assert_eq!(updated.version, 2);

        let err = repo
            .update(DEFAULT_TENANT_ID, &red.id, &packet_input("marlboro gold", 7.0))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { ref field, .. } if field == "name"));
    }

    #[tokio::test]
    async fn test_update_missing_product() {
        let db = db().await;
        let err = db
            .products()
            .update(DEFAULT_TENANT_ID, "missing", &packet_input("X", 1.0))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::ProductNotFound(_))));
    }

    #[tokio::test]
    async fn test_stale_version_conflicts() {
        let db = db().await;
        let product = db
            .products()
            .create_or_restock(DEFAULT_TENANT_ID, None, &packet_input("Marlboro Red", 10.0))
            .await
            .unwrap()
            .into_product();

        let mut conn = db.pool().acquire().await.unwrap();
        let stored = write(&mut conn, &product).await.unwrap();
        assert_eq!(stored.version, 2);

        // Same snapshot again: version 1 is gone
        let err = write(&mut conn, &product).await.unwrap_err();
        assert!(matches!(err, DbError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_delete() {
        let db = db().await;
        let repo = db.products();
        let product = repo
            .create_or_restock(DEFAULT_TENANT_ID, None, &packet_input("Marlboro Red", 10.0))
            .await
            .unwrap()
            .into_product();

        // Other tenants cannot delete it
        assert!(repo.delete(OTHER_TENANT, &product.id).await.is_err());

        repo.delete(DEFAULT_TENANT_ID, &product.id).await.unwrap();
        assert!(repo.get_by_id(DEFAULT_TENANT_ID, &product.id).await.unwrap().is_none());
        assert!(matches!(
            repo.delete(DEFAULT_TENANT_ID, &product.id).await,
            Err(DbError::Domain(CoreError::ProductNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_list_sorted_by_name() {
        let db = db().await;
        let repo = db.products();
        for name in ["Rothmans", "benson & hedges", "Marlboro Red"] {
            repo.create_or_restock(DEFAULT_TENANT_ID, None, &packet_input(name, 1.0))
                .await
                .unwrap();
        }

        let names: Vec<_> = repo
            .list(DEFAULT_TENANT_ID)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["benson & hedges", "Marlboro Red", "Rothmans"]);
    }
}
