//! # Stock Ledger
//!
//! Sale and restock arithmetic over a single product's stock quantity.
//!
//! ## Sale Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  apply_sale(product, quantity, sale_unit)                               │
//! │                                                                         │
//! │  1. quantity finite and > 0          else ValidationError               │
//! │  2. units::conversion(profile, unit) else IncompatibleUnit              │
//! │  3. available = stock × factor       (in sale units)                    │
//! │  4. quantity <= available            else InsufficientStock{available}  │
//! │  5. units::unit_price(product, unit) else PriceNotConfigured            │
//! │  6. total = unit_price × quantity    (no rounding)                      │
//! │  7. stock -= quantity / factor       (clamped at zero)                  │
//! │                                                                         │
//! │  Any failure leaves the product untouched.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reversal re-derives the stock delta from the product's current profile,
//! not the one in force when the sale was recorded. If the product has
//! since been switched to a stock type the sale unit cannot convert into,
//! nothing is restored and the caller gets [`Restoration::Skipped`].

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::types::{Product, Sale, StockUnit};
use crate::units::{conversion, unit_price};
use crate::validation::validate_quantity;
use crate::STOCK_TOLERANCE_ULPS;

// =============================================================================
// Sale Quote
// =============================================================================

/// The priced outcome of a sale that has passed every check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SaleQuote {
    pub sale_unit: StockUnit,
    pub quantity: f64,
    pub unit_price: f64,
    pub total_price: f64,
    /// Stock units removed by the sale.
    pub stock_delta: f64,
    /// Stock quantity left after the sale.
    pub remaining_stock: f64,
}

impl SaleQuote {
    /// Builds the sale record for this quote.
    pub fn record(&self, product: &Product, sold_by: &str, now: DateTime<Utc>) -> Sale {
        Sale {
            id: Uuid::new_v4().to_string(),
            tenant_id: product.tenant_id.clone(),
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            quantity: self.quantity,
            sale_unit: self.sale_unit,
            unit_price: self.unit_price,
            total_price: self.total_price,
            sold_by: sold_by.to_string(),
            created_at: now,
        }
    }
}

/// Checks and prices a sale without touching the product.
pub fn quote_sale(product: &Product, quantity: f64, sale_unit: StockUnit) -> CoreResult<SaleQuote> {
    validate_quantity(quantity)?;

    let conv = conversion(&product.profile, sale_unit)?;

    let available = conv.to_sale_units(product.stock_quantity);
    if exceeds_available(quantity, available) {
        return Err(CoreError::InsufficientStock {
            product: product.name.clone(),
            available,
            requested: quantity,
            unit: sale_unit,
        });
    }

    let unit_price = unit_price(product, sale_unit)?;
    let stock_delta = conv.to_stock_units(quantity);

    Ok(SaleQuote {
        sale_unit,
        quantity,
        unit_price,
        total_price: unit_price * quantity,
        stock_delta,
        remaining_stock: (product.stock_quantity - stock_delta).max(0.0),
    })
}

/// True when `quantity` is more than `available` beyond rounding error.
///
/// The allowance is relative to `available`, so nothing is sellable from
/// empty stock.
fn exceeds_available(quantity: f64, available: f64) -> bool {
    quantity > available + available * STOCK_TOLERANCE_ULPS * f64::EPSILON
}

/// Decrements the product's stock for a sale.
///
/// Only `stock_quantity` changes; bookkeeping fields are the caller's.
pub fn apply_sale(product: &mut Product, quantity: f64, sale_unit: StockUnit) -> CoreResult<SaleQuote> {
    let quote = quote_sale(product, quantity, sale_unit)?;
    product.stock_quantity = quote.remaining_stock;
    Ok(quote)
}

// =============================================================================
// Reversal
// =============================================================================

/// What [`reverse_sale`] did to the product.
#[derive(Debug, Clone, PartialEq)]
pub enum Restoration {
    /// Stock was increased by `stock_delta`.
    Restored { stock_delta: f64 },

    /// The sale cannot be expressed in the product's current stock unit.
    Skipped { reason: CoreError },
}

impl Restoration {
    pub fn is_restored(&self) -> bool {
        matches!(self, Restoration::Restored { .. })
    }
}

/// Adds a deleted sale's quantity back to the product.
///
/// Never fails: availability and pricing are not consulted, so a reversal
/// succeeds even when the forward sale would now be rejected.
pub fn reverse_sale(product: &mut Product, sale: &Sale) -> Restoration {
    if let Err(err) = validate_quantity(sale.quantity) {
        return Restoration::Skipped { reason: err.into() };
    }

    match conversion(&product.profile, sale.sale_unit) {
        Ok(conv) => {
            let stock_delta = conv.to_stock_units(sale.quantity);
            product.stock_quantity += stock_delta;
            Restoration::Restored { stock_delta }
        }
        Err(reason) => Restoration::Skipped { reason },
    }
}

// =============================================================================
// Unit Tests
// =============================================================================


// =============================================================================
// Property Tests
// =============================================================================
