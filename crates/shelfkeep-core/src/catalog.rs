//! # Product Catalogue Input
//!
//! Turns the flat product form into a validated, tagged [`StockProfile`].
//!
//! ## Required Fields by Stock Type
//! ```text
//! ┌─────────────┬────────────────────────────────┬─────────────────────────┐
//! │ stockType   │ required                       │ optional                │
//! ├─────────────┼────────────────────────────────┼─────────────────────────┤
//! │ card        │ pricePerCard                   │                         │
//! │ packet      │ cardsPerPacket, pricePerPacket │                         │
//! │             │ pricePerCard                   │                         │
//! │ carton      │ packetsPerCarton               │ cardsPerPacket          │
//! │             │ pricePerCarton, pricePerPacket │ pricePerCard (needs     │
//! │             │                                │   cardsPerPacket)       │
//! │ bottle      │ pricePerBottle                 │                         │
//! └─────────────┴────────────────────────────────┴─────────────────────────┘
//!   Any other stock field present → ValidationError::NotApplicable
//! ```
//!
//! These rules run once, here. Everything downstream works with
//! [`StockProfile`] and never re-checks them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::types::{Product, StockColumns, StockProfile, StockUnit};
use crate::validation::{
    validate_category, validate_description, validate_price, validate_product_name,
    validate_ratio, validate_stock_quantity, ValidationResult,
};

// =============================================================================
// Input
// =============================================================================

/// Product form as submitted by an admin.
///
/// Used for both create-or-restock and full updates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub stock_type: Option<StockUnit>,
    #[serde(default)]
    pub stock_quantity: f64,
    #[serde(flatten)]
    pub columns: StockColumns,
}

impl ProductInput {
    /// Validates every field and resolves the stock profile.
    pub fn validate(&self) -> ValidationResult<ValidatedProduct> {
        let name = validate_product_name(&self.name)?;
        let category = validate_category(&self.category)?;
        let description = validate_description(self.description.as_deref())?;
        let stock_type = self
            .stock_type
            .ok_or_else(|| ValidationError::required("stockType"))?;
        validate_stock_quantity(self.stock_quantity)?;
        let profile = profile_from_columns(stock_type, &self.columns)?;

        let image = self
            .image
            .as_deref()
            .map(str::trim)
            .filter(|i| !i.is_empty())
            .map(str::to_string);

        Ok(ValidatedProduct {
            name,
            category,
            description,
            image,
            profile,
            stock_quantity: self.stock_quantity,
        })
    }
}

// =============================================================================
// Validated Product
// =============================================================================

/// A product form that passed [`ProductInput::validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedProduct {
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub profile: StockProfile,
    pub stock_quantity: f64,
}

impl ValidatedProduct {
    /// Builds a brand-new product.
    pub fn into_product(self, tenant_id: &str, created_by: Option<&str>, now: DateTime<Utc>) -> Product {
        Product {
            id: Uuid::new_v4().to_string(),
            tenant_id: tenant_id.to_string(),
            name: self.name,
            category: self.category,
            description: self.description,
            image: self.image.unwrap_or_default(),
            profile: self.profile,
            stock_quantity: self.stock_quantity,
            created_by: created_by.map(str::to_string),
            created_at: now,
            updated_at: now,
            version: 1,
        }
    }

    /// Adds this form's quantity to an existing product of the same name.
    ///
    /// The stock profile is replaced, description and image are replaced
    /// only when supplied, and name and category are kept.
    ///
    /// ## Errors
    /// `NotAllowed` on `stockType` when the form's stock type differs from
    /// the existing product's; quantities in different units cannot be
    /// added together. `InvalidFormat` on `stockQuantity` when the sum is
    /// not a finite number.
    pub fn restock_into(self, existing: &mut Product, now: DateTime<Utc>) -> ValidationResult<()> {
        ensure_same_stock_type(existing, &self.profile)?;

        let stock_quantity = existing.stock_quantity + self.stock_quantity;
        validate_stock_quantity(stock_quantity)?;

        existing.stock_quantity = stock_quantity;
        existing.profile = self.profile;
        if let Some(description) = self.description {
            existing.description = Some(description);
        }
        if let Some(image) = self.image {
            existing.image = image;
        }
        existing.updated_at = now;
        Ok(())
    }

    /// Replaces every editable field of `existing`.
    ///
    /// Unlike restocking, the stock type may change here: the admin is
    /// restating the product from scratch, quantity included.
    pub fn apply_update(self, existing: &mut Product, now: DateTime<Utc>) {
        existing.name = self.name;
        existing.category = self.category;
        existing.description = self.description;
        existing.image = self.image.unwrap_or_default();
        existing.profile = self.profile;
        existing.stock_quantity = self.stock_quantity;
        existing.updated_at = now;
    }
}

fn ensure_same_stock_type(existing: &Product, profile: &StockProfile) -> ValidationResult<()> {
    if existing.stock_type() != profile.stock_unit() {
        return Err(ValidationError::NotAllowed {
            field: "stockType".to_string(),
            allowed: vec![existing.stock_type().to_string()],
        });
    }
    Ok(())
}

// =============================================================================
// Profile Resolution
// =============================================================================

/// Resolves flat stock columns into a tagged profile.
///
/// Used for request bodies and for rows read back from the database.
pub fn profile_from_columns(stock_type: StockUnit, columns: &StockColumns) -> ValidationResult<StockProfile> {
    let stock = stock_type.as_str();

    let profile = match stock_type {
        StockUnit::Card => {
            reject(stock, "cardsPerPacket", columns.cards_per_packet.is_some())?;
            reject(stock, "packetsPerCarton", columns.packets_per_carton.is_some())?;
            reject(stock, "pricePerPacket", columns.price_per_packet.is_some())?;
            reject(stock, "pricePerCarton", columns.price_per_carton.is_some())?;
            reject(stock, "pricePerBottle", columns.price_per_bottle.is_some())?;
            StockProfile::Card {
                price_per_card: price("pricePerCard", columns.price_per_card)?,
            }
        }
        StockUnit::Packet => {
            reject(stock, "packetsPerCarton", columns.packets_per_carton.is_some())?;
            reject(stock, "pricePerCarton", columns.price_per_carton.is_some())?;
            reject(stock, "pricePerBottle", columns.price_per_bottle.is_some())?;
            StockProfile::Packet {
                cards_per_packet: ratio("cardsPerPacket", columns.cards_per_packet)?,
                price_per_packet: price("pricePerPacket", columns.price_per_packet)?,
                price_per_card: price("pricePerCard", columns.price_per_card)?,
            }
        }
        StockUnit::Carton => {
            reject(stock, "pricePerBottle", columns.price_per_bottle.is_some())?;
            let cards_per_packet = columns
                .cards_per_packet
                .map(|n| ratio("cardsPerPacket", Some(n)))
                .transpose()?;
            let price_per_card = columns
                .price_per_card
                .map(|p| price("pricePerCard", Some(p)))
                .transpose()?;
            if price_per_card.is_some() && cards_per_packet.is_none() {
                return Err(ValidationError::required("cardsPerPacket"));
            }
            StockProfile::Carton {
                packets_per_carton: ratio("packetsPerCarton", columns.packets_per_carton)?,
                cards_per_packet,
                price_per_carton: price("pricePerCarton", columns.price_per_carton)?,
                price_per_packet: price("pricePerPacket", columns.price_per_packet)?,
                price_per_card,
            }
        }
        StockUnit::Bottle => {
            reject(stock, "cardsPerPacket", columns.cards_per_packet.is_some())?;
            reject(stock, "packetsPerCarton", columns.packets_per_carton.is_some())?;
            reject(stock, "pricePerCard", columns.price_per_card.is_some())?;
            reject(stock, "pricePerPacket", columns.price_per_packet.is_some())?;
            reject(stock, "pricePerCarton", columns.price_per_carton.is_some())?;
            StockProfile::Bottle {
                price_per_bottle: price("pricePerBottle", columns.price_per_bottle)?,
            }
        }
    };

    Ok(profile)
}

fn price(field: &str, value: Option<f64>) -> ValidationResult<f64> {
    let value = value.ok_or_else(|| ValidationError::required(field))?;
    validate_price(field, value)?;
    Ok(value)
}

fn ratio(field: &str, value: Option<u32>) -> ValidationResult<u32> {
    let value = value.ok_or_else(|| ValidationError::required(field))?;
    validate_ratio(field, value)?;
    Ok(value)
}

fn reject(stock_type: &str, field: &str, present: bool) -> ValidationResult<()> {
    if present {
        return Err(ValidationError::NotApplicable {
            field: field.to_string(),
            stock_type: stock_type.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
