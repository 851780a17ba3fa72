//! # Validation Module
//!
//! Field-level validators for Shelfkeep input.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP extractor (axum)                                        │
//! │  └── Type validation (JSON deserialization)                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: catalog / ledger (this crate)                                │
//! │  ├── THIS MODULE: per-field rules                                      │
//! │  └── catalog: per-stock-type required fields                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (stock_quantity >= 0)                                       │
//! │  └── UNIQUE (tenant_id, name_key)                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use shelfkeep_core::validation::{validate_product_name, validate_quantity};
//!
//! assert_eq!(validate_product_name("  Marlboro Red ").unwrap(), "Marlboro Red");
//! assert!(validate_quantity(2.5).is_ok());
//! assert!(validate_quantity(f64::NAN).is_err());
//! ```

use crate::error::ValidationError;
use crate::{MAX_CATEGORY_LEN, MAX_DESCRIPTION_LEN, MAX_NAME_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product name and returns it trimmed.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 200 characters
///
/// ## Example
/// ```rust
/// use shelfkeep_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Coca-Cola 50cl").is_ok());
/// assert!(validate_product_name("   ").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<String> {
    bounded_text("name", name, MAX_NAME_LEN)
}

/// Validates a product category and returns it trimmed.
pub fn validate_category(category: &str) -> ValidationResult<String> {
    bounded_text("category", category, MAX_CATEGORY_LEN)
}

/// Validates an optional description.
///
/// Blank descriptions collapse to `None`.
pub fn validate_description(description: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(description) = description.map(str::trim).filter(|d| !d.is_empty()) else {
        return Ok(None);
    };

    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(ValidationError::TooLong {
            field: "description".to_string(),
            max: MAX_DESCRIPTION_LEN,
        });
    }

    Ok(Some(description.to_string()))
}

fn bounded_text(field: &str, value: &str, max: usize) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(value.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a sale quantity.
///
/// ## Rules
/// - Must be a finite number
/// - Must be positive (> 0); fractions are fine
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Record Sale                                                            │
/// │                                                                         │
/// │  Storekeeper enters quantity: 2.5 packets                              │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity(2.5) ← THIS FUNCTION                                │
/// │       │                                                                 │
/// │       ├── NaN / ∞?  → Error: "quantity has invalid format"             │
/// │       │                                                                 │
/// │       ├── qty <= 0? → Error: "quantity must be positive"               │
/// │       │                                                                 │
/// │       └── OK → ledger::apply_sale                                      │
/// │                                                                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(qty: f64) -> ValidationResult<()> {
    ensure_finite("quantity", qty)?;

    if qty <= 0.0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates an on-hand stock quantity (zero allowed).
pub fn validate_stock_quantity(qty: f64) -> ValidationResult<()> {
    ensure_finite("stockQuantity", qty)?;

    if qty < 0.0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "stockQuantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a price.
///
/// ## Rules
/// - Must be a finite number
/// - Must be non-negative; zero is allowed (giveaways)
///
/// ## Example
/// ```rust
/// use shelfkeep_core::validation::validate_price;
///
/// assert!(validate_price("pricePerCard", 5.0).is_ok());
/// assert!(validate_price("pricePerCard", 0.0).is_ok());
/// assert!(validate_price("pricePerCard", -1.0).is_err());
/// ```
pub fn validate_price(field: &str, price: f64) -> ValidationResult<()> {
    ensure_finite(field, price)?;

    if price < 0.0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a conversion ratio such as `cardsPerPacket`.
pub fn validate_ratio(field: &str, ratio: u32) -> ValidationResult<()> {
    if ratio == 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

fn ensure_finite(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be a finite number".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use shelfkeep_core::validation::validate_uuid;
///
/// assert!(validate_uuid("productId", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("productId", "not-a-uuid").is_err());
/// ```
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::required(field));
    }

    uuid::Uuid::parse_str(id.trim()).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
