//! # Error Types
//!
//! Domain-specific error types for shelfkeep-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  shelfkeep-core errors (this file)                                     │
//! │  ├── CoreError        - Ledger, catalogue and policy failures          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  shelfkeep-db errors (separate crate)                                  │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  HTTP errors (in app)                                                  │
//! │  └── ApiError         - What the dashboard sees (serialized)           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Client       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every variant except `Forbidden` is a client-input error: callers surface
//! it as a 4xx and never retry.

use thiserror::Error;

use crate::types::StockUnit;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// Product cannot be found in the caller's tenant.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Sale cannot be found in the caller's tenant.
    #[error("Sale not found: {0}")]
    SaleNotFound(String),

    /// The sale unit has no conversion into the product's stock unit.
    ///
    /// ## When This Occurs
    /// - Selling `card` against a `bottle` product
    /// - Selling `card` against a carton product that has no
    ///   `cards_per_packet` configured
    /// - Selling `carton` against a packet product
    #[error("Cannot sell by {sale_unit} from stock kept in {stock_type}")]
    IncompatibleUnit {
        stock_type: StockUnit,
        sale_unit: StockUnit,
    },

    /// Not enough stock on hand, expressed in the requested unit.
    ///
    /// ## User Workflow
    /// ```text
    /// Record sale (300 cards)
    ///      │
    ///      ▼
    /// 10 packets × 20 cards = 200 cards available
    ///      │
    ///      ▼
    /// InsufficientStock { available: 200, requested: 300, unit: card }
    ///      │
    ///      ▼
    /// Dashboard shows: "Only 200 card(s) of Marlboro Red in stock"
    /// ```
    #[error("Insufficient stock for {product}: available {available} {unit}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: f64,
        requested: f64,
        unit: StockUnit,
    },

    /// The price field needed for the sale unit is absent or not a number.
    #[error("Price not configured: {field} is not set for {product}")]
    PriceNotConfigured {
        product: String,
        field: &'static str,
    },

    /// The caller's role does not allow the action.
    #[error("{role} is not allowed to {action}")]
    Forbidden { role: String, action: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be zero or more.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., invalid UUID, NaN).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// A field only makes sense for other stock types.
    #[error("{field} does not apply to {stock_type} stock")]
    NotApplicable { field: String, stock_type: String },
}

impl ValidationError {
    pub(crate) fn required(field: &str) -> Self {
        ValidationError::Required {
            field: field.to_string(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product: "Marlboro Red".to_string(),
            available: 200.0,
            requested: 300.0,
            unit: StockUnit::Card,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Marlboro Red: available 200 card, requested 300"
        );

        let err = CoreError::IncompatibleUnit {
            stock_type: StockUnit::Bottle,
            sale_unit: StockUnit::Card,
        };
        assert_eq!(err.to_string(), "Cannot sell by card from stock kept in bottle");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::required("category");
        assert_eq!(err.to_string(), "category is required");

        let err = ValidationError::NotApplicable {
            field: "packetsPerCarton".to_string(),
            stock_type: "bottle".to_string(),
        };
        assert_eq!(err.to_string(), "packetsPerCarton does not apply to bottle stock");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("name").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
