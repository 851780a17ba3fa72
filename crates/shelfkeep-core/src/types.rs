//! # Domain Types
//!
//! Core domain types used throughout Shelfkeep.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌──────────────────────┐        ┌──────────────────────┐              │
//! │  │       Product        │        │         Sale         │              │
//! │  │  ──────────────────  │        │  ──────────────────  │              │
//! │  │  id, tenant_id       │◄───────│  product_id (weak)   │              │
//! │  │  name, category      │        │  quantity, sale_unit │              │
//! │  │  stock_quantity      │        │  unit_price (frozen) │              │
//! │  │  profile ─────┐      │        │  total_price (frozen)│              │
//! │  └───────────────┼──────┘        └──────────────────────┘              │
//! │                  ▼                                                      │
//! │  ┌────────────────────────────────────────────────────────────┐        │
//! │  │ StockProfile                                               │        │
//! │  │   Card   { price_per_card }                                │        │
//! │  │   Packet { cards_per_packet, price_per_packet, per_card }  │        │
//! │  │   Carton { packets_per_carton, cards_per_packet?, ... }    │        │
//! │  │   Bottle { price_per_bottle }                              │        │
//! │  └────────────────────────────────────────────────────────────┘        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A product's stock unit is the tag of its [`StockProfile`], so a packet
//! product without `cards_per_packet` is unrepresentable.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Stock Unit
// =============================================================================

/// A unit of packaged goods.
///
/// Used both as a product's stock type and as a sale's unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum StockUnit {
    Card,
    Packet,
    Bottle,
    Carton,
}

impl StockUnit {
    /// All units, in display order.
    pub const ALL: [StockUnit; 4] = [
        StockUnit::Card,
        StockUnit::Packet,
        StockUnit::Bottle,
        StockUnit::Carton,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            StockUnit::Card => "card",
            StockUnit::Packet => "packet",
            StockUnit::Bottle => "bottle",
            StockUnit::Carton => "carton",
        }
    }
}

impl fmt::Display for StockUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StockUnit {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "card" => Ok(StockUnit::Card),
            "packet" => Ok(StockUnit::Packet),
            "bottle" => Ok(StockUnit::Bottle),
            "carton" => Ok(StockUnit::Carton),
            _ => Err(ValidationError::NotAllowed {
                field: "unit".to_string(),
                allowed: StockUnit::ALL.iter().map(|u| u.to_string()).collect(),
            }),
        }
    }
}

// =============================================================================
// Stock Profile
// =============================================================================

/// How a product is stocked and priced.
///
/// Serialized flat alongside the product, tagged by `stockType`:
/// ```json
/// { "stockType": "packet", "cardsPerPacket": 20, "pricePerPacket": 90, "pricePerCard": 5 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "stockType",
    rename_all = "lowercase",
    rename_all_fields = "camelCase"
)]
pub enum StockProfile {
    /// Loose cards, sold only by the card.
    Card { price_per_card: f64 },

    /// Packets of cards, sold by the packet or by the card.
    Packet {
        cards_per_packet: u32,
        price_per_packet: f64,
        price_per_card: f64,
    },

    /// Cartons of packets, sold by the carton or packet.
    ///
    /// Card sales are enabled per product by configuring
    /// `cards_per_packet`; `price_per_card` then prices them.
    Carton {
        packets_per_carton: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cards_per_packet: Option<u32>,
        price_per_carton: f64,
        price_per_packet: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        price_per_card: Option<f64>,
    },

    /// Single bottles.
    Bottle { price_per_bottle: f64 },
}

impl StockProfile {
    /// The unit `stock_quantity` is denominated in.
    pub const fn stock_unit(&self) -> StockUnit {
        match self {
            StockProfile::Card { .. } => StockUnit::Card,
            StockProfile::Packet { .. } => StockUnit::Packet,
            StockProfile::Carton { .. } => StockUnit::Carton,
            StockProfile::Bottle { .. } => StockUnit::Bottle,
        }
    }

    /// Flattens the profile into nullable columns.
    pub fn columns(&self) -> StockColumns {
        match *self {
            StockProfile::Card { price_per_card } => StockColumns {
                price_per_card: Some(price_per_card),
                ..StockColumns::default()
            },
            StockProfile::Packet {
                cards_per_packet,
                price_per_packet,
                price_per_card,
            } => StockColumns {
                cards_per_packet: Some(cards_per_packet),
                price_per_packet: Some(price_per_packet),
                price_per_card: Some(price_per_card),
                ..StockColumns::default()
            },
            StockProfile::Carton {
                packets_per_carton,
                cards_per_packet,
                price_per_carton,
                price_per_packet,
                price_per_card,
            } => StockColumns {
                cards_per_packet,
                packets_per_carton: Some(packets_per_carton),
                price_per_card,
                price_per_packet: Some(price_per_packet),
                price_per_carton: Some(price_per_carton),
                price_per_bottle: None,
            },
            StockProfile::Bottle { price_per_bottle } => StockColumns {
                price_per_bottle: Some(price_per_bottle),
                ..StockColumns::default()
            },
        }
    }
}

/// The flat, conditionally-required fields of a stock profile.
///
/// This is the shape of request bodies and database rows; it becomes a
/// [`StockProfile`] through [`crate::catalog::profile_from_columns`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockColumns {
    #[serde(default)]
    pub cards_per_packet: Option<u32>,
    #[serde(default)]
    pub packets_per_carton: Option<u32>,
    #[serde(default)]
    pub price_per_card: Option<f64>,
    #[serde(default)]
    pub price_per_packet: Option<f64>,
    #[serde(default)]
    pub price_per_carton: Option<f64>,
    #[serde(default)]
    pub price_per_bottle: Option<f64>,
}

// =============================================================================
// Product
// =============================================================================

/// A stocked product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Tenant this product belongs to.
    pub tenant_id: String,

    /// Display name, unique per tenant ignoring case.
    pub name: String,

    pub category: String,

    pub description: Option<String>,

    /// Image URL; empty when none was uploaded.
    pub image: String,

    /// Stock type plus its conversion factors and prices.
    #[serde(flatten)]
    pub profile: StockProfile,

    /// On-hand quantity in `profile.stock_unit()` units. Never negative.
    pub stock_quantity: f64,

    /// Admin who created the product.
    pub created_by: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    /// Bumped on every write; guards read-modify-write cycles.
    pub version: i64,
}

impl Product {
    /// The unit `stock_quantity` is denominated in.
    #[inline]
    pub fn stock_type(&self) -> StockUnit {
        self.profile.stock_unit()
    }

    /// Case-insensitive key used for name uniqueness.
    pub fn name_key(&self) -> String {
        name_key(&self.name)
    }
}

/// Normalizes a product name for uniqueness checks.
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

// =============================================================================
// Sale
// =============================================================================

/// A recorded sale.
///
/// Prices are frozen at sale time. `product_id` is a weak reference: the
/// product may since have changed or been deleted, so `product_name` keeps
/// a snapshot for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: String,
    pub tenant_id: String,
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub product_name: String,
    /// Quantity sold, in `sale_unit`.
    pub quantity: f64,
    pub sale_unit: StockUnit,
    /// Price of one `sale_unit` at time of sale (frozen).
    pub unit_price: f64,
    /// `unit_price × quantity` (frozen).
    pub total_price: f64,
    /// Storekeeper who recorded the sale.
    pub sold_by: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_unit_parse() {
        assert_eq!("card".parse::<StockUnit>().unwrap(), StockUnit::Card);
        assert_eq!(" Carton ".parse::<StockUnit>().unwrap(), StockUnit::Carton);
        assert!("crate".parse::<StockUnit>().is_err());
    }

    #[test]
    fn test_profile_serializes_flat_with_tag() {
        let profile = StockProfile::Packet {
            cards_per_packet: 20,
            price_per_packet: 90.0,
            price_per_card: 5.0,
        };
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["stockType"], "packet");
        assert_eq!(json["cardsPerPacket"], 20);
        assert_eq!(json["pricePerCard"], 5.0);
    }

    #[test]
    fn test_carton_without_cards_omits_card_fields() {
        let profile = StockProfile::Carton {
            packets_per_carton: 10,
            cards_per_packet: None,
            price_per_carton: 1000.0,
            price_per_packet: 110.0,
            price_per_card: None,
        };
        let json = serde_json::to_value(&profile).unwrap();
        assert!(json.get("cardsPerPacket").is_none());
        assert!(json.get("pricePerCard").is_none());

        let back: StockProfile = serde_json::from_value(json).unwrap();
        assert_eq!(back, profile);
    }

    #[test]
    fn test_columns_match_tag() {
        let profile = StockProfile::Bottle { price_per_bottle: 300.0 };
        let cols = profile.columns();
        assert_eq!(cols.price_per_bottle, Some(300.0));
        assert_eq!(cols.cards_per_packet, None);
        assert_eq!(profile.stock_unit(), StockUnit::Bottle);
    }

    #[test]
    fn test_name_key_ignores_case_and_padding() {
        assert_eq!(name_key("  Coca-Cola 50cl "), "coca-cola 50cl");
    }
}
