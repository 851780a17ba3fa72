//! # Unit Conversion
//!
//! The table of which sale units can be drawn from which stock units, and
//! the price field that prices each sale unit.
//!
//! ## Conversion Table
//! ```text
//! ┌────────────┬───────────┬────────────────────────────────────────────┐
//! │ stock type │ sale unit │ sale units per stock unit                  │
//! ├────────────┼───────────┼────────────────────────────────────────────┤
//! │ card       │ card      │ 1                                          │
//! │ packet     │ packet    │ 1                                          │
//! │ packet     │ card      │ cards_per_packet                           │
//! │ carton     │ carton    │ 1                                          │
//! │ carton     │ packet    │ packets_per_carton                         │
//! │ carton     │ card      │ packets_per_carton × cards_per_packet      │
//! │            │           │ (only when cards_per_packet is configured) │
//! │ bottle     │ bottle    │ 1                                          │
//! └────────────┴───────────┴────────────────────────────────────────────┘
//!   anything else → CoreError::IncompatibleUnit
//! ```
//!
//! Factors are kept as integers and applied by division, so
//! `25 cards / 20 = 1.25 packets` is exact.

use crate::error::{CoreError, CoreResult};
use crate::types::{Product, StockProfile, StockUnit};

// =============================================================================
// Conversion
// =============================================================================

/// A resolved `(stock unit, sale unit)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conversion {
    pub stock_unit: StockUnit,
    pub sale_unit: StockUnit,
    /// How many sale units one stock unit holds. Always at least 1.
    pub sale_units_per_stock_unit: u64,
}

impl Conversion {
    /// Expresses a stock quantity in sale units.
    #[inline]
    pub fn to_sale_units(&self, stock_qty: f64) -> f64 {
        stock_qty * self.sale_units_per_stock_unit as f64
    }

    /// Expresses a sale quantity in stock units.
    #[inline]
    pub fn to_stock_units(&self, sale_qty: f64) -> f64 {
        sale_qty / self.sale_units_per_stock_unit as f64
    }

    /// True when sale and stock units coincide.
    pub fn is_identity(&self) -> bool {
        self.sale_units_per_stock_unit == 1 && self.stock_unit == self.sale_unit
    }
}

/// Looks up the conversion for selling `sale_unit` out of `profile`.
///
/// ## Errors
/// [`CoreError::IncompatibleUnit`] when the pair is not in the table.
pub fn conversion(profile: &StockProfile, sale_unit: StockUnit) -> CoreResult<Conversion> {
    let factor: Option<u64> = match (profile, sale_unit) {
        (StockProfile::Card { .. }, StockUnit::Card)
        | (StockProfile::Packet { .. }, StockUnit::Packet)
        | (StockProfile::Carton { .. }, StockUnit::Carton)
        | (StockProfile::Bottle { .. }, StockUnit::Bottle) => Some(1),

        (StockProfile::Packet { cards_per_packet, .. }, StockUnit::Card) => {
            Some(u64::from(*cards_per_packet))
        }

        (StockProfile::Carton { packets_per_carton, .. }, StockUnit::Packet) => {
            Some(u64::from(*packets_per_carton))
        }

        (
            StockProfile::Carton {
                packets_per_carton,
                cards_per_packet: Some(cards_per_packet),
                ..
            },
            StockUnit::Card,
        ) => Some(u64::from(*packets_per_carton) * u64::from(*cards_per_packet)),

        _ => None,
    };

    match factor.filter(|n| *n > 0) {
        Some(n) => Ok(Conversion {
            stock_unit: profile.stock_unit(),
            sale_unit,
            sale_units_per_stock_unit: n,
        }),
        None => Err(CoreError::IncompatibleUnit {
            stock_type: profile.stock_unit(),
            sale_unit,
        }),
    }
}

/// Sale units the profile can be sold in, in display order.
pub fn sale_units(profile: &StockProfile) -> Vec<StockUnit> {
    StockUnit::ALL
        .into_iter()
        .filter(|unit| conversion(profile, *unit).is_ok())
        .collect()
}

// =============================================================================
// Pricing
// =============================================================================

/// Name of the product field that prices `unit`.
pub const fn price_field(unit: StockUnit) -> &'static str {
    match unit {
        StockUnit::Card => "pricePerCard",
        StockUnit::Packet => "pricePerPacket",
        StockUnit::Carton => "pricePerCarton",
        StockUnit::Bottle => "pricePerBottle",
    }
}

/// Price of one `sale_unit` of `product`.
///
/// ## Errors
/// [`CoreError::PriceNotConfigured`] when the matching price field is
/// absent or not a finite number.
pub fn unit_price(product: &Product, sale_unit: StockUnit) -> CoreResult<f64> {
    let columns = product.profile.columns();
    let price = match sale_unit {
        StockUnit::Card => columns.price_per_card,
        StockUnit::Packet => columns.price_per_packet,
        StockUnit::Carton => columns.price_per_carton,
        StockUnit::Bottle => columns.price_per_bottle,
    };

    match price {
        Some(price) if price.is_finite() => Ok(price),
        _ => Err(CoreError::PriceNotConfigured {
            product: product.name.clone(),
            field: price_field(sale_unit),
        }),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn packet() -> StockProfile {
        StockProfile::Packet {
            cards_per_packet: 20,
            price_per_packet: 90.0,
            price_per_card: 5.0,
        }
    }

    fn carton(cards_per_packet: Option<u32>) -> StockProfile {
        StockProfile::Carton {
            packets_per_carton: 10,
            cards_per_packet,
            price_per_carton: 850.0,
            price_per_packet: 90.0,
            price_per_card: cards_per_packet.map(|_| 5.0),
        }
    }

    #[test]
    fn test_identity_pairs() {
        let profiles = [
            StockProfile::Card { price_per_card: 5.0 },
            packet(),
            carton(None),
            StockProfile::Bottle { price_per_bottle: 300.0 },
        ];
        for profile in &profiles {
            let conv = conversion(profile, profile.stock_unit()).unwrap();
            assert!(conv.is_identity());
            assert_eq!(conv.to_stock_units(3.5), 3.5);
        }
    }

    #[test]
    fn test_packet_to_card() {
        let conv = conversion(&packet(), StockUnit::Card).unwrap();
        assert_eq!(conv.sale_units_per_stock_unit, 20);
        assert_eq!(conv.to_sale_units(10.0), 200.0);
        assert_eq!(conv.to_stock_units(25.0), 1.25);
    }

    #[test]
    fn test_carton_to_packet() {
        let conv = conversion(&carton(None), StockUnit::Packet).unwrap();
        assert_eq!(conv.sale_units_per_stock_unit, 10);
        assert_eq!(conv.to_stock_units(5.0), 0.5);
    }

    #[test]
    fn test_carton_to_card_needs_cards_per_packet() {
        assert_eq!(
            conversion(&carton(None), StockUnit::Card),
            Err(CoreError::IncompatibleUnit {
                stock_type: StockUnit::Carton,
                sale_unit: StockUnit::Card,
            })
        );

        let conv = conversion(&carton(Some(20)), StockUnit::Card).unwrap();
        assert_eq!(conv.sale_units_per_stock_unit, 200);
    }

    #[test]
    fn test_incompatible_pairs() {
        let bottle = StockProfile::Bottle { price_per_bottle: 300.0 };
        for unit in [StockUnit::Card, StockUnit::Packet, StockUnit::Carton] {
            assert!(conversion(&bottle, unit).is_err());
        }
        assert!(conversion(&packet(), StockUnit::Carton).is_err());
        assert!(conversion(&StockProfile::Card { price_per_card: 1.0 }, StockUnit::Packet).is_err());
    }

    #[test]
    fn test_sale_units() {
        assert_eq!(sale_units(&packet()), vec![StockUnit::Card, StockUnit::Packet]);
        assert_eq!(sale_units(&carton(None)), vec![StockUnit::Packet, StockUnit::Carton]);
        assert_eq!(
            sale_units(&carton(Some(20))),
            vec![StockUnit::Card, StockUnit::Packet, StockUnit::Carton]
        );
    }
}
