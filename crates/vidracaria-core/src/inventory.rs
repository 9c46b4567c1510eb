//! # Inventory
//!
//! Stock level arithmetic for glass sheets, profiles and hardware.
//!
//! ```text
//! Product { quantity: 10 }
//!      │
//!      ├── in  (+5, 2025-06-05) ──► quantity 15, last_entry 2025-06-05
//!      │
//!      └── out (−12) ──► InsufficientStock { available: 10, requested: 12 }
//! ```

use chrono::NaiveDate;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{MovementKind, Product, StockLevel, StockReason};
use crate::validation::{validate_quantity, validate_stock_level};

/// Computes the stock level after a movement.
///
/// The product itself is not touched; the caller persists the returned
/// [`StockLevel`] once the movement record is stored.
///
/// ## Errors
/// - `Validation` when `quantity <= 0`, the reason does not fit the
///   direction, or an entry would take the product past [`MAX_QUANTITY`](crate::MAX_QUANTITY)
/// - `InsufficientStock` when an exit exceeds what is on hand
pub fn apply_stock_movement(
    product: &Product,
    kind: MovementKind,
    quantity: i64,
    reason: StockReason,
    date: NaiveDate,
) -> CoreResult<StockLevel> {
    validate_quantity(quantity)?;

    if !reason.allowed_for(kind) {
        return Err(crate::error::ValidationError::InvalidFormat {
            field: "reason".to_string(),
            reason: format!("{} is not valid for a stock {}", reason.as_str(), kind),
        }
        .into());
    }

    match kind {
        MovementKind::In => {
            let quantity = product.quantity.saturating_add(quantity);
            validate_stock_level("quantity", quantity)?;
            Ok(StockLevel {
                quantity,
                last_entry: Some(date),
            })
        }
        MovementKind::Out => {
            if quantity > product.quantity {
                return Err(CoreError::InsufficientStock {
                    code: product.code.clone(),
                    available: product.quantity,
                    requested: quantity,
                });
            }
            Ok(StockLevel {
                quantity: product.quantity - quantity,
                last_entry: product.last_entry,
            })
        }
    }
}

/// At or below the minimum level.
#[inline]
pub fn is_low_stock(product: &Product) -> bool {
    product.quantity <= product.minimum_quantity
}

/// Products needing replenishment, lowest stock first.
pub fn low_stock<'a>(products: &'a [Product]) -> Vec<&'a Product> {
    let mut low: Vec<&Product> = products.iter().filter(|p| is_low_stock(p)).collect();
    low.sort_by(|a, b| {
        (a.quantity - a.minimum_quantity)
            .cmp(&(b.quantity - b.minimum_quantity))
            .then_with(|| a.code.cmp(&b.code))
    });
    low
}

/// Value of the stock on hand: Σ quantity × unit price.
pub fn stock_value(products: &[Product]) -> Money {
    products
        .iter()
        .map(|p| p.unit_price.multiply_quantity(p.quantity))
        .sum()
}

// =============================================================================
// Unit Tests
// =============================================================================
