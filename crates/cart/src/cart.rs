use serde::{Deserialize, Serialize};

use teahouse_catalog::Product;
use teahouse_core::{DomainError, DomainResult, ProductKey, UnitKind};
use teahouse_inventory::Ledger;

/// Minimum quantity for a bulk-unit (by-weight) line.
pub const MIN_BULK_QUANTITY: u32 = 20;

/// Cart line: product, unit kind, quantity, price captured at add time.
///
/// The captured price is a snapshot; later catalog price edits never touch
/// lines already in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product: ProductKey,
    pub unit: UnitKind,
    pub quantity: u32,
    /// Unit price in the smallest currency unit, captured at add time.
    pub unit_price: u64,
}

impl CartItem {
    pub fn line_total(&self) -> u64 {
        self.unit_price * u64::from(self.quantity)
    }
}

/// One user's cart. Insertion order is display order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and append a line item.
    ///
    /// Checks, in order: positive quantity, the product's price for the unit
    /// kind (piece sales must be allowed and priced), current ledger
    /// availability, and the bulk minimum.
    pub fn add_item(
        &mut self,
        key: ProductKey,
        product: &Product,
        unit: UnitKind,
        quantity: u32,
        ledger: &Ledger,
    ) -> DomainResult<&CartItem> {
        if quantity == 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }

        let unit_price = product.price_for(unit)?;

        let available = ledger.available(&key, unit);
        if quantity > available {
            return Err(DomainError::InsufficientStock { available });
        }

        if unit == UnitKind::Bulk && quantity < MIN_BULK_QUANTITY {
            return Err(DomainError::BelowMinimum {
                minimum: MIN_BULK_QUANTITY,
            });
        }

        self.items.push(CartItem {
            product: key,
            unit,
            quantity,
            unit_price,
        });
        Ok(self.items.last().expect("just pushed"))
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Σ captured price × quantity over all lines.
    pub fn total(&self) -> u64 {
        self.items.iter().map(CartItem::line_total).sum()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
