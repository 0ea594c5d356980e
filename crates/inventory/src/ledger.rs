use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use teahouse_core::{DomainError, DomainResult, ProductKey, UnitKind};

/// Available quantity of one product, per unit kind.
///
/// `pieces` is `None` until piece stock has been configured; a product sold
/// bulk-only simply never gets one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevel {
    pub bulk: u32,
    pub pieces: Option<u32>,
}

impl StockLevel {
    fn available(&self, unit: UnitKind) -> u32 {
        match unit {
            UnitKind::Bulk => self.bulk,
            UnitKind::Piece => self.pieces.unwrap_or(0),
        }
    }

    fn set(&mut self, unit: UnitKind, quantity: u32) {
        match unit {
            UnitKind::Bulk => self.bulk = quantity,
            UnitKind::Piece => self.pieces = Some(quantity),
        }
    }
}

/// One line of demand against the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockDemand {
    pub key: ProductKey,
    pub unit: UnitKind,
    pub quantity: u32,
}

/// A demand the ledger could not satisfy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortfall {
    pub key: ProductKey,
    pub unit: UnitKind,
    pub requested: u32,
    pub available: u32,
}

/// The availability ledger: category → product name → stock level.
///
/// Quantities are unsigned and decremented with checked arithmetic, so the
/// ledger can never record a negative quantity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    levels: BTreeMap<String, BTreeMap<String, StockLevel>>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current availability. Unknown products read as zero.
    pub fn available(&self, key: &ProductKey, unit: UnitKind) -> u32 {
        self.levels
            .get(&key.category)
            .and_then(|products| products.get(&key.name))
            .map(|level| level.available(unit))
            .unwrap_or(0)
    }

    pub fn level(&self, key: &ProductKey) -> StockLevel {
        self.levels
            .get(&key.category)
            .and_then(|products| products.get(&key.name))
            .copied()
            .unwrap_or_default()
    }

    /// Administrative restock: unconditional overwrite of the available
    /// quantity for one unit kind.
    pub fn set_available(&mut self, key: &ProductKey, unit: UnitKind, quantity: u32) {
        self.levels
            .entry(key.category.clone())
            .or_default()
            .entry(key.name.clone())
            .or_default()
            .set(unit, quantity);
    }

    /// Reduce availability by `quantity`. The only commerce path that lowers
    /// stock; fails rather than go negative.
    pub fn decrement(&mut self, key: &ProductKey, unit: UnitKind, quantity: u32) -> DomainResult<()> {
        let available = self.available(key, unit);
        let remaining = available
            .checked_sub(quantity)
            .ok_or(DomainError::InsufficientStock { available })?;
        self.levels
            .entry(key.category.clone())
            .or_default()
            .entry(key.name.clone())
            .or_default()
            .set(unit, remaining);
        Ok(())
    }

    /// All-or-nothing batch decrement.
    ///
    /// Demands for the same product and unit are aggregated before checking,
    /// every demand is validated against current availability, and only then
    /// is anything applied. On any shortfall the ledger is left untouched and
    /// the full shortfall list is returned.
    pub fn decrement_batch(&mut self, demands: &[StockDemand]) -> Result<(), Vec<Shortfall>> {
        let mut totals: BTreeMap<(ProductKey, UnitKind), u64> = BTreeMap::new();
        for demand in demands {
            *totals
                .entry((demand.key.clone(), demand.unit))
                .or_default() += u64::from(demand.quantity);
        }

        let shortfalls: Vec<Shortfall> = totals
            .iter()
            .filter_map(|((key, unit), requested)| {
                let available = self.available(key, *unit);
                if *requested > u64::from(available) {
                    Some(Shortfall {
                        key: key.clone(),
                        unit: *unit,
                        requested: u32::try_from(*requested).unwrap_or(u32::MAX),
                        available,
                    })
                } else {
                    None
                }
            })
            .collect();
        if !shortfalls.is_empty() {
            return Err(shortfalls);
        }

        for ((key, unit), requested) in totals {
            let available = self.available(&key, unit);
            let remaining = available - requested as u32;
            self.levels
                .entry(key.category)
                .or_default()
                .entry(key.name)
                .or_default()
                .set(unit, remaining);
        }
        Ok(())
    }

    /// Drop the ledger entry for a deleted product.
    pub fn remove_product(&mut self, key: &ProductKey) {
        if let Some(products) = self.levels.get_mut(&key.category) {
            products.remove(&key.name);
            if products.is_empty() {
                self.levels.remove(&key.category);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tea() -> ProductKey {
        ProductKey::new("Dark Oolong", "Wild Dan Cong")
    }

    fn pot() -> ProductKey {
        ProductKey::new("Teaware", "Clay Pot")
    }

    #[test]
    fn unknown_product_reads_as_zero() {
        let ledger = Ledger::new();
        assert_eq!(ledger.available(&tea(), UnitKind::Bulk), 0);
        assert_eq!(ledger.available(&tea(), UnitKind::Piece), 0);
    }

    #[test]
    fn unconfigured_piece_stock_reads_as_zero() {
        let mut ledger = Ledger::new();
        ledger.set_available(&tea(), UnitKind::Bulk, 100);
        assert_eq!(ledger.available(&tea(), UnitKind::Piece), 0);
    }

    #[test]
    fn set_available_is_an_unconditional_overwrite() {
        let mut ledger = Ledger::new();
        ledger.set_available(&tea(), UnitKind::Bulk, 100);
        ledger.set_available(&tea(), UnitKind::Bulk, 5);
        assert_eq!(ledger.available(&tea(), UnitKind::Bulk), 5);
    }

    #[test]
    fn decrement_subtracts_exactly_once() {
        let mut ledger = Ledger::new();
        ledger.set_available(&tea(), UnitKind::Bulk, 1000);
        ledger.decrement(&tea(), UnitKind::Bulk, 20).unwrap();
        assert_eq!(ledger.available(&tea(), UnitKind::Bulk), 980);
    }

    #[test]
    fn decrement_refuses_to_go_negative() {
        let mut ledger = Ledger::new();
        ledger.set_available(&tea(), UnitKind::Bulk, 10);
        let err = ledger.decrement(&tea(), UnitKind::Bulk, 11).unwrap_err();
        assert_eq!(err, DomainError::InsufficientStock { available: 10 });
        assert_eq!(ledger.available(&tea(), UnitKind::Bulk), 10);
    }

    #[test]
    fn batch_decrement_applies_all_demands() {
        let mut ledger = Ledger::new();
        ledger.set_available(&tea(), UnitKind::Bulk, 1000);
        ledger.set_available(&pot(), UnitKind::Piece, 5);

        ledger
            .decrement_batch(&[
                StockDemand { key: tea(), unit: UnitKind::Bulk, quantity: 20 },
                StockDemand { key: pot(), unit: UnitKind::Piece, quantity: 2 },
            ])
            .unwrap();

        assert_eq!(ledger.available(&tea(), UnitKind::Bulk), 980);
        assert_eq!(ledger.available(&pot(), UnitKind::Piece), 3);
    }

    #[test]
    fn batch_decrement_is_all_or_nothing() {
        let mut ledger = Ledger::new();
        ledger.set_available(&tea(), UnitKind::Bulk, 1000);
        ledger.set_available(&pot(), UnitKind::Piece, 1);

        let shortfalls = ledger
            .decrement_batch(&[
                StockDemand { key: tea(), unit: UnitKind::Bulk, quantity: 20 },
                StockDemand { key: pot(), unit: UnitKind::Piece, quantity: 2 },
            ])
            .unwrap_err();

        assert_eq!(shortfalls.len(), 1);
        assert_eq!(shortfalls[0].key, pot());
        assert_eq!(shortfalls[0].requested, 2);
        assert_eq!(shortfalls[0].available, 1);

        // Nothing was applied, including the satisfiable demand.
        assert_eq!(ledger.available(&tea(), UnitKind::Bulk), 1000);
        assert_eq!(ledger.available(&pot(), UnitKind::Piece), 1);
    }

    #[test]
    fn batch_decrement_aggregates_duplicate_lines() {
        let mut ledger = Ledger::new();
        ledger.set_available(&tea(), UnitKind::Bulk, 50);

        // 30 + 30 exceeds 50 even though each line alone fits.
        let shortfalls = ledger
            .decrement_batch(&[
                StockDemand { key: tea(), unit: UnitKind::Bulk, quantity: 30 },
                StockDemand { key: tea(), unit: UnitKind::Bulk, quantity: 30 },
            ])
            .unwrap_err();
        assert_eq!(shortfalls[0].requested, 60);
        assert_eq!(ledger.available(&tea(), UnitKind::Bulk), 50);
    }

    #[test]
    fn remove_product_clears_the_entry() {
        let mut ledger = Ledger::new();
        ledger.set_available(&tea(), UnitKind::Bulk, 100);
        ledger.remove_product(&tea());
        assert_eq!(ledger.available(&tea(), UnitKind::Bulk), 0);
    }

    proptest! {
        #[test]
        fn decrement_never_underflows(stock in 0u32..10_000, ask in 0u32..10_000) {
            let mut ledger = Ledger::new();
            ledger.set_available(&tea(), UnitKind::Bulk, stock);
            let result = ledger.decrement(&tea(), UnitKind::Bulk, ask);
            if ask <= stock {
                prop_assert!(result.is_ok());
                prop_assert_eq!(ledger.available(&tea(), UnitKind::Bulk), stock - ask);
            } else {
                prop_assert!(result.is_err());
                prop_assert_eq!(ledger.available(&tea(), UnitKind::Bulk), stock);
            }
        }
    }
}
