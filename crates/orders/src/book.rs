use serde::{Deserialize, Serialize};

use teahouse_core::{DomainError, DomainResult, OrderId};

use crate::order::{Order, OrderStatus};

/// Aggregate figures over the whole order book.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderStats {
    pub total: usize,
    pub new: usize,
    pub completed: usize,
    pub cancelled: usize,
    /// Revenue over completed orders, in the smallest currency unit.
    pub revenue: u64,
}

/// All orders, in creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderBook {
    orders: Vec<Order>,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, order: Order) -> DomainResult<()> {
        if self.get(order.id()).is_some() {
            return Err(DomainError::conflict(format!(
                "order {} already exists",
                order.id()
            )));
        }
        self.orders.push(order);
        Ok(())
    }

    pub fn get(&self, id: OrderId) -> Option<&Order> {
        self.orders.iter().find(|order| order.id() == id)
    }

    pub fn get_mut(&mut self, id: OrderId) -> Option<&mut Order> {
        self.orders.iter_mut().find(|order| order.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }

    /// Orders still awaiting fulfilment, oldest first.
    pub fn new_orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter().filter(|order| order.is_new())
    }

    pub fn stats(&self) -> OrderStats {
        let mut stats = OrderStats {
            total: self.orders.len(),
            ..OrderStats::default()
        };
        for order in &self.orders {
            match order.status() {
                OrderStatus::New => stats.new += 1,
                OrderStatus::Completed => {
                    stats.completed += 1;
                    stats.revenue += order.total();
                }
                OrderStatus::Cancelled => stats.cancelled += 1,
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::checkout;
    use chrono::Utc;
    use teahouse_cart::Cart;
    use teahouse_catalog::Product;
    use teahouse_core::{ChatId, DeliveryDetails, ProductKey, UnitKind};
    use teahouse_inventory::Ledger;

    fn make_order(ledger: &Ledger) -> Order {
        let key = ProductKey::new("Dark Oolong", "Wild Dan Cong");
        let mut product = Product::new();
        product.set_bulk_price(13).unwrap();

        let mut cart = Cart::new();
        cart.add_item(key, &product, UnitKind::Bulk, 20, ledger)
            .unwrap();

        let details = DeliveryDetails {
            city: "X".into(),
            method: "cdek".parse().unwrap(),
            recipient: "Y".into(),
            phone: "Z".into(),
        };
        checkout(ChatId(100), &cart, details, ledger, Utc::now()).unwrap()
    }

    fn stocked_ledger() -> Ledger {
        let mut ledger = Ledger::new();
        ledger.set_available(
            &ProductKey::new("Dark Oolong", "Wild Dan Cong"),
            UnitKind::Bulk,
            1000,
        );
        ledger
    }

    #[test]
    fn insert_and_lookup() {
        let ledger = stocked_ledger();
        let order = make_order(&ledger);
        let id = order.id();

        let mut book = OrderBook::new();
        book.insert(order).unwrap();
        assert!(book.get(id).is_some());
        assert!(book.get(OrderId::new()).is_none());
    }

    #[test]
    fn duplicate_insert_is_a_conflict() {
        let ledger = stocked_ledger();
        let order = make_order(&ledger);

        let mut book = OrderBook::new();
        book.insert(order.clone()).unwrap();
        assert!(matches!(
            book.insert(order).unwrap_err(),
            DomainError::Conflict(_)
        ));
    }

    #[test]
    fn stats_count_by_status_and_sum_completed_revenue() {
        let mut ledger = stocked_ledger();
        let mut book = OrderBook::new();

        let completed = make_order(&ledger);
        let completed_id = completed.id();
        let cancelled = make_order(&ledger);
        let cancelled_id = cancelled.id();
        let open = make_order(&ledger);

        book.insert(completed).unwrap();
        book.insert(cancelled).unwrap();
        book.insert(open).unwrap();

        book.get_mut(completed_id)
            .unwrap()
            .complete(&mut ledger)
            .unwrap();
        book.get_mut(cancelled_id).unwrap().cancel().unwrap();

        let stats = book.stats();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.new, 1);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.cancelled, 1);
        assert_eq!(stats.revenue, 260);

        assert_eq!(book.new_orders().count(), 1);
    }
}
