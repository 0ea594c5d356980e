use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use teahouse_cart::Cart;
use teahouse_catalog::Catalog;
use teahouse_core::ChatId;
use teahouse_inventory::Ledger;
use teahouse_orders::OrderBook;
use teahouse_session::Sessions;

/// The whole persisted state, serialized as one JSON document.
///
/// Fields default individually so documents written by older builds keep
/// loading after a field is added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateDocument {
    /// Every chat that ever sent `/start`; the broadcast audience.
    pub users: BTreeSet<ChatId>,
    pub catalog: Catalog,
    pub ledger: Ledger,
    pub carts: BTreeMap<ChatId, Cart>,
    pub orders: OrderBook,
    pub sessions: Sessions,
}

impl StateDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a user. Returns true the first time a chat is seen.
    pub fn register_user(&mut self, chat: ChatId) -> bool {
        self.users.insert(chat)
    }

    pub fn cart(&self, chat: ChatId) -> Option<&Cart> {
        self.carts.get(&chat)
    }

    /// The user's cart, created lazily on first access.
    pub fn cart_mut(&mut self, chat: ChatId) -> &mut Cart {
        self.carts.entry(chat).or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use teahouse_core::UnitKind;

    #[test]
    fn register_user_is_idempotent() {
        let mut doc = StateDocument::new();
        assert!(doc.register_user(ChatId(1)));
        assert!(!doc.register_user(ChatId(1)));
        assert_eq!(doc.users.len(), 1);
    }

    #[test]
    fn document_round_trips_through_json() {
        let mut doc = StateDocument::new();
        doc.register_user(ChatId(100));
        doc.catalog.add_category("Dark Oolong").unwrap();
        let key = doc.catalog.add_product("Dark Oolong", "Wild Dan Cong").unwrap();
        doc.ledger.set_available(&key, UnitKind::Bulk, 1000);

        let json = serde_json::to_string(&doc).unwrap();
        let back: StateDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn empty_json_object_loads_as_defaults() {
        let doc: StateDocument = serde_json::from_str("{}").unwrap();
        assert_eq!(doc, StateDocument::default());
    }
}
