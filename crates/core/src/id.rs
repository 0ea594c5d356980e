//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Identity of a chat participant (customer or administrator).
///
/// Carries the messaging transport's numeric chat identifier verbatim.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub i64);

impl core::fmt::Display for ChatId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for ChatId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s
            .parse::<i64>()
            .map_err(|e| DomainError::validation(format!("ChatId: {e}")))?;
        Ok(Self(raw))
    }
}

/// Identifier of an order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(Uuid);

impl OrderId {
    /// Mint a fresh identifier.
    ///
    /// Uses UUIDv7 (time-ordered); collision-free across the whole order book.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Short human-facing form for message text ("order #a1b2c3d4").
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for OrderId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0.simple(), f)
    }
}

impl FromStr for OrderId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uuid = Uuid::from_str(s)
            .map_err(|e| DomainError::validation(format!("OrderId: {e}")))?;
        Ok(Self(uuid))
    }
}

/// Identity of a product: its category plus its name within that category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProductKey {
    pub category: String,
    pub name: String,
}

impl ProductKey {
    pub fn new(category: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            name: name.into(),
        }
    }

    /// Deterministic short token for this key.
    ///
    /// Derived via UUIDv5 over `category \x1F name`, so the same key always
    /// yields the same token regardless of process restarts or insertion
    /// order. The separator byte cannot appear in either component, which
    /// keeps distinct keys from colliding.
    pub fn token(&self) -> ProductToken {
        let mut material = Vec::with_capacity(self.category.len() + self.name.len() + 1);
        material.extend_from_slice(self.category.as_bytes());
        material.push(0x1F);
        material.extend_from_slice(self.name.as_bytes());
        ProductToken(Uuid::new_v5(&Uuid::NAMESPACE_OID, &material))
    }
}

impl core::fmt::Display for ProductKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/{}", self.category, self.name)
    }
}

/// Opaque, deterministic reference to a product, safe to embed in callback
/// payloads where the full key would not fit.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductToken(Uuid);

impl core::fmt::Display for ProductToken {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0.simple(), f)
    }
}

impl FromStr for ProductToken {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uuid = Uuid::from_str(s)
            .map_err(|e| DomainError::validation(format!("ProductToken: {e}")))?;
        Ok(Self(uuid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_token_is_deterministic() {
        let a = ProductKey::new("Dark Oolong", "Wild Dan Cong").token();
        let b = ProductKey::new("Dark Oolong", "Wild Dan Cong").token();
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_keys_yield_distinct_tokens() {
        let a = ProductKey::new("Dark Oolong", "Wild Dan Cong").token();
        let b = ProductKey::new("Dark Oolong", "Aged Shui Xian").token();
        let c = ProductKey::new("White Tea", "Wild Dan Cong").token();
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(b, c);
    }

    #[test]
    fn category_name_split_is_unambiguous() {
        // "ab" + "c" must not collide with "a" + "bc".
        let a = ProductKey::new("ab", "c").token();
        let b = ProductKey::new("a", "bc").token();
        assert_ne!(a, b);
    }

    #[test]
    fn product_token_round_trips_through_display() {
        let token = ProductKey::new("Green Tea", "Dragon Well").token();
        let parsed: ProductToken = token.to_string().parse().unwrap();
        assert_eq!(token, parsed);
    }

    #[test]
    fn order_ids_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for _ in 0..10_000 {
            assert!(seen.insert(OrderId::new()));
        }
    }

    #[test]
    fn order_id_round_trips_through_display() {
        let id = OrderId::new();
        let parsed: OrderId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn order_id_short_form_is_a_prefix() {
        let id = OrderId::new();
        assert_eq!(id.short().len(), 8);
        assert!(id.to_string().starts_with(&id.short()));
    }
}
