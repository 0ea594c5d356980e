//! Shared value objects: compared by value, no identity of their own.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// The two unit kinds a product can be sold in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    /// Divisible quantity sold by weight (grams).
    Bulk,
    /// Discrete, countable quantity sold per item.
    Piece,
}

impl UnitKind {
    /// Short unit label for message text.
    pub fn label(&self) -> &'static str {
        match self {
            UnitKind::Bulk => "g",
            UnitKind::Piece => "pcs",
        }
    }
}

impl core::fmt::Display for UnitKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// Opaque reference to a product image held by the messaging transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(pub String);

impl ImageRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Supported delivery methods.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMethod {
    Cdek,
    Post,
    Pyaterochka,
    Avito,
}

impl DeliveryMethod {
    pub const ALL: [DeliveryMethod; 4] = [
        DeliveryMethod::Cdek,
        DeliveryMethod::Post,
        DeliveryMethod::Pyaterochka,
        DeliveryMethod::Avito,
    ];

    /// Stable wire tag, used in callback payloads and persisted records.
    pub fn tag(&self) -> &'static str {
        match self {
            DeliveryMethod::Cdek => "cdek",
            DeliveryMethod::Post => "post",
            DeliveryMethod::Pyaterochka => "pyaterochka",
            DeliveryMethod::Avito => "avito",
        }
    }

    /// Human-facing name.
    pub fn label(&self) -> &'static str {
        match self {
            DeliveryMethod::Cdek => "CDEK",
            DeliveryMethod::Post => "Russian Post",
            DeliveryMethod::Pyaterochka => "Pyaterochka pickup",
            DeliveryMethod::Avito => "Avito delivery",
        }
    }
}

impl core::fmt::Display for DeliveryMethod {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for DeliveryMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DeliveryMethod::ALL
            .into_iter()
            .find(|m| m.tag() == s)
            .ok_or_else(|| DomainError::validation(format!("unknown delivery method: {s}")))
    }
}

/// Delivery details collected during checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryDetails {
    pub city: String,
    pub method: DeliveryMethod,
    pub recipient: String,
    pub phone: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivery_method_tags_round_trip() {
        for method in DeliveryMethod::ALL {
            let parsed: DeliveryMethod = method.tag().parse().unwrap();
            assert_eq!(method, parsed);
        }
    }

    #[test]
    fn unknown_delivery_tag_is_rejected() {
        assert!("courier".parse::<DeliveryMethod>().is_err());
    }
}
