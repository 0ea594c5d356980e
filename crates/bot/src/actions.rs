//! Typed callback actions.
//!
//! Inline buttons carry an opaque payload string; this module is the single
//! place that encodes and decodes it. Product references travel as
//! deterministic tokens, orders as their full identifier.

use core::str::FromStr;

use thiserror::Error;

use teahouse_catalog::SaleMode;
use teahouse_core::{DeliveryMethod, OrderId, ProductToken, UnitKind};
use teahouse_session::ProductField;

/// Every action an inline button can trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    /// Show one product's card.
    ShowProduct(ProductToken),
    /// Add a preset quantity to the cart.
    AddAmount {
        token: ProductToken,
        quantity: u32,
        unit: UnitKind,
    },
    /// Ask the user to type a custom quantity.
    CustomAmount { token: ProductToken, unit: UnitKind },
    ClearCart,
    Checkout,
    /// Delivery method chosen during checkout.
    Delivery(DeliveryMethod),
    CompleteOrder(OrderId),
    CancelOrder(OrderId),
    /// Admin: open one category's management view.
    ManageCategory(String),
    /// Admin: open one product's management view.
    ManageProduct(ProductToken),
    /// Admin: start an edit flow for one product field.
    EditField {
        token: ProductToken,
        field: ProductField,
    },
    /// Admin: delete a product.
    DeleteProduct(ProductToken),
    /// Admin: start naming a new category.
    NewCategory,
    /// Admin: start naming a new product in this category.
    NewProductIn(String),
    /// Admin: choose how a product is sold.
    SetSaleMode {
        token: ProductToken,
        mode: SaleMode,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized callback action: {0}")]
pub struct ParseActionError(String);

fn unit_tag(unit: UnitKind) -> &'static str {
    match unit {
        UnitKind::Bulk => "g",
        UnitKind::Piece => "p",
    }
}

fn parse_unit(tag: &str) -> Option<UnitKind> {
    match tag {
        "g" => Some(UnitKind::Bulk),
        "p" => Some(UnitKind::Piece),
        _ => None,
    }
}

fn field_tag(field: ProductField) -> &'static str {
    match field {
        ProductField::Price => "price",
        ProductField::PiecePrice => "ppiece",
        ProductField::BulkStock => "stock",
        ProductField::PieceStock => "pstock",
        ProductField::Description => "desc",
        ProductField::Image => "photo",
    }
}

fn parse_field(tag: &str) -> Option<ProductField> {
    match tag {
        "price" => Some(ProductField::Price),
        "ppiece" => Some(ProductField::PiecePrice),
        "stock" => Some(ProductField::BulkStock),
        "pstock" => Some(ProductField::PieceStock),
        "desc" => Some(ProductField::Description),
        "photo" => Some(ProductField::Image),
        _ => None,
    }
}

fn mode_tag(mode: SaleMode) -> &'static str {
    match mode {
        SaleMode::BulkOnly => "bulk",
        SaleMode::BulkAndPieces => "both",
    }
}

fn parse_mode(tag: &str) -> Option<SaleMode> {
    match tag {
        "bulk" => Some(SaleMode::BulkOnly),
        "both" => Some(SaleMode::BulkAndPieces),
        _ => None,
    }
}

impl core::fmt::Display for CallbackAction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CallbackAction::ShowProduct(token) => write!(f, "p:{token}"),
            CallbackAction::AddAmount {
                token,
                quantity,
                unit,
            } => write!(f, "a:{token}:{quantity}:{}", unit_tag(*unit)),
            CallbackAction::CustomAmount { token, unit } => {
                write!(f, "c:{token}:{}", unit_tag(*unit))
            }
            CallbackAction::ClearCart => f.write_str("cart:clear"),
            CallbackAction::Checkout => f.write_str("cart:checkout"),
            CallbackAction::Delivery(method) => write!(f, "d:{}", method.tag()),
            CallbackAction::CompleteOrder(id) => write!(f, "o:done:{id}"),
            CallbackAction::CancelOrder(id) => write!(f, "o:drop:{id}"),
            CallbackAction::ManageCategory(category) => write!(f, "mc:{category}"),
            CallbackAction::ManageProduct(token) => write!(f, "mp:{token}"),
            CallbackAction::EditField { token, field } => {
                write!(f, "e:{}:{token}", field_tag(*field))
            }
            CallbackAction::DeleteProduct(token) => write!(f, "rm:{token}"),
            CallbackAction::NewCategory => f.write_str("new:cat"),
            CallbackAction::NewProductIn(category) => write!(f, "new:prod:{category}"),
            CallbackAction::SetSaleMode { token, mode } => {
                write!(f, "mode:{token}:{}", mode_tag(*mode))
            }
        }
    }
}

impl FromStr for CallbackAction {
    type Err = ParseActionError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let bad = || ParseActionError(raw.to_string());
        let (head, rest) = raw.split_once(':').ok_or_else(bad)?;

        match head {
            "p" => Ok(CallbackAction::ShowProduct(rest.parse().map_err(|_| bad())?)),
            "a" => {
                let mut parts = rest.split(':');
                let token = parts.next().ok_or_else(bad)?.parse().map_err(|_| bad())?;
                let quantity = parts
                    .next()
                    .and_then(|q| q.parse::<u32>().ok())
                    .ok_or_else(bad)?;
                let unit = parts.next().and_then(parse_unit).ok_or_else(bad)?;
                if parts.next().is_some() {
                    return Err(bad());
                }
                Ok(CallbackAction::AddAmount {
                    token,
                    quantity,
                    unit,
                })
            }
            "c" => {
                let (token, unit) = rest.split_once(':').ok_or_else(bad)?;
                Ok(CallbackAction::CustomAmount {
                    token: token.parse().map_err(|_| bad())?,
                    unit: parse_unit(unit).ok_or_else(bad)?,
                })
            }
            "cart" => match rest {
                "clear" => Ok(CallbackAction::ClearCart),
                "checkout" => Ok(CallbackAction::Checkout),
                _ => Err(bad()),
            },
            "d" => Ok(CallbackAction::Delivery(rest.parse().map_err(|_| bad())?)),
            "o" => {
                let (verb, id) = rest.split_once(':').ok_or_else(bad)?;
                let id = id.parse().map_err(|_| bad())?;
                match verb {
                    "done" => Ok(CallbackAction::CompleteOrder(id)),
                    "drop" => Ok(CallbackAction::CancelOrder(id)),
                    _ => Err(bad()),
                }
            }
            "mc" => Ok(CallbackAction::ManageCategory(rest.to_string())),
            "mp" => Ok(CallbackAction::ManageProduct(rest.parse().map_err(|_| bad())?)),
            "e" => {
                let (field, token) = rest.split_once(':').ok_or_else(bad)?;
                Ok(CallbackAction::EditField {
                    token: token.parse().map_err(|_| bad())?,
                    field: parse_field(field).ok_or_else(bad)?,
                })
            }
            "rm" => Ok(CallbackAction::DeleteProduct(rest.parse().map_err(|_| bad())?)),
            "new" => match rest.split_once(':') {
                None if rest == "cat" => Ok(CallbackAction::NewCategory),
                Some(("prod", category)) => Ok(CallbackAction::NewProductIn(category.to_string())),
                _ => Err(bad()),
            },
            "mode" => {
                let (token, mode) = rest.split_once(':').ok_or_else(bad)?;
                Ok(CallbackAction::SetSaleMode {
                    token: token.parse().map_err(|_| bad())?,
                    mode: parse_mode(mode).ok_or_else(bad)?,
                })
            }
            _ => Err(bad()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use teahouse_core::ProductKey;

    fn token() -> ProductToken {
        ProductKey::new("Dark Oolong", "Wild Dan Cong").token()
    }

    #[test]
    fn every_action_round_trips() {
        let actions = [
            CallbackAction::ShowProduct(token()),
            CallbackAction::AddAmount {
                token: token(),
                quantity: 50,
                unit: UnitKind::Bulk,
            },
            CallbackAction::AddAmount {
                token: token(),
                quantity: 2,
                unit: UnitKind::Piece,
            },
            CallbackAction::CustomAmount {
                token: token(),
                unit: UnitKind::Bulk,
            },
            CallbackAction::ClearCart,
            CallbackAction::Checkout,
            CallbackAction::Delivery(DeliveryMethod::Cdek),
            CallbackAction::CompleteOrder(OrderId::new()),
            CallbackAction::CancelOrder(OrderId::new()),
            CallbackAction::ManageCategory("Dark Oolong".into()),
            CallbackAction::ManageProduct(token()),
            CallbackAction::EditField {
                token: token(),
                field: ProductField::PiecePrice,
            },
            CallbackAction::DeleteProduct(token()),
            CallbackAction::NewCategory,
            CallbackAction::NewProductIn("Dark Oolong".into()),
            CallbackAction::SetSaleMode {
                token: token(),
                mode: SaleMode::BulkAndPieces,
            },
        ];
        for action in actions {
            let encoded = action.to_string();
            let decoded: CallbackAction = encoded.parse().unwrap();
            assert_eq!(decoded, action, "payload {encoded}");
        }
    }

    #[test]
    fn payloads_fit_the_transport_limit() {
        // Callback payloads are capped at 64 bytes by the transport.
        let action = CallbackAction::AddAmount {
            token: token(),
            quantity: 100_000,
            unit: UnitKind::Bulk,
        };
        assert!(action.to_string().len() <= 64);
    }

    #[test]
    fn garbage_is_rejected() {
        for raw in ["", "x", "p:", "a:nope:20:g", "o:eat:123", "cart:fly", "d:pigeon"] {
            assert!(raw.parse::<CallbackAction>().is_err(), "payload {raw:?}");
        }
    }
}
