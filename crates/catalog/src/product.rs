use serde::{Deserialize, Serialize};

use teahouse_core::{DomainError, DomainResult, ImageRef, UnitKind};

/// How a product may be sold.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleMode {
    /// Sold by weight only.
    BulkOnly,
    /// Sold by weight and per piece.
    BulkAndPieces,
}

/// A catalog entry.
///
/// Invariant: a piece price is present iff piece sales are allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Price per bulk unit, in the smallest currency unit.
    bulk_price: u64,
    /// Price per piece, in the smallest currency unit. Present iff
    /// `sale_mode` is `BulkAndPieces`.
    piece_price: Option<u64>,
    description: String,
    image: Option<ImageRef>,
    sale_mode: SaleMode,
}

impl Product {
    /// A freshly created product: bulk-only, unpriced, undescribed.
    ///
    /// The administrator fills in price and description through follow-up
    /// edits, mirroring how entries are authored in practice.
    pub fn new() -> Self {
        Self {
            bulk_price: 0,
            piece_price: None,
            description: String::new(),
            image: None,
            sale_mode: SaleMode::BulkOnly,
        }
    }

    pub fn bulk_price(&self) -> u64 {
        self.bulk_price
    }

    pub fn piece_price(&self) -> Option<u64> {
        self.piece_price
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn image(&self) -> Option<&ImageRef> {
        self.image.as_ref()
    }

    pub fn sale_mode(&self) -> SaleMode {
        self.sale_mode
    }

    pub fn allows_pieces(&self) -> bool {
        self.sale_mode == SaleMode::BulkAndPieces
    }

    /// Current price for the given unit kind.
    ///
    /// Fails when piece pricing is requested for a bulk-only product or has
    /// not been configured yet.
    pub fn price_for(&self, unit: UnitKind) -> DomainResult<u64> {
        match unit {
            UnitKind::Bulk => Ok(self.bulk_price),
            UnitKind::Piece => self
                .piece_price
                .ok_or_else(|| DomainError::validation("product is not sold per piece")),
        }
    }

    pub fn set_bulk_price(&mut self, price: u64) -> DomainResult<()> {
        if price == 0 {
            return Err(DomainError::validation("price must be positive"));
        }
        self.bulk_price = price;
        Ok(())
    }

    pub fn set_piece_price(&mut self, price: u64) -> DomainResult<()> {
        if price == 0 {
            return Err(DomainError::validation("price must be positive"));
        }
        if !self.allows_pieces() {
            return Err(DomainError::invariant(
                "cannot set a piece price on a bulk-only product",
            ));
        }
        self.piece_price = Some(price);
        Ok(())
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> DomainResult<()> {
        let description = description.into();
        if description.trim().is_empty() {
            return Err(DomainError::validation("description cannot be empty"));
        }
        self.description = description;
        Ok(())
    }

    pub fn set_image(&mut self, image: ImageRef) {
        self.image = Some(image);
    }

    /// Switch the sale mode. Dropping back to bulk-only clears the piece
    /// price so the pricing invariant holds.
    pub fn set_sale_mode(&mut self, mode: SaleMode) {
        self.sale_mode = mode;
        if mode == SaleMode::BulkOnly {
            self.piece_price = None;
        }
    }
}

impl Default for Product {
    fn default() -> Self {
        Self::new()
    }
}
