use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use teahouse_core::{DomainError, DomainResult, ProductKey, ProductToken};

use crate::product::Product;

/// The full product catalog: category name → product name → entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    categories: BTreeMap<String, BTreeMap<String, Product>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Category names in display order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.categories.contains_key(category)
    }

    /// Products of one category, in display order.
    pub fn products_in(&self, category: &str) -> DomainResult<&BTreeMap<String, Product>> {
        self.categories
            .get(category)
            .ok_or_else(DomainError::not_found)
    }

    pub fn get(&self, key: &ProductKey) -> Option<&Product> {
        self.categories.get(&key.category)?.get(&key.name)
    }

    pub fn get_mut(&mut self, key: &ProductKey) -> Option<&mut Product> {
        self.categories.get_mut(&key.category)?.get_mut(&key.name)
    }

    /// Resolve a deterministic product token back to its key.
    ///
    /// Tokens are derived from keys, so resolution is a scan; catalogs are
    /// small enough that this never matters.
    pub fn resolve_token(&self, token: ProductToken) -> Option<ProductKey> {
        for (category, products) in &self.categories {
            for name in products.keys() {
                let key = ProductKey::new(category.clone(), name.clone());
                if key.token() == token {
                    return Some(key);
                }
            }
        }
        None
    }

    pub fn add_category(&mut self, name: impl Into<String>) -> DomainResult<()> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("category name cannot be empty"));
        }
        if self.categories.contains_key(&name) {
            return Err(DomainError::conflict(format!(
                "category \"{name}\" already exists"
            )));
        }
        self.categories.insert(name, BTreeMap::new());
        Ok(())
    }

    /// Add a product to an existing category and return its key.
    pub fn add_product(
        &mut self,
        category: &str,
        name: impl Into<String>,
    ) -> DomainResult<ProductKey> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("product name cannot be empty"));
        }
        let products = self
            .categories
            .get_mut(category)
            .ok_or_else(DomainError::not_found)?;
        if products.contains_key(&name) {
            return Err(DomainError::conflict(format!(
                "product \"{name}\" already exists"
            )));
        }
        products.insert(name.clone(), Product::new());
        Ok(ProductKey::new(category, name))
    }

    pub fn remove_product(&mut self, key: &ProductKey) -> DomainResult<Product> {
        self.categories
            .get_mut(&key.category)
            .and_then(|products| products.remove(&key.name))
            .ok_or_else(DomainError::not_found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.add_category("Dark Oolong").unwrap();
        catalog.add_product("Dark Oolong", "Wild Dan Cong").unwrap();
        catalog
    }

    #[test]
    fn add_and_lookup_product() {
        let catalog = seeded();
        let key = ProductKey::new("Dark Oolong", "Wild Dan Cong");
        assert!(catalog.get(&key).is_some());
        assert!(catalog.get(&ProductKey::new("Dark Oolong", "Nope")).is_none());
    }

    #[test]
    fn duplicate_category_is_a_conflict() {
        let mut catalog = seeded();
        let err = catalog.add_category("Dark Oolong").unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn duplicate_product_is_a_conflict() {
        let mut catalog = seeded();
        let err = catalog
            .add_product("Dark Oolong", "Wild Dan Cong")
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn product_in_unknown_category_is_not_found() {
        let mut catalog = seeded();
        let err = catalog.add_product("White Tea", "Silver Needle").unwrap_err();
        assert_eq!(err, DomainError::NotFound);
    }

    #[test]
    fn token_resolution_round_trips() {
        let mut catalog = seeded();
        catalog.add_product("Dark Oolong", "Aged Shui Xian").unwrap();

        let key = ProductKey::new("Dark Oolong", "Aged Shui Xian");
        assert_eq!(catalog.resolve_token(key.token()), Some(key));

        let stranger = ProductKey::new("Green Tea", "Dragon Well");
        assert_eq!(catalog.resolve_token(stranger.token()), None);
    }

    #[test]
    fn remove_product_returns_the_entry() {
        let mut catalog = seeded();
        let key = ProductKey::new("Dark Oolong", "Wild Dan Cong");
        catalog.remove_product(&key).unwrap();
        assert!(catalog.get(&key).is_none());
        assert_eq!(catalog.remove_product(&key).unwrap_err(), DomainError::NotFound);
    }
}
