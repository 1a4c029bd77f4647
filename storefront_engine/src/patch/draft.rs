use serde::{Deserialize, Serialize};
use sfe_common::Money;

use crate::db_types::{NewProduct, Product};

/// The patchable view of a product: exactly the five mutable fields. Identity, version and timestamps are owned
/// by the store and cannot be edited through a patch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductDraft {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub retail_price: Money,
    pub wholesale_price: Money,
    pub quantity: i64,
}

impl From<&Product> for ProductDraft {
    fn from(p: &Product) -> Self {
        Self {
            name: p.name.clone(),
            description: p.description.clone(),
            retail_price: p.retail_price,
            wholesale_price: p.wholesale_price,
            quantity: p.quantity,
        }
    }
}

impl From<&NewProduct> for ProductDraft {
    fn from(p: &NewProduct) -> Self {
        Self {
            name: p.name.clone(),
            description: p.description.clone(),
            retail_price: p.retail_price,
            wholesale_price: p.wholesale_price,
            quantity: p.quantity,
        }
    }
}

impl From<ProductDraft> for NewProduct {
    fn from(d: ProductDraft) -> Self {
        Self {
            name: d.name,
            description: d.description,
            retail_price: d.retail_price,
            wholesale_price: d.wholesale_price,
            quantity: d.quantity,
        }
    }
}

impl ProductDraft {
    /// Checks the candidate against the product constraints. Returns the first violation, since single-entity
    /// operations fail fast.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must be non-empty".to_string());
        }
        if self.retail_price.is_negative() {
            return Err("retail_price must be >= 0".to_string());
        }
        if self.wholesale_price.is_negative() {
            return Err("wholesale_price must be >= 0".to_string());
        }
        if self.quantity < 0 {
            return Err("quantity must be >= 0".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use sfe_common::Money;

    use super::ProductDraft;

    fn draft() -> ProductDraft {
        ProductDraft {
            name: "Teapot".to_string(),
            description: Some("Stout and spouted".to_string()),
            retail_price: Money::from_cents(1099),
            wholesale_price: Money::from_cents(400),
            quantity: 12,
        }
    }

    #[test]
    fn valid_draft_passes() {
        assert!(draft().validate().is_ok());
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut d = draft();
        d.name = "   ".to_string();
        assert_eq!(d.validate().unwrap_err(), "name must be non-empty");
    }

    #[test]
    fn negative_price_is_rejected() {
        let mut d = draft();
        d.wholesale_price = Money::from_cents(-1);
        assert_eq!(d.validate().unwrap_err(), "wholesale_price must be >= 0");
    }

    #[test]
    fn negative_quantity_is_rejected() {
        let mut d = draft();
        d.quantity = -3;
        assert_eq!(d.validate().unwrap_err(), "quantity must be >= 0");
    }
}
