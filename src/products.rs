//! Products

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::pricing::{Price, parse_price_or_zero};

/// Catalog identifier of a product.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Create a new product identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Product as the catalog hands it to the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    /// Product identifier
    pub id: ProductId,

    /// Product title
    pub title: String,

    /// Product price as displayed by the catalog (e.g., "R$ 29,90")
    pub price: String,

    /// Product image reference
    pub image: String,
}

impl Product {
    /// Unit price, or zero when the catalog price is unreadable.
    pub fn unit_price(&self) -> Price {
        parse_price_or_zero(&self.price)
    }
}

#[cfg(test)]
mod tests {
    use crate::pricing::{from_minor, zero};

    use super::*;

    fn product(price: &str) -> Product {
        Product {
            id: ProductId::new("shampoo-300ml"),
            title: "Shampoo".to_string(),
            price: price.to_string(),
            image: "shampoo.png".to_string(),
        }
    }

    #[test]
    fn unit_price_parses_catalog_price() {
        assert_eq!(product("R$ 29,90").unit_price(), from_minor(2990));
    }

    #[test]
    fn unit_price_defaults_to_zero() {
        assert_eq!(product("consulte").unit_price(), zero());
    }

    #[test]
    fn product_id_serializes_as_plain_string() -> Result<(), serde_json::Error> {
        let id = ProductId::from("kit-01");

        assert_eq!(serde_json::to_string(&id)?, "\"kit-01\"");
        assert_eq!(id.to_string(), "kit-01");

        Ok(())
    }
}
