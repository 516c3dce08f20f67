//! Cart
//!
//! The shopper's cart: an ordered list of lines, unique by product id, persisted to a
//! [`CartStorage`] after every change. Totals are derived from the lines on every read.

use std::num::NonZeroU32;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    pricing::{Price, line_total, parse_price_or_zero, total_price},
    products::{Product, ProductId},
};

pub mod storage;
pub mod summary;

pub use storage::{CartStorage, FileStorage, MemoryStorage, StorageError};
pub use summary::write_cart_table;

/// One product in the cart with its quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    id: ProductId,
    title: String,
    #[serde(default)]
    price: String,
    #[serde(default)]
    image: String,
    quantity: NonZeroU32,
}

impl CartLine {
    fn from_product(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            title: product.title.clone(),
            price: product.price.clone(),
            image: product.image.clone(),
            quantity: NonZeroU32::MIN,
        }
    }

    /// Product identifier.
    pub fn id(&self) -> &ProductId {
        &self.id
    }

    /// Product title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Price as it was displayed when the product was added.
    pub fn price_label(&self) -> &str {
        &self.price
    }

    /// Product image reference.
    pub fn image(&self) -> &str {
        &self.image
    }

    /// Number of units; always at least one.
    pub fn quantity(&self) -> u32 {
        self.quantity.get()
    }

    /// Unit price, zero if the stored price is unreadable.
    pub fn unit_price(&self) -> Price {
        parse_price_or_zero(&self.price)
    }

    /// Unit price times quantity.
    pub fn line_total(&self) -> Price {
        line_total(&self.unit_price(), self.quantity())
    }
}

/// The shopper's cart.
#[derive(Debug)]
pub struct Cart<S: CartStorage = MemoryStorage> {
    lines: Vec<CartLine>,
    storage: S,
}

impl<S: CartStorage> Cart<S> {
    /// Load the cart from `storage`.
    ///
    /// A missing, unreadable or corrupt blob yields an empty cart.
    pub fn load(storage: S) -> Self {
        let lines = match storage.read() {
            Ok(Some(blob)) => decode_lines(&blob).unwrap_or_else(|error| {
                warn!(%error, "discarding corrupt stored cart");

                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(error) => {
                warn!(%error, "could not read stored cart; starting empty");

                Vec::new()
            }
        };

        debug!(lines = lines.len(), "cart loaded");

        Self { lines, storage }
    }

    /// Add one unit of `product`, appending a new line if it isn't in the cart yet.
    pub fn add_item(&mut self, product: &Product) {
        if let Some(line) = self.line_mut(&product.id) {
            line.quantity = line.quantity.saturating_add(1);
        } else {
            self.lines.push(CartLine::from_product(product));
        }

        debug!(id = %product.id, "item added");

        self.persist();
    }

    /// Remove the line for `id`; unknown ids are ignored.
    pub fn remove_item(&mut self, id: &ProductId) {
        let before = self.lines.len();

        self.lines.retain(|line| &line.id != id);

        if self.lines.len() != before {
            debug!(%id, "item removed");

            self.persist();
        }
    }

    /// Add one unit to the line for `id`.
    pub fn increase_quantity(&mut self, id: &ProductId) {
        if let Some(line) = self.line_mut(id) {
            line.quantity = line.quantity.saturating_add(1);

            debug!(%id, quantity = line.quantity.get(), "quantity increased");

            self.persist();
        }
    }

    /// Take one unit off the line for `id`; a line never drops below one unit.
    pub fn decrease_quantity(&mut self, id: &ProductId) {
        let Some(line) = self.line_mut(id) else {
            return;
        };

        let Some(quantity) = NonZeroU32::new(line.quantity.get() - 1) else {
            return;
        };

        line.quantity = quantity;

        debug!(%id, quantity = quantity.get(), "quantity decreased");

        self.persist();
    }

    /// Lines in the order they were added.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// The line for `id`, if present.
    pub fn line(&self, id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| &line.id == id)
    }

    /// Sum of every line total.
    pub fn subtotal(&self) -> Price {
        total_price(self.lines.iter().map(CartLine::line_total))
    }

    /// Total number of units across all lines.
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0_u32, |acc, line| acc.saturating_add(line.quantity()))
    }

    /// Check if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The storage backend.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Consume the cart, returning its storage backend.
    pub fn into_storage(self) -> S {
        self.storage
    }

    fn line_mut(&mut self, id: &ProductId) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|line| &line.id == id)
    }

    fn persist(&mut self) {
        let result = encode_lines(&self.lines)
            .map_err(StorageError::from)
            .and_then(|blob| self.storage.write(&blob));

        if let Err(error) = result {
            warn!(%error, "failed to persist cart");
        }
    }
}

fn encode_lines(lines: &[CartLine]) -> Result<String, serde_json::Error> {
    serde_json::to_string(lines)
}

fn decode_lines(blob: &str) -> Result<Vec<CartLine>, serde_json::Error> {
    serde_json::from_str(blob).map(merge_duplicate_lines)
}

/// Fold stored lines sharing a product id into the first one, summing quantities.
fn merge_duplicate_lines(stored: Vec<CartLine>) -> Vec<CartLine> {
    let mut positions: FxHashMap<ProductId, usize> = FxHashMap::default();
    let mut lines: Vec<CartLine> = Vec::with_capacity(stored.len());

    for line in stored {
        if let Some(existing) = positions.get(&line.id).and_then(|idx| lines.get_mut(*idx)) {
            warn!(id = %line.id, "merging duplicate stored cart line");

            existing.quantity = existing.quantity.saturating_add(line.quantity.get());

            continue;
        }

        positions.insert(line.id.clone(), lines.len());
        lines.push(line);
    }

    lines
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::pricing::{from_minor, zero};

    use super::*;

    fn product(id: &str, title: &str, price: &str) -> Product {
        Product {
            id: ProductId::new(id),
            title: title.to_string(),
            price: price.to_string(),
            image: format!("{id}.png"),
        }
    }

    fn shampoo() -> Product {
        product("shampoo", "Shampoo", "R$ 29,90")
    }

    fn conditioner() -> Product {
        product("condicionador", "Condicionador", "R$ 27,90")
    }

    fn empty_cart() -> Cart {
        Cart::load(MemoryStorage::default())
    }

    #[test]
    fn add_item_appends_then_increments() {
        let mut cart = empty_cart();

        cart.add_item(&shampoo());
        cart.add_item(&conditioner());
        cart.add_item(&shampoo());

        assert_eq!(cart.lines().len(), 2);
        assert_eq!(
            cart.line(&ProductId::new("shampoo")).map(CartLine::quantity),
            Some(2)
        );
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn subtotal_matches_scenario() {
        let mut cart = empty_cart();

        cart.add_item(&shampoo());
        cart.add_item(&shampoo());
        cart.add_item(&conditioner());

        assert_eq!(cart.subtotal(), from_minor(8770));
    }

    #[test]
    fn remove_item_ignores_unknown_ids() {
        let mut cart = empty_cart();

        cart.add_item(&shampoo());
        cart.remove_item(&ProductId::new("missing"));

        assert_eq!(cart.lines().len(), 1);

        cart.remove_item(&ProductId::new("shampoo"));

        assert!(cart.is_empty());
        assert_eq!(cart.subtotal(), zero());
    }

    #[test]
    fn decrease_quantity_never_removes_line() {
        let mut cart = empty_cart();
        let id = ProductId::new("shampoo");

        cart.add_item(&shampoo());
        cart.increase_quantity(&id);
        cart.decrease_quantity(&id);
        cart.decrease_quantity(&id);
        cart.decrease_quantity(&id);

        assert_eq!(cart.line(&id).map(CartLine::quantity), Some(1));
    }

    #[test]
    fn quantity_changes_on_unknown_id_are_no_ops() {
        let mut cart = empty_cart();
        let id = ProductId::new("ghost");

        cart.increase_quantity(&id);
        cart.decrease_quantity(&id);

        assert!(cart.is_empty());
        assert_eq!(cart.storage().contents(), None);
    }

    #[test]
    fn totals_track_every_mutation() {
        let mut cart = empty_cart();
        let shampoo_id = ProductId::new("shampoo");
        let conditioner_id = ProductId::new("condicionador");

        let steps: [&dyn Fn(&mut Cart); 7] = [
            &|c: &mut Cart| c.add_item(&shampoo()),
            &|c: &mut Cart| c.add_item(&conditioner()),
            &|c: &mut Cart| c.increase_quantity(&shampoo_id),
            &|c: &mut Cart| c.decrease_quantity(&conditioner_id),
            &|c: &mut Cart| c.add_item(&conditioner()),
            &|c: &mut Cart| c.remove_item(&shampoo_id),
            &|c: &mut Cart| c.decrease_quantity(&conditioner_id),
        ];

        for step in steps {
            step(&mut cart);

            let expected = cart
                .lines()
                .iter()
                .map(|line| line.unit_price().to_minor_units() * i64::from(line.quantity()))
                .sum::<i64>();

            assert_eq!(cart.subtotal(), from_minor(expected));
            assert!(
                cart.lines().iter().all(|line| line.quantity() >= 1),
                "every line keeps at least one unit"
            );
        }
    }

    #[test]
    fn malformed_price_counts_as_zero() {
        let mut cart = empty_cart();

        cart.add_item(&product("amostra", "Amostra", "sob consulta"));
        cart.add_item(&shampoo());

        assert_eq!(cart.subtotal(), from_minor(2990));
    }

    #[test]
    fn mutations_are_persisted_and_reloaded() {
        let mut cart = empty_cart();

        cart.add_item(&shampoo());
        cart.add_item(&shampoo());
        cart.add_item(&conditioner());

        let reloaded = Cart::load(cart.into_storage());

        assert_eq!(reloaded.lines().len(), 2);
        assert_eq!(reloaded.item_count(), 3);
        assert_eq!(reloaded.subtotal(), from_minor(8770));
    }

    #[test]
    fn corrupt_blob_loads_as_empty_cart() {
        let cart = Cart::load(MemoryStorage::with_contents("{not json"));

        assert!(cart.is_empty());
    }

    #[test]
    fn zero_quantity_blob_loads_as_empty_cart() {
        let blob = r#"[{"id":"x","title":"X","price":"R$ 1,00","image":"","quantity":0}]"#;

        assert!(Cart::load(MemoryStorage::with_contents(blob)).is_empty());
    }

    #[test]
    fn duplicate_stored_ids_merge_into_one_line() {
        let blob = r#"[
            {"id":"x","title":"X","price":"R$ 1,00","image":"","quantity":1},
            {"id":"y","title":"Y","price":"R$ 2,00","image":"","quantity":1},
            {"id":"x","title":"X","price":"R$ 1,00","image":"","quantity":2}
        ]"#;

        let mut cart = Cart::load(MemoryStorage::with_contents(blob));
        let x = ProductId::new("x");

        assert_eq!(cart.lines().len(), 2, "one line per product id");
        assert_eq!(cart.line(&x).map(CartLine::quantity), Some(3));
        assert_eq!(cart.subtotal(), from_minor(500));

        cart.increase_quantity(&x);

        let quantities: Vec<u32> = cart.lines().iter().map(CartLine::quantity).collect();

        assert_eq!(quantities, [4, 1]);

        cart.remove_item(&x);

        assert_eq!(cart.item_count(), 1);
        assert!(cart.line(&x).is_none(), "removed product is gone");
    }

    #[test]
    fn missing_price_field_loads_as_zero() {
        let blob = r#"[{"id":"x","title":"X","quantity":2}]"#;
        let cart = Cart::load(MemoryStorage::with_contents(blob));

        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.subtotal(), zero());
    }

    #[test]
    fn file_backed_cart_survives_restart() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("cart.json");

        let mut cart = Cart::load(FileStorage::new(&path));
        cart.add_item(&conditioner());
        cart.increase_quantity(&ProductId::new("condicionador"));

        let reloaded = Cart::load(FileStorage::new(&path));

        assert_eq!(reloaded.item_count(), 2);
        assert_eq!(reloaded.subtotal(), from_minor(5580));

        Ok(())
    }
}
