//! Order record

use crate::{
    cart::{Cart, CartLine, CartStorage},
    checkout::{CheckoutError, delivery::DeliveryInfo},
    coupons::Coupon,
    pricing::{Price, from_minor, zero},
};

/// Everything the handoff message describes. Built at checkout and never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    lines: Vec<CartLine>,
    subtotal: Price,
    coupon: Option<Coupon>,
    discount: Price,
    total: Price,
    delivery: DeliveryInfo,
}

impl OrderRecord {
    /// Lines in cart order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Total before discount.
    pub fn subtotal(&self) -> Price {
        self.subtotal
    }

    /// The coupon applied, if any.
    pub fn coupon(&self) -> Option<&Coupon> {
        self.coupon.as_ref()
    }

    /// Amount taken off the subtotal.
    pub fn discount(&self) -> Price {
        self.discount
    }

    /// Amount the shopper pays, shipping excluded.
    pub fn total(&self) -> Price {
        self.total
    }

    /// Pickup or delivery details.
    pub fn delivery(&self) -> &DeliveryInfo {
        &self.delivery
    }
}

/// Snapshot the cart, discount and delivery details into an order.
///
/// # Errors
///
/// - [`CheckoutError::EmptyCart`]: the cart has no lines.
/// - [`CheckoutError::Discount`]: the coupon discount could not be calculated.
pub fn build_order<S: CartStorage>(
    cart: &Cart<S>,
    coupon: Option<&Coupon>,
    delivery: DeliveryInfo,
) -> Result<OrderRecord, CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let subtotal = cart.subtotal();

    let discount = match coupon {
        Some(coupon) => coupon.discount_on(&subtotal)?,
        None => zero(),
    };

    let total = from_minor(subtotal.to_minor_units() - discount.to_minor_units());

    Ok(OrderRecord {
        lines: cart.lines().to_vec(),
        subtotal,
        coupon: coupon.cloned(),
        discount,
        total,
        delivery,
    })
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        cart::MemoryStorage,
        coupons::CouponRegistry,
        products::{Product, ProductId},
    };

    use super::*;

    fn scenario_cart() -> Cart {
        let mut cart = Cart::load(MemoryStorage::default());

        let shampoo = Product {
            id: ProductId::new("shampoo"),
            title: "Shampoo".to_string(),
            price: "R$ 29,90".to_string(),
            image: String::new(),
        };

        let conditioner = Product {
            id: ProductId::new("condicionador"),
            title: "Condicionador".to_string(),
            price: "R$ 27,90".to_string(),
            image: String::new(),
        };

        cart.add_item(&shampoo);
        cart.add_item(&shampoo);
        cart.add_item(&conditioner);

        cart
    }

    #[test]
    fn promo10_scenario_totals() -> TestResult {
        let coupon = CouponRegistry::default().evaluate("PROMO10")?;
        let order = build_order(&scenario_cart(), Some(&coupon), DeliveryInfo::Pickup)?;

        assert_eq!(order.subtotal(), from_minor(8770));
        assert_eq!(order.discount(), from_minor(877));
        assert_eq!(order.total(), from_minor(7893));
        assert_eq!(order.lines().len(), 2);
        assert_eq!(order.coupon().map(Coupon::code), Some("PROMO10"));

        Ok(())
    }

    #[test]
    fn no_coupon_means_no_discount() -> TestResult {
        let order = build_order(&scenario_cart(), None, DeliveryInfo::Pickup)?;

        assert_eq!(order.discount(), zero());
        assert_eq!(order.total(), order.subtotal());

        Ok(())
    }

    #[test]
    fn empty_cart_cannot_become_an_order() {
        let cart = Cart::load(MemoryStorage::default());

        assert!(matches!(
            build_order(&cart, None, DeliveryInfo::Pickup),
            Err(CheckoutError::EmptyCart)
        ));
    }
}
