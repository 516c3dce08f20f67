//! Checkout
//!
//! Turns the cart, the active coupon and the shopper's delivery choice into an order
//! message and hands it off to the store exactly once.

use thiserror::Error;
use tracing::{debug, info};

use crate::{
    address::{AddressResolver, AddressValidationError},
    cart::{Cart, CartStorage},
    coupons::Coupon,
    discounts::DiscountError,
};

pub mod delivery;
pub mod handoff;
pub mod message;
pub mod order;

pub use delivery::{DeliveryInfo, DeliveryType};
pub use handoff::{HandoffChannel, HandoffError, LinkOpener, StdoutOpener, WhatsAppHandoff};
pub use message::{OrderMessage, serialize};
pub use order::{OrderRecord, build_order};

/// Errors that stop a checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// There is nothing to order.
    #[error("the cart is empty")]
    EmptyCart,

    /// Delivery was chosen but the address form is incomplete.
    #[error(transparent)]
    Address(#[from] AddressValidationError),

    /// The coupon discount could not be calculated.
    #[error(transparent)]
    Discount(#[from] DiscountError),

    /// The handoff channel failed.
    #[error(transparent)]
    Handoff(#[from] HandoffError),
}

/// Result of a checkout attempt that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// The cart was empty; nothing was sent.
    Skipped,

    /// The order was handed off.
    Dispatched {
        /// The message that was sent.
        message: String,
    },
}

/// Checkout orchestrator bound to a handoff channel and the store contact.
#[derive(Debug)]
pub struct Checkout<H> {
    channel: H,
    destination: String,
}

impl<H: HandoffChannel> Checkout<H> {
    /// Create a checkout that sends orders to `destination` over `channel`.
    pub fn new(channel: H, destination: impl Into<String>) -> Self {
        Self {
            channel,
            destination: destination.into(),
        }
    }

    /// The store contact orders are sent to.
    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Validate, serialize and hand off the order.
    ///
    /// An empty cart is a silent no-op. With delivery chosen, the address form must be
    /// complete; otherwise nothing is sent and the missing fields are reported.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::Address`]: delivery was chosen and required fields are empty.
    /// - [`CheckoutError::Discount`]: the coupon discount could not be calculated.
    /// - [`CheckoutError::Handoff`]: the channel failed to deliver the message.
    pub fn checkout<S: CartStorage>(
        &self,
        cart: &Cart<S>,
        coupon: Option<&Coupon>,
        delivery_type: DeliveryType,
        resolver: &AddressResolver,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        if cart.is_empty() {
            debug!("checkout skipped, cart is empty");

            return Ok(CheckoutOutcome::Skipped);
        }

        let delivery = DeliveryInfo::from_form(delivery_type, resolver)?;
        let order = build_order(cart, coupon, delivery)?;
        let message = serialize(&order);

        self.channel.dispatch(&self.destination, &message)?;

        info!(
            lines = order.lines().len(),
            total_minor = order.total().to_minor_units(),
            ?delivery_type,
            "order handed off"
        );

        Ok(CheckoutOutcome::Dispatched { message })
    }
}
