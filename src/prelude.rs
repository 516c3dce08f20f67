//! Boutique prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    address::{
        AddressField, AddressResolver, AddressValidationError, DeliveryAddress, LookupOutcome,
        PostalCode, PostalCodeLookup, ResolverState, ViaCepClient,
    },
    cart::{Cart, CartLine, CartStorage, FileStorage, MemoryStorage},
    checkout::{
        Checkout, CheckoutError, CheckoutOutcome, DeliveryInfo, DeliveryType, HandoffChannel,
        OrderRecord, WhatsAppHandoff,
    },
    coupons::{Coupon, CouponError, CouponRegistry, CouponSlot},
    pricing::{Price, format_price, parse_price_or_zero},
    products::{Product, ProductId},
};
