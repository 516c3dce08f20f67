//! Boutique
//!
//! Cart and checkout core for a small cosmetics store: a persisted cart, coupon codes,
//! Brazilian real pricing, postal-code address resolution and a checkout that hands the
//! finished order off to the store as a text message.

pub mod address;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod coupons;
pub mod discounts;
pub mod observability;
pub mod prelude;
pub mod pricing;
pub mod products;
