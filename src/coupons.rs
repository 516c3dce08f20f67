//! Coupons
//!
//! A registry of coupon codes and the percentage each takes off the cart subtotal.
//! Codes match case-insensitively and ignore surrounding whitespace. Only one coupon is
//! active at a time; see [`CouponSlot`].

use std::{fs, path::Path};

use decimal_percentage::Percentage;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    discounts::{DiscountError, apply_discount, percentage_from_points},
    pricing::{Price, zero},
};

/// Codes available when no registry file is configured.
const BUILTIN_COUPONS: [(&str, u8); 2] = [("PROMO10", 10), ("FRETE", 0)];

/// Why a coupon code was not accepted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CouponError {
    /// No code was entered.
    #[error("enter a code")]
    Empty,

    /// The code is not in the registry.
    #[error("invalid or expired code: {0}")]
    Unknown(String),
}

/// Errors raised while building a coupon registry.
#[derive(Debug, Error)]
pub enum CouponRegistryError {
    /// IO error reading the registry file
    #[error("failed to read coupon registry: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("failed to parse coupon registry: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// A code was blank.
    #[error("coupon code is empty")]
    EmptyCode,

    /// Percentage above 100.
    #[error("coupon {code} has percent_off {percent_off}; expected 0..=100")]
    PercentOutOfRange {
        /// Offending code
        code: String,
        /// Configured percentage
        percent_off: u16,
    },

    /// Two entries collapse to the same code once upper-cased.
    #[error("duplicate coupon code: {0}")]
    Duplicate(String),
}

/// A valid coupon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coupon {
    code: String,
    percent_off: u8,
}

impl Coupon {
    /// Canonical (upper-case) code.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Percentage points taken off the subtotal.
    pub fn percent_off(&self) -> u8 {
        self.percent_off
    }

    /// The discount as a [`Percentage`].
    pub fn percentage(&self) -> Percentage {
        percentage_from_points(self.percent_off)
    }

    /// Discount this coupon takes off `subtotal`.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscountError`] if the percentage calculation overflows.
    pub fn discount_on(&self, subtotal: &Price) -> Result<Price, DiscountError> {
        apply_discount(subtotal, &self.percentage())
    }
}

/// Registry file layout.
#[derive(Debug, Deserialize)]
struct CouponsFixture {
    coupons: FxHashMap<String, u16>,
}

/// Table of valid coupon codes.
#[derive(Debug, Clone)]
pub struct CouponRegistry {
    codes: FxHashMap<String, u8>,
}

impl Default for CouponRegistry {
    fn default() -> Self {
        Self {
            codes: BUILTIN_COUPONS
                .iter()
                .map(|(code, percent_off)| ((*code).to_string(), *percent_off))
                .collect(),
        }
    }
}

impl CouponRegistry {
    /// Build a registry from `(code, percent_off)` pairs.
    ///
    /// # Errors
    ///
    /// Returns an error if a code is blank, a percentage exceeds 100, or two codes
    /// differ only by case or surrounding whitespace.
    pub fn from_entries<I, S>(entries: I) -> Result<Self, CouponRegistryError>
    where
        I: IntoIterator<Item = (S, u16)>,
        S: AsRef<str>,
    {
        let mut codes = FxHashMap::default();

        for (code, percent_off) in entries {
            let code = canonical_code(code.as_ref());

            if code.is_empty() {
                return Err(CouponRegistryError::EmptyCode);
            }

            let points = u8::try_from(percent_off)
                .ok()
                .filter(|points| *points <= 100)
                .ok_or_else(|| CouponRegistryError::PercentOutOfRange {
                    code: code.clone(),
                    percent_off,
                })?;

            if codes.insert(code.clone(), points).is_some() {
                return Err(CouponRegistryError::Duplicate(code));
            }
        }

        Ok(Self { codes })
    }

    /// Parse a registry from a YAML document of the form `coupons: { CODE: percent }`.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or any entry is invalid.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, CouponRegistryError> {
        let fixture: CouponsFixture = serde_norway::from_str(yaml)?;

        Self::from_entries(fixture.coupons)
    }

    /// Load a registry from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or an entry is invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CouponRegistryError> {
        let path = path.as_ref();
        let registry = Self::from_yaml_str(&fs::read_to_string(path)?)?;

        info!(path = %path.display(), coupons = registry.len(), "loaded coupon registry");

        Ok(registry)
    }

    /// Look up a code entered by the shopper.
    ///
    /// # Errors
    ///
    /// - [`CouponError::Empty`]: the code is blank.
    /// - [`CouponError::Unknown`]: the code is not registered.
    pub fn evaluate(&self, code: &str) -> Result<Coupon, CouponError> {
        let code = canonical_code(code);

        if code.is_empty() {
            return Err(CouponError::Empty);
        }

        match self.codes.get(&code) {
            Some(percent_off) => {
                debug!(%code, percent_off, "coupon accepted");

                Ok(Coupon {
                    code,
                    percent_off: *percent_off,
                })
            }
            None => {
                debug!(%code, "coupon rejected");

                Err(CouponError::Unknown(code))
            }
        }
    }

    /// Number of registered codes.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Check if the registry has no codes.
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

fn canonical_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// The coupon currently applied to a shopping session.
#[derive(Debug, Clone, Default)]
pub struct CouponSlot {
    active: Option<Coupon>,
}

impl CouponSlot {
    /// Apply `code`, replacing any coupon already applied.
    ///
    /// # Errors
    ///
    /// Returns the [`CouponError`] for an empty or unknown code; the slot is left untouched.
    pub fn apply(&mut self, registry: &CouponRegistry, code: &str) -> Result<&Coupon, CouponError> {
        let coupon = registry.evaluate(code)?;

        Ok(self.active.insert(coupon))
    }

    /// Remove the applied coupon, if any.
    pub fn clear(&mut self) {
        self.active = None;
    }

    /// The applied coupon.
    pub fn active(&self) -> Option<&Coupon> {
        self.active.as_ref()
    }

    /// Discount the applied coupon takes off `subtotal`; zero without a coupon.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscountError`] if the percentage calculation overflows.
    pub fn discount_on(&self, subtotal: &Price) -> Result<Price, DiscountError> {
        self.active
            .as_ref()
            .map_or_else(|| Ok(zero()), |coupon| coupon.discount_on(subtotal))
    }
}
