//! Delivery options

use crate::address::{AddressResolver, AddressValidationError, DeliveryAddress};

/// How the shopper wants to receive the order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeliveryType {
    /// Collect at the store.
    #[default]
    Pickup,

    /// Deliver to an address.
    Delivery,
}

/// Delivery details carried by an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryInfo {
    /// Collect at the store; no address.
    Pickup,

    /// Deliver to the given address.
    Delivery(DeliveryAddress),
}

impl DeliveryInfo {
    /// Build delivery details for `delivery_type` from the address form.
    ///
    /// Pickup ignores the form entirely.
    ///
    /// # Errors
    ///
    /// Returns an [`AddressValidationError`] if delivery is chosen and a required field is empty.
    pub fn from_form(
        delivery_type: DeliveryType,
        resolver: &AddressResolver,
    ) -> Result<Self, AddressValidationError> {
        match delivery_type {
            DeliveryType::Pickup => Ok(DeliveryInfo::Pickup),
            DeliveryType::Delivery => resolver.validate().map(DeliveryInfo::Delivery),
        }
    }

    /// The delivery address, if any.
    pub fn address(&self) -> Option<&DeliveryAddress> {
        match self {
            DeliveryInfo::Pickup => None,
            DeliveryInfo::Delivery(address) => Some(address),
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::address::AddressField;

    use super::*;

    #[test]
    fn pickup_ignores_incomplete_form() -> TestResult {
        let mut resolver = AddressResolver::new();

        resolver.edit(AddressField::Street, "Rua Augusta")?;

        let info = DeliveryInfo::from_form(DeliveryType::Pickup, &resolver)?;

        assert_eq!(info, DeliveryInfo::Pickup);
        assert_eq!(info.address(), None);

        Ok(())
    }

    #[test]
    fn delivery_requires_complete_form() {
        let resolver = AddressResolver::new();

        let result = DeliveryInfo::from_form(DeliveryType::Delivery, &resolver);

        assert!(
            matches!(result, Err(ref error) if error.missing().len() == AddressField::REQUIRED.len()),
            "expected every required field to be reported, got {result:?}"
        );
    }
}
