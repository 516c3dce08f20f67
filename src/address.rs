//! Delivery address
//!
//! Postal-code normalisation, the provenance-tracking address form, the lookup
//! collaborator and the resolver state machine that ties them together.

pub mod form;
pub mod lookup;
pub mod postal_code;
pub mod resolver;
pub mod viacep;

pub use form::{
    AddressField, AddressForm, AddressFormError, AddressValidationError, DeliveryAddress,
    FieldEntry, FieldHint, Provenance,
};
pub use lookup::{LookupError, LookupOutcome, PostalCodeLookup, ResolvedAddress};
pub use postal_code::{PostalCode, PostalCodeError};
pub use resolver::{
    AddressResolver, ApplyOutcome, LookupRequest, ResolutionError, ResolverState, perform_lookup,
};
pub use viacep::ViaCepClient;
