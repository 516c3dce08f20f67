//! Delivery address form
//!
//! Every field remembers where its value came from. Fields filled by a postal-code lookup
//! are locked against edits until the code changes or a later lookup fails.

use std::fmt;

use smallvec::SmallVec;
use thiserror::Error;

use crate::address::{
    lookup::ResolvedAddress,
    postal_code::{PostalCode, format_digits, normalize},
};

/// Fields of the delivery address form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressField {
    /// Street name
    Street,
    /// House or building number
    Number,
    /// Neighborhood
    Neighborhood,
    /// City
    City,
    /// State abbreviation
    State,
    /// Postal code
    ZipCode,
    /// Apartment, block, etc.
    Complement,
    /// Landmark to help the courier
    Reference,
}

impl AddressField {
    /// Fields that must be filled in before a delivery order can be placed.
    pub const REQUIRED: [AddressField; 6] = [
        AddressField::Street,
        AddressField::Number,
        AddressField::Neighborhood,
        AddressField::City,
        AddressField::State,
        AddressField::ZipCode,
    ];

    /// Fields a postal-code lookup populates.
    pub const DEPENDENT: [AddressField; 4] = [
        AddressField::Street,
        AddressField::Neighborhood,
        AddressField::City,
        AddressField::State,
    ];

    /// Whether the field must be filled in for delivery.
    pub fn is_required(self) -> bool {
        Self::REQUIRED.contains(&self)
    }
}

impl fmt::Display for AddressField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AddressField::Street => "street",
            AddressField::Number => "number",
            AddressField::Neighborhood => "neighborhood",
            AddressField::City => "city",
            AddressField::State => "state",
            AddressField::ZipCode => "zip code",
            AddressField::Complement => "complement",
            AddressField::Reference => "reference",
        })
    }
}

/// Where a field's current value came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Provenance {
    /// Typed by the shopper, or never touched by a lookup.
    #[default]
    UserEdited,

    /// Filled by a postal-code lookup; read-only while this holds.
    AutoFilled,
}

/// A single form field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldEntry {
    value: String,
    provenance: Provenance,
}

impl FieldEntry {
    /// Current value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Where the value came from.
    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    fn set(&mut self, value: impl Into<String>, provenance: Provenance) {
        self.value = value.into();
        self.provenance = provenance;
    }

    fn reset(&mut self) {
        self.set(String::new(), Provenance::UserEdited);
    }
}

/// Errors raised when editing the form directly.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressFormError {
    /// The field was filled by a lookup and cannot be edited.
    #[error("{0} was filled from the postal code and cannot be edited")]
    Locked(AddressField),

    /// The zip code is entered through the resolver so lookups can be triggered.
    #[error("zip code must be entered through the postal-code input")]
    ZipCodeInput,
}

/// Non-blocking hint shown when a field loses focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldHint {
    /// A required field is empty.
    Required,

    /// The zip code has fewer than eight digits.
    IncompletePostalCode,
}

impl fmt::Display for FieldHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FieldHint::Required => "required",
            FieldHint::IncompletePostalCode => "enter all 8 digits",
        })
    }
}

/// Submission was blocked because required fields are empty.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("missing required delivery fields: {}", list_fields(.missing))]
pub struct AddressValidationError {
    missing: SmallVec<[AddressField; 6]>,
}

impl AddressValidationError {
    /// The fields that still need a value.
    pub fn missing(&self) -> &[AddressField] {
        &self.missing
    }
}

fn list_fields(fields: &[AddressField]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A complete delivery address, ready to be put on an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryAddress {
    /// Street name
    pub street: String,

    /// House or building number
    pub number: String,

    /// Neighborhood
    pub neighborhood: String,

    /// City
    pub city: String,

    /// State abbreviation
    pub state: String,

    /// Postal code
    pub zip_code: PostalCode,

    /// Apartment, block, etc.
    pub complement: Option<String>,

    /// Landmark to help the courier
    pub reference: Option<String>,
}

/// Field values and provenance for one address-entry session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressForm {
    street: FieldEntry,
    number: FieldEntry,
    neighborhood: FieldEntry,
    city: FieldEntry,
    state: FieldEntry,
    zip_code: FieldEntry,
    complement: FieldEntry,
    reference: FieldEntry,
}

impl AddressForm {
    /// The entry for `field`.
    pub fn entry(&self, field: AddressField) -> &FieldEntry {
        match field {
            AddressField::Street => &self.street,
            AddressField::Number => &self.number,
            AddressField::Neighborhood => &self.neighborhood,
            AddressField::City => &self.city,
            AddressField::State => &self.state,
            AddressField::ZipCode => &self.zip_code,
            AddressField::Complement => &self.complement,
            AddressField::Reference => &self.reference,
        }
    }

    fn entry_mut(&mut self, field: AddressField) -> &mut FieldEntry {
        match field {
            AddressField::Street => &mut self.street,
            AddressField::Number => &mut self.number,
            AddressField::Neighborhood => &mut self.neighborhood,
            AddressField::City => &mut self.city,
            AddressField::State => &mut self.state,
            AddressField::ZipCode => &mut self.zip_code,
            AddressField::Complement => &mut self.complement,
            AddressField::Reference => &mut self.reference,
        }
    }

    /// Current value of `field`.
    pub fn value(&self, field: AddressField) -> &str {
        self.entry(field).value()
    }

    /// Provenance of `field`.
    pub fn provenance(&self, field: AddressField) -> Provenance {
        self.entry(field).provenance()
    }

    /// Whether `field` is read-only because a lookup filled it.
    pub fn is_locked(&self, field: AddressField) -> bool {
        self.provenance(field) == Provenance::AutoFilled
    }

    /// Type a value into `field`.
    ///
    /// # Errors
    ///
    /// - [`AddressFormError::Locked`]: the field was filled by a lookup.
    /// - [`AddressFormError::ZipCodeInput`]: the zip code has its own input path.
    pub fn set_field(
        &mut self,
        field: AddressField,
        value: impl Into<String>,
    ) -> Result<(), AddressFormError> {
        if field == AddressField::ZipCode {
            return Err(AddressFormError::ZipCodeInput);
        }

        if self.is_locked(field) {
            return Err(AddressFormError::Locked(field));
        }

        self.entry_mut(field).set(value, Provenance::UserEdited);

        Ok(())
    }

    /// Hint for `field` when it loses focus; never blocks anything.
    pub fn hint(&self, field: AddressField) -> Option<FieldHint> {
        let value = self.value(field).trim();

        if field.is_required() && value.is_empty() {
            return Some(FieldHint::Required);
        }

        if field == AddressField::ZipCode && PostalCode::parse(value).is_err() {
            return Some(FieldHint::IncompletePostalCode);
        }

        None
    }

    /// Check every required field and build the address.
    ///
    /// # Errors
    ///
    /// Returns an [`AddressValidationError`] listing each required field that is empty
    /// (an incomplete zip code counts as empty).
    pub fn validate(&self) -> Result<DeliveryAddress, AddressValidationError> {
        let zip_code = PostalCode::parse(self.value(AddressField::ZipCode)).ok();

        let missing: SmallVec<[AddressField; 6]> = AddressField::REQUIRED
            .into_iter()
            .filter(|field| match field {
                AddressField::ZipCode => zip_code.is_none(),
                other => self.value(*other).trim().is_empty(),
            })
            .collect();

        match zip_code {
            Some(zip_code) if missing.is_empty() => Ok(DeliveryAddress {
                street: self.trimmed(AddressField::Street),
                number: self.trimmed(AddressField::Number),
                neighborhood: self.trimmed(AddressField::Neighborhood),
                city: self.trimmed(AddressField::City),
                state: self.trimmed(AddressField::State),
                zip_code,
                complement: self.optional(AddressField::Complement),
                reference: self.optional(AddressField::Reference),
            }),
            _ => Err(AddressValidationError { missing }),
        }
    }

    fn trimmed(&self, field: AddressField) -> String {
        self.value(field).trim().to_string()
    }

    fn optional(&self, field: AddressField) -> Option<String> {
        Some(self.trimmed(field)).filter(|value| !value.is_empty())
    }

    /// Store the zip code in display form; the zip code is always user-entered.
    pub(crate) fn set_zip_code(&mut self, raw: &str) {
        self.zip_code
            .set(format_digits(&normalize(raw)), Provenance::UserEdited);
    }

    /// Normalised digits of the zip code.
    pub(crate) fn zip_digits(&self) -> String {
        normalize(self.zip_code.value())
    }

    /// Replace the lookup-dependent fields with a lookup result.
    ///
    /// Only fields present in the result become auto-filled. A field the result omits is
    /// cleared if it held an earlier lookup value; anything the shopper typed stays.
    pub(crate) fn fill_from_lookup(&mut self, resolved: &ResolvedAddress) {
        let values = [
            (AddressField::Street, &resolved.street),
            (AddressField::Neighborhood, &resolved.neighborhood),
            (AddressField::City, &resolved.city),
            (AddressField::State, &resolved.state),
        ];

        for (field, value) in values {
            match value {
                Some(value) => self.entry_mut(field).set(value.as_str(), Provenance::AutoFilled),
                None if self.is_locked(field) => self.entry_mut(field).reset(),
                None => {}
            }
        }
    }

    /// Clear the lookup-dependent fields and hand them back to the shopper.
    pub(crate) fn clear_dependent(&mut self) {
        for field in AddressField::DEPENDENT {
            self.entry_mut(field).reset();
        }
    }

    /// Whether any field currently holds a lookup value.
    pub(crate) fn has_auto_filled(&self) -> bool {
        AddressField::DEPENDENT
            .into_iter()
            .any(|field| self.is_locked(field))
    }
}
