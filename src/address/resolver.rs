//! Address resolver
//!
//! Drives the delivery form from the postal-code input:
//!
//! ```text
//! Idle ──(8 digits / blur)──► Resolving ──► Resolved | NotFound | Failed
//!   ▲                                                  │
//!   └────────────(input cleared or shortened)──────────┘
//! ```
//!
//! Each lookup is issued as a [`LookupRequest`] tagged with a sequence number. A result is
//! applied only if its request is still the latest one issued and the live input still holds
//! the same digits, so a slow response for an old code never overwrites a newer one.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::address::{
    form::{
        AddressField, AddressForm, AddressFormError, AddressValidationError, DeliveryAddress,
        FieldHint,
    },
    lookup::{LookupError, LookupOutcome, PostalCodeLookup},
    postal_code::{POSTAL_CODE_DIGITS, PostalCode},
};

/// Where the resolver is in the lookup cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResolverState {
    /// No complete code has been looked up.
    #[default]
    Idle,

    /// A lookup is in flight.
    Resolving,

    /// The latest lookup filled the form.
    Resolved,

    /// The latest lookup found no address.
    NotFound,

    /// The latest lookup failed.
    Failed,
}

/// Field-level error shown under the zip code input.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionError {
    /// The code is unknown to the lookup service.
    #[error("postal code not found; please fill in the address manually")]
    NotFound,

    /// The lookup could not be completed.
    #[error("could not look up the postal code; please fill in the address manually")]
    LookupFailed,
}

/// A lookup the caller should perform on the resolver's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    sequence: u64,
    digits: String,
}

impl LookupRequest {
    /// Issuance order of this request within its resolver.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Normalised digits the request was issued for.
    pub fn digits(&self) -> &str {
        &self.digits
    }

    /// The postal code to look up, if the digits form a complete code.
    pub fn postal_code(&self) -> Option<PostalCode> {
        PostalCode::parse(&self.digits).ok()
    }
}

/// Whether a completed lookup changed the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The result was applied.
    Applied,

    /// The result belonged to a superseded request and was discarded.
    Stale,
}

/// Perform the lookup for `request`.
///
/// Incomplete codes (from a blur with a partial input) are answered
/// [`LookupOutcome::NotFound`] without calling the service.
///
/// # Errors
///
/// Returns the [`LookupError`] raised by the service.
pub async fn perform_lookup<L>(
    lookup: &L,
    request: &LookupRequest,
) -> Result<LookupOutcome, LookupError>
where
    L: PostalCodeLookup + ?Sized,
{
    match request.postal_code() {
        Some(code) => lookup.lookup(&code).await,
        None => Ok(LookupOutcome::NotFound),
    }
}

/// Postal-code driven address entry for one checkout session.
#[derive(Debug, Clone, Default)]
pub struct AddressResolver {
    form: AddressForm,
    state: ResolverState,
    error: Option<ResolutionError>,
    issued: u64,
    issued_for: Option<String>,
}

impl AddressResolver {
    /// Create a resolver with an empty form.
    pub fn new() -> Self {
        Self::default()
    }

    /// The form being filled.
    pub fn form(&self) -> &AddressForm {
        &self.form
    }

    /// Current state.
    pub fn state(&self) -> ResolverState {
        self.state
    }

    /// Field-level error from the latest lookup, if any.
    pub fn error(&self) -> Option<ResolutionError> {
        self.error
    }

    /// Whether a lookup is in flight.
    pub fn is_resolving(&self) -> bool {
        self.state == ResolverState::Resolving
    }

    /// Handle a change of the zip code input.
    ///
    /// Returns the lookup to perform when the input reaches a complete code that hasn't
    /// been looked up yet. Clearing or shortening the input resets any previous resolution.
    pub fn input_postal_code(&mut self, raw: &str) -> Option<LookupRequest> {
        self.form.set_zip_code(raw);

        let digits = self.form.zip_digits();

        if digits.len() < POSTAL_CODE_DIGITS {
            self.reset();

            return None;
        }

        if self.issued_for.as_deref() == Some(digits.as_str()) {
            return None;
        }

        Some(self.issue(digits))
    }

    /// Handle the zip code input losing focus.
    ///
    /// A code that has not been looked up yet, complete or not, is looked up once.
    pub fn blur_postal_code(&mut self) -> Option<LookupRequest> {
        let digits = self.form.zip_digits();

        if digits.is_empty() || self.issued_for.as_deref() == Some(digits.as_str()) {
            return None;
        }

        Some(self.issue(digits))
    }

    /// Apply the result of `request`, unless a newer request or input has superseded it.
    pub fn complete(
        &mut self,
        request: &LookupRequest,
        result: Result<LookupOutcome, LookupError>,
    ) -> ApplyOutcome {
        let current = request.sequence == self.issued
            && self.state == ResolverState::Resolving
            && self.form.zip_digits() == request.digits;

        if !current {
            debug!(
                sequence = request.sequence,
                latest = self.issued,
                digits = %request.digits,
                "discarding stale postal code lookup"
            );

            return ApplyOutcome::Stale;
        }

        match result {
            Ok(LookupOutcome::Found(resolved)) => {
                self.form.fill_from_lookup(&resolved);
                self.state = ResolverState::Resolved;
                self.error = None;

                info!(digits = %request.digits, "postal code resolved");
            }
            Ok(LookupOutcome::NotFound) => {
                self.form.clear_dependent();
                self.state = ResolverState::NotFound;
                self.error = Some(ResolutionError::NotFound);

                info!(digits = %request.digits, "postal code not found");
            }
            Err(error) => {
                self.form.clear_dependent();
                self.state = ResolverState::Failed;
                self.error = Some(ResolutionError::LookupFailed);

                warn!(digits = %request.digits, %error, "postal code lookup failed");
            }
        }

        ApplyOutcome::Applied
    }

    /// Perform `request` against `lookup` and apply the result.
    pub async fn resolve<L>(&mut self, lookup: &L, request: LookupRequest) -> ApplyOutcome
    where
        L: PostalCodeLookup + ?Sized,
    {
        let result = perform_lookup(lookup, &request).await;

        self.complete(&request, result)
    }

    /// Enter a zip code and, if that triggers a lookup, resolve it straight away.
    pub async fn enter_postal_code<L>(&mut self, lookup: &L, raw: &str) -> ResolverState
    where
        L: PostalCodeLookup + ?Sized,
    {
        if let Some(request) = self.input_postal_code(raw) {
            self.resolve(lookup, request).await;
        }

        self.state
    }

    /// Type a value into a non-zip field.
    ///
    /// # Errors
    ///
    /// Returns an [`AddressFormError`] if the field is locked by a lookup or is the zip code.
    pub fn edit(
        &mut self,
        field: AddressField,
        value: impl Into<String>,
    ) -> Result<(), AddressFormError> {
        self.form.set_field(field, value)
    }

    /// Non-blocking hint for `field` when it loses focus.
    pub fn hint(&self, field: AddressField) -> Option<FieldHint> {
        self.form.hint(field)
    }

    /// Validate the form for submission.
    ///
    /// # Errors
    ///
    /// Returns an [`AddressValidationError`] listing the empty required fields.
    pub fn validate(&self) -> Result<DeliveryAddress, AddressValidationError> {
        self.form.validate()
    }

    fn issue(&mut self, digits: String) -> LookupRequest {
        if self.form.has_auto_filled() {
            self.form.clear_dependent();
        }

        self.issued = self.issued.wrapping_add(1);
        self.issued_for = Some(digits.clone());
        self.state = ResolverState::Resolving;
        self.error = None;

        debug!(sequence = self.issued, %digits, "postal code lookup issued");

        LookupRequest {
            sequence: self.issued,
            digits,
        }
    }

    fn reset(&mut self) {
        if self.state != ResolverState::Idle || self.form.has_auto_filled() {
            self.form.clear_dependent();

            debug!("postal code cleared; address reset");
        }

        self.state = ResolverState::Idle;
        self.error = None;
        self.issued_for = None;
    }
}
