//! Postal-code lookup collaborator.

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;

use crate::address::postal_code::PostalCode;

/// Address fields returned by a lookup; any of them may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedAddress {
    /// Street name
    pub street: Option<String>,

    /// Neighborhood
    pub neighborhood: Option<String>,

    /// City
    pub city: Option<String>,

    /// State abbreviation (e.g. `SP`)
    pub state: Option<String>,
}

/// Result of a lookup that reached the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// The code is known.
    Found(ResolvedAddress),

    /// The service has no address for the code.
    NotFound,
}

/// Errors that can occur when talking to the lookup service.
#[derive(Debug, Error)]
pub enum LookupError {
    /// An HTTP transport or deserialization error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service returned a non-2xx response or unexpected body.
    #[error("unexpected response from postal-code lookup: {0}")]
    UnexpectedResponse(String),
}

/// Resolves postal codes to address fields.
#[automock]
#[async_trait]
pub trait PostalCodeLookup: Send + Sync {
    /// Look up the address for `code`.
    ///
    /// # Errors
    ///
    /// Returns a [`LookupError`] if the service could not be reached or answered unexpectedly.
    async fn lookup(&self, code: &PostalCode) -> Result<LookupOutcome, LookupError>;
}
