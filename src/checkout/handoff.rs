//! Order handoff
//!
//! Checkout ends by passing the order message to an external channel. The store receives
//! orders over `WhatsApp`, so the default channel turns the message into a `wa.me` link and
//! hands it to a [`LinkOpener`].

use std::io::{self, Write as _};

use mockall::automock;
use reqwest::Url;
use thiserror::Error;
use tracing::info;

const WHATSAPP_BASE_URL: &str = "https://wa.me";

/// Errors raised while handing an order off.
#[derive(Debug, Error)]
pub enum HandoffError {
    /// The store contact could not be turned into a link.
    #[error("invalid store contact: {0}")]
    InvalidDestination(String),

    /// The link could not be opened.
    #[error("could not open handoff link: {0}")]
    Open(#[from] io::Error),
}

/// Delivers an order message to the store.
#[automock]
pub trait HandoffChannel {
    /// Send `message` to `destination`.
    ///
    /// # Errors
    ///
    /// Returns a [`HandoffError`] if the message could not be delivered.
    fn dispatch(&self, destination: &str, message: &str) -> Result<(), HandoffError>;
}

/// Opens a link for the shopper.
#[automock]
pub trait LinkOpener {
    /// Open `url`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the link could not be opened.
    fn open(&self, url: &Url) -> io::Result<()>;
}

/// Writes the link to standard output.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutOpener;

impl LinkOpener for StdoutOpener {
    fn open(&self, url: &Url) -> io::Result<()> {
        writeln!(io::stdout().lock(), "{url}")
    }
}

/// `WhatsApp` click-to-chat handoff.
#[derive(Debug, Clone, Default)]
pub struct WhatsAppHandoff<O = StdoutOpener> {
    opener: O,
}

impl<O: LinkOpener> WhatsAppHandoff<O> {
    /// Create a handoff that opens links with `opener`.
    pub fn new(opener: O) -> Self {
        Self { opener }
    }

    /// Build the click-to-chat link for `destination` with `message` prefilled.
    ///
    /// Only the digits of `destination` are kept, so `+55 (11) 99999-0000` works. The
    /// message is percent-encoded, spaces included.
    ///
    /// # Errors
    ///
    /// Returns [`HandoffError::InvalidDestination`] if `destination` has no digits.
    pub fn build_link(destination: &str, message: &str) -> Result<Url, HandoffError> {
        let digits: String = destination.chars().filter(char::is_ascii_digit).collect();

        if digits.is_empty() {
            return Err(HandoffError::InvalidDestination(destination.to_string()));
        }

        let mut link =
            Url::parse_with_params(&format!("{WHATSAPP_BASE_URL}/{digits}"), &[("text", message)])
                .map_err(|err| HandoffError::InvalidDestination(err.to_string()))?;

        // Form encoding writes spaces as `+`; a literal `+` is already escaped as `%2B`.
        let query = link.query().map(|query| query.replace('+', "%20"));
        link.set_query(query.as_deref());

        Ok(link)
    }
}

impl<O: LinkOpener> HandoffChannel for WhatsAppHandoff<O> {
    fn dispatch(&self, destination: &str, message: &str) -> Result<(), HandoffError> {
        let link = Self::build_link(destination, message)?;

        info!(host = link.host_str(), "handing order off");

        self.opener.open(&link)?;

        Ok(())
    }
}
