//! Syntactic pre-filter for e-mail addresses.
//!
//! The check is deliberately loose: it accepts plenty of addresses that do not
//! exist and is no RFC 5322 parser. Its only job is to keep obviously broken
//! input away from the network.

mod types;

pub use types::{EmailAddress, EmailError};

use std::sync::LazyLock;

use regex::Regex;

const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

static EMAIL_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(EMAIL_PATTERN).ok());

/// Returns `true` when `address` has the shape `local@domain.tld`.
///
/// Pure and total: malformed input yields `false`, never an error.
pub fn validate(address: &str) -> bool {
    EMAIL_RE
        .as_ref()
        .is_some_and(|re| re.is_match(address))
}

impl EmailAddress {
    /// Valide puis découpe l'adresse en partie locale / domaine.
    pub fn parse(address: &str) -> Result<Self, EmailError> {
        if !validate(address) {
            return Err(EmailError::InvalidFormat);
        }
        // le motif exclut '@' des deux côtés : exactement un séparateur
        let (local, domain) = address.split_once('@').ok_or(EmailError::InvalidFormat)?;
        Ok(Self::from_parts(local, domain))
    }
}
