//! Mail exchanger resolution.
//!
//! [`resolve_mail_host`] picks the preferred MX host of a domain and falls back
//! to the domain itself when it has an address record but no MX. Every DNS
//! failure collapses to `None`; [`check_mx`] keeps the full record list and
//! its errors for diagnostics.

mod error;
mod resolver;
mod types;

pub use error::MxError as Error;
pub use resolver::{
    DEFAULT_DNS_TIMEOUT, MailResolver, SystemResolver, check_mx, resolve_mail_host,
};
pub use types::{MxRecord, MxStatus};
