//! Verification pipeline: format → disposable → mail host → SMTP probe.
//!
//! The format check short-circuits: an invalid address never touches the
//! network. A domain without a usable mail host is never probed.

mod error;
mod options;
mod types;

pub use error::VerifyError;
pub use options::VerifierOptions;
pub use types::{DeliverabilityStatus, VerificationResult, VerificationSummary};

use std::sync::Arc;

use crate::disposable::DisposableDomains;
use crate::mx::{MailResolver, SystemResolver, resolve_mail_host};
use crate::smtp_probe::{DeliverabilityProbe, SmtpProber};
use crate::validator::{EmailAddress, validate};

/// Runs the full pipeline with an injected resolver and prober.
pub struct Verifier<R = SystemResolver, P = SmtpProber> {
    disposable: Arc<DisposableDomains>,
    resolver: R,
    prober: P,
}

impl<R, P> Verifier<R, P>
where
    R: MailResolver,
    P: DeliverabilityProbe,
{
    pub fn new(disposable: Arc<DisposableDomains>, resolver: R, prober: P) -> Self {
        Self {
            disposable,
            resolver,
            prober,
        }
    }

    /// Verifies one address. Always returns a complete result.
    pub fn verify(&self, email: &str) -> VerificationResult {
        let address = match EmailAddress::parse(email) {
            Ok(address) => address,
            Err(_) => {
                tracing::debug!(email, "invalid format, skipping network checks");
                return VerificationResult::invalid_format(email);
            }
        };

        let is_disposable = self.disposable.is_disposable(address.domain());

        let Some(mail_host) = resolve_mail_host(&self.resolver, address.domain()) else {
            tracing::debug!(domain = address.domain(), "no mail host, probe skipped");
            return VerificationResult {
                email: email.to_string(),
                format_valid: true,
                is_disposable,
                email_verified: false,
                mail_host: None,
                status: DeliverabilityStatus::NoMailServer,
                probe: None,
            };
        };

        let report = self.prober.probe(&mail_host, email);
        let email_verified = report.outcome.is_accepted();
        let status = DeliverabilityStatus::from_outcome(&report.outcome);
        tracing::debug!(email, host = %mail_host, %status, "verification finished");

        VerificationResult {
            email: email.to_string(),
            format_valid: true,
            is_disposable,
            email_verified,
            mail_host: Some(mail_host),
            status,
            probe: Some(report),
        }
    }
}

impl Verifier {
    /// Production stack: system DNS configuration and live SMTP probing.
    pub fn from_options(options: &VerifierOptions) -> Result<Self, VerifyError> {
        let disposable = match &options.disposable_list {
            Some(path) => DisposableDomains::from_file(path)?,
            None => DisposableDomains::builtin(),
        };
        let resolver = SystemResolver::with_timeout(options.dns_timeout)?;
        let prober = SmtpProber::new(options.probe.clone());
        Ok(Self::new(Arc::new(disposable), resolver, prober))
    }
}

/// Verifies `email` with default options.
///
/// Builds a fresh [`Verifier`] on every call; keep one around when checking
/// many addresses. A malformed address is answered before the resolver is
/// even built.
pub fn verify_email(email: &str) -> Result<VerificationResult, VerifyError> {
    if !validate(email) {
        return Ok(VerificationResult::invalid_format(email));
    }
    let verifier = Verifier::from_options(&VerifierOptions::default())?;
    Ok(verifier.verify(email))
}
