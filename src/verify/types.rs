use std::fmt;

use crate::smtp_probe::{ProbeOutcome, ProbeReport};

/// High-level deliverability verdict for one address.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliverabilityStatus {
    Deliverable,
    Rejected { code: u16, message: String },
    Unreachable { reason: String },
    NoMailServer,
    /// Format was invalid, nothing was looked up.
    NotChecked,
}

impl DeliverabilityStatus {
    pub(crate) fn from_outcome(outcome: &ProbeOutcome) -> Self {
        match outcome {
            ProbeOutcome::Accepted { .. } => Self::Deliverable,
            ProbeOutcome::Rejected { reply } => Self::Rejected {
                code: reply.code,
                message: reply.message.clone(),
            },
            ProbeOutcome::Unreachable { reason, .. } => Self::Unreachable {
                reason: reason.clone(),
            },
        }
    }
}

impl fmt::Display for DeliverabilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deliverable => f.write_str("deliverable"),
            Self::Rejected { code, message } => write!(f, "rejected ({code} {message})"),
            Self::Unreachable { reason } => write!(f, "unreachable ({reason})"),
            Self::NoMailServer => f.write_str("no mail server"),
            Self::NotChecked => f.write_str("not checked"),
        }
    }
}

/// Outcome of one [`Verifier::verify`](crate::verify::Verifier::verify) call.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    pub email: String,
    pub format_valid: bool,
    pub is_disposable: bool,
    pub email_verified: bool,
    #[cfg_attr(feature = "with-serde", serde(skip_serializing_if = "Option::is_none", default))]
    pub mail_host: Option<String>,
    pub status: DeliverabilityStatus,
    #[cfg_attr(feature = "with-serde", serde(skip_serializing_if = "Option::is_none", default))]
    pub probe: Option<ProbeReport>,
}

impl VerificationResult {
    pub(crate) fn invalid_format(email: &str) -> Self {
        Self {
            email: email.to_string(),
            format_valid: false,
            is_disposable: false,
            email_verified: false,
            mail_host: None,
            status: DeliverabilityStatus::NotChecked,
            probe: None,
        }
    }

    pub fn summary(&self) -> VerificationSummary {
        VerificationSummary {
            email_verified: self.email_verified,
            is_disposable: self.is_disposable,
        }
    }
}

/// The two-field view rendered as JSON by front ends.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerificationSummary {
    pub email_verified: bool,
    pub is_disposable: bool,
}
