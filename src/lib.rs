#![forbid(unsafe_code)]
//! mailverify_lib: vérification d'adresses e-mail
//!
//! format → domaine jetable → serveur MX → sonde SMTP (`RCPT TO`, sans `DATA`)

pub mod disposable;
pub mod mx;
pub mod smtp_probe;
pub mod validator;
pub mod verify;

pub use disposable::{DisposableDomains, DisposableError};
pub use mx::{
    Error as MxError, MailResolver, MxRecord, MxStatus, SystemResolver, check_mx,
    resolve_mail_host,
};
pub use smtp_probe::{
    DeliverabilityProbe, ProbeError, ProbeOptions, ProbeOutcome, ProbeReport, ProbeStage,
    ProbeState, SmtpEvent, SmtpProber, SmtpReply, probe,
};
pub use validator::{EmailAddress, EmailError, validate};
pub use verify::{
    DeliverabilityStatus, VerificationResult, VerificationSummary, Verifier, VerifierOptions,
    VerifyError, verify_email,
};
