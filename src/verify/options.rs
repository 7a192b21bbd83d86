use std::path::PathBuf;
use std::time::Duration;

use crate::mx::DEFAULT_DNS_TIMEOUT;
use crate::smtp_probe::ProbeOptions;

/// Everything [`Verifier::from_options`](crate::verify::Verifier::from_options)
/// needs to build the production pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifierOptions {
    pub probe: ProbeOptions,
    pub dns_timeout: Duration,
    /// Disposable list file; the built-in list is used when `None`.
    pub disposable_list: Option<PathBuf>,
}

impl Default for VerifierOptions {
    fn default() -> Self {
        Self {
            probe: ProbeOptions::default(),
            dns_timeout: DEFAULT_DNS_TIMEOUT,
            disposable_list: None,
        }
    }
}
