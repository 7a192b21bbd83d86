use std::net::IpAddr;
use std::time::Duration;

use trust_dns_resolver::{
    Resolver,
    error::{ResolveError, ResolveErrorKind},
    system_conf,
};

use super::{Error, MxRecord, MxStatus};

/// Per-query DNS timeout used when the caller does not pick one.
pub const DEFAULT_DNS_TIMEOUT: Duration = Duration::from_secs(5);

/// DNS seam used by the resolution logic. Implemented by [`SystemResolver`]
/// and by stubs in tests.
///
/// "No records" must be reported as `Ok(vec![])`; `Err` is for lookup failures.
pub trait MailResolver {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, ResolveError>;
    fn lookup_host(&self, domain: &str) -> Result<Vec<IpAddr>, ResolveError>;
}

/// Synchronous resolver built from the system configuration.
pub struct SystemResolver {
    inner: Resolver,
}

impl SystemResolver {
    /// Reads the system configuration, then bounds every query by `timeout`
    /// with a single attempt.
    pub fn with_timeout(timeout: Duration) -> Result<Self, Error> {
        let (config, mut opts) = system_conf::read_system_conf().map_err(|e| Error::resolver_config(ResolveError::from(e)))?;
        opts.timeout = timeout;
        opts.attempts = 1;
        let inner = Resolver::new(config, opts).map_err(Error::resolver_init)?;
        Ok(Self { inner })
    }
}

impl MailResolver for SystemResolver {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, ResolveError> {
        let lookup = match self.inner.mx_lookup(domain) {
            Ok(lookup) => lookup,
            Err(err) if should_treat_as_empty(&err) => return Ok(Vec::new()),
            Err(err) => return Err(err),
        };
        let mut records = Vec::new();
        for mx in lookup.iter() {
            let exchange = normalize_exchange(mx.exchange().to_utf8());
            records.push(MxRecord::new(mx.preference(), exchange));
        }
        Ok(records)
    }

    fn lookup_host(&self, domain: &str) -> Result<Vec<IpAddr>, ResolveError> {
        match self.inner.lookup_ip(domain) {
            Ok(lookup) => Ok(lookup.iter().collect()),
            Err(err) if should_treat_as_empty(&err) => Ok(Vec::new()),
            Err(err) => Err(err),
        }
    }
}

/// Lookup MX records for `domain` using the system resolver, each query
/// bounded by [`DEFAULT_DNS_TIMEOUT`].
///
/// The domain is normalized via IDNA before querying DNS. The resulting
/// [`MxStatus`] lists the records by ascending preference.
pub fn check_mx(domain: &str) -> Result<MxStatus, Error> {
    let ascii = normalize_domain(domain)?;
    let resolver = SystemResolver::with_timeout(DEFAULT_DNS_TIMEOUT)?;
    resolve_with(&resolver, &ascii)
}

/// Returns the host to probe for `domain`, or `None` when no usable mail
/// target exists. Lookup failures of any kind end up as `None`.
pub fn resolve_mail_host<R>(resolver: &R, domain: &str) -> Option<String>
where
    R: MailResolver + ?Sized,
{
    let ascii = match normalize_domain(domain) {
        Ok(ascii) => ascii,
        Err(err) => {
            tracing::debug!(domain, error = %err, "domain cannot be queried");
            return None;
        }
    };

    match resolve_with(resolver, &ascii) {
        Ok(status) => match status.preferred() {
            Some(record) if record.is_null() => {
                tracing::debug!(domain = %ascii, "null MX published, domain accepts no mail");
                return None;
            }
            Some(record) => {
                tracing::debug!(
                    domain = %ascii,
                    exchange = %record.exchange,
                    preference = record.preference,
                    "selected preferred MX"
                );
                return Some(record.exchange.clone());
            }
            None => tracing::debug!(domain = %ascii, "no MX records, trying address fallback"),
        },
        Err(err) => {
            tracing::debug!(domain = %ascii, error = %err, "MX lookup failed, trying address fallback");
        }
    }

    match resolver.lookup_host(&ascii) {
        Ok(addrs) if !addrs.is_empty() => {
            tracing::debug!(domain = %ascii, addresses = addrs.len(), "using domain as implicit MX");
            Some(ascii)
        }
        Ok(_) => {
            tracing::debug!(domain = %ascii, "no address records either");
            None
        }
        Err(err) => {
            tracing::debug!(domain = %ascii, error = %err, "address lookup failed");
            None
        }
    }
}

pub(crate) fn resolve_with<R>(resolver: &R, ascii_domain: &str) -> Result<MxStatus, Error>
where
    R: MailResolver + ?Sized,
{
    let mut records = resolver.lookup_mx(ascii_domain).map_err(Error::lookup)?;

    // stable: equal preferences keep their DNS order
    records.sort_by_key(|record| record.preference);

    if records.is_empty() {
        Ok(MxStatus::NoRecords)
    } else {
        Ok(MxStatus::Records(records))
    }
}

pub(crate) fn normalize_domain(domain: &str) -> Result<String, Error> {
    let trimmed = domain.trim().trim_end_matches('.');
    if trimmed.is_empty() {
        return Err(Error::EmptyDomain);
    }
    idna::domain_to_ascii(trimmed).map_err(Error::idna)
}

pub(crate) fn normalize_exchange(exchange: String) -> String {
    let trimmed = exchange.trim_end_matches('.');
    trimmed.to_ascii_lowercase()
}

fn should_treat_as_empty(err: &ResolveError) -> bool {
    matches!(err.kind(), ResolveErrorKind::NoRecordsFound { .. })
}
