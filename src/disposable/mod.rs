//! Disposable (throwaway) mail provider lookup.
//!
//! [`DisposableDomains`] is a read-only set built once and shared by every
//! verification. Matching is exact and case-insensitive: `sub.mailinator.com`
//! is not flagged unless listed itself.

mod error;

pub use error::DisposableError;

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use phf::phf_set;

/// Seed list used when no list file is supplied.
const BUILTIN_DOMAINS: phf::Set<&'static str> = phf_set! {
    "10minutemail.com",
    "guerrillamail.com",
    "mailinator.com",
    "tempmail.org",
    "temp-mail.org",
    "yopmail.com",
    "throwaway.email",
    "maildrop.cc",
    "sharklasers.com",
    "guerrillamailblock.com",
    "pokemail.net",
    "spam4.me",
    "bccto.me",
    "chacuo.net",
    "dispostable.com",
    "fakeinbox.com",
    "fantastu.com",
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisposableDomains {
    domains: HashSet<String>,
}

impl DisposableDomains {
    pub fn builtin() -> Self {
        BUILTIN_DOMAINS.iter().copied().collect()
    }

    /// Reads a list file: one domain per line, blank lines and `#` comments ignored.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DisposableError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|err| DisposableError::read(path, err))?;
        let domains: Self = parse_list(&contents).collect();
        tracing::debug!(path = %path.display(), entries = domains.len(), "disposable list loaded");
        Ok(domains)
    }

    pub fn is_disposable(&self, domain: &str) -> bool {
        self.domains.contains(&normalize(domain))
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for DisposableDomains {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let domains = iter
            .into_iter()
            .map(|domain| normalize(domain.as_ref()))
            .filter(|domain| !domain.is_empty())
            .collect();
        Self { domains }
    }
}

fn parse_list(contents: &str) -> impl Iterator<Item = &str> {
    contents.lines().filter_map(|line| {
        let entry = line.split('#').next().unwrap_or_default().trim();
        if entry.is_empty() {
            return None;
        }
        if entry.contains(char::is_whitespace) {
            tracing::warn!(line = %line, "skipping malformed disposable list entry");
            return None;
        }
        Some(entry)
    })
}

fn normalize(domain: &str) -> String {
    domain.trim().trim_end_matches('.').to_ascii_lowercase()
}
