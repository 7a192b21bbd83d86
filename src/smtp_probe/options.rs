use std::time::Duration;

const DEFAULT_HELO: &str = "localhost";
const DEFAULT_SENDER: &str = "test@example.com";

/// Controls how [`probe`](crate::smtp_probe::probe) talks to the mail exchanger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOptions {
    pub port: u16,
    pub helo_domain: String,
    /// Placeholder `MAIL FROM` address; nothing is ever sent on its behalf.
    pub envelope_sender: String,
    /// Total budget for the whole transaction, connect included.
    pub timeout: Duration,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            port: 25,
            helo_domain: DEFAULT_HELO.to_string(),
            envelope_sender: DEFAULT_SENDER.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl ProbeOptions {
    /// Hostname used in `EHLO`/`HELO`, `localhost` when left blank.
    pub fn helo_name(&self) -> &str {
        match self.helo_domain.trim() {
            "" => DEFAULT_HELO,
            name => name,
        }
    }

    pub fn sender(&self) -> &str {
        match self.envelope_sender.trim() {
            "" => DEFAULT_SENDER,
            sender => sender,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_policy() {
        let options = ProbeOptions::default();
        assert_eq!(options.port, 25);
        assert_eq!(options.timeout, Duration::from_secs(10));
        assert_eq!(options.helo_name(), "localhost");
        assert_eq!(options.sender(), "test@example.com");
    }

    #[test]
    fn blank_values_fall_back() {
        let options = ProbeOptions {
            helo_domain: "  ".to_string(),
            envelope_sender: String::new(),
            ..ProbeOptions::default()
        };
        assert_eq!(options.helo_name(), "localhost");
        assert_eq!(options.sender(), "test@example.com");
    }
}
