use std::fmt;

/// SMTP exchange a transcript event or failure belongs to.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStage {
    Connect,
    Banner,
    Ehlo,
    Helo,
    MailFrom,
    RcptTo,
    Quit,
}

impl fmt::Display for ProbeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Connect => "connect",
            Self::Banner => "banner",
            Self::Ehlo => "EHLO",
            Self::Helo => "HELO",
            Self::MailFrom => "MAIL FROM",
            Self::RcptTo => "RCPT TO",
            Self::Quit => "QUIT",
        })
    }
}

/// Position in the probe state machine. Transitions only move forward; a
/// failure leaves the report on the last state reached.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ProbeState {
    Disconnected,
    Connected,
    Greeted,
    SenderDeclared,
    RecipientProbed,
    Closed,
}

/// A raw SMTP reply, preserving the numeric status code and message text.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpReply {
    pub code: u16,
    pub message: String,
}

impl SmtpReply {
    pub fn is_positive_completion(&self) -> bool {
        (200..300).contains(&self.code)
    }
}

impl fmt::Display for SmtpReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.code)
        } else {
            write!(f, "{} {}", self.code, self.message.replace('\n', " / "))
        }
    }
}

/// A recorded SMTP transcript event used for diagnostics.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmtpEvent {
    Sent {
        stage: ProbeStage,
        command: String,
    },
    Received {
        stage: ProbeStage,
        reply: SmtpReply,
    },
    Error {
        stage: ProbeStage,
        message: String,
    },
}

impl fmt::Display for SmtpEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sent { command, .. } => write!(f, "C: {command}"),
            Self::Received { reply, .. } => write!(f, "S: {reply}"),
            Self::Error { stage, message } => write!(f, "! {stage}: {message}"),
        }
    }
}

/// Deliverability signal of a single probe.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// `RCPT TO` answered 250, 251 or 252.
    Accepted { reply: SmtpReply },
    /// `RCPT TO` answered with any other code.
    Rejected { reply: SmtpReply },
    /// Connection, protocol or timeout failure before a usable `RCPT TO` answer.
    Unreachable {
        stage: ProbeStage,
        reason: String,
        reply: Option<SmtpReply>,
    },
}

impl ProbeOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted { reply } => write!(f, "accepted ({reply})"),
            Self::Rejected { reply } => write!(f, "rejected ({reply})"),
            Self::Unreachable { reason, .. } => write!(f, "unreachable ({reason})"),
        }
    }
}

/// Detailed report for one probe against one host.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    pub host: String,
    pub address: Option<String>,
    pub state: ProbeState,
    pub events: Vec<SmtpEvent>,
    pub outcome: ProbeOutcome,
}

impl ProbeReport {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            address: None,
            state: ProbeState::Disconnected,
            events: Vec::new(),
            outcome: ProbeOutcome::Unreachable {
                stage: ProbeStage::Connect,
                reason: "probe not attempted".to_string(),
                reply: None,
            },
        }
    }

    /// Builds a finished report from an outcome alone. Handy for custom probes.
    pub fn with_outcome(host: impl Into<String>, outcome: ProbeOutcome) -> Self {
        Self {
            outcome,
            ..Self::new(host)
        }
    }

    pub(crate) fn sent(&mut self, stage: ProbeStage, command: &str) {
        tracing::debug!(host = %self.host, %stage, "C: {command}");
        self.events.push(SmtpEvent::Sent {
            stage,
            command: command.to_string(),
        });
    }

    pub(crate) fn received(&mut self, stage: ProbeStage, reply: &SmtpReply) {
        tracing::debug!(host = %self.host, %stage, "S: {reply}");
        self.events.push(SmtpEvent::Received {
            stage,
            reply: reply.clone(),
        });
    }

    pub(crate) fn error(&mut self, stage: ProbeStage, message: String) {
        tracing::debug!(host = %self.host, %stage, error = %message, "probe step failed");
        self.events.push(SmtpEvent::Error { stage, message });
    }
}
