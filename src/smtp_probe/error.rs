use std::io;
use std::net::SocketAddr;

use thiserror::Error;

use super::types::{ProbeOutcome, ProbeStage, SmtpReply};

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("address lookup for {host} failed: {source}")]
    AddressLookup {
        host: String,
        #[source]
        source: io::Error,
    },
    #[error("no socket address resolved for {host}")]
    NoAddress { host: String },
    #[error("connection to {address} failed: {source}")]
    Connect {
        address: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("{stage} timed out")]
    Timeout { stage: ProbeStage },
    #[error("I/O error during {stage}: {source}")]
    Io {
        stage: ProbeStage,
        #[source]
        source: io::Error,
    },
    #[error("protocol error during {stage}: {message}")]
    Protocol { stage: ProbeStage, message: String },
    #[error("{stage} refused: {reply}")]
    Refused { stage: ProbeStage, reply: SmtpReply },
}

impl ProbeError {
    pub(crate) fn connect(address: SocketAddr, source: io::Error) -> Self {
        if is_timeout(&source) {
            Self::Timeout {
                stage: ProbeStage::Connect,
            }
        } else {
            Self::Connect { address, source }
        }
    }

    pub(crate) fn io(stage: ProbeStage, source: io::Error) -> Self {
        if is_timeout(&source) {
            Self::Timeout { stage }
        } else {
            Self::Io { stage, source }
        }
    }

    pub(crate) fn protocol(stage: ProbeStage, message: impl Into<String>) -> Self {
        Self::Protocol {
            stage,
            message: message.into(),
        }
    }

    pub(crate) fn refused(stage: ProbeStage, reply: SmtpReply) -> Self {
        Self::Refused { stage, reply }
    }

    pub fn stage(&self) -> ProbeStage {
        match self {
            Self::AddressLookup { .. } | Self::NoAddress { .. } | Self::Connect { .. } => {
                ProbeStage::Connect
            }
            Self::Timeout { stage }
            | Self::Io { stage, .. }
            | Self::Protocol { stage, .. }
            | Self::Refused { stage, .. } => *stage,
        }
    }

    /// The server answered negatively; the connection itself is still usable.
    pub fn is_refusal(&self) -> bool {
        matches!(self, Self::Refused { .. })
    }
}

impl From<ProbeError> for ProbeOutcome {
    fn from(err: ProbeError) -> Self {
        let stage = err.stage();
        let reason = err.to_string();
        let reply = match err {
            ProbeError::Refused { reply, .. } => Some(reply),
            _ => None,
        };
        ProbeOutcome::Unreachable {
            stage,
            reason,
            reply,
        }
    }
}

// read timeouts surface as WouldBlock on Unix and TimedOut on Windows
fn is_timeout(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
    )
}
