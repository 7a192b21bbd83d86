use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::{Duration, Instant};

use super::error::ProbeError;
use super::types::{ProbeStage, SmtpReply};

/// Single time budget shared by every network operation of one probe.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Deadline {
    at: Option<Instant>,
    budget: Duration,
}

impl Deadline {
    pub(crate) fn after(budget: Duration) -> Self {
        Self {
            at: Instant::now().checked_add(budget),
            budget,
        }
    }

    pub(crate) fn remaining(&self, stage: ProbeStage) -> Result<Duration, ProbeError> {
        let left = match self.at {
            Some(at) => at.saturating_duration_since(Instant::now()),
            None => self.budget,
        };
        if left.is_zero() {
            Err(ProbeError::Timeout { stage })
        } else {
            Ok(left)
        }
    }
}

pub(crate) struct SmtpSession {
    stream: TcpStream,
    reader: BufReader<TcpStream>,
    deadline: Deadline,
}

impl SmtpSession {
    pub(crate) fn connect(
        host: &str,
        addrs: &[SocketAddr],
        deadline: Deadline,
    ) -> Result<(Self, SocketAddr), ProbeError> {
        let mut last_err = None;
        for addr in addrs {
            let budget = deadline.remaining(ProbeStage::Connect)?;
            match TcpStream::connect_timeout(addr, budget) {
                Ok(stream) => {
                    let reader = BufReader::new(
                        stream
                            .try_clone()
                            .map_err(|err| ProbeError::io(ProbeStage::Connect, err))?,
                    );
                    let session = Self {
                        stream,
                        reader,
                        deadline,
                    };
                    return Ok((session, *addr));
                }
                Err(err) => {
                    tracing::debug!(host, %addr, error = %err, "connect attempt failed");
                    last_err = Some(ProbeError::connect(*addr, err));
                }
            }
        }
        Err(last_err.unwrap_or_else(|| ProbeError::NoAddress {
            host: host.to_string(),
        }))
    }

    pub(crate) fn send_command(
        &mut self,
        command: &str,
        stage: ProbeStage,
    ) -> Result<(), ProbeError> {
        if command.contains(['\r', '\n']) {
            return Err(ProbeError::protocol(stage, "command contains a line break"));
        }
        let budget = self.deadline.remaining(stage)?;
        self.stream
            .set_write_timeout(Some(budget))
            .map_err(|err| ProbeError::io(stage, err))?;

        let mut line = command.as_bytes().to_vec();
        line.extend_from_slice(b"\r\n");
        self.stream
            .write_all(&line)
            .map_err(|err| ProbeError::io(stage, err))?;
        self.stream.flush().map_err(|err| ProbeError::io(stage, err))
    }

    pub(crate) fn read_reply(&mut self, stage: ProbeStage) -> Result<SmtpReply, ProbeError> {
        let mut code = None;
        let mut message_lines = Vec::new();
        loop {
            let budget = self.deadline.remaining(stage)?;
            self.stream
                .set_read_timeout(Some(budget))
                .map_err(|err| ProbeError::io(stage, err))?;

            let mut raw = String::new();
            let bytes = self
                .reader
                .read_line(&mut raw)
                .map_err(|err| ProbeError::io(stage, err))?;
            if bytes == 0 {
                return Err(ProbeError::protocol(
                    stage,
                    "connection closed while reading reply",
                ));
            }
            let raw = raw.trim_end_matches(['\r', '\n']);
            tracing::trace!(%stage, line = raw, "reply line");

            let line = parse_reply_line(raw).map_err(|message| ProbeError::protocol(stage, message))?;
            if let Some(existing) = code {
                if existing != line.code {
                    return Err(ProbeError::protocol(
                        stage,
                        format!("inconsistent SMTP reply codes: {existing} vs {}", line.code),
                    ));
                }
            } else {
                code = Some(line.code);
            }
            message_lines.push(line.text.to_string());
            if line.last {
                break;
            }
        }
        Ok(SmtpReply {
            code: code.ok_or_else(|| ProbeError::protocol(stage, "SMTP reply missing status code"))?,
            message: message_lines.join("\n"),
        })
    }
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ReplyLine<'a> {
    pub code: u16,
    pub last: bool,
    pub text: &'a str,
}

/// Splits `250-text` / `250 text` into code, continuation flag and text.
pub(crate) fn parse_reply_line(raw: &str) -> Result<ReplyLine<'_>, String> {
    let code_part = raw
        .get(..3)
        .ok_or_else(|| format!("invalid SMTP reply: '{raw}'"))?;
    if !code_part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("invalid SMTP status code: '{code_part}'"));
    }
    let code = code_part
        .parse::<u16>()
        .map_err(|_| format!("invalid SMTP status code: '{code_part}'"))?;
    let last = match raw.as_bytes().get(3) {
        None | Some(b' ') => true,
        Some(b'-') => false,
        Some(_) => return Err(format!("invalid SMTP reply separator: '{raw}'")),
    };
    let text = raw.get(4..).unwrap_or_default();
    Ok(ReplyLine { code, last, text })
}
