//! SMTP deliverability probing.
//!
//! [`probe`] opens one connection to the mail exchanger and walks a partial
//! mail transaction:
//!
//! `Disconnected → Connected → Greeted → SenderDeclared → RecipientProbed → Closed`
//!
//! The `RCPT TO` reply is the only decision point; every earlier step either
//! continues or ends the probe as [`ProbeOutcome::Unreachable`]. `DATA` is never
//! sent, so the recipient's mailbox is untouched. [`ProbeReport::state`] is the
//! last state actually reached, and the transcript only lists commands that
//! were written to the socket.

mod error;
mod options;
mod session;
mod types;

pub use error::ProbeError;
pub use options::ProbeOptions;
pub use types::{ProbeOutcome, ProbeReport, ProbeStage, ProbeState, SmtpEvent, SmtpReply};

use std::net::{SocketAddr, ToSocketAddrs};

use session::{Deadline, SmtpSession};

/// Anything able to answer "would this host accept mail for this address?".
pub trait DeliverabilityProbe {
    fn probe(&self, target_host: &str, email: &str) -> ProbeReport;
}

impl<F> DeliverabilityProbe for F
where
    F: Fn(&str, &str) -> ProbeReport,
{
    fn probe(&self, target_host: &str, email: &str) -> ProbeReport {
        self(target_host, email)
    }
}

/// Live SMTP implementation of [`DeliverabilityProbe`].
#[derive(Debug, Clone, Default)]
pub struct SmtpProber {
    options: ProbeOptions,
}

impl SmtpProber {
    pub fn new(options: ProbeOptions) -> Self {
        Self { options }
    }
}

impl DeliverabilityProbe for SmtpProber {
    fn probe(&self, target_host: &str, email: &str) -> ProbeReport {
        probe(target_host, email, &self.options)
    }
}

/// Probes `target_host` for `email`. Never fails: every error ends up in the
/// report as [`ProbeOutcome::Unreachable`].
pub fn probe(target_host: &str, email: &str, options: &ProbeOptions) -> ProbeReport {
    let mut report = ProbeReport::new(target_host);
    let deadline = Deadline::after(options.timeout);

    // Disconnected -> Connected
    let mut session = match open_session(target_host, options.port, deadline, &mut report) {
        Ok(session) => session,
        Err(err) => {
            fail(&mut report, err);
            return report;
        }
    };

    // Connected -> Greeted -> SenderDeclared
    if let Err(err) = open_transaction(&mut session, &mut report, options) {
        let refused = err.is_refusal();
        fail(&mut report, err);
        if refused {
            let _ = send_quit(&mut session, &mut report);
        }
        return report;
    }

    // SenderDeclared -> RecipientProbed
    let rcpt_cmd = format!("RCPT TO:<{email}>");
    let outcome = match exchange(&mut session, &mut report, ProbeStage::RcptTo, &rcpt_cmd) {
        Ok(reply) => {
            report.state = ProbeState::RecipientProbed;
            classify_recipient(reply)
        }
        Err(err) => {
            report.error(err.stage(), err.to_string());
            ProbeOutcome::from(err)
        }
    };
    report.outcome = outcome;

    // -> Closed, only once the server acknowledged QUIT
    if send_quit(&mut session, &mut report) {
        report.state = ProbeState::Closed;
    }

    tracing::debug!(host = target_host, outcome = %report.outcome, "probe finished");
    report
}

fn open_session(
    host: &str,
    port: u16,
    deadline: Deadline,
    report: &mut ProbeReport,
) -> Result<SmtpSession, ProbeError> {
    let addrs = resolve_socket_addrs(host, port)?;
    let (session, peer) = SmtpSession::connect(host, &addrs, deadline)?;
    report.address = Some(peer.to_string());
    report.state = ProbeState::Connected;
    Ok(session)
}

fn open_transaction(
    session: &mut SmtpSession,
    report: &mut ProbeReport,
    options: &ProbeOptions,
) -> Result<(), ProbeError> {
    let banner = session.read_reply(ProbeStage::Banner)?;
    report.received(ProbeStage::Banner, &banner);
    if !banner.is_positive_completion() {
        return Err(ProbeError::refused(ProbeStage::Banner, banner));
    }

    greet(session, report, options.helo_name())?;
    report.state = ProbeState::Greeted;

    let mail_cmd = format!("MAIL FROM:<{}>", options.sender());
    let mail_reply = exchange(session, report, ProbeStage::MailFrom, &mail_cmd)?;
    if !mail_reply.is_positive_completion() {
        return Err(ProbeError::refused(ProbeStage::MailFrom, mail_reply));
    }
    report.state = ProbeState::SenderDeclared;
    Ok(())
}

/// `EHLO`, falling back to `HELO` for servers that refuse the extended greeting.
fn greet(
    session: &mut SmtpSession,
    report: &mut ProbeReport,
    helo_name: &str,
) -> Result<(), ProbeError> {
    let ehlo = exchange(session, report, ProbeStage::Ehlo, &format!("EHLO {helo_name}"))?;
    if ehlo.is_positive_completion() {
        return Ok(());
    }
    tracing::debug!(host = %report.host, code = ehlo.code, "EHLO refused, retrying with HELO");

    let helo = exchange(session, report, ProbeStage::Helo, &format!("HELO {helo_name}"))?;
    if helo.is_positive_completion() {
        Ok(())
    } else {
        Err(ProbeError::refused(ProbeStage::Helo, helo))
    }
}

fn exchange(
    session: &mut SmtpSession,
    report: &mut ProbeReport,
    stage: ProbeStage,
    command: &str,
) -> Result<SmtpReply, ProbeError> {
    session.send_command(command, stage)?;
    report.sent(stage, command);
    let reply = session.read_reply(stage)?;
    report.received(stage, &reply);
    Ok(reply)
}

fn classify_recipient(reply: SmtpReply) -> ProbeOutcome {
    if matches!(reply.code, 250..=252) {
        ProbeOutcome::Accepted { reply }
    } else {
        ProbeOutcome::Rejected { reply }
    }
}

// best effort: a failed QUIT never changes the outcome
fn send_quit(session: &mut SmtpSession, report: &mut ProbeReport) -> bool {
    match exchange(session, report, ProbeStage::Quit, "QUIT") {
        Ok(_) => true,
        Err(err) => {
            report.error(ProbeStage::Quit, err.to_string());
            false
        }
    }
}

fn fail(report: &mut ProbeReport, err: ProbeError) {
    report.error(err.stage(), err.to_string());
    report.outcome = ProbeOutcome::from(err);
}

fn resolve_socket_addrs(host: &str, port: u16) -> Result<Vec<SocketAddr>, ProbeError> {
    let addrs: Vec<SocketAddr> = (host, port)
        .to_socket_addrs()
        .map_err(|source| ProbeError::AddressLookup {
            host: host.to_string(),
            source,
        })?
        .collect();
    if addrs.is_empty() {
        return Err(ProbeError::NoAddress {
            host: host.to_string(),
        });
    }
    Ok(addrs)
}

#[cfg(test)]
mod tests;
