use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

use super::*;

type Script = Vec<(&'static str, String)>;

/// Scripted SMTP peer: writes `banner`, then answers each expected command
/// in order. Returns every line the client sent.
fn spawn_mock_server(banner: &'static str, script: Script) -> (u16, thread::JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock server");
    let port = listener.local_addr().expect("addr").port();
    let handle = thread::spawn(move || {
        let mut received = Vec::new();
        if let Ok((mut stream, _)) = listener.accept() {
            let _ = handle_session(&mut stream, banner, script, &mut received);
        }
        received
    });
    (port, handle)
}

fn handle_session(
    stream: &mut TcpStream,
    banner: &str,
    script: Script,
    received: &mut Vec<String>,
) -> io::Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);
    stream.write_all(banner.as_bytes())?;
    stream.flush()?;
    for (expected, response) in script {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim_end().to_string();
        let matches = line.starts_with(expected);
        received.push(line);
        if !matches {
            break;
        }
        stream.write_all(response.as_bytes())?;
        stream.flush()?;
    }
    Ok(())
}

fn options_for(port: u16) -> ProbeOptions {
    ProbeOptions {
        port,
        timeout: Duration::from_secs(5),
        ..ProbeOptions::default()
    }
}

fn happy_script(rcpt_reply: &str) -> Script {
    vec![
        ("EHLO", "250-mock.example\r\n250 PIPELINING\r\n".to_string()),
        ("MAIL FROM:", "250 2.1.0 Ok\r\n".to_string()),
        ("RCPT TO:", rcpt_reply.to_string()),
        ("QUIT", "221 2.0.0 Bye\r\n".to_string()),
    ]
}

#[test]
fn accepted_recipient_walks_every_state() {
    let (port, handle) = spawn_mock_server("220 mock ESMTP\r\n", happy_script("250 2.1.5 Ok\r\n"));
    let report = probe("127.0.0.1", "user@example.com", &options_for(port));
    let received = handle.join().expect("server thread");

    assert!(report.outcome.is_accepted(), "{:?}", report.outcome);
    assert_eq!(report.state, ProbeState::Closed);
    assert_eq!(
        received,
        vec![
            "EHLO localhost",
            "MAIL FROM:<test@example.com>",
            "RCPT TO:<user@example.com>",
            "QUIT",
        ]
    );
    assert!(report.address.is_some());
}

#[test]
fn codes_251_and_252_are_accepted() {
    for reply in ["251 User not local; will forward\r\n", "252 Cannot VRFY user\r\n"] {
        let (port, handle) = spawn_mock_server("220 mock\r\n", happy_script(reply));
        let report = probe("127.0.0.1", "user@example.com", &options_for(port));
        handle.join().expect("server thread");
        assert!(report.outcome.is_accepted(), "{reply}: {:?}", report.outcome);
    }
}

#[test]
fn rejected_recipient_keeps_reply() {
    let (port, handle) = spawn_mock_server(
        "220 mock\r\n",
        happy_script("550 5.1.1 User unknown\r\n"),
    );
    let report = probe("127.0.0.1", "ghost@example.com", &options_for(port));
    let received = handle.join().expect("server thread");

    match &report.outcome {
        ProbeOutcome::Rejected { reply } => {
            assert_eq!(reply.code, 550);
            assert_eq!(reply.message, "5.1.1 User unknown");
        }
        other => panic!("expected rejection, got {other:?}"),
    }
    assert_eq!(received.last().map(String::as_str), Some("QUIT"));
    assert_eq!(report.state, ProbeState::Closed);
}

#[test]
fn transient_recipient_reply_is_rejected() {
    let (port, handle) = spawn_mock_server("220 mock\r\n", happy_script("451 Try later\r\n"));
    let report = probe("127.0.0.1", "user@example.com", &options_for(port));
    handle.join().expect("server thread");
    assert!(matches!(
        report.outcome,
        ProbeOutcome::Rejected { ref reply } if reply.code == 451
    ));
}

#[test]
fn ehlo_refusal_falls_back_to_helo() {
    let (port, handle) = spawn_mock_server(
        "220 old-school\r\n",
        vec![
            ("EHLO", "502 Command not implemented\r\n".to_string()),
            ("HELO", "250 old-school\r\n".to_string()),
            ("MAIL FROM:", "250 Ok\r\n".to_string()),
            ("RCPT TO:", "250 Ok\r\n".to_string()),
            ("QUIT", "221 Bye\r\n".to_string()),
        ],
    );
    let report = probe("127.0.0.1", "user@example.com", &options_for(port));
    let received = handle.join().expect("server thread");

    assert!(report.outcome.is_accepted(), "{:?}", report.outcome);
    assert_eq!(received[1], "HELO localhost");
}

#[test]
fn sender_refusal_is_unreachable_and_quits() {
    let (port, handle) = spawn_mock_server(
        "220 mock\r\n",
        vec![
            ("EHLO", "250 mock\r\n".to_string()),
            ("MAIL FROM:", "553 Sender rejected\r\n".to_string()),
            ("QUIT", "221 Bye\r\n".to_string()),
        ],
    );
    let report = probe("127.0.0.1", "user@example.com", &options_for(port));
    let received = handle.join().expect("server thread");

    match &report.outcome {
        ProbeOutcome::Unreachable { stage, reply, .. } => {
            assert_eq!(*stage, ProbeStage::MailFrom);
            assert_eq!(reply.as_ref().map(|r| r.code), Some(553));
        }
        other => panic!("expected unreachable, got {other:?}"),
    }
    assert_eq!(report.state, ProbeState::Greeted);
    assert!(!received.iter().any(|line| line.starts_with("RCPT")));
    assert_eq!(received.last().map(String::as_str), Some("QUIT"));
}

#[test]
fn banner_refusal_is_unreachable() {
    let (port, handle) = spawn_mock_server(
        "554 No SMTP service here\r\n",
        vec![("QUIT", "221 Bye\r\n".to_string())],
    );
    let report = probe("127.0.0.1", "user@example.com", &options_for(port));
    handle.join().expect("server thread");

    assert!(matches!(
        report.outcome,
        ProbeOutcome::Unreachable {
            stage: ProbeStage::Banner,
            ..
        }
    ));
    assert_eq!(report.state, ProbeState::Connected);
}

#[test]
fn unparseable_recipient_reply_is_unreachable() {
    let (port, handle) = spawn_mock_server(
        "220 mock\r\n",
        happy_script("what is this\r\n"),
    );
    let report = probe("127.0.0.1", "user@example.com", &options_for(port));
    handle.join().expect("server thread");

    assert!(matches!(
        report.outcome,
        ProbeOutcome::Unreachable {
            stage: ProbeStage::RcptTo,
            ..
        }
    ));
    assert!(
        report
            .events
            .iter()
            .any(|event| matches!(event, SmtpEvent::Sent { stage: ProbeStage::Quit, .. }))
    );
    assert_eq!(report.state, ProbeState::Closed);
}

#[test]
fn line_breaks_in_address_are_never_sent() {
    let (port, handle) = spawn_mock_server(
        "220 mock\r\n",
        vec![
            ("EHLO", "250 mock\r\n".to_string()),
            ("MAIL FROM:", "250 Ok\r\n".to_string()),
            ("QUIT", "221 Bye\r\n".to_string()),
        ],
    );
    let report = probe("127.0.0.1", "a@b.com>\r\nDATA", &options_for(port));
    let received = handle.join().expect("server thread");

    assert!(matches!(
        report.outcome,
        ProbeOutcome::Unreachable {
            stage: ProbeStage::RcptTo,
            ..
        }
    ));
    assert!(!received.iter().any(|line| line.starts_with("RCPT") || line == "DATA"));
    assert!(
        !report
            .events
            .iter()
            .any(|event| matches!(event, SmtpEvent::Sent { stage: ProbeStage::RcptTo, .. }))
    );
    assert!(
        report
            .events
            .iter()
            .any(|event| matches!(event, SmtpEvent::Error { stage: ProbeStage::RcptTo, .. }))
    );
}

#[test]
fn dropped_connection_before_recipient_stops_at_sender_declared() {
    let (port, handle) = spawn_mock_server(
        "220 mock\r\n",
        vec![
            ("EHLO", "250 mock\r\n".to_string()),
            ("MAIL FROM:", "250 Ok\r\n".to_string()),
        ],
    );
    let report = probe("127.0.0.1", "user@example.com", &options_for(port));
    handle.join().expect("server thread");

    assert!(matches!(
        report.outcome,
        ProbeOutcome::Unreachable {
            stage: ProbeStage::RcptTo,
            ..
        }
    ));
    assert_eq!(report.state, ProbeState::SenderDeclared);
}

#[test]
fn silent_server_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock server");
    let port = listener.local_addr().expect("addr").port();
    let handle = thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            // hold the connection open until the client gives up
            let mut sink = Vec::new();
            let _ = stream.read_to_end(&mut sink);
        }
    });

    let options = ProbeOptions {
        port,
        timeout: Duration::from_millis(300),
        ..ProbeOptions::default()
    };
    let report = probe("127.0.0.1", "user@example.com", &options);
    handle.join().expect("server thread");

    match &report.outcome {
        ProbeOutcome::Unreachable { stage, reason, .. } => {
            assert_eq!(*stage, ProbeStage::Banner);
            assert!(reason.contains("timed out"), "{reason}");
        }
        other => panic!("expected timeout, got {other:?}"),
    }
    assert!(!report.outcome.is_accepted());
}

#[test]
fn refused_connection_is_unreachable() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr").port()
    };
    let report = probe("127.0.0.1", "user@example.com", &options_for(port));

    assert!(matches!(
        report.outcome,
        ProbeOutcome::Unreachable {
            stage: ProbeStage::Connect,
            ..
        }
    ));
    assert_eq!(report.state, ProbeState::Disconnected);
    assert!(report.address.is_none());
}

#[test]
fn closure_implements_probe_trait() {
    let stub = |host: &str, _email: &str| {
        ProbeReport::with_outcome(
            host,
            ProbeOutcome::Rejected {
                reply: SmtpReply {
                    code: 550,
                    message: "no".to_string(),
                },
            },
        )
    };
    let report = DeliverabilityProbe::probe(&stub, "mx.example.com", "a@example.com");
    assert_eq!(report.host, "mx.example.com");
    assert!(!report.outcome.is_accepted());
}
