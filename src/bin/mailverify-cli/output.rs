#[cfg(any(feature = "with-serde", feature = "with-csv"))]
use anyhow::Context;
use anyhow::{Result, bail};

use crate::args::Cli;
#[cfg(feature = "with-csv")]
use mailverify_lib::DeliverabilityStatus;
use mailverify_lib::VerificationResult;

/// Bloc lisible d'un résultat, une ligne par champ.
pub fn human_lines(result: &VerificationResult, transcript: bool) -> Vec<String> {
    let mut lines = vec![
        format!("Email: {}", result.email),
        format!("Format Valid: {}", result.format_valid),
        format!("Email Verified: {}", result.email_verified),
        format!("Is Disposable: {}", result.is_disposable),
    ];
    if let Some(host) = &result.mail_host {
        lines.push(format!("Mail Host: {host}"));
    }
    lines.push(format!("Status: {}", result.status));

    if transcript {
        if let Some(report) = &result.probe {
            lines.push("Transcript:".to_string());
            lines.extend(report.events.iter().map(|event| format!("  {event}")));
        }
    }
    lines
}

/// `{email_verified, is_disposable}` indenté, comme affiché en mode interactif.
#[cfg(feature = "with-serde")]
pub fn summary_json(result: &VerificationResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(&result.summary())?)
}

#[cfg(not(feature = "with-serde"))]
pub fn summary_json(_: &VerificationResult) -> Result<String> {
    bail!("le résumé JSON nécessite la feature 'with-serde'")
}

pub fn write_reports(results: &[VerificationResult], cli: &Cli) -> Result<()> {
    match cli.format.as_str() {
        "human" => write_human(results, cli),
        "json" => write_json(results, cli),
        "ndjson" => write_ndjson(results, cli),
        "csv" => write_csv(results, cli),
        other => bail!("unknown --format '{other}', use: human|json|ndjson|csv"),
    }
}

pub fn any_invalid(results: &[VerificationResult]) -> bool {
    results.iter().any(|result| !result.format_valid)
}

fn write_human(results: &[VerificationResult], cli: &Cli) -> Result<()> {
    if cli.out.is_some() {
        bail!("--out n'est pas supporté avec --format human");
    }
    for (idx, result) in results.iter().enumerate() {
        if idx > 0 {
            println!();
        }
        for line in human_lines(result, cli.transcript) {
            println!("{line}");
        }
    }
    Ok(())
}

#[cfg(feature = "with-serde")]
fn write_json(results: &[VerificationResult], cli: &Cli) -> Result<()> {
    let s = serde_json::to_string_pretty(results)?;
    if let Some(path) = &cli.out {
        write_all_atomically(path, s.as_bytes())?;
    } else {
        println!("{s}");
    }
    Ok(())
}

#[cfg(not(feature = "with-serde"))]
fn write_json(_: &[VerificationResult], _: &Cli) -> Result<()> {
    bail!("format=json nécessite la feature 'with-serde'")
}

#[cfg(feature = "with-serde")]
fn write_ndjson(results: &[VerificationResult], cli: &Cli) -> Result<()> {
    if let Some(path) = &cli.out {
        let mut buf = Vec::new();
        for result in results {
            let line = serde_json::to_string(result)?;
            buf.extend_from_slice(line.as_bytes());
            buf.push(b'\n');
        }
        write_all_atomically(path, &buf)?;
    } else {
        for result in results {
            println!("{}", serde_json::to_string(result)?);
        }
    }
    Ok(())
}

#[cfg(not(feature = "with-serde"))]
fn write_ndjson(_: &[VerificationResult], _: &Cli) -> Result<()> {
    bail!("format=ndjson nécessite la feature 'with-serde'")
}

#[cfg(feature = "with-csv")]
const CSV_HEADER: [&str; 7] = [
    "email",
    "format_valid",
    "is_disposable",
    "email_verified",
    "mail_host",
    "status",
    "detail",
];

#[cfg(feature = "with-csv")]
fn write_csv(results: &[VerificationResult], cli: &Cli) -> Result<()> {
    if let Some(path) = &cli.out {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.write_record(CSV_HEADER)?;
        for result in results {
            wtr.write_record(csv_record(result))?;
        }
        let data = wtr.into_inner()?;
        write_all_atomically(path, &data)?;
    } else {
        let mut wtr = csv::Writer::from_writer(std::io::stdout());
        wtr.write_record(CSV_HEADER)?;
        for result in results {
            wtr.write_record(csv_record(result))?;
        }
        wtr.flush()?;
    }
    Ok(())
}

#[cfg(not(feature = "with-csv"))]
fn write_csv(_: &[VerificationResult], _: &Cli) -> Result<()> {
    bail!("format=csv nécessite la feature 'with-csv'")
}

#[cfg(feature = "with-csv")]
fn csv_record(result: &VerificationResult) -> Vec<String> {
    let (status, detail) = csv_for_status(&result.status);
    vec![
        result.email.clone(),
        result.format_valid.to_string(),
        result.is_disposable.to_string(),
        result.email_verified.to_string(),
        result.mail_host.clone().unwrap_or_default(),
        status.to_string(),
        detail,
    ]
}

#[cfg(feature = "with-csv")]
fn csv_for_status(status: &DeliverabilityStatus) -> (&'static str, String) {
    match status {
        DeliverabilityStatus::Deliverable => ("deliverable", String::new()),
        DeliverabilityStatus::Rejected { code, message } => {
            ("rejected", format!("{code}:{message}"))
        }
        DeliverabilityStatus::Unreachable { reason } => ("unreachable", reason.clone()),
        DeliverabilityStatus::NoMailServer => ("no_mx", String::new()),
        DeliverabilityStatus::NotChecked => ("not_checked", String::new()),
    }
}

#[cfg(any(feature = "with-serde", feature = "with-csv"))]
fn write_all_atomically(path: &str, bytes: &[u8]) -> Result<()> {
    use std::io::Write;

    let tmp = format!("{path}.tmp");
    {
        let mut f = std::fs::File::create(&tmp).with_context(|| format!("create {tmp}"))?;
        f.write_all(bytes)?;
        f.sync_all()?;
    }
    std::fs::rename(&tmp, path).with_context(|| format!("rename {tmp} -> {path}"))?;
    Ok(())
}
