use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser, Subcommand};
use mailverify_lib::{ProbeOptions, VerifierOptions};

#[derive(Parser)]
#[command(name = "mailverify-cli", version, about = "vérifie qu'une adresse e-mail existe")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Option<Commands>,

    /// lit des adresses depuis stdin (une par ligne)
    #[arg(long)]
    pub stdin: bool,

    /// write report to file (JSON/NDJSON/CSV selon --format)
    #[arg(long)]
    pub out: Option<String>,

    /// format: human|json|ndjson|csv
    #[arg(long, default_value = "human")]
    pub format: String,

    /// affiche la transcription SMTP (format human)
    #[arg(long)]
    pub transcript: bool,

    /// liste de domaines jetables (un par ligne, `#` pour commenter)
    #[arg(long = "disposable-list")]
    pub disposable_list: Option<PathBuf>,

    /// budget total de la sonde SMTP (ms)
    #[arg(long = "timeout", default_value_t = 10_000)]
    pub timeout_ms: u64,

    /// timeout des requêtes DNS (ms)
    #[arg(long = "dns-timeout", default_value_t = 5_000)]
    pub dns_timeout_ms: u64,

    /// port SMTP du serveur MX
    #[arg(long, default_value_t = 25)]
    pub port: u16,

    /// nom utilisé pour EHLO/HELO
    #[arg(long)]
    pub helo: Option<String>,

    /// enveloppe MAIL FROM
    #[arg(long = "from")]
    pub mail_from: Option<String>,

    /// verbosité des logs (-v, -vv); RUST_LOG a priorité
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// vérifie une seule adresse
    Verify {
        /// adresse e-mail à tester
        email: String,
    },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn verifier_options(&self) -> VerifierOptions {
        let mut probe = ProbeOptions {
            port: self.port,
            timeout: Duration::from_millis(self.timeout_ms),
            ..ProbeOptions::default()
        };
        if let Some(helo) = &self.helo {
            probe.helo_domain = helo.clone();
        }
        if let Some(from) = &self.mail_from {
            probe.envelope_sender = from.clone();
        }

        VerifierOptions {
            probe,
            dns_timeout: Duration::from_millis(self.dns_timeout_ms),
            disposable_list: self.disposable_list.clone(),
        }
    }

    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "mailverify_lib=debug,info",
            _ => "mailverify_lib=trace,debug",
        }
    }
}
