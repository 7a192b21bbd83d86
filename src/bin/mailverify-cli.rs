#[path = "mailverify-cli/args.rs"]
mod args;
#[path = "mailverify-cli/interactive.rs"]
mod interactive;
#[path = "mailverify-cli/output.rs"]
mod output;

use std::io::{self, BufRead};

use anyhow::{Context, Result};
use mailverify_lib::{VerificationResult, Verifier};
use tracing_subscriber::EnvFilter;

use crate::args::{Cli, Commands};

fn init_tracing(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    let verifier =
        Verifier::from_options(&cli.verifier_options()).context("initialise verifier")?;

    let mut results: Vec<VerificationResult> = Vec::new();

    if cli.stdin {
        for line in io::stdin().lock().lines() {
            let line = line.context("read stdin")?;
            let email = line.trim();
            if email.is_empty() {
                continue;
            }
            results.push(verifier.verify(email));
        }
    } else if let Some(Commands::Verify { email }) = &cli.cmd {
        results.push(verifier.verify(email.trim()));
    } else {
        // pas de sous-commande: mode interactif
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        return interactive::run(
            |email| verifier.verify(email),
            stdin.lock(),
            &mut stdout,
            cli.transcript,
        );
    }

    output::write_reports(&results, &cli)?;

    // codes de sortie : 0 OK, 2 invalids, 1 fatal
    if output::any_invalid(&results) {
        std::process::exit(2);
    }
    Ok(())
}
