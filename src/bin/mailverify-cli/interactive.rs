use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use mailverify_lib::VerificationResult;

use crate::output::{human_lines, summary_json};

const PROMPT: &str = "Enter email address to verify (or 'quit' to exit): ";

/// Boucle interactive: une adresse par ligne jusqu'à `quit` ou EOF.
pub fn run<F, R, W>(verify: F, mut input: R, out: &mut W, transcript: bool) -> Result<()>
where
    F: Fn(&str) -> VerificationResult,
    R: BufRead,
    W: Write,
{
    writeln!(out, "Email Verifier Application")?;
    writeln!(out, "{}", "=".repeat(30))?;

    loop {
        write!(out, "\n{PROMPT}")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line).context("read stdin")? == 0 {
            // EOF (Ctrl-D)
            writeln!(out, "\n\nGoodbye!")?;
            return Ok(());
        }

        let email = line.trim();
        if email.eq_ignore_ascii_case("quit") {
            writeln!(out, "Goodbye!")?;
            return Ok(());
        }
        if email.is_empty() {
            writeln!(out, "Please enter a valid email address.")?;
            continue;
        }

        writeln!(out, "\nVerifying: {email}")?;
        writeln!(out, "{}", "-".repeat(40))?;

        let result = verify(email);
        for line in human_lines(&result, transcript) {
            writeln!(out, "{line}")?;
        }
        match summary_json(&result) {
            Ok(json) => writeln!(out, "\nJSON Result:\n{json}")?,
            Err(err) => writeln!(out, "Error: {err}")?,
        }
    }
}
