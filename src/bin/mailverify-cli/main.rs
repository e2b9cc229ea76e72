mod args;
mod config;
mod output;

use std::io::{self, BufRead};

use anyhow::{Context, Result};
use mailverify_lib::{VerificationResult, Verifier};
use tracing_subscriber::EnvFilter;

use crate::args::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    let addresses = match &cli.cmd {
        Some(Commands::Verify { email }) => vec![email.clone()],
        None if cli.stdin => read_stdin()?,
        None => {
            Cli::clap_command().print_help()?;
            println!();
            return Ok(());
        }
    };

    let options = config::resolve_options(&cli)?;
    let verifier =
        Verifier::from_system_conf(options).context("initialise system DNS resolver")?;

    let mut rows: Vec<VerificationResult> = Vec::with_capacity(addresses.len());
    for email in &addresses {
        let row = verifier
            .verify(email)
            .await
            .with_context(|| format!("verify '{email}'"))?;
        rows.push(row);
    }

    output::write_reports(&rows, cli.format)?;

    // exit codes: 0 verified, 2 unverified, 1 fatal
    if output::any_unverified(&rows) {
        std::process::exit(2);
    }
    Ok(())
}

fn init_tracing(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_directive()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Blank lines are skipped; surrounding whitespace is trimmed.
fn read_stdin() -> Result<Vec<String>> {
    let mut addresses = Vec::new();
    for line in io::stdin().lock().lines() {
        let line = line.context("read stdin")?;
        let email = line.trim();
        if !email.is_empty() {
            addresses.push(email.to_string());
        }
    }
    Ok(addresses)
}
