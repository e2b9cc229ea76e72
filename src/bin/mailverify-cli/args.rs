use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "mailverify-cli", version, about = "Probe whether mailboxes exist over SMTP")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Option<Commands>,

    /// read addresses from stdin (one per line)
    #[arg(long)]
    pub stdin: bool,

    /// output format
    #[arg(long, value_enum, default_value_t = Format::Human)]
    pub format: Format,

    /// TOML file with an `[smtp]` table
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// SMTP port of the MX hosts
    #[arg(long, env = "MAILVERIFY_PORT")]
    pub port: Option<u16>,

    /// envelope sender for MAIL FROM
    #[arg(long, env = "MAILVERIFY_SENDER")]
    pub sender: Option<String>,

    /// idle timeout in ms (0 disables it)
    #[arg(long, env = "MAILVERIFY_TIMEOUT")]
    pub timeout: Option<u64>,

    /// name announced in EHLO
    #[arg(long, env = "MAILVERIFY_FQDN")]
    pub fqdn: Option<String>,

    /// require the status code at the start of a reply line
    #[arg(long)]
    pub strict_replies: bool,

    /// log the SMTP dialogue to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// verify a single address
    Verify { email: String },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Human,
    Json,
    Ndjson,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn clap_command() -> clap::Command {
        <Self as clap::CommandFactory>::command()
    }

    /// Default `tracing` directive when `RUST_LOG` is unset.
    pub fn log_directive(&self) -> &'static str {
        if self.verbose {
            "mailverify=debug"
        } else {
            "mailverify=warn"
        }
    }
}
