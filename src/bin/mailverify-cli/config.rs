use std::path::Path;

use anyhow::Result;
#[cfg(feature = "with-serde")]
use anyhow::Context;
#[cfg(not(feature = "with-serde"))]
use anyhow::bail;
use mailverify_lib::{ReplyMatch, VerifyOptions};

use crate::args::Cli;

/// Contents of the `[smtp]` table; every key is optional.
#[cfg_attr(feature = "with-serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "with-serde", serde(deny_unknown_fields))]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SmtpSection {
    pub port: Option<u16>,
    pub sender: Option<String>,
    pub timeout: Option<u64>,
    pub fqdn: Option<String>,
    pub strict_replies: Option<bool>,
}

#[cfg(feature = "with-serde")]
#[derive(Debug, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    smtp: SmtpSection,
}

#[cfg(feature = "with-serde")]
pub fn parse_config(text: &str) -> Result<SmtpSection> {
    let file: ConfigFile = toml::from_str(text)?;
    Ok(file.smtp)
}

#[cfg(feature = "with-serde")]
pub fn load_config(path: &Path) -> Result<SmtpSection> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    parse_config(&text).with_context(|| format!("parse config {}", path.display()))
}

#[cfg(not(feature = "with-serde"))]
pub fn load_config(_path: &Path) -> Result<SmtpSection> {
    bail!("--config requires the 'with-serde' feature")
}

/// Defaults, then the config file, then env/flags (clap merges those two).
pub fn resolve_options(cli: &Cli) -> Result<VerifyOptions> {
    let file = match &cli.config {
        Some(path) => load_config(path)?,
        None => SmtpSection::default(),
    };
    Ok(layer(file, cli))
}

fn layer(file: SmtpSection, cli: &Cli) -> VerifyOptions {
    let mut options = VerifyOptions::default();
    apply(&mut options, file);
    apply(
        &mut options,
        SmtpSection {
            port: cli.port,
            sender: cli.sender.clone(),
            timeout: cli.timeout,
            fqdn: cli.fqdn.clone(),
            strict_replies: cli.strict_replies.then_some(true),
        },
    );
    options
}

fn apply(options: &mut VerifyOptions, section: SmtpSection) {
    if let Some(port) = section.port {
        options.port = port;
    }
    if let Some(sender) = section.sender {
        options.sender = sender;
    }
    if let Some(timeout) = section.timeout {
        options.timeout_ms = timeout;
    }
    if let Some(fqdn) = section.fqdn {
        options.fqdn = fqdn;
    }
    if let Some(strict) = section.strict_replies {
        options.reply_match = if strict {
            ReplyMatch::StatusLine
        } else {
            ReplyMatch::Substring
        };
    }
}
