use std::time::Duration;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use mxprobe::ProbeOptions;

#[derive(Parser)]
#[command(name = "mxprobe-cli", version)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Option<Commands>,

    /// format: human|json
    #[arg(long, global = true, default_value = "human")]
    pub format: String,

    /// logs détaillés sur stderr (équivaut à RUST_LOG=mxprobe=debug)
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// teste si l'adresse serait acceptée par son MX principal
    Verify {
        /// adresse e-mail à tester
        email: String,
        /// port SMTP du MX
        #[arg(long, default_value_t = 25)]
        port: u16,
        /// timeout global de la session (ms)
        #[arg(long, default_value_t = 10_000)]
        timeout_ms: u64,
        /// nom utilisé pour EHLO (par défaut le domaine de l'adresse)
        #[arg(long)]
        helo: Option<String>,
        /// enveloppe MAIL FROM (par défaut admin@domaine)
        #[arg(long)]
        mail_from: Option<String>,
    },
    /// liste les MX d'un domaine, par priorité
    Mx { domain: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Human,
    Json,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn clap_command() -> clap::Command {
        <Self as clap::CommandFactory>::command()
    }

    pub fn parsed_format(&self) -> Result<Format> {
        format_from_str(&self.format)
    }
}

pub fn format_from_str(s: &str) -> Result<Format> {
    match s {
        "human" => Ok(Format::Human),
        "json" => Ok(Format::Json),
        other => bail!("unknown --format '{other}', use: human|json"),
    }
}

pub fn probe_options(
    port: u16,
    timeout_ms: u64,
    helo: Option<String>,
    mail_from: Option<String>,
) -> ProbeOptions {
    ProbeOptions {
        port,
        timeout: Duration::from_millis(timeout_ms),
        helo_domain: helo,
        envelope_sender: mail_from,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_defaults() {
        let cli = <Cli as Parser>::try_parse_from(["mxprobe-cli", "verify", "user@example.com"])
            .expect("parse");
        let Some(Commands::Verify {
            email,
            port,
            timeout_ms,
            helo,
            mail_from,
        }) = cli.cmd
        else {
            panic!("expected verify");
        };
        assert_eq!(email, "user@example.com");
        let options = probe_options(port, timeout_ms, helo, mail_from);
        assert_eq!(options, ProbeOptions::default());
    }

    #[test]
    fn verify_overrides() {
        let cli = <Cli as Parser>::try_parse_from([
            "mxprobe-cli",
            "verify",
            "user@example.com",
            "--timeout-ms",
            "2500",
            "--mail-from",
            "checker@sender.test",
            "--helo",
            "sender.test",
            "--port",
            "2525",
        ])
        .expect("parse");
        let Some(Commands::Verify {
            port,
            timeout_ms,
            helo,
            mail_from,
            ..
        }) = cli.cmd
        else {
            panic!("expected verify");
        };
        let options = probe_options(port, timeout_ms, helo, mail_from);
        assert_eq!(options.port, 2525);
        assert_eq!(options.timeout, Duration::from_millis(2500));
        assert_eq!(options.helo_domain.as_deref(), Some("sender.test"));
        assert_eq!(options.envelope_sender.as_deref(), Some("checker@sender.test"));
    }

    #[test]
    fn bare_timeout_flag_is_rejected() {
        let parsed = <Cli as Parser>::try_parse_from([
            "mxprobe-cli",
            "verify",
            "user@example.com",
            "--timeout",
            "2500",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn global_format_after_subcommand() {
        let cli = <Cli as Parser>::try_parse_from(["mxprobe-cli", "mx", "example.com", "--format", "json"])
            .expect("parse");
        assert_eq!(cli.parsed_format().expect("format"), Format::Json);
    }

    #[test]
    fn unknown_format_rejected() {
        assert!(format_from_str("csv").is_err());
    }

    #[test]
    fn clap_definition_is_consistent() {
        Cli::clap_command().debug_assert();
    }
}
