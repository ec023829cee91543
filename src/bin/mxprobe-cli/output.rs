use anyhow::Result;
#[cfg(feature = "with-serde")]
use anyhow::Context;

use crate::args::Format;
use mxprobe::{MailExchanger, ProbeResult};

pub fn human_verdict(email: &str, result: &ProbeResult) -> String {
    if result.accepted {
        format!("[OK]       {email}")
    } else {
        format!("[REJECTED] {email} :: {}", result.message)
    }
}

pub fn human_exchangers(domain: &str, exchangers: &[MailExchanger]) -> Vec<String> {
    if exchangers.is_empty() {
        return vec![format!("{domain}: no MX records")];
    }
    exchangers
        .iter()
        .map(|mx| format!("{:>5}  {}", mx.priority, mx.host))
        .collect()
}

pub fn print_verdict(format: Format, email: &str, result: &ProbeResult) -> Result<()> {
    match format {
        Format::Human => println!("{}", human_verdict(email, result)),
        Format::Json => println!("{}", to_json(result)?),
    }
    Ok(())
}

pub fn print_exchangers(format: Format, domain: &str, exchangers: &[MailExchanger]) -> Result<()> {
    match format {
        Format::Human => {
            for line in human_exchangers(domain, exchangers) {
                println!("{line}");
            }
        }
        Format::Json => println!("{}", to_json(&exchangers)?),
    }
    Ok(())
}

#[cfg(feature = "with-serde")]
fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string(value).context("serialize JSON output")
}

#[cfg(not(feature = "with-serde"))]
fn to_json<T: ?Sized>(_value: &T) -> Result<String> {
    anyhow::bail!("format=json nécessite la feature 'with-serde'")
}
