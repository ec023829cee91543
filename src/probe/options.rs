use std::borrow::Cow;
use std::time::Duration;

/// Controls how [`verify_email`](crate::verify_email) talks to the exchanger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOptions {
    pub port: u16,
    /// Budget for the whole session: connect, every write and every read.
    pub timeout: Duration,
    pub helo_domain: Option<String>,
    pub envelope_sender: Option<String>,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            port: 25,
            timeout: Duration::from_secs(10),
            helo_domain: None,
            envelope_sender: None,
        }
    }
}

impl ProbeOptions {
    /// Returns the `EHLO` argument, defaulting to the recipient's domain.
    pub fn helo_domain<'a>(&'a self, domain: &'a str) -> Cow<'a, str> {
        self.helo_domain
            .as_deref()
            .filter(|value| !value.is_empty())
            .map(Cow::Borrowed)
            .unwrap_or(Cow::Borrowed(domain))
    }

    /// Returns the `MAIL FROM` address. When unspecified an `admin@domain`
    /// placeholder is synthesised; no real sender is needed since nothing is sent.
    pub fn envelope_sender(&self, domain: &str) -> String {
        self.envelope_sender
            .as_ref()
            .filter(|value| !value.is_empty())
            .cloned()
            .unwrap_or_else(|| format!("admin@{domain}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_recipient_domain() {
        let options = ProbeOptions::default();
        assert_eq!(options.port, 25);
        assert_eq!(options.helo_domain("example.com"), "example.com");
        assert_eq!(options.envelope_sender("example.com"), "admin@example.com");
    }

    #[test]
    fn blank_overrides_are_ignored() {
        let options = ProbeOptions {
            helo_domain: Some(String::new()),
            envelope_sender: Some(String::new()),
            ..ProbeOptions::default()
        };
        assert_eq!(options.helo_domain("example.com"), "example.com");
        assert_eq!(options.envelope_sender("example.com"), "admin@example.com");
    }

    #[test]
    fn overrides_win() {
        let options = ProbeOptions {
            helo_domain: Some("probe.local".into()),
            envelope_sender: Some("bounce@probe.local".into()),
            ..ProbeOptions::default()
        };
        assert_eq!(options.helo_domain("example.com"), "probe.local");
        assert_eq!(options.envelope_sender("example.com"), "bounce@probe.local");
    }
}
