use thiserror::Error;

/// Verdict of a single probe. `message` is empty when the address was accepted.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub accepted: bool,
    pub message: String,
}

impl ProbeResult {
    pub fn accepted() -> Self {
        Self {
            accepted: true,
            message: String::new(),
        }
    }

    pub fn rejected(failure: ProbeFailure) -> Self {
        Self {
            accepted: false,
            message: failure.to_string(),
        }
    }
}

impl From<ProbeFailure> for ProbeResult {
    fn from(failure: ProbeFailure) -> Self {
        Self::rejected(failure)
    }
}

/// Every way a probe can end negatively. The `Display` text is what callers see.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeFailure {
    #[error("No MX records found")]
    NoMailExchanger,
    #[error("Server responded with {code}: {line}")]
    UnexpectedReplyCode { code: u16, line: String },
    #[error("{0}")]
    Transport(String),
    #[error("Connection timeout")]
    Timeout,
    #[error("Verification failed")]
    PrematureClose,
}
