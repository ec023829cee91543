//! The probe dialogue as a pure function of (step, reply).
//!
//! Nothing here touches the network, which keeps every protocol decision
//! testable on its own.

use std::fmt;

use super::types::{ProbeFailure, ProbeResult};

/// The reply the session is currently waiting for.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Server banner, right after connecting.
    Greeting,
    /// Answer to `EHLO`.
    Hello,
    /// Answer to `MAIL FROM`.
    MailFrom,
    /// Answer to `RCPT TO`; whatever arrives here decides the verdict.
    RcptTo,
}

impl Step {
    fn accepts(self, code: u16) -> bool {
        match self {
            Self::Greeting => code == 220,
            Self::Hello => matches!(code, 250 | 220),
            Self::MailFrom => code == 250,
            Self::RcptTo => true,
        }
    }
}

/// Commands the probe may write. `Display` renders the exact wire bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ehlo(String),
    MailFrom(String),
    RcptTo(String),
    Quit,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ehlo(domain) => write!(f, "EHLO {domain}\r\n"),
            Self::MailFrom(sender) => write!(f, "MAIL FROM:<{sender}>\r\n"),
            Self::RcptTo(recipient) => write!(f, "RCPT TO:<{recipient}>\r\n"),
            Self::Quit => f.write_str("QUIT\r\n"),
        }
    }
}

/// Identity used on the wire for one probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub helo: String,
    pub sender: String,
    pub recipient: String,
}

/// What to do after a reply: where to go, what to write, and whether the
/// verdict is now known. `next == None` means the dialogue is over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: Option<Step>,
    pub command: Option<Command>,
    pub result: Option<ProbeResult>,
}

pub fn transition(step: Step, code: u16, line: &str, envelope: &Envelope) -> Transition {
    if !step.accepts(code) {
        return finish(ProbeFailure::UnexpectedReplyCode {
            code,
            line: line.to_string(),
        });
    }

    match step {
        Step::Greeting => advance(Step::Hello, Command::Ehlo(envelope.helo.clone())),
        Step::Hello => advance(Step::MailFrom, Command::MailFrom(envelope.sender.clone())),
        Step::MailFrom => advance(Step::RcptTo, Command::RcptTo(envelope.recipient.clone())),
        Step::RcptTo if matches!(code, 250 | 251) => Transition {
            next: None,
            command: Some(Command::Quit),
            result: Some(ProbeResult::accepted()),
        },
        Step::RcptTo => finish(ProbeFailure::UnexpectedReplyCode {
            code,
            line: line.to_string(),
        }),
    }
}

fn advance(next: Step, command: Command) -> Transition {
    Transition {
        next: Some(next),
        command: Some(command),
        result: None,
    }
}

fn finish(failure: ProbeFailure) -> Transition {
    Transition {
        next: None,
        command: Some(Command::Quit),
        result: Some(failure.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope() -> Envelope {
        Envelope {
            helo: "examplemx.test".to_string(),
            sender: "admin@examplemx.test".to_string(),
            recipient: "user@examplemx.test".to_string(),
        }
    }

    #[test]
    fn wire_format() {
        assert_eq!(Command::Ehlo("d.test".into()).to_string(), "EHLO d.test\r\n");
        assert_eq!(
            Command::MailFrom("admin@d.test".into()).to_string(),
            "MAIL FROM:<admin@d.test>\r\n"
        );
        assert_eq!(
            Command::RcptTo("u@d.test".into()).to_string(),
            "RCPT TO:<u@d.test>\r\n"
        );
        assert_eq!(Command::Quit.to_string(), "QUIT\r\n");
    }

    #[test]
    fn banner_triggers_ehlo() {
        let t = transition(Step::Greeting, 220, "220 ready", &envelope());
        assert_eq!(t.next, Some(Step::Hello));
        assert_eq!(t.command, Some(Command::Ehlo("examplemx.test".into())));
        assert_eq!(t.result, None);
    }

    #[test]
    fn ehlo_accepts_250_and_220() {
        for code in [250, 220] {
            let t = transition(Step::Hello, code, "ok", &envelope());
            assert_eq!(t.next, Some(Step::MailFrom));
            assert_eq!(
                t.command,
                Some(Command::MailFrom("admin@examplemx.test".into()))
            );
        }
    }

    #[test]
    fn mail_from_triggers_rcpt() {
        let t = transition(Step::MailFrom, 250, "250 ok", &envelope());
        assert_eq!(t.next, Some(Step::RcptTo));
        assert_eq!(t.command, Some(Command::RcptTo("user@examplemx.test".into())));
    }

    #[test]
    fn mail_from_rejects_220() {
        let t = transition(Step::MailFrom, 220, "220 what", &envelope());
        assert_eq!(t.next, None);
        assert_eq!(t.command, Some(Command::Quit));
    }

    #[test]
    fn rcpt_250_and_251_accept() {
        for code in [250, 251] {
            let t = transition(Step::RcptTo, code, "ok", &envelope());
            assert_eq!(t.next, None);
            assert_eq!(t.command, Some(Command::Quit));
            assert_eq!(t.result, Some(ProbeResult::accepted()));
        }
    }

    #[test]
    fn rcpt_rejection_carries_code_and_line() {
        let t = transition(Step::RcptTo, 550, "550 mailbox unavailable", &envelope());
        let result = t.result.expect("verdict");
        assert!(!result.accepted);
        assert_eq!(
            result.message,
            "Server responded with 550: 550 mailbox unavailable"
        );
        assert_eq!(t.command, Some(Command::Quit));
    }

    #[test]
    fn unexpected_code_short_circuits_every_step() {
        for step in [Step::Greeting, Step::Hello, Step::MailFrom] {
            let t = transition(step, 550, "550 go away", &envelope());
            assert_eq!(t.next, None, "{step:?}");
            assert_eq!(t.command, Some(Command::Quit), "{step:?}");
            assert_eq!(
                t.result.map(|r| r.message),
                Some("Server responded with 550: 550 go away".to_string())
            );
        }
    }
}
