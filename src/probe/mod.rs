//! Mailbox existence probing.
//!
//! [`verify_email`] resolves the recipient domain's preferred exchanger and
//! walks it through `EHLO`, `MAIL FROM` and `RCPT TO`, quitting before any
//! message data. Every failure mode ends in a [`ProbeResult`]; only a
//! malformed address is reported as an error.

mod machine;
mod options;
mod reply;
mod session;
mod slot;
mod transport;
mod types;


use std::io;
use std::time::Instant;

pub use machine::{Command, Envelope, Step, Transition, transition};
pub use options::ProbeOptions;
pub use session::{Action, Event, ProbeSession, Reaction};
pub use slot::ResultSlot;
pub use transport::{Connection, Connector, TcpConnector};
pub use types::{ProbeFailure, ProbeResult};

use crate::address::{AddressError, extract_domain};
use crate::mx::{self, LookupMx, resolve_exchangers};

const READ_CHUNK: usize = 1024;

/// Probes `address` with default options, the system resolver and plain TCP.
pub fn verify_email(address: &str) -> Result<ProbeResult, AddressError> {
    verify_email_with_options(address, &ProbeOptions::default())
}

/// Identical to [`verify_email`], but allows tweaking port, timeout and the
/// identity presented to the server.
pub fn verify_email_with_options(
    address: &str,
    options: &ProbeOptions,
) -> Result<ProbeResult, AddressError> {
    extract_domain(address)?;
    match mx::system_resolver() {
        Ok(resolver) => verify_email_with(address, options, &resolver, &TcpConnector),
        Err(err) => {
            tracing::warn!(address, error = %err, "no usable DNS resolver");
            Ok(ProbeFailure::NoMailExchanger.into())
        }
    }
}

/// Runs a probe with explicit DNS and transport collaborators.
///
/// Only the lowest-priority exchanger is tried; when it cannot be reached the
/// verdict is negative, there is no fail-over.
pub fn verify_email_with<R, C>(
    address: &str,
    options: &ProbeOptions,
    resolver: &R,
    connector: &C,
) -> Result<ProbeResult, AddressError>
where
    R: LookupMx + ?Sized,
    C: Connector,
{
    let domain = extract_domain(address)?;
    let exchangers = resolve_exchangers(resolver, domain);
    let Some(primary) = exchangers.first() else {
        tracing::info!(address, domain, "no mail exchanger");
        return Ok(ProbeFailure::NoMailExchanger.into());
    };

    let mut session = ProbeSession::new(&primary.host, domain, address, options);
    Ok(run_session(connector, &mut session, options))
}

/// Drives `session` over one connection until it closes, under a single
/// deadline covering the whole exchange.
pub fn run_session<C: Connector>(
    connector: &C,
    session: &mut ProbeSession,
    options: &ProbeOptions,
) -> ProbeResult {
    let deadline = Instant::now() + options.timeout;

    match connector.connect(session.host(), options.port, options.timeout) {
        Ok(mut conn) => pump(&mut conn, session, deadline),
        Err(err) => {
            session.handle(io_event(&err));
            session.handle(Event::Closed);
        }
    }

    session
        .outcome()
        .cloned()
        .unwrap_or_else(|| ProbeFailure::PrematureClose.into())
}

fn pump<T: Connection>(conn: &mut T, session: &mut ProbeSession, deadline: Instant) {
    let mut buf = [0u8; READ_CHUNK];
    while !session.is_closed() {
        let remaining = deadline.saturating_duration_since(Instant::now());
        let reaction = if remaining.is_zero() {
            session.handle(Event::TimedOut)
        } else if let Err(err) = conn.set_deadline(remaining) {
            session.handle(io_event(&err))
        } else {
            match conn.read(&mut buf) {
                Ok(0) => session.handle(Event::Closed),
                Ok(read) => session.handle(Event::Data(&buf[..read])),
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => session.handle(io_event(&err)),
            }
        };
        perform(conn, session, reaction.actions);
    }
}

fn perform<T: Connection>(conn: &mut T, session: &mut ProbeSession, actions: Vec<Action>) {
    for action in actions {
        match action {
            Action::Send(command) => {
                let written = conn
                    .write_all(command.to_string().as_bytes())
                    .and_then(|()| conn.flush());
                if let Err(err) = written {
                    session.handle(io_event(&err));
                    close(conn, session);
                    return;
                }
            }
            Action::Close => {
                close(conn, session);
                return;
            }
        }
    }
}

fn close<T: Connection>(conn: &mut T, session: &mut ProbeSession) {
    if let Err(err) = conn.shutdown() {
        tracing::debug!(host = session.host(), error = %err, "shutdown failed");
    }
    session.handle(Event::Closed);
}

fn io_event(err: &io::Error) -> Event<'static> {
    match err.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => Event::TimedOut,
        _ => Event::Failed(err.to_string()),
    }
}
