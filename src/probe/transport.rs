use std::io::{self, Read, Write};
use std::net::{IpAddr, Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

/// A bidirectional byte stream to an exchanger.
pub trait Connection: Read + Write {
    /// Bounds every subsequent read and write by `remaining`.
    fn set_deadline(&mut self, remaining: Duration) -> io::Result<()>;

    /// Closes both directions. Calling it twice must be harmless.
    fn shutdown(&mut self) -> io::Result<()>;
}

/// Opens [`Connection`]s. The probe calls [`connect`](Self::connect) exactly once.
pub trait Connector {
    type Conn: Connection;

    fn connect(&self, host: &str, port: u16, timeout: Duration) -> io::Result<Self::Conn>;
}

impl Connection for TcpStream {
    fn set_deadline(&mut self, remaining: Duration) -> io::Result<()> {
        // set_read_timeout rejects zero
        let remaining = remaining.max(Duration::from_millis(1));
        self.set_read_timeout(Some(remaining))?;
        self.set_write_timeout(Some(remaining))
    }

    fn shutdown(&mut self) -> io::Result<()> {
        match TcpStream::shutdown(self, Shutdown::Both) {
            Err(err) if err.kind() == io::ErrorKind::NotConnected => Ok(()),
            other => other,
        }
    }
}

/// Plain TCP, trying each address the host resolves to in turn. Name
/// resolution and every attempt share the single `timeout` budget.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl Connector for TcpConnector {
    type Conn = TcpStream;

    fn connect(&self, host: &str, port: u16, timeout: Duration) -> io::Result<TcpStream> {
        let deadline = Instant::now() + timeout;
        let addrs = resolve_within(host, port, timeout)?;
        connect_any(host, &addrs, deadline, TcpStream::connect_timeout)
    }
}

/// `getaddrinfo` cannot be cancelled, so it runs on a detached thread and is
/// abandoned once `timeout` passes.
fn resolve_within(host: &str, port: u16, timeout: Duration) -> io::Result<Vec<SocketAddr>> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(vec![SocketAddr::new(ip, port)]);
    }
    let (tx, rx) = mpsc::channel();
    let target = host.to_string();
    thread::Builder::new()
        .name("mxprobe-resolve".into())
        .spawn(move || {
            let addrs = (target.as_str(), port)
                .to_socket_addrs()
                .map(|addrs| addrs.collect::<Vec<SocketAddr>>());
            // receiver may have given up already
            let _ = tx.send(addrs);
        })?;
    match rx.recv_timeout(timeout) {
        Ok(addrs) => addrs,
        Err(RecvTimeoutError::Timeout) => {
            tracing::debug!(host, ?timeout, "address resolution timed out");
            Err(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("resolving {host} timed out"),
            ))
        }
        Err(RecvTimeoutError::Disconnected) => Err(io::Error::other(format!(
            "address resolution for {host} aborted"
        ))),
    }
}

/// Tries `addrs` in order, handing each attempt only what is left of the
/// budget. Stops with `TimedOut` once `deadline` has passed.
fn connect_any<S, F>(host: &str, addrs: &[SocketAddr], deadline: Instant, mut attempt: F) -> io::Result<S>
where
    F: FnMut(&SocketAddr, Duration) -> io::Result<S>,
{
    let mut last_err = None;
    for addr in addrs {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            tracing::debug!(host, %addr, "connect budget exhausted");
            last_err = Some(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("connecting to {host} timed out"),
            ));
            break;
        }
        match attempt(addr, remaining) {
            Ok(stream) => {
                tracing::debug!(host, %addr, "connected");
                return Ok(stream);
            }
            Err(err) => {
                tracing::debug!(host, %addr, error = %err, "connect attempt failed");
                last_err = Some(err);
            }
        }
    }
    Err(last_err.unwrap_or_else(|| {
        io::Error::new(
            io::ErrorKind::AddrNotAvailable,
            format!("no socket address available for {host}"),
        )
    }))
}
