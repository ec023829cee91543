#![forbid(unsafe_code)]
//! mxprobe — checks whether a mailbox would be accepted, without sending mail.
//!
//! The domain of the address is resolved to its preferred mail exchanger and
//! a partial SMTP dialogue (`EHLO`, `MAIL FROM`, `RCPT TO`, `QUIT`) is run
//! against it. See [`verify_email`].

pub mod address;
pub mod mx;
pub mod probe;

pub use address::{AddressError, extract_domain};
pub use mx::{Error as MxError, LookupMx, MailExchanger, lookup_exchangers, resolve_exchangers};
pub use probe::{
    ProbeFailure, ProbeOptions, ProbeResult, ProbeSession, TcpConnector, verify_email,
    verify_email_with, verify_email_with_options,
};
