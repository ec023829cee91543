//! DNS MX resolution.
//!
//! [`resolve_exchangers`] queries a [`LookupMx`] implementation and returns the
//! exchangers ordered by priority. Failures are not errors at this level: a
//! domain whose lookup fails simply has no exchanger.

mod error;
mod resolver;
mod types;

pub use error::MxError as Error;
pub use resolver::{LookupMx, lookup_exchangers, resolve_exchangers, system_resolver};
pub use types::MailExchanger;
