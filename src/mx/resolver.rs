use trust_dns_resolver::Resolver;
use trust_dns_resolver::error::{ResolveError, ResolveErrorKind};

use super::{Error, MailExchanger};

/// Source of MX records. Implemented for the system [`Resolver`]; tests and
/// embedders may supply their own.
pub trait LookupMx {
    /// Returns the exchangers for `domain` in the order the resolver delivered them.
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MailExchanger>, ResolveError>;
}

impl LookupMx for Resolver {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MailExchanger>, ResolveError> {
        let lookup = Resolver::mx_lookup(self, domain)?;
        let mut exchangers = Vec::new();
        for mx in lookup.iter() {
            let host = normalize_exchange(&mx.exchange().to_utf8());
            exchangers.push(MailExchanger::new(host, mx.preference()));
        }
        Ok(exchangers)
    }
}

/// Builds a resolver from the host's system configuration (`/etc/resolv.conf`
/// or the platform equivalent).
pub fn system_resolver() -> Result<Resolver, Error> {
    Resolver::from_system_conf().map_err(Error::resolver_init)
}

/// Resolves the exchangers of `domain` through the system resolver.
///
/// A resolver that cannot be initialised behaves like a failed lookup and
/// yields an empty list.
pub fn lookup_exchangers(domain: &str) -> Vec<MailExchanger> {
    match system_resolver() {
        Ok(resolver) => resolve_exchangers(&resolver, domain),
        Err(err) => {
            tracing::warn!(domain, error = %err, "no usable DNS resolver");
            Vec::new()
        }
    }
}

/// Resolves the exchangers of `domain`, ascending by priority.
///
/// Lookup failures and empty answers both produce an empty list; the caller
/// treats that as "no usable exchanger". Equal priorities keep the order the
/// resolver returned them in.
pub fn resolve_exchangers<R>(resolver: &R, domain: &str) -> Vec<MailExchanger>
where
    R: LookupMx + ?Sized,
{
    match try_resolve(resolver, domain) {
        Ok(exchangers) => {
            tracing::debug!(domain, count = exchangers.len(), "resolved mail exchangers");
            exchangers
        }
        Err(Error::Query { source, .. }) if is_empty_answer(&source) => {
            tracing::debug!(domain, "domain publishes no MX records");
            Vec::new()
        }
        Err(err) => {
            tracing::warn!(domain, error = %err, "MX resolution failed");
            Vec::new()
        }
    }
}

pub(crate) fn try_resolve<R>(resolver: &R, domain: &str) -> Result<Vec<MailExchanger>, Error>
where
    R: LookupMx + ?Sized,
{
    let ascii = normalize_domain(domain)?;
    let mut exchangers = resolver
        .lookup_mx(&ascii)
        .map_err(|source| Error::query(&ascii, source))?;
    // null MX (RFC 7505): the domain accepts no mail
    exchangers.retain(|mx| !normalize_exchange(&mx.host).is_empty());
    // stable: ties stay in resolver order
    exchangers.sort_by_key(|mx| mx.priority);
    Ok(exchangers)
}

pub(crate) fn normalize_domain(domain: &str) -> Result<String, Error> {
    let trimmed = domain.trim();
    if trimmed.is_empty() {
        return Err(Error::EmptyDomain);
    }
    idna::domain_to_ascii(trimmed).map_err(|source| Error::idna(trimmed, source))
}

pub(crate) fn normalize_exchange(exchange: &str) -> String {
    exchange.trim_end_matches('.').to_ascii_lowercase()
}

fn is_empty_answer(err: &ResolveError) -> bool {
    matches!(err.kind(), ResolveErrorKind::NoRecordsFound { .. })
}
