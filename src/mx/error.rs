use thiserror::Error;
use trust_dns_resolver::error::ResolveError;

/// Reasons an exchanger lookup produced nothing usable.
///
/// None of these reach callers of [`resolve_exchangers`](super::resolve_exchangers):
/// they are logged and collapsed into an empty list.
#[derive(Debug, Error)]
pub enum MxError {
    #[error("domain is empty")]
    EmptyDomain,
    #[error("domain '{domain}' cannot be converted to ASCII")]
    Idna {
        domain: String,
        #[source]
        source: idna::Errors,
    },
    #[error("system resolver unavailable: {source}")]
    ResolverInit {
        #[source]
        source: std::io::Error,
    },
    #[error("MX query for '{domain}' failed: {source}")]
    Query {
        domain: String,
        #[source]
        source: ResolveError,
    },
}

impl MxError {
    pub(crate) fn idna(domain: &str, source: idna::Errors) -> Self {
        Self::Idna {
            domain: domain.to_string(),
            source,
        }
    }

    pub(crate) fn resolver_init(source: std::io::Error) -> Self {
        Self::ResolverInit { source }
    }

    pub(crate) fn query(domain: &str, source: ResolveError) -> Self {
        Self::Query {
            domain: domain.to_string(),
            source,
        }
    }
}
