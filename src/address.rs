use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("invalid address '{address}': missing domain part")]
    InvalidAddress { address: String },
}

impl AddressError {
    pub(crate) fn invalid(address: &str) -> Self {
        Self::InvalidAddress {
            address: address.to_string(),
        }
    }
}

/// Returns the part of `address` after the first `@`.
///
/// No further validation is performed: whatever follows the separator is
/// handed to DNS as-is.
pub fn extract_domain(address: &str) -> Result<&str, AddressError> {
    match address.split_once('@') {
        Some((_, domain)) if !domain.is_empty() => Ok(domain),
        _ => Err(AddressError::invalid(address)),
    }
}
