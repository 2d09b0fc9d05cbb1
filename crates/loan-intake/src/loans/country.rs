use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use super::domain::{CountryCode, OriginAddress};
use super::service::AdmissionError;

/// External address-to-country collaborator.
#[async_trait]
pub trait CountryLookup: Send + Sync {
    async fn lookup_country(&self, address: &str) -> Result<String, LookupError>;
}

/// Failure of the external lookup. Never surfaced past the resolver.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("lookup transport failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("lookup returned status {0}")]
    Status(u16),
    #[error("lookup response malformed: {0}")]
    Malformed(String),
    #[error("lookup rejected address: {0}")]
    Rejected(String),
    #[error("lookup timed out after {0:?}")]
    TimedOut(Duration),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountrySource {
    Lookup,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCountry {
    pub code: CountryCode,
    pub source: CountrySource,
}

/// Best-effort country resolution: only a missing address is an error, every
/// lookup problem degrades to the configured default.
pub struct CountryResolver<L> {
    lookup: Arc<L>,
    default_country: CountryCode,
    timeout: Duration,
}

impl<L> CountryResolver<L>
where
    L: CountryLookup + 'static,
{
    pub fn new(lookup: Arc<L>, default_country: CountryCode, timeout: Duration) -> Self {
        Self {
            lookup,
            default_country,
            timeout,
        }
    }

    pub async fn resolve(&self, origin: &OriginAddress) -> Result<ResolvedCountry, AdmissionError> {
        let address = origin.as_str().ok_or(AdmissionError::AddressUnavailable)?;

        match self.lookup_with_deadline(address).await {
            Ok(code) => Ok(ResolvedCountry {
                code,
                source: CountrySource::Lookup,
            }),
            Err(err) => {
                warn!(
                    %address,
                    error = %err,
                    fallback = %self.default_country,
                    "country lookup failed"
                );
                Ok(ResolvedCountry {
                    code: self.default_country.clone(),
                    source: CountrySource::Fallback,
                })
            }
        }
    }

    async fn lookup_with_deadline(&self, address: &str) -> Result<CountryCode, LookupError> {
        let raw = tokio::time::timeout(self.timeout, self.lookup.lookup_country(address))
            .await
            .map_err(|_| LookupError::TimedOut(self.timeout))??;

        CountryCode::parse(&raw)
            .ok_or_else(|| LookupError::Malformed("blank country code".to_string()))
    }
}
