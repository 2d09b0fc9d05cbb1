use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Normalised ISO country code; trimmed and lowercased so lookups and the
/// fallback share one rate window.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountryCode(String);

impl CountryCode {
    /// Returns `None` for blank input.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_ascii_lowercase()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Address a request originated from, as reported by the transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OriginAddress(Option<String>);

impl OriginAddress {
    /// Prefers the forwarding header over the direct connection address.
    /// Only the first hop of an `X-Forwarded-For` chain is kept.
    pub fn from_parts(forwarded_for: Option<&str>, remote: Option<&str>) -> Self {
        let forwarded = forwarded_for
            .and_then(|chain| chain.split(',').next())
            .map(str::trim)
            .filter(|value| !value.is_empty());
        let remote = remote.map(str::trim).filter(|value| !value.is_empty());

        Self(forwarded.or(remote).map(str::to_string))
    }

    pub fn direct(address: impl Into<String>) -> Self {
        let address = address.into();
        Self::from_parts(None, Some(address.as_str()))
    }

    pub fn unknown() -> Self {
        Self(None)
    }

    pub fn as_str(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

/// Inbound application payload; never stored as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanRequest {
    pub amount: f64,
    pub term: u32,
    pub first_name: String,
    pub last_name: String,
    pub personal_id: String,
}

/// Admitted loan as persisted by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    pub amount: f64,
    pub term: u32,
    pub first_name: String,
    pub last_name: String,
    pub personal_id: String,
    pub country_code: CountryCode,
}

impl Loan {
    pub fn admit(request: LoanRequest, country_code: CountryCode) -> Self {
        let LoanRequest {
            amount,
            term,
            first_name,
            last_name,
            personal_id,
        } = request;

        Self {
            amount,
            term,
            first_name,
            last_name,
            personal_id,
            country_code,
        }
    }

    pub fn summary(&self) -> LoanSummary {
        LoanSummary {
            amount: self.amount,
            term: self.term,
            personal_id: self.personal_id.clone(),
            country_code: self.country_code.clone(),
        }
    }
}

/// Externally exposed projection of a loan; names are withheld.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanSummary {
    pub amount: f64,
    pub term: u32,
    pub personal_id: String,
    pub country_code: CountryCode,
}

/// Timestamped marker counted by the rate window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanApplicationAttempt {
    pub country_code: CountryCode,
    pub applied_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlacklistEntry {
    pub personal_id: String,
}
