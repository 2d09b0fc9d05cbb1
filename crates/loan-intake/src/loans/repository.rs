use chrono::{DateTime, Utc};

use super::domain::{BlacklistEntry, CountryCode, Loan};

/// Persistence for admitted loans.
pub trait LoanRepository: Send + Sync {
    fn save_loan(&self, loan: Loan) -> Result<Loan, RepositoryError>;
    fn find_all_loans(&self) -> Result<Vec<Loan>, RepositoryError>;
    fn find_loans_by_last_name(&self, last_name: &str) -> Result<Vec<Loan>, RepositoryError>;
}

/// Append-only log of admission attempts, keyed by country.
pub trait AttemptRepository: Send + Sync {
    fn save_attempt(
        &self,
        country: &CountryCode,
        applied_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;

    /// Number of attempts for `country` at or after `from`.
    fn count_attempts_from(
        &self,
        country: &CountryCode,
        from: DateTime<Utc>,
    ) -> Result<u64, RepositoryError>;

    /// Append an attempt and count the window as a single unit. Stores with a
    /// transaction or lock primitive must override this so concurrent callers
    /// for one country always see their own record and no write is lost.
    fn record_and_count(
        &self,
        country: &CountryCode,
        applied_at: DateTime<Utc>,
        from: DateTime<Utc>,
    ) -> Result<u64, RepositoryError> {
        self.save_attempt(country, applied_at)?;
        self.count_attempts_from(country, from)
    }
}

/// Read-only view of the externally managed deny-list.
pub trait BlacklistRepository: Send + Sync {
    fn find_blacklist_entry(
        &self,
        personal_id: &str,
    ) -> Result<Option<BlacklistEntry>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
