use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use chrono::{DateTime, Utc};

use super::domain::{BlacklistEntry, CountryCode, Loan, LoanApplicationAttempt};
use super::repository::{
    AttemptRepository, BlacklistRepository, LoanRepository, RepositoryError,
};

/// Process-local record store. Loans keep insertion order; attempts are
/// bucketed per country behind one lock so record-and-count is atomic.
#[derive(Default, Clone)]
pub struct InMemoryLoanStore {
    loans: Arc<Mutex<Vec<Loan>>>,
    attempts: Arc<Mutex<HashMap<CountryCode, Vec<DateTime<Utc>>>>>,
    blacklist: Arc<RwLock<HashSet<String>>>,
}

impl InMemoryLoanStore {
    pub fn with_blacklist<I, S>(personal_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let store = Self::default();
        store.extend_blacklist(personal_ids);
        store
    }

    /// Seeds the deny-list; returns how many new entries were added.
    pub fn extend_blacklist<I, S>(&self, personal_ids: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut guard = match self.blacklist.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut added = 0;
        for personal_id in personal_ids {
            if guard.insert(personal_id.into()) {
                added += 1;
            }
        }
        added
    }

    /// Snapshot of every attempt recorded for `country`, oldest first.
    pub fn attempts_for(&self, country: &CountryCode) -> Vec<LoanApplicationAttempt> {
        let Ok(guard) = self.attempts.lock() else {
            return Vec::new();
        };
        guard
            .get(country)
            .map(|stamps| {
                stamps
                    .iter()
                    .map(|applied_at| LoanApplicationAttempt {
                        country_code: country.clone(),
                        applied_at: *applied_at,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn attempts(
        &self,
    ) -> Result<MutexGuard<'_, HashMap<CountryCode, Vec<DateTime<Utc>>>>, RepositoryError> {
        self.attempts
            .lock()
            .map_err(|_| RepositoryError::Unavailable("attempt log lock poisoned".to_string()))
    }

    fn loans(&self) -> Result<MutexGuard<'_, Vec<Loan>>, RepositoryError> {
        self.loans
            .lock()
            .map_err(|_| RepositoryError::Unavailable("loan table lock poisoned".to_string()))
    }
}

fn count_from(stamps: Option<&Vec<DateTime<Utc>>>, from: DateTime<Utc>) -> u64 {
    stamps
        .map(|stamps| stamps.iter().filter(|stamp| **stamp >= from).count() as u64)
        .unwrap_or(0)
}

impl LoanRepository for InMemoryLoanStore {
    fn save_loan(&self, loan: Loan) -> Result<Loan, RepositoryError> {
        self.loans()?.push(loan.clone());
        Ok(loan)
    }

    fn find_all_loans(&self) -> Result<Vec<Loan>, RepositoryError> {
        Ok(self.loans()?.clone())
    }

    fn find_loans_by_last_name(&self, last_name: &str) -> Result<Vec<Loan>, RepositoryError> {
        Ok(self
            .loans()?
            .iter()
            .filter(|loan| loan.last_name == last_name)
            .cloned()
            .collect())
    }
}

impl AttemptRepository for InMemoryLoanStore {
    fn save_attempt(
        &self,
        country: &CountryCode,
        applied_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        self.attempts()?
            .entry(country.clone())
            .or_default()
            .push(applied_at);
        Ok(())
    }

    fn count_attempts_from(
        &self,
        country: &CountryCode,
        from: DateTime<Utc>,
    ) -> Result<u64, RepositoryError> {
        Ok(count_from(self.attempts()?.get(country), from))
    }

    fn record_and_count(
        &self,
        country: &CountryCode,
        applied_at: DateTime<Utc>,
        from: DateTime<Utc>,
    ) -> Result<u64, RepositoryError> {
        let mut guard = self.attempts()?;
        let stamps = guard.entry(country.clone()).or_default();
        stamps.push(applied_at);
        Ok(count_from(Some(&*stamps), from))
    }
}

impl BlacklistRepository for InMemoryLoanStore {
    fn find_blacklist_entry(
        &self,
        personal_id: &str,
    ) -> Result<Option<BlacklistEntry>, RepositoryError> {
        let guard = self
            .blacklist
            .read()
            .map_err(|_| RepositoryError::Unavailable("blacklist lock poisoned".to_string()))?;
        Ok(guard.get(personal_id).map(|id| BlacklistEntry {
            personal_id: id.clone(),
        }))
    }
}
