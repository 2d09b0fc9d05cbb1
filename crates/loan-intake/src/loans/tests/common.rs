use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::config::AdmissionConfig;
use crate::loans::country::{CountryLookup, LookupError};
use crate::loans::domain::{BlacklistEntry, CountryCode, Loan, LoanRequest};
use crate::loans::memory::InMemoryLoanStore;
use crate::loans::repository::{
    AttemptRepository, BlacklistRepository, LoanRepository, RepositoryError,
};
use crate::loans::service::AdmissionController;

pub(super) const LOOKUP_TIMEOUT: Duration = Duration::from_millis(50);

pub(super) fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0)
        .single()
        .expect("valid instant")
}

pub(super) fn ms(millis: i64) -> chrono::Duration {
    chrono::Duration::milliseconds(millis)
}

pub(super) fn country(code: &str) -> CountryCode {
    CountryCode::parse(code).expect("valid country code")
}

pub(super) fn admission_config(window_ms: u64, count_limit: u64) -> AdmissionConfig {
    AdmissionConfig {
        window_ms,
        count_limit,
        default_country: country("lv"),
        blacklist_path: None,
    }
}

pub(super) fn request(personal_id: &str, last_name: &str) -> LoanRequest {
    LoanRequest {
        amount: 1500.0,
        term: 24,
        first_name: "Janis".to_string(),
        last_name: last_name.to_string(),
        personal_id: personal_id.to_string(),
    }
}

#[derive(Debug, Clone, Copy)]
pub(super) enum Scripted {
    Code(&'static str),
    Fail,
    Hang,
}

/// Lookup stub replaying a script; the last step repeats once exhausted.
pub(super) struct ScriptedLookup {
    script: Vec<Scripted>,
    calls: AtomicUsize,
    seen: Mutex<Vec<String>>,
}

impl ScriptedLookup {
    pub(super) fn always(step: Scripted) -> Self {
        Self::sequence(vec![step])
    }

    pub(super) fn sequence(script: Vec<Scripted>) -> Self {
        assert!(!script.is_empty(), "script needs at least one step");
        Self {
            script,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn seen(&self) -> Vec<String> {
        self.seen.lock().expect("seen mutex poisoned").clone()
    }
}

#[async_trait]
impl CountryLookup for ScriptedLookup {
    async fn lookup_country(&self, address: &str) -> Result<String, LookupError> {
        self.seen
            .lock()
            .expect("seen mutex poisoned")
            .push(address.to_string());
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let step = self.script[call.min(self.script.len() - 1)];

        match step {
            Scripted::Code(code) => Ok(code.to_string()),
            Scripted::Fail => Err(LookupError::Status(503)),
            Scripted::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok("zz".to_string())
            }
        }
    }
}

pub(super) type MemoryController = AdmissionController<InMemoryLoanStore, ScriptedLookup>;

pub(super) fn build_controller(
    store: &InMemoryLoanStore,
    lookup: Scripted,
    config: &AdmissionConfig,
) -> MemoryController {
    AdmissionController::new(
        Arc::new(store.clone()),
        Arc::new(ScriptedLookup::always(lookup)),
        config,
        LOOKUP_TIMEOUT,
    )
}

pub(super) struct UnavailableStore;

impl LoanRepository for UnavailableStore {
    fn save_loan(&self, _loan: Loan) -> Result<Loan, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn find_all_loans(&self) -> Result<Vec<Loan>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn find_loans_by_last_name(&self, _last_name: &str) -> Result<Vec<Loan>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

impl AttemptRepository for UnavailableStore {
    fn save_attempt(
        &self,
        _country: &CountryCode,
        _applied_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn count_attempts_from(
        &self,
        _country: &CountryCode,
        _from: DateTime<Utc>,
    ) -> Result<u64, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

impl BlacklistRepository for UnavailableStore {
    fn find_blacklist_entry(
        &self,
        _personal_id: &str,
    ) -> Result<Option<BlacklistEntry>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Accepts attempts and blacklist lookups but refuses to persist loans.
#[derive(Default)]
pub(super) struct ReadOnlyLoanStore {
    pub(super) inner: InMemoryLoanStore,
}

impl LoanRepository for ReadOnlyLoanStore {
    fn save_loan(&self, _loan: Loan) -> Result<Loan, RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn find_all_loans(&self) -> Result<Vec<Loan>, RepositoryError> {
        self.inner.find_all_loans()
    }

    fn find_loans_by_last_name(&self, last_name: &str) -> Result<Vec<Loan>, RepositoryError> {
        self.inner.find_loans_by_last_name(last_name)
    }
}

/// Uses the trait's default two-step record-and-count.
impl AttemptRepository for ReadOnlyLoanStore {
    fn save_attempt(
        &self,
        country: &CountryCode,
        applied_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        self.inner.save_attempt(country, applied_at)
    }

    fn count_attempts_from(
        &self,
        country: &CountryCode,
        from: DateTime<Utc>,
    ) -> Result<u64, RepositoryError> {
        self.inner.count_attempts_from(country, from)
    }
}

impl BlacklistRepository for ReadOnlyLoanStore {
    fn find_blacklist_entry(
        &self,
        personal_id: &str,
    ) -> Result<Option<BlacklistEntry>, RepositoryError> {
        self.inner.find_blacklist_entry(personal_id)
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
