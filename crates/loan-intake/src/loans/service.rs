use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use super::blacklist::BlacklistGate;
use super::country::{CountryLookup, CountryResolver};
use super::domain::{CountryCode, Loan, LoanRequest, OriginAddress};
use super::envelope::{summaries_json, LoanResponse};
use super::rate_window::RateWindowLimiter;
use super::repository::{
    AttemptRepository, BlacklistRepository, LoanRepository, RepositoryError,
};
use crate::config::AdmissionConfig;

/// Reasons an application is rejected or a query fails.
#[derive(Debug, thiserror::Error)]
pub enum AdmissionError {
    #[error("Unknown IP address")]
    AddressUnavailable,
    #[error("Loan application limit is exceeded for the country ({country})")]
    RateExceeded { country: CountryCode },
    #[error("Person ({personal_id}) is in blacklist!")]
    Blacklisted { personal_id: String },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("failed to encode loans: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Runs country resolution, the rate window and the blacklist gate in order,
/// persisting the loan only when all three pass.
///
/// Stages are not transactional: the attempt recorded by the rate window
/// survives a later blacklist rejection or a failed loan write.
pub struct AdmissionController<S, L> {
    store: Arc<S>,
    resolver: CountryResolver<L>,
    limiter: RateWindowLimiter<S>,
    gate: BlacklistGate<S>,
}

impl<S, L> AdmissionController<S, L>
where
    S: LoanRepository + AttemptRepository + BlacklistRepository + 'static,
    L: CountryLookup + 'static,
{
    pub fn new(
        store: Arc<S>,
        lookup: Arc<L>,
        config: &AdmissionConfig,
        lookup_timeout: Duration,
    ) -> Self {
        let resolver = CountryResolver::new(lookup, config.default_country.clone(), lookup_timeout);
        let limiter = RateWindowLimiter::from_config(store.clone(), config);
        let gate = BlacklistGate::new(store.clone());

        Self {
            store,
            resolver,
            limiter,
            gate,
        }
    }

    pub async fn apply_for_loan(
        &self,
        request: LoanRequest,
        origin: &OriginAddress,
    ) -> Result<String, AdmissionError> {
        self.apply_for_loan_at(request, origin, Utc::now()).await
    }

    /// Returns the admitted loan's personal id.
    pub async fn apply_for_loan_at(
        &self,
        request: LoanRequest,
        origin: &OriginAddress,
        now: DateTime<Utc>,
    ) -> Result<String, AdmissionError> {
        let country = self.resolver.resolve(origin).await?.code;
        self.limiter.admit(&country, now)?;
        self.gate.check(&request.personal_id)?;

        let loan = self.store.save_loan(Loan::admit(request, country))?;
        info!(personal_id = %loan.personal_id, country = %loan.country_code, "loan admitted");
        Ok(loan.personal_id)
    }

    pub fn list_all(&self) -> Result<Vec<Loan>, AdmissionError> {
        Ok(self.store.find_all_loans()?)
    }

    pub fn list_by_last_name(&self, last_name: &str) -> Result<Vec<Loan>, AdmissionError> {
        Ok(self.store.find_loans_by_last_name(last_name)?)
    }

    pub async fn respond_to_application(
        &self,
        request: LoanRequest,
        origin: &OriginAddress,
    ) -> LoanResponse {
        envelope(self.apply_for_loan(request, origin).await)
    }

    pub fn respond_with_all(&self) -> LoanResponse {
        envelope(
            self.list_all()
                .and_then(|loans| summaries_json(&loans).map_err(AdmissionError::from)),
        )
    }

    pub fn respond_with_last_name(&self, last_name: &str) -> LoanResponse {
        envelope(
            self.list_by_last_name(last_name)
                .and_then(|loans| summaries_json(&loans).map_err(AdmissionError::from)),
        )
    }
}

fn envelope(result: Result<String, AdmissionError>) -> LoanResponse {
    match result {
        Ok(payload) => LoanResponse::ok(payload),
        Err(err) => {
            match &err {
                AdmissionError::Repository(_) | AdmissionError::Encoding(_) => {
                    error!(error = %err, "loan operation failed")
                }
                _ => warn!(reason = %err, "loan application rejected"),
            }
            LoanResponse::fail(err.to_string())
        }
    }
}
