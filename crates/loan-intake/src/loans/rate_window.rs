use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use super::domain::CountryCode;
use super::repository::AttemptRepository;
use super::service::AdmissionError;
use crate::config::AdmissionConfig;

/// Sliding-window ceiling on admission attempts per country.
///
/// Every call appends an attempt before counting, so rejected attempts still
/// consume budget. The window is `[now - window, now]`, recomputed per call.
pub struct RateWindowLimiter<A> {
    attempts: Arc<A>,
    window: Duration,
    count_limit: u64,
}

impl<A> RateWindowLimiter<A>
where
    A: AttemptRepository + 'static,
{
    pub fn new(attempts: Arc<A>, window: Duration, count_limit: u64) -> Self {
        Self {
            attempts,
            window,
            count_limit,
        }
    }

    pub fn from_config(attempts: Arc<A>, config: &AdmissionConfig) -> Self {
        Self::new(attempts, config.window(), config.count_limit)
    }

    /// Records the attempt at `now` and returns the in-window count, which
    /// includes the attempt just recorded.
    pub fn admit(&self, country: &CountryCode, now: DateTime<Utc>) -> Result<u64, AdmissionError> {
        let window_start = now
            .checked_sub_signed(self.window)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let attempts = self
            .attempts
            .record_and_count(country, now, window_start)?;

        if attempts > self.count_limit {
            warn!(%country, attempts, limit = self.count_limit, "country rate window exceeded");
            return Err(AdmissionError::RateExceeded {
                country: country.clone(),
            });
        }

        debug!(%country, attempts, limit = self.count_limit, "rate window check passed");
        Ok(attempts)
    }
}
