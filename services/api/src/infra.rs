use loan_intake::error::AppError;
use loan_intake::loans::{load_blacklist_file, InMemoryLoanStore};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Builds the record store, seeding the blacklist when a CSV path is given.
pub(crate) fn seeded_store(blacklist: Option<&Path>) -> Result<InMemoryLoanStore, AppError> {
    let store = InMemoryLoanStore::default();

    if let Some(path) = blacklist {
        let personal_ids = load_blacklist_file(path)?;
        let added = store.extend_blacklist(personal_ids);
        info!(path = %path.display(), entries = added, "blacklist seeded");
    }

    Ok(store)
}
