//! Loan intake: country resolution, per-country rate window, blacklist gate,
//! and the admission controller that sequences them.

pub mod blacklist;
pub mod country;
pub mod domain;
pub mod envelope;
pub mod geoip;
pub mod memory;
pub mod rate_window;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use blacklist::{load_blacklist_csv, load_blacklist_file, BlacklistGate, BlacklistImportError};
pub use country::{CountryLookup, CountryResolver, CountrySource, LookupError, ResolvedCountry};
pub use domain::{
    BlacklistEntry, CountryCode, Loan, LoanApplicationAttempt, LoanRequest, LoanSummary,
    OriginAddress,
};
pub use envelope::{LoanResponse, ResultCode};
pub use geoip::GeoIpClient;
pub use memory::InMemoryLoanStore;
pub use rate_window::RateWindowLimiter;
pub use repository::{AttemptRepository, BlacklistRepository, LoanRepository, RepositoryError};
pub use router::loan_router;
pub use service::{AdmissionController, AdmissionError};
