use serde::{Deserialize, Serialize};

use super::domain::{Loan, LoanSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResultCode {
    Ok,
    Fail,
}

/// Uniform response shape for every loan operation. On success the payload
/// is a personal id or a JSON-encoded list of loan summaries; on failure it is
/// the error message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanResponse {
    pub status: ResultCode,
    pub payload: String,
}

impl LoanResponse {
    pub fn ok(payload: impl Into<String>) -> Self {
        Self {
            status: ResultCode::Ok,
            payload: payload.into(),
        }
    }

    pub fn fail(payload: impl Into<String>) -> Self {
        Self {
            status: ResultCode::Fail,
            payload: payload.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == ResultCode::Ok
    }
}

pub(crate) fn summaries_json(loans: &[Loan]) -> Result<String, serde_json::Error> {
    let summaries: Vec<LoanSummary> = loans.iter().map(Loan::summary).collect();
    serde_json::to_string(&summaries)
}
