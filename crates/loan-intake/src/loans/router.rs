use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Query, State},
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use super::country::CountryLookup;
use super::domain::{LoanRequest, OriginAddress};
use super::envelope::LoanResponse;
use super::repository::{AttemptRepository, BlacklistRepository, LoanRepository};
use super::service::AdmissionController;

pub const FORWARDED_FOR: &str = "x-forwarded-for";

/// Router exposing loan intake and the two listing queries.
pub fn loan_router<S, L>(controller: Arc<AdmissionController<S, L>>) -> Router
where
    S: LoanRepository + AttemptRepository + BlacklistRepository + 'static,
    L: CountryLookup + 'static,
{
    Router::new()
        .route("/loan/apply", post(apply_handler::<S, L>))
        .route("/loan/all", get(all_handler::<S, L>))
        .route("/loan/by-user", get(by_user_handler::<S, L>))
        .with_state(controller)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ByUserQuery {
    pub(crate) name: String,
}

pub(crate) fn origin_from(headers: &HeaderMap, remote: Option<SocketAddr>) -> OriginAddress {
    let forwarded = headers
        .get(FORWARDED_FOR)
        .and_then(|value| value.to_str().ok());
    let remote = remote.map(|addr| addr.ip().to_string());
    OriginAddress::from_parts(forwarded, remote.as_deref())
}

pub(crate) async fn apply_handler<S, L>(
    State(controller): State<Arc<AdmissionController<S, L>>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Json(request): Json<LoanRequest>,
) -> Json<LoanResponse>
where
    S: LoanRepository + AttemptRepository + BlacklistRepository + 'static,
    L: CountryLookup + 'static,
{
    let origin = origin_from(&headers, connect_info.map(|ConnectInfo(addr)| addr));
    Json(controller.respond_to_application(request, &origin).await)
}

pub(crate) async fn all_handler<S, L>(
    State(controller): State<Arc<AdmissionController<S, L>>>,
) -> Json<LoanResponse>
where
    S: LoanRepository + AttemptRepository + BlacklistRepository + 'static,
    L: CountryLookup + 'static,
{
    Json(controller.respond_with_all())
}

pub(crate) async fn by_user_handler<S, L>(
    State(controller): State<Arc<AdmissionController<S, L>>>,
    Query(query): Query<ByUserQuery>,
) -> Json<LoanResponse>
where
    S: LoanRepository + AttemptRepository + BlacklistRepository + 'static,
    L: CountryLookup + 'static,
{
    Json(controller.respond_with_last_name(&query.name))
}
