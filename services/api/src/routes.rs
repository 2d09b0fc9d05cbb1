use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use loan_intake::loans::{
    loan_router, AdmissionController, AttemptRepository, BlacklistRepository, CountryLookup,
    LoanRepository,
};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_service_routes<S, L>(controller: Arc<AdmissionController<S, L>>) -> axum::Router
where
    S: LoanRepository + AttemptRepository + BlacklistRepository + 'static,
    L: CountryLookup + 'static,
{
    loan_router(controller)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::DemoLookup;
    use axum::body::Body;
    use axum::http::Request;
    use loan_intake::loans::{CountryCode, InMemoryLoanStore};
    use loan_intake::config::AdmissionConfig;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;
    use tower::ServiceExt;

    fn state(ready: bool) -> AppState {
        AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        }
    }

    fn controller() -> Arc<AdmissionController<InMemoryLoanStore, DemoLookup>> {
        let config = AdmissionConfig {
            window_ms: 60_000,
            count_limit: 5,
            default_country: CountryCode::parse("lv").expect("valid code"),
            blacklist_path: None,
        };
        Arc::new(AdmissionController::new(
            Arc::new(InMemoryLoanStore::default()),
            Arc::new(DemoLookup),
            &config,
            Duration::from_millis(100),
        ))
    }

    async fn status_of(response: axum::response::Response) -> (StatusCode, serde_json::Value) {
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), 4096)
            .await
            .expect("read body");
        (status, serde_json::from_slice(&body).expect("json body"))
    }

    #[tokio::test]
    async fn readiness_reflects_flag() {
        let app_state = state(false);
        let response = readiness_endpoint(Extension(app_state.clone()))
            .await
            .into_response();
        let (status, body) = status_of(response).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "initializing");

        app_state.readiness.store(true, Ordering::Release);
        let response = readiness_endpoint(Extension(app_state)).await.into_response();
        let (status, body) = status_of(response).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ready");
    }

    #[tokio::test]
    async fn service_routes_mount_health_next_to_loans() {
        let router = with_service_routes(controller()).layer(Extension(state(true)));

        let response = router
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
            .await
            .expect("route executes");
        let (status, body) = status_of(response).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");

        let response = router
            .oneshot(Request::get("/loan/all").body(Body::empty()).expect("request"))
            .await
            .expect("route executes");
        let (status, body) = status_of(response).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "OK");
        assert_eq!(body["payload"], "[]");
    }
}
