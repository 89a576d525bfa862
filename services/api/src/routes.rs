use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use rental_booking::booking::{
    booking_router, BookingNotifier, BookingRepository, BookingService, UnitDirectory,
};
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;

pub(crate) fn with_booking_routes<R, U, N>(service: Arc<BookingService<R, U, N>>) -> axum::Router
where
    R: BookingRepository + 'static,
    U: UnitDirectory + 'static,
    N: BookingNotifier + 'static,
{
    booking_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    if state.readiness.load(Ordering::Relaxed) {
        (StatusCode::OK, Json(json!({ "status": "ready" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "initializing" })),
        )
    }
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
    use crate::infra::{InMemoryBookingRepository, InMemoryUnitDirectory, LogMailer};
    use axum::body::Body;
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use rental_booking::booking::{notification_queue, FixedClock};
    use rental_booking::config::NotificationConfig;
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    fn app_state(ready: bool) -> AppState {
        AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        }
    }

    fn app(ready: bool) -> axum::Router {
        let (notifier, _worker) =
            notification_queue(Arc::new(LogMailer), NotificationConfig::default());
        let today = chrono::NaiveDate::from_ymd_opt(2024, 12, 1).expect("valid date");
        let service = Arc::new(BookingService::new(
            Arc::new(InMemoryBookingRepository::default()),
            Arc::new(InMemoryUnitDirectory::sample()),
            Arc::new(notifier),
            Arc::new(FixedClock::on(today)),
        ));
        with_booking_routes(service).layer(Extension(app_state(ready)))
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json payload")
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn readiness_tracks_startup_flag() {
        let starting = app(false)
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request"))
            .await
            .expect("route executes");
        assert_eq!(starting.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json_body(starting).await["status"], "initializing");

        let ready = app(true)
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request"))
            .await
            .expect("route executes");
        assert_eq!(ready.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn metrics_endpoint_serves_prometheus_text() {
        let response = app(true)
            .oneshot(Request::get("/metrics").body(Body::empty()).expect("request"))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; version=0.0.4"
        );
    }

    #[tokio::test]
    async fn sample_units_are_bookable_through_the_api() {
        let request = Request::post("/api/v1/units/downtown-loft/bookings")
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-user-id", "mike_tenant")
            .body(Body::from(
                json!({ "start_date": "2025-01-01", "end_date": "2026-01-01" }).to_string(),
            ))
            .expect("request");

        let response = app(true).oneshot(request).await.expect("route executes");

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert_eq!(body["total_amount"], "32500.00");
        assert_eq!(body["deposit_amount"], "6500.00");
    }
}
