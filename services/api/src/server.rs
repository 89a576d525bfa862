use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryBookingRepository, InMemoryUnitDirectory, LogMailer};
use crate::routes::with_booking_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use rental_booking::booking::{notification_queue, BookingService, SystemClock};
use rental_booking::config::AppConfig;
use rental_booking::error::AppError;
use rental_booking::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let (notifier, worker) =
        notification_queue(Arc::new(LogMailer), config.notifications.clone());
    let booking_service = Arc::new(BookingService::new(
        Arc::new(InMemoryBookingRepository::default()),
        Arc::new(InMemoryUnitDirectory::sample()),
        Arc::new(notifier),
        Arc::new(SystemClock),
    ));

    let app = with_booking_routes(booking_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "rental booking service ready");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router owned the last notifier handle; the worker exits once the queue is empty.
    let delivered = worker.shutdown().await?;
    info!(delivered, "notification queue drained");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "unable to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
