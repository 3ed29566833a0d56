//! # glimmer-observability
//!
//! Observability-Crate fuer Glimmer:
//! - Prometheus-kompatible Metriken (`/metrics`)
//! - Health-Check-Endpunkt (`/health`)
//! - Structured Logging via tracing-subscriber

pub mod health;
pub mod logging;
pub mod metrics;

pub use health::{health_router, HealthResponse, HealthState, HealthStatus};
pub use logging::logging_initialisieren;
pub use metrics::{metrics_router, GlimmerMetrics};

use anyhow::Result;
use std::future::Future;
use std::net::SocketAddr;

/// Router mit beiden Endpunkten
pub fn observability_router(metriken: GlimmerMetrics, health: HealthState) -> axum::Router {
    axum::Router::new()
        .merge(metrics_router(metriken))
        .merge(health_router(health))
}

/// Startet den Observability-HTTP-Server (Metriken + Health)
///
/// Endpunkte:
/// - `GET /metrics` – Prometheus scrape format
/// - `GET /health`  – Health-Check JSON
///
/// Laeuft bis `shutdown` fertig ist.
pub async fn observability_server_starten(
    bind_addr: SocketAddr,
    metriken: GlimmerMetrics,
    health: HealthState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let app = observability_router(metriken, health);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!(addr = %bind_addr, "Observability-Server gestartet");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    async fn abrufen(app: axum::Router, pfad: &str) -> (StatusCode, String) {
        let antwort = app
            .oneshot(Request::builder().uri(pfad).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = antwort.status();
        let bytes = axum::body::to_bytes(antwort.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn endpunkte_antworten() {
        let metriken = GlimmerMetrics::neu().unwrap();
        metriken.overlays_aktiv.set(2);
        let health = HealthState::neu();
        let app = observability_router(metriken, health);

        let (status, metrics) = abrufen(app.clone(), "/metrics").await;
        assert_eq!(status, StatusCode::OK);
        assert!(metrics.contains("glimmer_overlays_aktiv 2"));

        let (status, body) = abrufen(app.clone(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        let health: HealthResponse = serde_json::from_str(&body).unwrap();
        assert_eq!(health.status, HealthStatus::Healthy);
        assert!(health.host_aktiv);

        let (status, _) = abrufen(app, "/unbekannt").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
