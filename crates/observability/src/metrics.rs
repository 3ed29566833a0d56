//! Prometheus-kompatible Metriken fuer Glimmer
//!
//! Registrierte Metriken:
//! - `glimmer_overlays_aktiv` – Gauge: Bestehende Overlay-Records
//! - `glimmer_abos_aktiv` – Gauge: Aktivierte Abos
//! - `glimmer_overlays_erstellt_total` – Counter: Erstellte Overlays
//! - `glimmer_overlays_entfernt_total` – Counter: Zerstoerte Overlays
//! - `glimmer_aufgaben_verworfen_total` – Counter: Still verworfene Tick-Aufgaben
//! - `glimmer_handler_fehler_total` – Counter: Verschluckte Handler-Fehler
//! - `glimmer_tick_aufgaben` – Histogram: Ausgefuehrte Aufgaben pro Tick
//!
//! Die Engine zaehlt selbst nur atomar mit ([`StatistikSnapshot`]). Der
//! Server uebernimmt den Snapshot periodisch in die Registry.

use anyhow::Result;
use axum::{extract::State, response::IntoResponse, routing::get, Router};
use glimmer_engine::statistik::StatistikSnapshot;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntGauge, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

/// Alle Glimmer-Prometheus-Metriken
#[derive(Clone)]
pub struct GlimmerMetrics {
    pub registry: Arc<Registry>,

    pub overlays_aktiv: IntGauge,
    pub abos_aktiv: IntGauge,

    pub overlays_erstellt: IntCounter,
    pub overlays_entfernt: IntCounter,
    pub aufgaben_verworfen: IntCounter,
    pub handler_fehler: IntCounter,

    pub tick_aufgaben: Histogram,
}

impl GlimmerMetrics {
    /// Erstellt und registriert alle Metriken in einer neuen Registry
    pub fn neu() -> Result<Self> {
        let registry = Registry::new();

        // --- Bestand ---
        let overlays_aktiv = IntGauge::with_opts(Opts::new(
            "glimmer_overlays_aktiv",
            "Anzahl bestehender Overlays",
        ))?;
        registry.register(Box::new(overlays_aktiv.clone()))?;

        let abos_aktiv = IntGauge::with_opts(Opts::new(
            "glimmer_abos_aktiv",
            "Anzahl aktivierter Abos",
        ))?;
        registry.register(Box::new(abos_aktiv.clone()))?;

        // --- Zaehler ---
        let overlays_erstellt = IntCounter::with_opts(Opts::new(
            "glimmer_overlays_erstellt_total",
            "Gesamtanzahl erstellter Overlays",
        ))?;
        registry.register(Box::new(overlays_erstellt.clone()))?;

        let overlays_entfernt = IntCounter::with_opts(Opts::new(
            "glimmer_overlays_entfernt_total",
            "Gesamtanzahl zerstoerter Overlays",
        ))?;
        registry.register(Box::new(overlays_entfernt.clone()))?;

        let aufgaben_verworfen = IntCounter::with_opts(Opts::new(
            "glimmer_aufgaben_verworfen_total",
            "Verzoegerte Aufgaben, deren Ziel beim Ausfuehren verschwunden war",
        ))?;
        registry.register(Box::new(aufgaben_verworfen.clone()))?;

        let handler_fehler = IntCounter::with_opts(Opts::new(
            "glimmer_handler_fehler_total",
            "Unerwartete Fehler an den Fehlerbarrieren",
        ))?;
        registry.register(Box::new(handler_fehler.clone()))?;

        // --- Tick ---
        let tick_aufgaben = Histogram::with_opts(
            HistogramOpts::new("glimmer_tick_aufgaben", "Ausgefuehrte Aufgaben pro Tick")
                .buckets(vec![0.0, 1.0, 2.0, 5.0, 10.0, 25.0, 50.0, 100.0]),
        )?;
        registry.register(Box::new(tick_aufgaben.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            overlays_aktiv,
            abos_aktiv,
            overlays_erstellt,
            overlays_entfernt,
            aufgaben_verworfen,
            handler_fehler,
            tick_aufgaben,
        })
    }

    /// Uebernimmt einen Engine-Snapshot
    ///
    /// Zaehler werden nur um die Differenz erhoeht und bleiben monoton.
    pub fn uebernehmen(&self, snapshot: &StatistikSnapshot) {
        self.overlays_aktiv.set(snapshot.overlays_aktiv as i64);
        self.abos_aktiv.set(snapshot.abos_aktiv as i64);

        nachziehen(&self.overlays_erstellt, snapshot.overlays_erstellt);
        nachziehen(&self.overlays_entfernt, snapshot.overlays_entfernt);
        nachziehen(&self.aufgaben_verworfen, snapshot.aufgaben_verworfen);
        nachziehen(&self.handler_fehler, snapshot.handler_fehler);
    }

    /// Exportiert alle Metriken im Prometheus-Textformat
    pub fn exportieren(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

fn nachziehen(zaehler: &IntCounter, wert: u64) {
    let differenz = wert.saturating_sub(zaehler.get());
    if differenz > 0 {
        zaehler.inc_by(differenz);
    }
}

/// Axum-Router fuer den `/metrics`-Endpunkt
pub fn metrics_router(metriken: GlimmerMetrics) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metriken)
}

async fn metrics_handler(State(metriken): State<GlimmerMetrics>) -> impl IntoResponse {
    match metriken.exportieren() {
        Ok(text) => (
            axum::http::StatusCode::OK,
            [(
                axum::http::header::CONTENT_TYPE,
                "text/plain; version=0.0.4",
            )],
            text,
        )
            .into_response(),
        Err(err) => {
            tracing::error!("Metriken-Export fehlgeschlagen: {err}");
            axum::http::StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
