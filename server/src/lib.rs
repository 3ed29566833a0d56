//! glimmer-server – Bibliotheks-Root
//!
//! Betreibt die Overlay-Engine gegen den simulierten Host. Die
//! Host-Schleife ist der einzige Ort, an dem Ticks laufen und Ereignisse
//! zugestellt werden.

pub mod bus;
pub mod config;
pub mod eingabe;

use anyhow::Result;
use glimmer_engine::{OverlayEngine, SimHost, TickQueue};
use glimmer_observability::{observability_server_starten, GlimmerMetrics, HealthState};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;

use bus::KanalBus;
use config::ServerConfig;
use eingabe::{Ausgabe, GlimmerEngine, Sitzung};

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
    config_pfad: String,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    ///
    /// `config_pfad` wird beim Befehl `reload` erneut gelesen.
    pub fn neu(config: ServerConfig, config_pfad: impl Into<String>) -> Self {
        Self {
            config,
            config_pfad: config_pfad.into(),
        }
    }

    /// Startet alle Subsysteme und laeuft bis zum Shutdown-Signal
    ///
    /// Reihenfolge:
    /// 1. Simulierten Host und Engine aufbauen, Abos wiederherstellen
    /// 2. Observability-Server starten (optional)
    /// 3. Host-Schleife: Ticks, Ereignisse, Eingabezeilen von stdin
    /// 4. Auf Ctrl-C warten
    pub async fn starten(self) -> Result<()> {
        let host = Arc::new(SimHost::neu());
        let engine: Arc<GlimmerEngine> = Arc::new(OverlayEngine::neu(
            host.clone(),
            host.clone(),
            Arc::new(TickQueue::neu()),
            self.config.glow.clone(),
        ));
        engine.bootstrap();

        let metriken = GlimmerMetrics::neu()?;
        let health = HealthState::neu();
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        if self.config.observability.aktiviert {
            let addr: SocketAddr = self.config.observability_bind_adresse().parse()?;
            let metriken = metriken.clone();
            let health = health.clone();
            tokio::spawn(async move {
                let shutdown = async move {
                    let _ = shutdown_rx.changed().await;
                };
                if let Err(e) = observability_server_starten(addr, metriken, health, shutdown).await {
                    tracing::error!(fehler = %e, "Observability-Server beendet");
                }
            });
        }

        let (bus, mut ereignisse) = KanalBus::neu();
        let sitzung = Sitzung::neu(host, engine.clone(), bus, self.config_pfad.clone());

        let mut takt = tokio::time::interval(Duration::from_millis(self.config.tick.intervall_ms));
        takt.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut zeilen = BufReader::new(tokio::io::stdin()).lines();
        let mut eingabe_offen = true;

        tracing::info!(
            tick_ms = self.config.tick.intervall_ms,
            observability = self.config.observability.aktiviert,
            "Server laeuft. Eingabe als JSON-Zeilen auf stdin, Ende mit Ctrl-C"
        );

        loop {
            tokio::select! {
                _ = takt.tick() => {
                    let ausgefuehrt = engine.tick();
                    metriken.tick_aufgaben.observe(ausgefuehrt as f64);
                    metriken.uebernehmen(&engine.statistik());
                    health.tick_gelaufen();
                }
                Some(ereignis) = ereignisse.recv() => {
                    engine.ereignis_verarbeiten(ereignis);
                }
                zeile = zeilen.next_line(), if eingabe_offen => {
                    match zeile {
                        Ok(Some(zeile)) => {
                            if let Some(ausgabe) = sitzung.zeile_verarbeiten(&zeile) {
                                ausgeben(&ausgabe);
                            }
                            // Ereignisse dieser Zeile vor der naechsten zustellen
                            while let Ok(ereignis) = ereignisse.try_recv() {
                                engine.ereignis_verarbeiten(ereignis);
                            }
                        }
                        Ok(None) => {
                            tracing::info!("Eingabe beendet, Host laeuft weiter");
                            eingabe_offen = false;
                        }
                        Err(e) => {
                            tracing::warn!(fehler = %e, "stdin nicht lesbar");
                            eingabe_offen = false;
                        }
                    }
                }
                signal = tokio::signal::ctrl_c() => {
                    signal?;
                    break;
                }
            }
        }

        tracing::info!("Shutdown-Signal empfangen, Server wird beendet");
        health.host_status_setzen(false);
        let _ = shutdown_tx.send(true);
        let statistik = engine.statistik();
        tracing::info!(
            overlays_erstellt = statistik.overlays_erstellt,
            overlays_entfernt = statistik.overlays_entfernt,
            handler_fehler = statistik.handler_fehler,
            "Engine gestoppt"
        );
        Ok(())
    }
}

fn ausgeben(ausgabe: &Ausgabe) {
    match serde_json::to_string(ausgabe) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::error!(fehler = %e, "Ausgabe nicht serialisierbar"),
    }
}
