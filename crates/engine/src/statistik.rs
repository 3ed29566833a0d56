//! Laufzeit-Zaehler der Engine
//!
//! Werden vom Server periodisch in Prometheus-Metriken uebertragen.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monoton steigende Zaehler
#[derive(Debug, Default)]
pub struct EngineStatistik {
    overlays_erstellt: AtomicU64,
    overlays_entfernt: AtomicU64,
    aufgaben_verworfen: AtomicU64,
    handler_fehler: AtomicU64,
}

/// Momentaufnahme von [`EngineStatistik`] plus aktuelle Speichergroessen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatistikSnapshot {
    pub overlays_erstellt: u64,
    pub overlays_entfernt: u64,
    pub aufgaben_verworfen: u64,
    pub handler_fehler: u64,
    pub overlays_aktiv: u64,
    pub abos_aktiv: u64,
}

impl EngineStatistik {
    pub fn overlay_erstellt(&self) {
        self.overlays_erstellt.fetch_add(1, Ordering::Relaxed);
    }

    pub fn overlay_entfernt(&self) {
        self.overlays_entfernt.fetch_add(1, Ordering::Relaxed);
    }

    /// Eine verzoegerte Aufgabe fand ihr Ziel nicht mehr vor
    pub fn aufgabe_verworfen(&self) {
        self.aufgaben_verworfen.fetch_add(1, Ordering::Relaxed);
    }

    pub fn handler_fehler(&self) {
        self.handler_fehler.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self, overlays_aktiv: usize, abos_aktiv: usize) -> StatistikSnapshot {
        StatistikSnapshot {
            overlays_erstellt: self.overlays_erstellt.load(Ordering::Relaxed),
            overlays_entfernt: self.overlays_entfernt.load(Ordering::Relaxed),
            aufgaben_verworfen: self.aufgaben_verworfen.load(Ordering::Relaxed),
            handler_fehler: self.handler_fehler.load(Ordering::Relaxed),
            overlays_aktiv: overlays_aktiv as u64,
            abos_aktiv: abos_aktiv as u64,
        }
    }
}
