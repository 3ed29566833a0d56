//! Overlay-State – Autoritativer Zustand aller Overlays und Abos
//!
//! Verwaltet:
//! - pro Ziel hoechstens einen [`OverlayRecord`]
//! - pro Betrachter einen [`SubscriptionRecord`]
//!
//! Thread-safe durch DashMap. Jede Read-Modify-Write-Operation auf einem
//! Schluessel laeuft unter dem Entry-Lock dieses Schluessels, verschiedene
//! Schluessel blockieren sich nicht gegenseitig.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use glimmer_core::{ParticipantId, WeakHandle};
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Overlay eines dekorierten Ziels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayRecord {
    /// Dekoriertes Ziel
    pub target: ParticipantId,
    /// Sichtbares Glow-Objekt
    pub glow: WeakHandle,
    /// Unsichtbarer Ankerfolger zwischen Ziel und Glow
    pub ankerfolger: WeakHandle,
    /// Koerper, an den der Ankerfolger gebunden ist
    pub anker: WeakHandle,
    /// Zuletzt bekanntes Modell des Ziels (erkennt Skin-Wechsel)
    pub anker_modell: String,
}

impl OverlayRecord {
    /// Beide Host-Objekte des Overlays
    pub fn handles(&self) -> [WeakHandle; 2] {
        [self.glow, self.ankerfolger]
    }
}

/// Abo eines Betrachters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionRecord {
    pub viewer: ParticipantId,
    pub aktiviert: bool,
}

// ---------------------------------------------------------------------------
// OverlayState
// ---------------------------------------------------------------------------

/// Zentraler In-Memory-Zustand der Engine
///
/// Clone teilt den inneren Zustand (Arc).
#[derive(Clone, Default)]
pub struct OverlayState {
    inner: Arc<OverlayStateInner>,
}

#[derive(Default)]
struct OverlayStateInner {
    /// Overlays, indexiert nach Ziel
    overlays: DashMap<ParticipantId, OverlayRecord>,
    /// Abos, indexiert nach Betrachter
    abos: DashMap<ParticipantId, SubscriptionRecord>,
}

impl OverlayState {
    /// Erstellt einen neuen leeren Zustand
    pub fn neu() -> Self {
        Self::default()
    }

    // --- Overlays ---

    /// Fuegt ein Overlay ein, sofern fuer das Ziel noch keines existiert
    ///
    /// Gibt false zurueck wenn bereits ein Record vorhanden war; der
    /// uebergebene Record wird dann verworfen.
    pub fn overlay_einfuegen(&self, record: OverlayRecord) -> bool {
        match self.inner.overlays.entry(record.target) {
            Entry::Occupied(_) => false,
            Entry::Vacant(frei) => {
                frei.insert(record);
                true
            }
        }
    }

    /// Entfernt das Overlay eines Ziels
    pub fn overlay_entfernen(&self, target: &ParticipantId) -> Option<OverlayRecord> {
        self.inner.overlays.remove(target).map(|(_, record)| record)
    }

    /// Kopie des Overlays eines Ziels
    pub fn overlay(&self, target: &ParticipantId) -> Option<OverlayRecord> {
        self.inner.overlays.get(target).map(|r| r.clone())
    }

    pub fn hat_overlay(&self, target: &ParticipantId) -> bool {
        self.inner.overlays.contains_key(target)
    }

    /// Momentaufnahme aller Overlays
    ///
    /// Haelt keine Locks ueber den Aufruf hinaus, Aufrufer duerfen waehrend
    /// der Iteration den Zustand veraendern.
    pub fn alle_overlays(&self) -> Vec<OverlayRecord> {
        self.inner
            .overlays
            .iter()
            .map(|e| e.value().clone())
            .collect()
    }

    /// Entfernt alle Overlays und gibt die entfernten Records zurueck
    pub fn overlays_leeren(&self) -> Vec<OverlayRecord> {
        let ziele: Vec<ParticipantId> = self.inner.overlays.iter().map(|e| *e.key()).collect();
        ziele
            .iter()
            .filter_map(|t| self.overlay_entfernen(t))
            .collect()
    }

    pub fn overlay_anzahl(&self) -> usize {
        self.inner.overlays.len()
    }

    // --- Abos ---

    /// Legt ein deaktiviertes Abo an (ueberschreibt ein bestehendes)
    pub fn abo_anlegen(&self, viewer: ParticipantId) {
        self.inner.abos.insert(
            viewer,
            SubscriptionRecord {
                viewer,
                aktiviert: false,
            },
        );
    }

    /// Entfernt das Abo eines Betrachters
    pub fn abo_entfernen(&self, viewer: &ParticipantId) -> bool {
        self.inner.abos.remove(viewer).is_some()
    }

    /// Schaltet das Abo atomar um und gibt den neuen Zustand zurueck
    ///
    /// Fehlt der Record, gilt der vorherige Zustand als deaktiviert.
    pub fn abo_umschalten(&self, viewer: ParticipantId) -> bool {
        let mut eintrag = self.inner.abos.entry(viewer).or_insert(SubscriptionRecord {
            viewer,
            aktiviert: false,
        });
        eintrag.aktiviert = !eintrag.aktiviert;
        eintrag.aktiviert
    }

    /// Ist das Abo vorhanden und aktiviert
    pub fn abo_aktiv(&self, viewer: &ParticipantId) -> bool {
        self.inner
            .abos
            .get(viewer)
            .map(|r| r.aktiviert)
            .unwrap_or(false)
    }

    pub fn hat_abo(&self, viewer: &ParticipantId) -> bool {
        self.inner.abos.contains_key(viewer)
    }

    /// Momentaufnahme aller Abos
    pub fn alle_abos(&self) -> Vec<SubscriptionRecord> {
        self.inner.abos.iter().map(|e| *e.value()).collect()
    }

    /// Alle Betrachter mit aktiviertem Abo
    pub fn aktive_abonnenten(&self) -> Vec<ParticipantId> {
        self.inner
            .abos
            .iter()
            .filter(|e| e.aktiviert)
            .map(|e| e.viewer)
            .collect()
    }

    /// Entfernt alle Abos
    pub fn abos_leeren(&self) {
        self.inner.abos.clear();
    }

    pub fn abo_anzahl(&self) -> usize {
        self.inner.abos.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
