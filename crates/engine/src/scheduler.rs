//! Verzoegerte Aufgaben fuer den naechsten Host-Tick
//!
//! Eine [`Aufgabe`] traegt nur Identifikatoren, keine Live-Referenzen. Bei
//! Ausfuehrung wird alles neu beim Host aufgeloest und geprueft; ist das
//! Ziel inzwischen verschwunden, wird die Aufgabe still verworfen.

use glimmer_core::{ParticipantId, WeakHandle};
use parking_lot::Mutex;
use std::collections::VecDeque;

use crate::engine::OverlayEngine;
use crate::host::{EntityHost, PermissionOracle, TickScheduler};

/// Einmalige, verzoegerte Aufgabe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aufgabe {
    /// Nach einem Spawn: Modell pruefen, ggf. Overlay (neu) erstellen
    SpawnPruefen(ParticipantId),
    /// Overlay erstellen, falls der Anker dann noch gueltig ist
    OverlayErstellen(ParticipantId),
    /// Uebertragung eines Betrachters neu berechnen
    BetrachterAktualisieren(ParticipantId),
    /// Objekt entfernen, falls es dann noch existiert
    Entfernen(WeakHandle),
}

/// FIFO-Warteschlange als [`TickScheduler`]
///
/// Der Host ruft pro Tick [`OverlayEngine::tick`] auf. Aufgaben, die
/// waehrend eines Ticks eingeplant werden, laufen erst im naechsten.
#[derive(Default)]
pub struct TickQueue {
    warteschlange: Mutex<VecDeque<Aufgabe>>,
}

impl TickQueue {
    pub fn neu() -> Self {
        Self::default()
    }

    /// Entnimmt alle bis jetzt eingeplanten Aufgaben
    pub fn entnehmen(&self) -> Vec<Aufgabe> {
        self.warteschlange.lock().drain(..).collect()
    }

    pub fn anzahl(&self) -> usize {
        self.warteschlange.lock().len()
    }

    pub fn ist_leer(&self) -> bool {
        self.warteschlange.lock().is_empty()
    }
}

impl TickScheduler for TickQueue {
    fn einplanen(&self, aufgabe: Aufgabe) {
        tracing::trace!(?aufgabe, "Aufgabe eingeplant");
        self.warteschlange.lock().push_back(aufgabe);
    }
}

impl<H, P> OverlayEngine<H, P, TickQueue>
where
    H: EntityHost,
    P: PermissionOracle,
{
    /// Fuehrt alle Aufgaben aus, die vor diesem Tick eingeplant wurden
    ///
    /// Gibt die Anzahl der ausgefuehrten Aufgaben zurueck.
    pub fn tick(&self) -> usize {
        let aufgaben = self.planer().entnehmen();
        let anzahl = aufgaben.len();
        for aufgabe in aufgaben {
            self.aufgabe_ausfuehren(aufgabe);
        }
        anzahl
    }

    /// Tickt so lange, bis keine Aufgaben mehr anstehen (hoechstens `max` Ticks)
    pub fn ticks_bis_leer(&self, max: usize) -> usize {
        let mut ticks = 0;
        while ticks < max && !self.planer().ist_leer() {
            self.tick();
            ticks += 1;
        }
        ticks
    }
}
