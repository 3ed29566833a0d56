//! Abo-Umschaltung fuer Betrachter
//!
//! Einziger Pfad, auf dem ein Abo-Ereignis (statt eines
//! Lebenszyklus-Ereignisses) neue Overlays entstehen laesst. Beim
//! Abbestellen wird nie ein Overlay zerstoert, andere Betrachter koennen
//! es noch brauchen.

use glimmer_core::ParticipantId;

use crate::engine::OverlayEngine;
use crate::host::{EntityHost, PermissionOracle, TickScheduler};
use crate::scheduler::Aufgabe;

/// Log-Target fuer Audit-Eintraege
pub const AUDIT_TARGET: &str = "glimmer::audit";

impl<H, P, S> OverlayEngine<H, P, S>
where
    H: EntityHost,
    P: PermissionOracle,
    S: TickScheduler,
{
    /// Schaltet das Abo eines Betrachters um und gleicht die Uebertragung ab
    ///
    /// Gibt den neuen Zustand zurueck.
    pub fn abo_umschalten(&self, viewer: ParticipantId) -> bool {
        let aktiviert = self.state.abo_umschalten(viewer);
        tracing::info!(target: AUDIT_TARGET, betrachter = %viewer, aktiviert, "Abo umgeschaltet");

        if !aktiviert {
            self.betrachter_aktualisieren(viewer);
            return false;
        }

        let senden = self.betrachter_kann_sehen(viewer);
        let mut eingeplant = 0usize;

        for info in self.host.alle_teilnehmer() {
            if info.id == viewer {
                continue;
            }
            let abgedeckt = match self.state.overlay(&info.id) {
                Some(record) => match self.uebertragen(&record, viewer, senden) {
                    Ok(true) => true,
                    Ok(false) => {
                        self.verwaist(&record);
                        false
                    }
                    Err(e) => {
                        self.fehler_protokollieren("umschalten", "uebertragen", &e);
                        true
                    }
                },
                None => false,
            };
            if !abgedeckt && senden && info.lebt && self.aktuelles_modell(info.id).is_some() {
                self.einplanen(Aufgabe::OverlayErstellen(info.id));
                eingeplant += 1;
            }
        }

        tracing::debug!(betrachter = %viewer, senden, eingeplant, "Abo aktiviert");
        true
    }
}
