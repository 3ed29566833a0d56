//! Adapter fuer die Befehls-Oberflaeche
//!
//! Das Parsen des Chat-Befehls und die lokalisierten Texte liegen beim
//! Aufrufer. Hier wird nur entschieden, welche Rueckmeldung er zeigen soll.

use glimmer_core::ParticipantId;
use serde::Serialize;

use crate::engine::OverlayEngine;
use crate::host::{EntityHost, PermissionOracle, TickScheduler};
use crate::visibility::kann_sehen;

/// Rueckmeldung an den Aufrufer des Befehls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BefehlAntwort {
    /// Weder volle noch eingeschraenkte Stufe (oder Bot)
    KeineBerechtigung,
    /// Abo aktiv, Overlays werden sofort uebertragen
    Aktiviert,
    /// Abo aktiv, Uebertragung erst nach dem Tod oder als Zuschauer
    AktiviertNurTot,
    Deaktiviert,
}

impl<H, P, S> OverlayEngine<H, P, S>
where
    H: EntityHost,
    P: PermissionOracle,
    S: TickScheduler,
{
    /// Verarbeitet den Umschalt-Befehl eines Teilnehmers
    pub fn wallhack_befehl(&self, viewer: ParticipantId) -> BefehlAntwort {
        let Some(info) = self.host.teilnehmer(viewer) else {
            return BefehlAntwort::KeineBerechtigung;
        };
        let rechte = self.berechtigungen(viewer);
        if info.ist_bot || !rechte.irgendeine() {
            tracing::debug!(betrachter = %viewer, "Befehl ohne Berechtigung");
            return BefehlAntwort::KeineBerechtigung;
        }

        if !self.abo_umschalten(viewer) {
            return BefehlAntwort::Deaktiviert;
        }
        if kann_sehen(rechte, &info) {
            BefehlAntwort::Aktiviert
        } else {
            BefehlAntwort::AktiviertNurTot
        }
    }
}
