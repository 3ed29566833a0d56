//! Sichtbarkeit – Wer bekommt welches Overlay uebertragen
//!
//! Die Regel selbst ([`kann_sehen`]) ist eine reine Funktion ueber die
//! Rechte-Stufen und den Spielzustand des Betrachters. Die Identitaet des
//! Ziels kennt sie nicht; die Selbstausnahme (Betrachter == Ziel ergibt
//! immer false) setzen die Update-Prozeduren durch.
//!
//! Beide Update-Prozeduren sind idempotent und erzeugen oder entfernen
//! nie Overlays (mit Ausnahme verwaister Records, deren Glow-Objekt der
//! Host bereits zerstoert hat).

use glimmer_core::{ParticipantId, Result};

use crate::config::GlowKonfiguration;
use crate::engine::OverlayEngine;
use crate::host::{EntityHost, PermissionOracle, TeilnehmerInfo, TickScheduler};
use crate::state::OverlayRecord;

/// Aufgeloeste Rechte-Stufen eines Betrachters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Berechtigungen {
    /// Sieht Overlays immer
    pub voll: bool,
    /// Sieht Overlays nur tot oder als Zuschauer
    pub eingeschraenkt: bool,
}

impl Berechtigungen {
    pub fn irgendeine(&self) -> bool {
        self.voll || self.eingeschraenkt
    }
}

/// Loest beide Stufen unabhaengig voneinander auf
///
/// Ein leerer Rechte-String gewaehrt die Stufe jedem.
pub fn berechtigungen_pruefen<P: PermissionOracle + ?Sized>(
    rechte: &P,
    config: &GlowKonfiguration,
    id: ParticipantId,
) -> Berechtigungen {
    let stufe = |recht: &str| recht.is_empty() || rechte.hat_recht(id, recht);
    Berechtigungen {
        voll: stufe(&config.recht_voll),
        eingeschraenkt: stufe(&config.recht_eingeschraenkt),
    }
}

/// Sichtbarkeitsregel fuer einen Betrachter
pub fn kann_sehen(rechte: Berechtigungen, betrachter: &TeilnehmerInfo) -> bool {
    if rechte.voll {
        return true;
    }
    if rechte.eingeschraenkt {
        return !betrachter.lebt || betrachter.team.ist_neutral();
    }
    false
}

impl<H, P, S> OverlayEngine<H, P, S>
where
    H: EntityHost,
    P: PermissionOracle,
    S: TickScheduler,
{
    /// `kann_sehen` mit frisch nachgeschlagenem Host-Zustand
    ///
    /// Ein nicht mehr verbundener Betrachter sieht nichts.
    pub fn betrachter_kann_sehen(&self, viewer: ParticipantId) -> bool {
        match self.host.teilnehmer(viewer) {
            Some(info) => kann_sehen(self.berechtigungen(viewer), &info),
            None => false,
        }
    }

    /// Setzt die Uebertragung beider Overlay-Objekte fuer einen Betrachter
    ///
    /// Gibt false zurueck wenn das Glow-Objekt nicht mehr existiert.
    pub(crate) fn uebertragen(
        &self,
        record: &OverlayRecord,
        viewer: ParticipantId,
        senden: bool,
    ) -> Result<bool> {
        let senden = senden && viewer != record.target;
        if !self.host.ist_gueltig(record.glow) {
            return Ok(false);
        }
        for handle in record.handles() {
            if self.host.ist_gueltig(handle) {
                self.host.uebertragung_setzen(handle, viewer, senden)?;
            }
        }
        Ok(true)
    }

    /// Entfernt einen Record, dessen Glow der Host bereits zerstoert hat
    pub(crate) fn verwaist(&self, record: &OverlayRecord) {
        tracing::debug!(ziel = %record.target, "Glow-Objekt verschwunden, Record wird entfernt");
        self.overlay_zerstoeren(record.target);
    }

    /// Uebertragung eines frisch erstellten Overlays fuer alle Teilnehmer
    pub fn neue_overlay_sichtbarkeit(&self, target: ParticipantId) {
        let Some(record) = self.state.overlay(&target) else {
            tracing::debug!(ziel = %target, "Kein Overlay fuer Sichtbarkeits-Update");
            return;
        };

        for info in self.host.alle_teilnehmer() {
            let senden = info.id != target
                && self.state.abo_aktiv(&info.id)
                && kann_sehen(self.berechtigungen(info.id), &info);

            match self.uebertragen(&record, info.id, senden) {
                Ok(true) => {}
                Ok(false) => {
                    self.verwaist(&record);
                    return;
                }
                Err(e) => {
                    self.fehler_protokollieren("sichtbarkeit", "neues_overlay", &e);
                }
            }
        }
    }

    /// Berechnet die Uebertragung aller Overlays fuer einen Betrachter neu
    pub fn betrachter_aktualisieren(&self, viewer: ParticipantId) {
        let senden = self.state.abo_aktiv(&viewer) && self.betrachter_kann_sehen(viewer);

        for record in self.state.alle_overlays() {
            match self.uebertragen(&record, viewer, senden) {
                Ok(true) => {}
                Ok(false) => self.verwaist(&record),
                Err(e) => self.fehler_protokollieren("sichtbarkeit", "betrachter", &e),
            }
        }
        tracing::trace!(betrachter = %viewer, senden, "Betrachter aktualisiert");
    }

    /// Berechnet die Uebertragung fuer alle Betrachter mit Abo neu
    ///
    /// Veraendert weder Abos noch den Overlay-Bestand.
    pub fn alle_betrachter_aktualisieren(&self) {
        for abo in self.state.alle_abos() {
            self.betrachter_aktualisieren(abo.viewer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glimmer_core::{PersistentId, Team};

    struct FesteRechte(&'static [&'static str]);

    impl PermissionOracle for FesteRechte {
        fn hat_recht(&self, _id: ParticipantId, recht: &str) -> bool {
            self.0.contains(&recht)
        }
    }

    fn info(team: Team, lebt: bool) -> TeilnehmerInfo {
        TeilnehmerInfo {
            id: ParticipantId(1),
            persistent_id: PersistentId(100),
            ist_bot: false,
            team,
            lebt,
        }
    }

    const VOLL: Berechtigungen = Berechtigungen {
        voll: true,
        eingeschraenkt: false,
    };
    const EINGESCHRAENKT: Berechtigungen = Berechtigungen {
        voll: false,
        eingeschraenkt: true,
    };

    #[test]
    fn voll_sieht_immer() {
        assert!(kann_sehen(VOLL, &info(Team::A, true)));
        assert!(kann_sehen(VOLL, &info(Team::B, false)));
        assert!(kann_sehen(VOLL, &info(Team::Zuschauer, false)));
    }

    #[test]
    fn eingeschraenkt_nur_tot_oder_zuschauer() {
        assert!(!kann_sehen(EINGESCHRAENKT, &info(Team::A, true)));
        assert!(!kann_sehen(EINGESCHRAENKT, &info(Team::B, true)));
        assert!(kann_sehen(EINGESCHRAENKT, &info(Team::A, false)));
        assert!(kann_sehen(EINGESCHRAENKT, &info(Team::Zuschauer, true)));
        assert!(kann_sehen(EINGESCHRAENKT, &info(Team::Keins, true)));
    }

    #[test]
    fn ohne_stufe_nie() {
        let keine = Berechtigungen::default();
        assert!(!keine.irgendeine());
        assert!(!kann_sehen(keine, &info(Team::Zuschauer, false)));
    }

    #[test]
    fn leerer_rechte_string_gewaehrt_jedem() {
        let config = GlowKonfiguration {
            recht_voll: String::new(),
            ..GlowKonfiguration::default()
        };
        let b = berechtigungen_pruefen(&FesteRechte(&[]), &config, ParticipantId(3));
        assert!(b.voll);
        assert!(!b.eingeschraenkt);
    }

    #[test]
    fn stufen_unabhaengig_aufgeloest() {
        let config = GlowKonfiguration::default();
        let b = berechtigungen_pruefen(
            &FesteRechte(&["@css/generic"]),
            &config,
            ParticipantId(3),
        );
        assert_eq!(b, EINGESCHRAENKT);

        let b = berechtigungen_pruefen(
            &FesteRechte(&["@css/root", "@css/generic"]),
            &config,
            ParticipantId(3),
        );
        assert!(b.voll && b.eingeschraenkt);
    }
}
