//! OverlayEngine – Zusammenfuehrung von Zustand, Host und Konfiguration
//!
//! Die Engine ist `Send + Sync` und wird ueber `Arc` zwischen den
//! Event-Callbacks, dem Tick und der Befehls-Oberflaeche geteilt. Sie
//! blockiert nie; alles was auf den Host warten muss, wird als
//! [`Aufgabe`] fuer den naechsten Tick eingeplant.

use glimmer_core::{GlimmerError, ParticipantId, Result};
use parking_lot::RwLock;
use std::sync::Arc;

use crate::config::GlowKonfiguration;
use crate::host::{EntityHost, GlowParameter, PermissionOracle, TickScheduler};
use crate::scheduler::Aufgabe;
use crate::state::{OverlayRecord, OverlayState};
use crate::statistik::{EngineStatistik, StatistikSnapshot};
use crate::visibility::{berechtigungen_pruefen, Berechtigungen};

/// Overlay-Lebenszyklus- und Sichtbarkeits-Engine
pub struct OverlayEngine<H, P, S>
where
    H: EntityHost,
    P: PermissionOracle,
    S: TickScheduler,
{
    pub(crate) host: Arc<H>,
    pub(crate) rechte: Arc<P>,
    planer: Arc<S>,
    pub(crate) state: OverlayState,
    config: RwLock<GlowKonfiguration>,
    pub(crate) statistik: EngineStatistik,
}

impl<H, P, S> OverlayEngine<H, P, S>
where
    H: EntityHost,
    P: PermissionOracle,
    S: TickScheduler,
{
    /// Erstellt eine neue Engine mit leerem Zustand
    pub fn neu(host: Arc<H>, rechte: Arc<P>, planer: Arc<S>, config: GlowKonfiguration) -> Self {
        Self {
            host,
            rechte,
            planer,
            state: OverlayState::neu(),
            config: RwLock::new(config),
            statistik: EngineStatistik::default(),
        }
    }

    /// Gemeinsamer Zustand (Overlays + Abos)
    pub fn state(&self) -> &OverlayState {
        &self.state
    }

    pub fn planer(&self) -> &S {
        &self.planer
    }

    /// Kopie der aktuellen Konfiguration
    pub fn konfiguration(&self) -> GlowKonfiguration {
        self.config.read().clone()
    }

    pub fn statistik(&self) -> StatistikSnapshot {
        self.statistik
            .snapshot(self.state.overlay_anzahl(), self.state.aktive_abonnenten().len())
    }

    /// Rechte-Stufen eines Teilnehmers unter der aktuellen Konfiguration
    pub fn berechtigungen(&self, id: ParticipantId) -> Berechtigungen {
        let config = self.config.read();
        berechtigungen_pruefen(self.rechte.as_ref(), &config, id)
    }

    /// Wiederaufnahme nach einem Neustart der Engine
    ///
    /// Jeder verbundene Mensch mit irgendeiner Rechte-Stufe bekommt ein
    /// deaktiviertes Abo. Ein frueheres "aktiviert" wird nie
    /// wiederhergestellt.
    pub fn bootstrap(&self) {
        let mut angelegt = 0usize;
        for info in self.host.alle_teilnehmer() {
            if info.ist_bot || !self.berechtigungen(info.id).irgendeine() {
                continue;
            }
            self.state.abo_anlegen(info.id);
            angelegt += 1;
        }
        tracing::info!(abos = angelegt, "Engine gestartet, Abos deaktiviert angelegt");
    }

    /// Uebernimmt eine neue Konfiguration
    ///
    /// Bestehende Overlays werden neu eingefaerbt, die Uebertragung aller
    /// Betrachter neu berechnet. Abos und Overlay-Bestand bleiben unveraendert.
    pub fn konfiguration_neu_laden(&self, neu: GlowKonfiguration) {
        *self.config.write() = neu;
        for record in self.state.alle_overlays() {
            if let Err(e) = self.glow_konfigurieren(&record) {
                tracing::warn!(ziel = %record.target, fehler = %e, "Neueinfaerben fehlgeschlagen");
            }
        }
        self.alle_betrachter_aktualisieren();
        tracing::info!("Glow-Konfiguration neu geladen");
    }

    pub(crate) fn einplanen(&self, aufgabe: Aufgabe) {
        self.planer.einplanen(aufgabe);
    }

    /// Glow-Parameter fuer das aktuelle Team des Ziels
    pub(crate) fn glow_parameter(&self, target: ParticipantId) -> Option<GlowParameter> {
        let info = self.host.teilnehmer(target)?;
        self.config.read().glow_parameter(info.team)
    }

    /// Wendet Farbe und Glow-Parameter auf ein bestehendes Overlay an
    fn glow_konfigurieren(&self, record: &OverlayRecord) -> Result<()> {
        let Some(parameter) = self.glow_parameter(record.target) else {
            return Ok(());
        };
        if self.host.ist_gueltig(record.glow) {
            self.host.glow_setzen(record.glow, &parameter)?;
        }
        Ok(())
    }

    /// Fuehrt eine verzoegerte Aufgabe aus
    ///
    /// Fehlerbarriere: ein Fehler wird geloggt und verschluckt, damit
    /// nachfolgende Aufgaben weiterlaufen.
    pub fn aufgabe_ausfuehren(&self, aufgabe: Aufgabe) {
        let ergebnis = match aufgabe {
            Aufgabe::SpawnPruefen(id) => self.spawn_pruefen(id),
            Aufgabe::OverlayErstellen(id) => self.overlay_erstellen(id).map(|erstellt| {
                if !erstellt {
                    self.statistik.aufgabe_verworfen();
                }
            }),
            Aufgabe::BetrachterAktualisieren(id) => {
                self.betrachter_aktualisieren(id);
                Ok(())
            }
            Aufgabe::Entfernen(handle) => {
                if self.host.ist_gueltig(handle) {
                    self.host.entfernen(handle)
                } else {
                    self.statistik.aufgabe_verworfen();
                    tracing::debug!(handle = %handle, "Objekt bereits entfernt");
                    Ok(())
                }
            }
        };

        if let Err(e) = ergebnis {
            self.fehler_protokollieren("aufgabe", &format!("{aufgabe:?}"), &e);
        }
    }

    /// Einheitliches Logging an den Fehlerbarrieren
    pub(crate) fn fehler_protokollieren(
        &self,
        quelle: &'static str,
        was: &str,
        fehler: &GlimmerError,
    ) {
        if fehler.ist_erwartet() {
            tracing::debug!(quelle, was, fehler = %fehler, "Abgebrochen (erwartet)");
        } else {
            self.statistik.handler_fehler();
            tracing::error!(quelle, was, fehler = %fehler, "Fehler verschluckt");
        }
    }
}
