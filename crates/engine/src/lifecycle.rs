//! Lebenszyklus-Controller – Reaktion auf Host-Ereignisse
//!
//! Zustandsautomat pro Ziel: `KeinOverlay` <-> `Overlay`. Jedes der neun
//! Ereignisse aus [`GlowEvent`] hat genau einen Handler. Erstellen und
//! Zerstoeren sind idempotent.
//!
//! Der Host meldet "gespawnt" oft bevor der Koerper fertig initialisiert
//! ist. Deshalb wird jede Erstellung, die aus einem Ereignis folgt, auf den
//! naechsten Tick verschoben und prueft den Anker dort erneut.

use glimmer_core::{GlowEvent, ParticipantId, Result, Rgba, Team};

use crate::engine::OverlayEngine;
use crate::host::{EntityHost, ObjektFlags, PermissionOracle, TickScheduler};
use crate::scheduler::Aufgabe;
use crate::state::OverlayRecord;

impl<H, P, S> OverlayEngine<H, P, S>
where
    H: EntityHost,
    P: PermissionOracle,
    S: TickScheduler,
{
    // -----------------------------------------------------------------------
    // Dispatcher
    // -----------------------------------------------------------------------

    /// Verarbeitet ein Lebenszyklus-Ereignis
    ///
    /// Fehlerbarriere: Fehler eines Handlers werden geloggt und
    /// verschluckt, damit folgende Ereignisse unbeeintraechtigt bleiben.
    pub fn ereignis_verarbeiten(&self, event: GlowEvent) {
        tracing::debug!(ereignis = event.name(), "Ereignis empfangen");

        let ergebnis = match &event {
            GlowEvent::Verbunden { participant } => self.teilnehmer_verbunden(*participant),
            GlowEvent::Gespawnt { participant } => self.teilnehmer_gespawnt(*participant),
            GlowEvent::Getrennt { participant } => self.teilnehmer_getrennt(*participant),
            GlowEvent::Gestorben { participant } => self.teilnehmer_gestorben(*participant),
            GlowEvent::TeamGewechselt {
                participant,
                neues_team,
            } => self.team_gewechselt(*participant, *neues_team),
            GlowEvent::Uebernahme { bot, mensch } => self.uebernahme(*bot, *mensch),
            GlowEvent::RundenEnde => self.runden_ende(),
            GlowEvent::RundenVorstart => self.runden_vorstart(),
            GlowEvent::KarteEntladen => self.karte_entladen(),
        };

        if let Err(e) = ergebnis {
            self.fehler_protokollieren("ereignis", event.name(), &e);
        }
    }

    // -----------------------------------------------------------------------
    // Handler
    // -----------------------------------------------------------------------

    /// Ein Mensch mit irgendeiner Rechte-Stufe bekommt ein deaktiviertes Abo
    pub fn teilnehmer_verbunden(&self, id: ParticipantId) -> Result<()> {
        let Some(info) = self.host.teilnehmer(id) else {
            tracing::debug!(teilnehmer = %id, "Verbunden, aber nicht mehr im Roster");
            return Ok(());
        };
        if info.ist_bot || !self.berechtigungen(id).irgendeine() {
            return Ok(());
        }
        self.state.abo_anlegen(id);
        tracing::debug!(teilnehmer = %id, "Abo angelegt (deaktiviert)");
        Ok(())
    }

    pub fn teilnehmer_gespawnt(&self, id: ParticipantId) -> Result<()> {
        if self.state.hat_abo(&id) {
            self.einplanen(Aufgabe::BetrachterAktualisieren(id));
        }
        self.einplanen(Aufgabe::SpawnPruefen(id));
        Ok(())
    }

    pub fn teilnehmer_gestorben(&self, id: ParticipantId) -> Result<()> {
        self.overlay_zerstoeren(id);
        if self.state.hat_abo(&id) {
            self.einplanen(Aufgabe::BetrachterAktualisieren(id));
        }
        Ok(())
    }

    pub fn teilnehmer_getrennt(&self, id: ParticipantId) -> Result<()> {
        self.overlay_zerstoeren(id);
        if self.state.abo_entfernen(&id) {
            tracing::debug!(teilnehmer = %id, "Abo entfernt");
        }
        Ok(())
    }

    /// Farbe haengt am Team, daher zerstoeren und im naechsten Tick neu erstellen
    pub fn team_gewechselt(&self, id: ParticipantId, neues_team: Team) -> Result<()> {
        let hatte_overlay = self.overlay_zerstoeren(id);
        tracing::debug!(teilnehmer = %id, ?neues_team, hatte_overlay, "Teamwechsel");

        if self.andere_abonnenten_vorhanden(id) {
            self.einplanen(Aufgabe::OverlayErstellen(id));
        }
        if self.state.hat_abo(&id) {
            self.einplanen(Aufgabe::BetrachterAktualisieren(id));
        }
        Ok(())
    }

    /// Ein Mensch steuert jetzt den Koerper eines Bots
    pub fn uebernahme(&self, bot: ParticipantId, mensch: ParticipantId) -> Result<()> {
        self.overlay_zerstoeren(bot);

        let Some(info) = self.host.teilnehmer(mensch) else {
            tracing::debug!(teilnehmer = %mensch, "Uebernahme durch unbekannten Teilnehmer");
            return Ok(());
        };
        if !info.ist_bot && self.andere_abonnenten_vorhanden(mensch) {
            self.einplanen(Aufgabe::OverlayErstellen(mensch));
        }
        if self.state.hat_abo(&mensch) {
            self.einplanen(Aufgabe::BetrachterAktualisieren(mensch));
        }
        Ok(())
    }

    /// Alle Overlays weg, Abos bleiben
    pub fn runden_ende(&self) -> Result<()> {
        let anzahl = self.alle_overlays_zerstoeren();
        tracing::debug!(overlays = anzahl, "Rundenende");
        Ok(())
    }

    /// Alle Overlays weg, Anker werden gleich massenhaft ungueltig
    pub fn runden_vorstart(&self) -> Result<()> {
        let anzahl = self.alle_overlays_zerstoeren();
        tracing::debug!(overlays = anzahl, "Rundenvorstart");
        Ok(())
    }

    /// Vollstaendiges Zuruecksetzen: Overlays und Abos
    pub fn karte_entladen(&self) -> Result<()> {
        let anzahl = self.alle_overlays_zerstoeren();
        self.state.abos_leeren();
        tracing::info!(overlays = anzahl, "Karte entladen, Zustand zurueckgesetzt");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Verzoegerte Pruefung nach Spawn
    // -----------------------------------------------------------------------

    /// Laeuft einen Tick nach dem Spawn
    ///
    /// Stimmt das gecachte Modell nicht mehr (Skin-Wechsel) oder haengt der
    /// Ankerfolger nicht mehr am aktuellen Koerper (Respawn), wird das
    /// Overlay zerstoert und ggf. neu erstellt.
    pub(crate) fn spawn_pruefen(&self, id: ParticipantId) -> Result<()> {
        if self.host.teilnehmer(id).is_none() {
            self.statistik.aufgabe_verworfen();
            tracing::debug!(teilnehmer = %id, "Spawn-Pruefung: Teilnehmer weg");
            return Ok(());
        }

        if let Some(record) = self.state.overlay(&id) {
            let gleicher_anker = self.host.anker(id) == Some(record.anker)
                && self.host.ist_gueltig(record.anker);
            let aktuelles_modell = self.aktuelles_modell(id);
            if gleicher_anker && aktuelles_modell.as_deref() == Some(record.anker_modell.as_str()) {
                return Ok(());
            }
            tracing::debug!(
                teilnehmer = %id,
                gleicher_anker,
                alt = %record.anker_modell,
                neu = ?aktuelles_modell,
                "Anker oder Modell geaendert, Overlay wird neu erstellt"
            );
            self.overlay_zerstoeren(id);
        }

        if self.andere_abonnenten_vorhanden(id) {
            self.overlay_erstellen(id)?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Erstellen / Zerstoeren
    // -----------------------------------------------------------------------

    /// Oeffentlicher, idempotenter Einstieg zum Erzwingen eines Overlays
    ///
    /// Gibt true zurueck wenn ein neues Overlay entstanden ist.
    pub fn glow_setzen(&self, target: ParticipantId) -> bool {
        match self.overlay_erstellen(target) {
            Ok(erstellt) => erstellt,
            Err(e) => {
                self.fehler_protokollieren("glow_setzen", "overlay_erstellen", &e);
                false
            }
        }
    }

    /// Modell des Ankers, sofern Koerper und Modell-Subsystem aufloesbar sind
    pub(crate) fn aktuelles_modell(&self, id: ParticipantId) -> Option<String> {
        let anker = self.host.anker(id)?;
        if !self.host.ist_gueltig(anker) {
            return None;
        }
        self.host
            .modell_aufloesen(anker)
            .filter(|modell| !modell.is_empty())
    }

    /// Erstellt das Overlay fuer ein Ziel
    ///
    /// `Ok(false)` bei jedem erwarteten Abbruch: Overlay existiert bereits,
    /// Ziel weg, tot, ohne Teamfarbe oder Anker nicht (mehr) gueltig. Ein
    /// Record wird nur geschrieben, wenn beide Host-Objekte erfolgreich
    /// erstellt und konfiguriert wurden.
    pub fn overlay_erstellen(&self, target: ParticipantId) -> Result<bool> {
        if self.state.hat_overlay(&target) {
            return Ok(false);
        }
        let Some(info) = self.host.teilnehmer(target) else {
            tracing::debug!(ziel = %target, "Erstellung abgebrochen: Teilnehmer weg");
            return Ok(false);
        };
        if !info.lebt {
            tracing::debug!(ziel = %target, "Erstellung abgebrochen: Ziel tot");
            return Ok(false);
        }
        let Some(parameter) = self.konfiguration().glow_parameter(info.team) else {
            tracing::debug!(ziel = %target, team = ?info.team, "Erstellung abgebrochen: keine Teamfarbe");
            return Ok(false);
        };
        let Some(anker) = self.host.anker(target).filter(|a| self.host.ist_gueltig(*a)) else {
            tracing::debug!(ziel = %target, "Erstellung abgebrochen: Anker ungueltig");
            return Ok(false);
        };
        let Some(modell) = self
            .host
            .modell_aufloesen(anker)
            .filter(|modell| !modell.is_empty())
        else {
            tracing::debug!(ziel = %target, "Erstellung abgebrochen: Modell nicht aufloesbar");
            return Ok(false);
        };

        let ankerfolger = self.host.objekt_erstellen(&modell, ObjektFlags::ANKERFOLGER)?;
        let glow = match self.host.objekt_erstellen(&modell, ObjektFlags::GLOW) {
            Ok(glow) => glow,
            Err(e) => {
                self.einplanen(Aufgabe::Entfernen(ankerfolger));
                return Err(e);
            }
        };
        let record = OverlayRecord {
            target,
            glow,
            ankerfolger,
            anker,
            anker_modell: modell,
        };

        let konfiguriert = self
            .host
            .folgen(ankerfolger, anker)
            .and_then(|_| self.host.folgen(glow, ankerfolger))
            .and_then(|_| self.host.renderfarbe_setzen(glow, Rgba::TRANSPARENT))
            .and_then(|_| self.host.glow_setzen(glow, &parameter));
        if let Err(e) = konfiguriert {
            self.handles_entfernen(&record);
            return Err(e);
        }

        if !self.state.overlay_einfuegen(record.clone()) {
            // Paralleler Ersteller war schneller
            self.handles_entfernen(&record);
            return Ok(false);
        }

        self.statistik.overlay_erstellt();

        // Ein Gestorben-Handler seit der Lebend-Pruefung fand noch keinen Record
        if !self.host.teilnehmer(target).is_some_and(|t| t.lebt) {
            tracing::debug!(ziel = %target, "Ziel waehrend der Erstellung gestorben");
            self.overlay_zerstoeren(target);
            return Ok(false);
        }

        tracing::debug!(ziel = %target, glow = %glow, modell = %record.anker_modell, "Overlay erstellt");
        self.neue_overlay_sichtbarkeit(target);
        Ok(true)
    }

    /// Entfernt den Record und plant das Entfernen beider Objekte ein
    ///
    /// Gibt true zurueck wenn ein Overlay vorhanden war.
    pub fn overlay_zerstoeren(&self, target: ParticipantId) -> bool {
        match self.state.overlay_entfernen(&target) {
            Some(record) => {
                self.handles_entfernen(&record);
                self.statistik.overlay_entfernt();
                tracing::debug!(ziel = %target, "Overlay zerstoert");
                true
            }
            None => {
                tracing::trace!(ziel = %target, "Kein Overlay zum Zerstoeren");
                false
            }
        }
    }

    /// Zerstoert alle Overlays, gibt die Anzahl zurueck
    pub fn alle_overlays_zerstoeren(&self) -> usize {
        let records = self.state.overlays_leeren();
        for record in &records {
            self.handles_entfernen(record);
            self.statistik.overlay_entfernt();
        }
        records.len()
    }

    /// Beide Handles werden erst beim Entfernen im naechsten Tick geprueft
    fn handles_entfernen(&self, record: &OverlayRecord) {
        for handle in record.handles() {
            self.einplanen(Aufgabe::Entfernen(handle));
        }
    }

    /// Gibt es mindestens einen aktiven Abonnenten ausser `target`
    pub(crate) fn andere_abonnenten_vorhanden(&self, target: ParticipantId) -> bool {
        self.state
            .aktive_abonnenten()
            .into_iter()
            .any(|viewer| viewer != target)
    }
}
