//! Lebenszyklus-Ereignisse und Event-Bus-Schnittstelle
//!
//! Der Host liefert genau neun Ereignisarten an die Overlay-Engine. Jede
//! Variante traegt nur die minimal noetigen Identifikatoren; der aktuelle
//! Zustand wird bei der Verarbeitung immer neu beim Host nachgeschlagen.

use crate::types::{ParticipantId, Team};
use serde::{Deserialize, Serialize};

/// Alle Lebenszyklus-Ereignisse die die Engine verarbeitet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "typ", rename_all = "snake_case")]
pub enum GlowEvent {
    /// Ein Teilnehmer hat sich verbunden
    Verbunden { participant: ParticipantId },
    /// Ein Teilnehmer ist (wieder) gespawnt
    Gespawnt { participant: ParticipantId },
    /// Ein Teilnehmer hat die Verbindung getrennt
    Getrennt { participant: ParticipantId },
    /// Ein Teilnehmer ist gestorben
    Gestorben { participant: ParticipantId },
    /// Ein Teilnehmer hat das Team gewechselt
    TeamGewechselt {
        participant: ParticipantId,
        neues_team: Team,
    },
    /// Ein Mensch hat einen Bot uebernommen (oder umgekehrt)
    Uebernahme {
        bot: ParticipantId,
        mensch: ParticipantId,
    },
    /// Die Runde ist beendet
    RundenEnde,
    /// Die naechste Runde startet gleich
    RundenVorstart,
    /// Die Karte wird entladen
    KarteEntladen,
}

impl GlowEvent {
    /// Gibt den Event-Namen als String zurueck (fuer Logs)
    pub fn name(&self) -> &'static str {
        match self {
            Self::Verbunden { .. } => "verbunden",
            Self::Gespawnt { .. } => "gespawnt",
            Self::Getrennt { .. } => "getrennt",
            Self::Gestorben { .. } => "gestorben",
            Self::TeamGewechselt { .. } => "team_gewechselt",
            Self::Uebernahme { .. } => "uebernahme",
            Self::RundenEnde => "runden_ende",
            Self::RundenVorstart => "runden_vorstart",
            Self::KarteEntladen => "karte_entladen",
        }
    }
}

/// Trait fuer den Event-Bus
///
/// Die konkrete Implementierung (tokio-Kanal im Server, direkter Aufruf
/// in Tests) entscheidet wann die Engine das Ereignis zu sehen bekommt.
pub trait EventBus: Send + Sync + 'static {
    /// Sendet ein Ereignis an die Engine
    fn senden(&self, event: GlowEvent) -> crate::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_namen() {
        let e = GlowEvent::Gespawnt {
            participant: ParticipantId(1),
        };
        assert_eq!(e.name(), "gespawnt");
        assert_eq!(GlowEvent::KarteEntladen.name(), "karte_entladen");
    }

    #[test]
    fn event_ist_serde_kompatibel() {
        let event = GlowEvent::TeamGewechselt {
            participant: ParticipantId(4),
            neues_team: Team::B,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"typ\":\"team_gewechselt\""));
        let zurueck: GlowEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(zurueck, event);
    }

    #[test]
    fn event_aus_json_zeile() {
        let e: GlowEvent = serde_json::from_str(r#"{"typ":"runden_ende"}"#).unwrap();
        assert_eq!(e, GlowEvent::RundenEnde);
    }
}
