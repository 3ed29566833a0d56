//! Gemeinsame Identifikations- und Wertetypen fuer Glimmer
//!
//! Alle IDs verwenden das Newtype-Pattern um Verwechslungen zwischen
//! Slot-Nummern, Steam-artigen Dauer-IDs und Entity-Handles zur Compilezeit
//! auszuschliessen.

use serde::{Deserialize, Serialize};

/// Sitzungslokale Teilnehmer-ID (Slot), nur fuer die aktuelle Verbindung gueltig
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParticipantId(pub u32);

impl ParticipantId {
    /// Gibt den inneren Slot-Wert zurueck
    pub fn inner(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "slot:{}", self.0)
    }
}

/// Sitzungsuebergreifende Teilnehmer-ID, bleibt ueber Reconnects stabil
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PersistentId(pub u64);

impl PersistentId {
    /// Gibt die innere ID zurueck
    pub fn inner(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for PersistentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "pid:{}", self.0)
    }
}

/// Schwache Referenz auf ein Objekt in der Entity-Registry des Hosts
///
/// Traegt keinen Besitz. Der Host kann das Objekt jederzeit zerstoeren,
/// deshalb muss vor jeder Verwendung die Gueltigkeit geprueft werden.
/// `seriennummer` unterscheidet wiederverwendete Indizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeakHandle {
    pub index: u32,
    pub seriennummer: u32,
}

impl WeakHandle {
    pub fn neu(index: u32, seriennummer: u32) -> Self {
        Self { index, seriennummer }
    }
}

impl std::fmt::Display for WeakHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "entity:{}#{}", self.index, self.seriennummer)
    }
}

/// Team-Zugehoerigkeit eines Teilnehmers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    /// Noch keinem Team zugewiesen
    #[default]
    Keins,
    /// Reiner Zuschauer
    Zuschauer,
    /// Spielendes Team A
    A,
    /// Spielendes Team B
    B,
}

impl Team {
    /// Gibt true zurueck fuer das neutrale Team und die Zuschauer
    pub fn ist_neutral(&self) -> bool {
        matches!(self, Self::Keins | Self::Zuschauer)
    }
}

/// RGBA-Farbe wie sie das Overlay-Primitive erwartet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const ROT: Rgba = Rgba::neu(255, 0, 0, 255);
    pub const BLAU: Rgba = Rgba::neu(0, 0, 255, 255);
    pub const TRANSPARENT: Rgba = Rgba::neu(255, 255, 255, 0);

    pub const fn neu(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn participant_id_display() {
        assert_eq!(ParticipantId(7).to_string(), "slot:7");
    }

    #[test]
    fn weak_handle_unterscheidet_seriennummer() {
        let a = WeakHandle::neu(12, 1);
        let b = WeakHandle::neu(12, 2);
        assert_ne!(a, b, "Wiederverwendeter Index darf nicht gleich sein");
        assert_eq!(a.to_string(), "entity:12#1");
    }

    #[test]
    fn neutrale_teams() {
        assert!(Team::Keins.ist_neutral());
        assert!(Team::Zuschauer.ist_neutral());
        assert!(!Team::A.ist_neutral());
        assert!(!Team::B.ist_neutral());
    }

    #[test]
    fn team_ist_serde_kompatibel() {
        let json = serde_json::to_string(&Team::Zuschauer).unwrap();
        assert_eq!(json, "\"zuschauer\"");
        let team: Team = serde_json::from_str("\"a\"").unwrap();
        assert_eq!(team, Team::A);
    }

    #[test]
    fn farben_sind_deckend() {
        assert_eq!(Rgba::ROT.a, 255);
        assert_eq!(Rgba::BLAU.a, 255);
        assert_eq!(Rgba::TRANSPARENT.a, 0);
    }
}
