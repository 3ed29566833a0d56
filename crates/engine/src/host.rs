//! Host-Schnittstellen der Overlay-Engine
//!
//! Die Engine besitzt keine Entities. Sie spricht ueber drei Traits mit
//! dem Host:
//! - [`EntityHost`] – Teilnehmer-Roster und Entity-Registry-Primitive
//! - [`PermissionOracle`] – Aufloesung von Rechte-Strings
//! - [`TickScheduler`] – Einplanen von Aufgaben fuer den naechsten Tick
//!
//! Alle Handles sind schwach. Ein ungueltiges Handle ist ein normaler
//! Endzustand und kein Fehler.

use glimmer_core::{ParticipantId, PersistentId, Result, Rgba, Team, WeakHandle};

use crate::scheduler::Aufgabe;

/// Momentaufnahme eines Teilnehmers aus dem Host-Roster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeilnehmerInfo {
    pub id: ParticipantId,
    pub persistent_id: PersistentId,
    /// Vom Host gesteuert (Bot)
    pub ist_bot: bool,
    pub team: Team,
    pub lebt: bool,
}

/// Sichtbarkeits-Flags beim Erstellen eines Overlay-Objekts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjektFlags {
    /// Wird das Objekt selbst gezeichnet
    pub zeichnen: bool,
    /// Wirft das Objekt einen Schatten
    pub schatten: bool,
}

impl ObjektFlags {
    /// Unsichtbarer Ankerfolger, haengt am Koerper des Ziels
    pub const ANKERFOLGER: ObjektFlags = ObjektFlags {
        zeichnen: false,
        schatten: false,
    };

    /// Sichtbares Glow-Objekt, haengt am Ankerfolger
    pub const GLOW: ObjektFlags = ObjektFlags {
        zeichnen: true,
        schatten: false,
    };
}

/// Parameter fuer das Glow-Primitive des Hosts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlowParameter {
    pub farbe: Rgba,
    pub reichweite: i32,
    pub typ: i32,
    /// -1 = fuer alle Teams sichtbar
    pub team_filter: i32,
    pub min_reichweite: i32,
}

/// Roster und Entity-Registry des Hosts
pub trait EntityHost: Send + Sync + 'static {
    /// Schlaegt einen verbundenen Teilnehmer nach
    fn teilnehmer(&self, id: ParticipantId) -> Option<TeilnehmerInfo>;

    /// Alle aktuell verbundenen Teilnehmer
    fn alle_teilnehmer(&self) -> Vec<TeilnehmerInfo>;

    /// Handle auf den renderbaren Koerper (Anker) eines Teilnehmers
    fn anker(&self, id: ParticipantId) -> Option<WeakHandle>;

    /// Prueft ob das Handle noch auf ein existierendes Objekt zeigt
    fn ist_gueltig(&self, handle: WeakHandle) -> bool;

    /// Aktuelles Modell des Ankers
    ///
    /// `None` wenn Koerper oder Modell-Subsystem (noch) nicht aufloesbar sind.
    fn modell_aufloesen(&self, anker: WeakHandle) -> Option<String>;

    /// Erstellt ein neues Overlay-Objekt mit dem angegebenen Modell
    fn objekt_erstellen(&self, modell: &str, flags: ObjektFlags) -> Result<WeakHandle>;

    /// Bindet `kind` an die Transformation von `eltern`
    fn folgen(&self, kind: WeakHandle, eltern: WeakHandle) -> Result<()>;

    /// Setzt die Grund-Renderfarbe
    fn renderfarbe_setzen(&self, handle: WeakHandle, farbe: Rgba) -> Result<()>;

    /// Konfiguriert das Glow-Primitive
    fn glow_setzen(&self, handle: WeakHandle, parameter: &GlowParameter) -> Result<()>;

    /// Steuert ob `handle` an den Client von `betrachter` uebertragen wird
    fn uebertragung_setzen(
        &self,
        handle: WeakHandle,
        betrachter: ParticipantId,
        senden: bool,
    ) -> Result<()>;

    /// Entfernt das Objekt aus der Registry
    fn entfernen(&self, handle: WeakHandle) -> Result<()>;
}

/// Loest einen Rechte-String fuer einen Teilnehmer auf
pub trait PermissionOracle: Send + Sync + 'static {
    fn hat_recht(&self, id: ParticipantId, recht: &str) -> bool;
}

/// "Beim naechsten Tick ausfuehren" des Hosts
///
/// Einmalig, FIFO pro Quelle. Die Aufgabe traegt nur Identifikatoren und
/// wird bei Ausfuehrung gegen den dann aktuellen Zustand geprueft.
pub trait TickScheduler: Send + Sync + 'static {
    fn einplanen(&self, aufgabe: Aufgabe);
}
