//! Fehlertypen fuer Glimmer
//!
//! Zentraler Fehler-Enum fuer alle Host-Aufrufe und Engine-Operationen.
//! Erwartete Races (ungueltiger Anker, verschwundener Teilnehmer) werden
//! nicht als Fehler modelliert, sondern als stiller Abbruch.

use thiserror::Error;

use crate::types::{ParticipantId, WeakHandle};

/// Globaler Result-Alias fuer Glimmer
pub type Result<T> = std::result::Result<T, GlimmerError>;

/// Alle moeglichen Fehler im Glimmer-System
#[derive(Debug, Error)]
pub enum GlimmerError {
    // --- Host ---
    #[error("Host-Aufruf fehlgeschlagen ({aufruf}): {grund}")]
    Host { aufruf: &'static str, grund: String },

    #[error("Entity nicht mehr vorhanden: {0}")]
    EntityUngueltig(WeakHandle),

    // --- Ressourcen ---
    #[error("Teilnehmer nicht gefunden: {0}")]
    TeilnehmerNichtGefunden(ParticipantId),

    // --- Intern ---
    #[error("Interner Fehler: {0}")]
    Intern(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl GlimmerError {
    /// Erstellt einen Host-Fehler fuer den angegebenen Aufruf
    pub fn host(aufruf: &'static str, grund: impl Into<String>) -> Self {
        Self::Host {
            aufruf,
            grund: grund.into(),
        }
    }

    /// Erstellt einen internen Fehler aus einer beliebigen Nachricht
    pub fn intern(msg: impl Into<String>) -> Self {
        Self::Intern(msg.into())
    }

    /// Gibt true zurueck wenn der Fehler ein erwarteter Race ist
    ///
    /// Solche Fehler werden auf niedriger Stufe geloggt und nicht eskaliert.
    pub fn ist_erwartet(&self) -> bool {
        matches!(
            self,
            Self::EntityUngueltig(_) | Self::TeilnehmerNichtGefunden(_)
        )
    }
}
