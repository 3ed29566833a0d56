//! glimmer-core – Gemeinsame Typen, Ereignisse und Fehlertypen
//!
//! Dieses Crate stellt die fundamentalen Bausteine bereit, die von der
//! Overlay-Engine, dem Server und der Observability gemeinsam genutzt werden.

pub mod error;
pub mod event;
pub mod types;

// Re-Exporte fuer bequemen Zugriff
pub use error::{GlimmerError, Result};
pub use event::{EventBus, GlowEvent};
pub use types::{ParticipantId, PersistentId, Rgba, Team, WeakHandle};
