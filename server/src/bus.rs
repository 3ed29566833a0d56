//! Event-Bus ueber einen tokio-Kanal
//!
//! Die Eingabe veraendert zuerst den simulierten Host und meldet danach
//! das Ereignis. Die Host-Schleife stellt die Ereignisse der Engine zu.

use glimmer_core::{EventBus, GlimmerError, GlowEvent, Result};
use tokio::sync::mpsc;

/// Sendeseite des Ereigniskanals
#[derive(Clone)]
pub struct KanalBus {
    sender: mpsc::UnboundedSender<GlowEvent>,
}

impl KanalBus {
    /// Erstellt Bus und Empfangsseite
    pub fn neu() -> (Self, mpsc::UnboundedReceiver<GlowEvent>) {
        let (sender, empfaenger) = mpsc::unbounded_channel();
        (Self { sender }, empfaenger)
    }
}

impl EventBus for KanalBus {
    fn senden(&self, event: GlowEvent) -> Result<()> {
        tracing::trace!(ereignis = event.name(), "Ereignis gemeldet");
        self.sender
            .send(event)
            .map_err(|_| GlimmerError::intern("Ereigniskanal geschlossen"))
    }
}
