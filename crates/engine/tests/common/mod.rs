//! Gemeinsame Test-Hilfen: SimHost + TickQueue + Engine

#![allow(dead_code)]

use glimmer_core::{GlowEvent, ParticipantId, PersistentId, Team, WeakHandle};
use glimmer_engine::{GlowKonfiguration, OverlayEngine, OverlayRecord, SimHost, TickQueue};
use std::sync::Arc;

pub const VOLL: &str = "@css/root";
pub const EINGESCHRAENKT: &str = "@css/generic";

pub type TestEngine = OverlayEngine<SimHost, SimHost, TickQueue>;

pub struct Welt {
    pub host: Arc<SimHost>,
    pub engine: Arc<TestEngine>,
}

pub fn welt() -> Welt {
    welt_mit(GlowKonfiguration::default())
}

pub fn welt_mit(config: GlowKonfiguration) -> Welt {
    let host = Arc::new(SimHost::neu());
    let engine = Arc::new(OverlayEngine::neu(
        host.clone(),
        host.clone(),
        Arc::new(TickQueue::neu()),
        config,
    ));
    Welt { host, engine }
}

impl Welt {
    /// Verbindet einen Menschen mit den angegebenen Rechten
    pub fn mensch(&self, slot: u32, rechte: &[&str]) -> ParticipantId {
        let id = ParticipantId(slot);
        self.host.verbinden(id, PersistentId(76_000 + slot as u64), false);
        for recht in rechte {
            self.host.recht_geben(id, recht);
        }
        self.ereignis(GlowEvent::Verbunden { participant: id });
        id
    }

    pub fn bot(&self, slot: u32) -> ParticipantId {
        let id = ParticipantId(slot);
        self.host.verbinden(id, PersistentId(0), true);
        self.ereignis(GlowEvent::Verbunden { participant: id });
        id
    }

    /// Setzt das Team, spawnt und meldet das Ereignis (ohne Tick)
    pub fn spawnen(&self, id: ParticipantId, team: Team, modell: &str) {
        self.host.team_setzen(id, team);
        self.host.spawnen(id, modell);
        self.ereignis(GlowEvent::Gespawnt { participant: id });
    }

    pub fn sterben(&self, id: ParticipantId) {
        self.host.sterben(id);
        self.ereignis(GlowEvent::Gestorben { participant: id });
    }

    pub fn ereignis(&self, event: GlowEvent) {
        self.engine.ereignis_verarbeiten(event);
    }

    /// Arbeitet alle anstehenden verzoegerten Aufgaben ab
    pub fn tick(&self) {
        self.engine.ticks_bis_leer(16);
    }

    pub fn overlay(&self, target: ParticipantId) -> Option<OverlayRecord> {
        self.engine.state().overlay(&target)
    }

    /// Uebertragungsbits beider Objekte des Overlays von `target` fuer `viewer`
    pub fn bits(&self, viewer: ParticipantId, target: ParticipantId) -> [Option<bool>; 2] {
        let record = self
            .overlay(target)
            .expect("Ziel hat kein Overlay");
        [
            self.host.uebertragung(record.glow, viewer),
            self.host.uebertragung(record.ankerfolger, viewer),
        ]
    }

    pub fn sieht(&self, viewer: ParticipantId, target: ParticipantId) -> bool {
        self.bits(viewer, target) == [Some(true), Some(true)]
    }

    /// Alle Uebertragungsbits aller Overlays fuer alle Teilnehmer
    pub fn alle_bits(&self, teilnehmer: &[ParticipantId]) -> Vec<(WeakHandle, ParticipantId, Option<bool>)> {
        let mut records = self.engine.state().alle_overlays();
        records.sort_by_key(|r| r.target);
        let mut bits = Vec::new();
        for record in records {
            for handle in record.handles() {
                for p in teilnehmer {
                    bits.push((handle, *p, self.host.uebertragung(handle, *p)));
                }
            }
        }
        bits
    }
}
