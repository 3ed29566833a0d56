//! JSON-Zeilen-Eingabe fuer den simulierten Host
//!
//! Jede Zeile ist ein Objekt mit dem Feld `cmd`, z.B.
//!
//! ```text
//! {"cmd":"connect","slot":1,"pid":76001,"rechte":["@css/root"]}
//! {"cmd":"spawn","slot":2,"team":"b","modell":"models/bot.mdl"}
//! {"cmd":"toggle","slot":1}
//! ```
//!
//! Weltveraenderungen gehen zuerst an den [`SimHost`], danach wird das
//! passende Ereignis ueber den Bus gemeldet. `toggle`, `reload` und
//! `status` liefern eine [`Ausgabe`] zurueck.

use anyhow::Result;
use glimmer_core::{EventBus, GlimmerError, GlowEvent, ParticipantId, PersistentId, Team};
use glimmer_engine::statistik::StatistikSnapshot;
use glimmer_engine::{BefehlAntwort, EntityHost, OverlayEngine, SimHost, TickQueue};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::ServerConfig;

/// Engine-Instanz des Demo-Servers
pub type GlimmerEngine = OverlayEngine<SimHost, SimHost, TickQueue>;

/// Eine Eingabezeile
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Eingabe {
    Connect {
        slot: u32,
        #[serde(default)]
        pid: u64,
        #[serde(default)]
        bot: bool,
        #[serde(default)]
        rechte: Vec<String>,
    },
    Spawn {
        slot: u32,
        team: Team,
        modell: String,
    },
    Die {
        slot: u32,
    },
    Disconnect {
        slot: u32,
    },
    Team {
        slot: u32,
        team: Team,
    },
    Takeover {
        bot: u32,
        mensch: u32,
    },
    RoundEnd,
    RoundPrestart,
    MapUnload,
    Toggle {
        slot: u32,
    },
    Reload,
    Status,
}

/// Rueckmeldung auf stdout
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "typ", rename_all = "snake_case")]
pub enum Ausgabe {
    Befehl { slot: u32, antwort: BefehlAntwort },
    NeuGeladen,
    Statistik { statistik: StatistikSnapshot },
    Fehler { meldung: String },
}

/// Verbindet Eingabe, simulierten Host, Bus und Engine
pub struct Sitzung<B: EventBus> {
    host: Arc<SimHost>,
    engine: Arc<GlimmerEngine>,
    bus: B,
    config_pfad: String,
}

impl<B: EventBus> Sitzung<B> {
    pub fn neu(
        host: Arc<SimHost>,
        engine: Arc<GlimmerEngine>,
        bus: B,
        config_pfad: impl Into<String>,
    ) -> Self {
        Self {
            host,
            engine,
            bus,
            config_pfad: config_pfad.into(),
        }
    }

    /// Verarbeitet eine Rohzeile; leere Zeilen werden ignoriert
    pub fn zeile_verarbeiten(&self, zeile: &str) -> Option<Ausgabe> {
        let zeile = zeile.trim();
        if zeile.is_empty() {
            return None;
        }

        let eingabe = match serde_json::from_str::<Eingabe>(zeile) {
            Ok(eingabe) => eingabe,
            Err(e) => {
                tracing::warn!(fehler = %e, "Ungueltige Eingabezeile");
                return Some(Ausgabe::Fehler {
                    meldung: format!("ungueltige Eingabe: {e}"),
                });
            }
        };

        match self.ausfuehren(eingabe) {
            Ok(ausgabe) => ausgabe,
            Err(e) => {
                tracing::warn!(fehler = %e, "Eingabe fehlgeschlagen");
                Some(Ausgabe::Fehler {
                    meldung: e.to_string(),
                })
            }
        }
    }

    pub fn ausfuehren(&self, eingabe: Eingabe) -> Result<Option<Ausgabe>> {
        let ereignis = match eingabe {
            Eingabe::Connect {
                slot,
                pid,
                bot,
                rechte,
            } => {
                let id = ParticipantId(slot);
                self.host.verbinden(id, PersistentId(pid), bot);
                for recht in &rechte {
                    self.host.recht_geben(id, recht);
                }
                GlowEvent::Verbunden { participant: id }
            }
            Eingabe::Spawn { slot, team, modell } => {
                let id = self.bekannt(slot)?;
                self.host.team_setzen(id, team);
                self.host.spawnen(id, &modell);
                GlowEvent::Gespawnt { participant: id }
            }
            Eingabe::Die { slot } => {
                let id = self.bekannt(slot)?;
                self.host.sterben(id);
                GlowEvent::Gestorben { participant: id }
            }
            Eingabe::Disconnect { slot } => {
                let id = self.bekannt(slot)?;
                self.host.trennen(id);
                GlowEvent::Getrennt { participant: id }
            }
            Eingabe::Team { slot, team } => {
                let id = self.bekannt(slot)?;
                self.host.team_setzen(id, team);
                GlowEvent::TeamGewechselt {
                    participant: id,
                    neues_team: team,
                }
            }
            Eingabe::Takeover { bot, mensch } => {
                let bot = self.bekannt(bot)?;
                let mensch = self.bekannt(mensch)?;
                self.host.uebernehmen(bot, mensch);
                GlowEvent::Uebernahme { bot, mensch }
            }
            Eingabe::RoundEnd => GlowEvent::RundenEnde,
            Eingabe::RoundPrestart => GlowEvent::RundenVorstart,
            Eingabe::MapUnload => {
                self.host.karte_wechseln();
                GlowEvent::KarteEntladen
            }
            Eingabe::Toggle { slot } => {
                let antwort = self.engine.wallhack_befehl(ParticipantId(slot));
                return Ok(Some(Ausgabe::Befehl { slot, antwort }));
            }
            Eingabe::Reload => {
                let config = ServerConfig::laden(&self.config_pfad)?;
                self.engine.konfiguration_neu_laden(config.glow);
                return Ok(Some(Ausgabe::NeuGeladen));
            }
            Eingabe::Status => {
                return Ok(Some(Ausgabe::Statistik {
                    statistik: self.engine.statistik(),
                }));
            }
        };

        self.bus.senden(ereignis)?;
        Ok(None)
    }

    fn bekannt(&self, slot: u32) -> Result<ParticipantId> {
        let id = ParticipantId(slot);
        if self.host.teilnehmer(id).is_none() {
            return Err(GlimmerError::TeilnehmerNichtGefunden(id).into());
        }
        Ok(id)
    }
}
