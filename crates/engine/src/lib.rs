//! glimmer-engine – Overlay-Lebenszyklus und Sichtbarkeit
//!
//! Haelt eine Menge von Glow-Overlays synchron mit einer staendig
//! wechselnden Teilnehmerpopulation und berechnet pro Betrachter, welche
//! Overlays an dessen Client uebertragen werden.
//!
//! ## Module
//! - [`host`] – Schnittstellen zum Host (Entity-Registry, Rechte, Tick)
//! - [`state`] – Overlay- und Abo-Speicher (DashMap, atomar pro Schluessel)
//! - [`visibility`] – Sichtbarkeitsregel und Uebertragungs-Updates
//! - [`lifecycle`] – Reaktion auf Lebenszyklus-Ereignisse
//! - [`toggle`] – Abo-Umschaltung fuer Betrachter
//! - [`scheduler`] – Verzoegerte Aufgaben fuer den naechsten Tick
//! - [`befehl`] – Adapter fuer die Befehls-Oberflaeche
//! - [`config`] – Glow- und Rechte-Konfiguration
//! - [`statistik`] – Zaehler fuer Metriken
//! - [`sim`] – In-Memory-Host fuer Tests und Demo-Server

pub mod befehl;
pub mod config;
pub mod engine;
pub mod host;
pub mod lifecycle;
pub mod scheduler;
pub mod sim;
pub mod state;
pub mod statistik;
pub mod toggle;
pub mod visibility;

pub use befehl::BefehlAntwort;
pub use config::GlowKonfiguration;
pub use engine::OverlayEngine;
pub use host::{EntityHost, PermissionOracle, TeilnehmerInfo, TickScheduler};
pub use scheduler::{Aufgabe, TickQueue};
pub use sim::SimHost;
pub use state::{OverlayRecord, OverlayState, SubscriptionRecord};
pub use visibility::{kann_sehen, Berechtigungen};
