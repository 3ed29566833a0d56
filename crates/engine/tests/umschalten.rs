//! Integration-Tests fuer Abo-Umschaltung, Befehl und Wiederanlauf

mod common;

use common::{welt, EINGESCHRAENKT, VOLL};
use glimmer_core::{GlowEvent, PersistentId, ParticipantId, Team};
use glimmer_engine::{BefehlAntwort, TickQueue};

#[test]
fn einschalten_erstellt_overlays_fuer_lebende() {
    let w = welt();
    let v = w.mensch(1, &[VOLL]);
    let x = w.bot(2);
    let y = w.bot(3);
    let tot = w.bot(4);
    w.spawnen(x, Team::A, "m");
    w.spawnen(y, Team::B, "m");
    w.spawnen(tot, Team::B, "m");
    w.tick();
    w.sterben(tot);
    assert_eq!(w.engine.state().overlay_anzahl(), 0);

    assert!(w.engine.abo_umschalten(v));
    // Erstellung erst im naechsten Tick
    assert_eq!(w.engine.state().overlay_anzahl(), 0);
    assert_eq!(w.engine.planer().anzahl(), 2);
    w.tick();

    assert!(w.sieht(v, x));
    assert!(w.sieht(v, y));
    assert!(w.overlay(tot).is_none());
}

#[test]
fn einschalten_ersetzt_verwaisten_record() {
    let w = welt();
    let v1 = w.mensch(1, &[VOLL]);
    let v2 = w.mensch(2, &[VOLL]);
    w.engine.abo_umschalten(v1);
    let x = w.bot(3);
    w.spawnen(x, Team::A, "m");
    w.tick();
    let alt = w.overlay(x).unwrap();

    // Host zerstoert das Glow-Objekt ausserhalb der Engine
    w.host.entity_zerstoeren(alt.glow);

    w.engine.abo_umschalten(v2);
    assert!(w.overlay(x).is_none());
    w.tick();

    let neu = w.overlay(x).unwrap();
    assert_ne!(neu.glow, alt.glow);
    assert!(w.sieht(v1, x));
    assert!(w.sieht(v2, x));
}

#[test]
fn ausschalten_behaelt_overlays() {
    let w = welt();
    let v = w.mensch(1, &[VOLL]);
    let u = w.mensch(2, &[VOLL]);
    w.engine.abo_umschalten(v);
    w.engine.abo_umschalten(u);
    let x = w.bot(3);
    w.spawnen(x, Team::A, "m");
    w.tick();
    let record = w.overlay(x).unwrap();

    assert!(!w.engine.abo_umschalten(v));
    w.tick();

    assert_eq!(w.overlay(x), Some(record));
    assert_eq!(w.bits(v, x), [Some(false), Some(false)]);
    assert!(w.sieht(u, x));
}

#[test]
fn ausschalten_als_letzter_abonnent() {
    let w = welt();
    let v = w.mensch(1, &[VOLL]);
    w.engine.abo_umschalten(v);
    let x = w.bot(2);
    w.spawnen(x, Team::A, "m");
    w.tick();

    w.engine.abo_umschalten(v);
    w.tick();

    // Overlay bleibt bis zum naechsten Lebenszyklus-Ereignis
    assert!(w.overlay(x).is_some());
    assert_eq!(w.bits(v, x), [Some(false), Some(false)]);

    w.sterben(x);
    w.spawnen(x, Team::A, "m");
    w.tick();
    assert!(w.overlay(x).is_none());
}

#[test]
fn wieder_einschalten_nutzt_bestehende_overlays() {
    let w = welt();
    let v = w.mensch(1, &[VOLL]);
    w.engine.abo_umschalten(v);
    let x = w.bot(2);
    w.spawnen(x, Team::B, "m");
    w.tick();
    let record = w.overlay(x).unwrap();

    w.engine.abo_umschalten(v);
    w.engine.abo_umschalten(v);
    w.tick();

    assert_eq!(w.overlay(x), Some(record));
    assert!(w.sieht(v, x));
    assert_eq!(w.engine.statistik().overlays_erstellt, 1);
}

#[test]
fn eingeschraenkt_lebend_plant_nichts_ein() {
    let w = welt();
    let v = w.mensch(1, &[EINGESCHRAENKT]);
    w.spawnen(v, Team::B, "m");
    let x = w.bot(2);
    w.spawnen(x, Team::A, "m");
    w.tick();

    assert!(w.engine.abo_umschalten(v));
    assert!(w.engine.planer().ist_leer());
}

#[test]
fn unbekannter_betrachter_bekommt_abo() {
    let w = welt();
    let v = ParticipantId(9);
    assert!(w.engine.abo_umschalten(v));
    assert!(w.engine.state().abo_aktiv(&v));
    assert!(w.engine.planer().ist_leer());
}

#[test]
fn befehl_antworten() {
    let w = welt();
    let voll = w.mensch(1, &[VOLL]);
    let begrenzt = w.mensch(2, &[EINGESCHRAENKT]);
    let ohne = w.mensch(3, &[]);
    let bot = w.bot(4);
    w.spawnen(begrenzt, Team::A, "m");

    assert_eq!(w.engine.wallhack_befehl(voll), BefehlAntwort::Aktiviert);
    assert_eq!(w.engine.wallhack_befehl(voll), BefehlAntwort::Deaktiviert);
    assert_eq!(
        w.engine.wallhack_befehl(begrenzt),
        BefehlAntwort::AktiviertNurTot
    );
    assert_eq!(w.engine.wallhack_befehl(ohne), BefehlAntwort::KeineBerechtigung);
    assert_eq!(w.engine.wallhack_befehl(bot), BefehlAntwort::KeineBerechtigung);
    assert_eq!(
        w.engine.wallhack_befehl(ParticipantId(99)),
        BefehlAntwort::KeineBerechtigung
    );

    assert!(!w.engine.state().hat_abo(&ohne));
    assert!(!w.engine.state().hat_abo(&bot));
}

#[test]
fn befehl_tot_eingeschraenkt_ist_voll_aktiv() {
    let w = welt();
    let begrenzt = w.mensch(1, &[EINGESCHRAENKT]);
    assert_eq!(w.engine.wallhack_befehl(begrenzt), BefehlAntwort::Aktiviert);
}

#[test]
fn befehl_antwort_serialisierung() {
    let json = serde_json::to_string(&BefehlAntwort::AktiviertNurTot).unwrap();
    assert_eq!(json, "\"aktiviert_nur_tot\"");
}

#[test]
fn verbinden_legt_deaktiviertes_abo_an() {
    let w = welt();
    let v = w.mensch(1, &[EINGESCHRAENKT]);
    let ohne = w.mensch(2, &[]);
    let bot = w.bot(3);

    assert!(w.engine.state().hat_abo(&v));
    assert!(!w.engine.state().abo_aktiv(&v));
    assert!(!w.engine.state().hat_abo(&ohne));
    assert!(!w.engine.state().hat_abo(&bot));
}

#[test]
fn bootstrap_nach_neustart() {
    let w = welt();
    let v = w.mensch(1, &[VOLL]);
    w.engine.abo_umschalten(v);

    // Neue Engine auf demselben Host: Zustand ist leer
    let planer = std::sync::Arc::new(TickQueue::neu());
    let neu = glimmer_engine::OverlayEngine::neu(
        w.host.clone(),
        w.host.clone(),
        planer,
        w.engine.konfiguration(),
    );
    let u = ParticipantId(2);
    w.host.verbinden(u, PersistentId(76_002), false);
    w.host.recht_geben(u, EINGESCHRAENKT);
    let bot = ParticipantId(3);
    w.host.verbinden(bot, PersistentId(0), true);

    neu.bootstrap();

    assert_eq!(neu.state().abo_anzahl(), 2);
    assert!(!neu.state().abo_aktiv(&v), "Aktivierung wird nie wiederhergestellt");
    assert!(neu.state().hat_abo(&u));
    assert!(!neu.state().hat_abo(&bot));
}

#[test]
fn karte_entladen_dann_neu_verbinden() {
    let w = welt();
    let v = w.mensch(1, &[VOLL]);
    w.engine.abo_umschalten(v);
    w.ereignis(GlowEvent::KarteEntladen);
    assert_eq!(w.engine.state().abo_anzahl(), 0);

    w.ereignis(GlowEvent::Verbunden { participant: v });
    assert!(w.engine.state().hat_abo(&v));
    assert!(!w.engine.state().abo_aktiv(&v));
}
