//! SimHost – In-Memory-Host fuer Tests und den Demo-Server
//!
//! Bildet Roster, Rechte und Entity-Registry nach. Weltveraenderungen
//! (Spawn, Tod, Kartenwechsel ...) werden ueber eigene Methoden ausgeloest;
//! die passenden Ereignisse muss der Aufrufer danach an die Engine geben.
//!
//! Ueber [`SimHost::fehler_einschleusen`] laesst sich ein Host-Aufruf
//! gezielt fehlschlagen, ueber [`SimHost::tod_einschleusen`] stirbt ein
//! Teilnehmer mitten in einem Host-Aufruf.

use glimmer_core::{GlimmerError, ParticipantId, PersistentId, Result, Rgba, Team, WeakHandle};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::host::{EntityHost, GlowParameter, ObjektFlags, PermissionOracle, TeilnehmerInfo};

/// Objekt in der simulierten Entity-Registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimEntity {
    pub handle: WeakHandle,
    pub modell: String,
    /// `None` fuer Spielerkoerper
    pub flags: Option<ObjektFlags>,
    pub eltern: Option<WeakHandle>,
    pub renderfarbe: Option<Rgba>,
    pub glow: Option<GlowParameter>,
    /// Modell-Subsystem fertig initialisiert
    pub bereit: bool,
}

#[derive(Debug, Clone)]
struct SimTeilnehmer {
    info: TeilnehmerInfo,
    anker: Option<WeakHandle>,
    rechte: HashSet<String>,
}

#[derive(Default)]
struct SimWelt {
    teilnehmer: BTreeMap<ParticipantId, SimTeilnehmer>,
    entities: HashMap<u32, SimEntity>,
    naechster_index: u32,
    naechste_seriennummer: u32,
    uebertragung: HashMap<(WeakHandle, ParticipantId), bool>,
    fehler: HashSet<&'static str>,
    tode: HashMap<&'static str, ParticipantId>,
}

impl SimWelt {
    fn entity_anlegen(&mut self, modell: &str, flags: Option<ObjektFlags>, bereit: bool) -> WeakHandle {
        self.naechster_index += 1;
        self.naechste_seriennummer += 1;
        let handle = WeakHandle::neu(self.naechster_index, self.naechste_seriennummer);
        self.entities.insert(
            handle.index,
            SimEntity {
                handle,
                modell: modell.to_string(),
                flags,
                eltern: None,
                renderfarbe: None,
                glow: None,
                bereit,
            },
        );
        handle
    }

    fn entity(&self, handle: WeakHandle) -> Option<&SimEntity> {
        self.entities
            .get(&handle.index)
            .filter(|e| e.handle == handle)
    }

    fn entity_mut(&mut self, handle: WeakHandle) -> Result<&mut SimEntity> {
        self.entities
            .get_mut(&handle.index)
            .filter(|e| e.handle == handle)
            .ok_or(GlimmerError::EntityUngueltig(handle))
    }

    fn entity_zerstoeren(&mut self, handle: WeakHandle) -> bool {
        if self.entity(handle).is_none() {
            return false;
        }
        self.entities.remove(&handle.index);
        self.uebertragung.retain(|(h, _), _| *h != handle);
        true
    }

    fn pruefen(&mut self, aufruf: &'static str) -> Result<()> {
        if let Some(id) = self.tode.remove(aufruf) {
            if let Some(t) = self.teilnehmer.get_mut(&id) {
                t.info.lebt = false;
            }
        }
        if self.fehler.contains(aufruf) {
            return Err(GlimmerError::host(aufruf, "eingeschleuster Fehler"));
        }
        Ok(())
    }
}

/// Simulierter Host
#[derive(Default)]
pub struct SimHost {
    welt: Mutex<SimWelt>,
}

impl SimHost {
    pub fn neu() -> Self {
        Self::default()
    }

    // --- Weltveraenderungen ---

    /// Verbindet einen Teilnehmer (ohne Team, nicht lebendig)
    ///
    /// Ein belegter Slot wird ersetzt: der alte Koerper verschwindet, die
    /// Rechte bleiben nur bei gleicher persistenter Id erhalten.
    pub fn verbinden(&self, id: ParticipantId, persistent_id: PersistentId, ist_bot: bool) {
        let mut welt = self.welt.lock();
        let mut rechte = HashSet::new();
        if let Some(alt) = welt.teilnehmer.remove(&id) {
            if let Some(anker) = alt.anker {
                welt.entity_zerstoeren(anker);
            }
            welt.uebertragung.retain(|(_, v), _| *v != id);
            if alt.info.persistent_id == persistent_id {
                rechte = alt.rechte;
            }
        }
        welt.teilnehmer.insert(
            id,
            SimTeilnehmer {
                info: TeilnehmerInfo {
                    id,
                    persistent_id,
                    ist_bot,
                    team: Team::Keins,
                    lebt: false,
                },
                anker: None,
                rechte,
            },
        );
    }

    pub fn recht_geben(&self, id: ParticipantId, recht: &str) {
        if let Some(t) = self.welt.lock().teilnehmer.get_mut(&id) {
            t.rechte.insert(recht.to_string());
        }
    }

    pub fn recht_entziehen(&self, id: ParticipantId, recht: &str) {
        if let Some(t) = self.welt.lock().teilnehmer.get_mut(&id) {
            t.rechte.remove(recht);
        }
    }

    pub fn team_setzen(&self, id: ParticipantId, team: Team) {
        if let Some(t) = self.welt.lock().teilnehmer.get_mut(&id) {
            t.info.team = team;
        }
    }

    /// Spawnt mit fertig initialisiertem Koerper
    pub fn spawnen(&self, id: ParticipantId, modell: &str) -> Option<WeakHandle> {
        self.spawnen_mit(id, modell, true)
    }

    /// Spawnt, das Modell-Subsystem ist aber noch nicht bereit
    pub fn spawnen_unfertig(&self, id: ParticipantId, modell: &str) -> Option<WeakHandle> {
        self.spawnen_mit(id, modell, false)
    }

    fn spawnen_mit(&self, id: ParticipantId, modell: &str, bereit: bool) -> Option<WeakHandle> {
        let mut welt = self.welt.lock();
        let alter_anker = welt.teilnehmer.get(&id)?.anker;
        if let Some(alt) = alter_anker {
            welt.entity_zerstoeren(alt);
        }
        let anker = welt.entity_anlegen(modell, None, bereit);
        let t = welt.teilnehmer.get_mut(&id)?;
        t.anker = Some(anker);
        t.info.lebt = true;
        Some(anker)
    }

    /// Schliesst die Initialisierung des Koerpers ab
    pub fn koerper_fertigstellen(&self, id: ParticipantId) {
        let mut welt = self.welt.lock();
        if let Some(anker) = welt.teilnehmer.get(&id).and_then(|t| t.anker) {
            if let Ok(e) = welt.entity_mut(anker) {
                e.bereit = true;
            }
        }
    }

    /// Der Koerper bleibt als Leiche bestehen
    pub fn sterben(&self, id: ParticipantId) {
        if let Some(t) = self.welt.lock().teilnehmer.get_mut(&id) {
            t.info.lebt = false;
        }
    }

    pub fn trennen(&self, id: ParticipantId) {
        let mut welt = self.welt.lock();
        if let Some(t) = welt.teilnehmer.remove(&id) {
            if let Some(anker) = t.anker {
                welt.entity_zerstoeren(anker);
            }
        }
        welt.uebertragung.retain(|(_, v), _| *v != id);
    }

    pub fn modell_wechseln(&self, id: ParticipantId, modell: &str) {
        let mut welt = self.welt.lock();
        if let Some(anker) = welt.teilnehmer.get(&id).and_then(|t| t.anker) {
            if let Ok(e) = welt.entity_mut(anker) {
                e.modell = modell.to_string();
            }
        }
    }

    /// Mensch uebernimmt Koerper, Team und Lebenszustand des Bots
    pub fn uebernehmen(&self, bot: ParticipantId, mensch: ParticipantId) {
        let mut welt = self.welt.lock();
        let Some(b) = welt.teilnehmer.get_mut(&bot) else {
            return;
        };
        let anker = b.anker.take();
        let team = b.info.team;
        let lebt = b.info.lebt;
        b.info.lebt = false;
        if let Some(m) = welt.teilnehmer.get_mut(&mensch) {
            m.anker = anker;
            m.info.team = team;
            m.info.lebt = lebt;
        }
    }

    /// Zerstoert ein Objekt ausserhalb der Engine
    pub fn entity_zerstoeren(&self, handle: WeakHandle) -> bool {
        self.welt.lock().entity_zerstoeren(handle)
    }

    /// Kartenwechsel: alle Objekte verschwinden, Teilnehmer sind tot
    pub fn karte_wechseln(&self) {
        let mut welt = self.welt.lock();
        welt.entities.clear();
        welt.uebertragung.clear();
        for t in welt.teilnehmer.values_mut() {
            t.anker = None;
            t.info.lebt = false;
        }
    }

    /// Laesst den angegebenen Host-Aufruf ab jetzt fehlschlagen
    pub fn fehler_einschleusen(&self, aufruf: &'static str) {
        self.welt.lock().fehler.insert(aufruf);
    }

    pub fn fehler_beheben(&self) {
        self.welt.lock().fehler.clear();
    }

    /// Laesst `id` beim naechsten Aufruf von `aufruf` sterben
    ///
    /// Der Aufruf selbst gelingt. Ein Ereignis wird nicht gemeldet.
    pub fn tod_einschleusen(&self, aufruf: &'static str, id: ParticipantId) {
        self.welt.lock().tode.insert(aufruf, id);
    }

    // --- Abfragen ---

    pub fn entity(&self, handle: WeakHandle) -> Option<SimEntity> {
        self.welt.lock().entity(handle).cloned()
    }

    /// Zuletzt gesetzte Uebertragung, `None` wenn nie gesetzt
    pub fn uebertragung(&self, handle: WeakHandle, betrachter: ParticipantId) -> Option<bool> {
        self.welt
            .lock()
            .uebertragung
            .get(&(handle, betrachter))
            .copied()
    }

    /// Anzahl existierender Overlay-Objekte (ohne Spielerkoerper)
    pub fn overlay_objekte(&self) -> usize {
        self.welt
            .lock()
            .entities
            .values()
            .filter(|e| e.flags.is_some())
            .count()
    }
}

impl EntityHost for SimHost {
    fn teilnehmer(&self, id: ParticipantId) -> Option<TeilnehmerInfo> {
        self.welt.lock().teilnehmer.get(&id).map(|t| t.info.clone())
    }

    fn alle_teilnehmer(&self) -> Vec<TeilnehmerInfo> {
        self.welt
            .lock()
            .teilnehmer
            .values()
            .map(|t| t.info.clone())
            .collect()
    }

    fn anker(&self, id: ParticipantId) -> Option<WeakHandle> {
        self.welt.lock().teilnehmer.get(&id).and_then(|t| t.anker)
    }

    fn ist_gueltig(&self, handle: WeakHandle) -> bool {
        self.welt.lock().entity(handle).is_some()
    }

    fn modell_aufloesen(&self, anker: WeakHandle) -> Option<String> {
        self.welt
            .lock()
            .entity(anker)
            .filter(|e| e.bereit)
            .map(|e| e.modell.clone())
    }

    fn objekt_erstellen(&self, modell: &str, flags: ObjektFlags) -> Result<WeakHandle> {
        let mut welt = self.welt.lock();
        welt.pruefen("objekt_erstellen")?;
        Ok(welt.entity_anlegen(modell, Some(flags), true))
    }

    fn folgen(&self, kind: WeakHandle, eltern: WeakHandle) -> Result<()> {
        let mut welt = self.welt.lock();
        welt.pruefen("folgen")?;
        if welt.entity(eltern).is_none() {
            return Err(GlimmerError::EntityUngueltig(eltern));
        }
        welt.entity_mut(kind)?.eltern = Some(eltern);
        Ok(())
    }

    fn renderfarbe_setzen(&self, handle: WeakHandle, farbe: Rgba) -> Result<()> {
        let mut welt = self.welt.lock();
        welt.pruefen("renderfarbe_setzen")?;
        welt.entity_mut(handle)?.renderfarbe = Some(farbe);
        Ok(())
    }

    fn glow_setzen(&self, handle: WeakHandle, parameter: &GlowParameter) -> Result<()> {
        let mut welt = self.welt.lock();
        welt.pruefen("glow_setzen")?;
        welt.entity_mut(handle)?.glow = Some(*parameter);
        Ok(())
    }

    fn uebertragung_setzen(
        &self,
        handle: WeakHandle,
        betrachter: ParticipantId,
        senden: bool,
    ) -> Result<()> {
        let mut welt = self.welt.lock();
        welt.pruefen("uebertragung_setzen")?;
        welt.entity_mut(handle)?;
        welt.uebertragung.insert((handle, betrachter), senden);
        Ok(())
    }

    fn entfernen(&self, handle: WeakHandle) -> Result<()> {
        let mut welt = self.welt.lock();
        welt.pruefen("entfernen")?;
        if welt.entity_zerstoeren(handle) {
            Ok(())
        } else {
            Err(GlimmerError::EntityUngueltig(handle))
        }
    }
}

impl PermissionOracle for SimHost {
    fn hat_recht(&self, id: ParticipantId, recht: &str) -> bool {
        self.welt
            .lock()
            .teilnehmer
            .get(&id)
            .map(|t| t.rechte.contains(recht))
            .unwrap_or(false)
    }
}
