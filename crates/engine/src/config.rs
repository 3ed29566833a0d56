//! Glow-Konfiguration
//!
//! Reine Daten: Rechte-Strings fuer die beiden Stufen und die Parameter
//! des Glow-Primitives. Laden und Neuladen passiert ausserhalb der Engine.

use glimmer_core::{Rgba, Team};
use serde::{Deserialize, Serialize};

use crate::host::GlowParameter;

/// Konfiguration der Overlay-Engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlowKonfiguration {
    /// Recht fuer volle Sicht (leer = jeder)
    pub recht_voll: String,
    /// Recht fuer eingeschraenkte Sicht, nur tot oder als Zuschauer (leer = jeder)
    pub recht_eingeschraenkt: String,
    /// Glow-Farbe fuer Team A
    pub farbe_team_a: Rgba,
    /// Glow-Farbe fuer Team B
    pub farbe_team_b: Rgba,
    /// Maximale Zeichenreichweite des Glows
    pub reichweite: i32,
    /// Glow-Typ des Primitives (3 = Umriss)
    pub glow_typ: i32,
    pub min_reichweite: i32,
}

impl Default for GlowKonfiguration {
    fn default() -> Self {
        Self {
            recht_voll: "@css/root".into(),
            recht_eingeschraenkt: "@css/generic".into(),
            farbe_team_a: Rgba::ROT,
            farbe_team_b: Rgba::BLAU,
            reichweite: i32::MAX,
            glow_typ: 3,
            min_reichweite: 0,
        }
    }
}

impl GlowKonfiguration {
    /// Teamfarbe des Ziels; neutrale Teams haben keine
    pub fn teamfarbe(&self, team: Team) -> Option<Rgba> {
        match team {
            Team::A => Some(self.farbe_team_a),
            Team::B => Some(self.farbe_team_b),
            Team::Keins | Team::Zuschauer => None,
        }
    }

    /// Glow-Parameter fuer ein Ziel im angegebenen Team
    pub fn glow_parameter(&self, team: Team) -> Option<GlowParameter> {
        self.teamfarbe(team).map(|farbe| GlowParameter {
            farbe,
            reichweite: self.reichweite,
            typ: self.glow_typ,
            team_filter: -1,
            min_reichweite: self.min_reichweite,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standardfarben() {
        let cfg = GlowKonfiguration::default();
        assert_eq!(cfg.teamfarbe(Team::A), Some(Rgba::ROT));
        assert_eq!(cfg.teamfarbe(Team::B), Some(Rgba::BLAU));
        assert_eq!(cfg.teamfarbe(Team::Zuschauer), None);
        assert_eq!(cfg.teamfarbe(Team::Keins), None);
    }

    #[test]
    fn glow_parameter_ohne_teamfilter() {
        let p = GlowKonfiguration::default()
            .glow_parameter(Team::B)
            .unwrap();
        assert_eq!(p.team_filter, -1);
        assert_eq!(p.min_reichweite, 0);
        assert_eq!(p.reichweite, i32::MAX);
        assert_eq!(p.typ, 3);
    }

    #[test]
    fn config_aus_toml_string() {
        let toml = r#"
            recht_voll = ""
            glow_typ = 2

            [farbe_team_a]
            r = 0
            g = 255
            b = 0
            a = 255
        "#;
        let cfg: GlowKonfiguration = toml::from_str(toml).unwrap();
        assert_eq!(cfg.recht_voll, "");
        assert_eq!(cfg.glow_typ, 2);
        assert_eq!(cfg.farbe_team_a, Rgba::neu(0, 255, 0, 255));
        // Nicht angegebene Felder behalten Standardwerte
        assert_eq!(cfg.recht_eingeschraenkt, "@css/generic");
        assert_eq!(cfg.farbe_team_b, Rgba::BLAU);
    }
}
