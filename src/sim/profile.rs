//! Level and breath-phase tuning tables
//!
//! Everything here is a pure lookup. Unknown tags never error: they resolve
//! to the quietest flame (dormant level, hold-empty breath).

use serde::{Deserialize, Serialize};

use crate::color::Rgba;

/// Progression tier, ordered from quietest to brightest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Level {
    #[default]
    Dormant,
    Building,
    Strong,
    Peak,
}

impl Level {
    /// All tiers in intensity order
    pub const ALL: [Level; 4] = [Level::Dormant, Level::Building, Level::Strong, Level::Peak];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Dormant => "dormant",
            Level::Building => "building",
            Level::Strong => "strong",
            Level::Peak => "peak",
        }
    }

    /// Parse a tier tag, accepting the progression calculator's bonfire names
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "dormant" | "smoldering" => Some(Level::Dormant),
            "building" | "steady-flame" | "steady" => Some(Level::Building),
            "strong" | "roaring" => Some(Level::Strong),
            "peak" | "first-flame" => Some(Level::Peak),
            _ => None,
        }
    }

    /// Like `parse`, but unknown tags fall back to `Dormant`
    pub fn from_tag(s: &str) -> Self {
        Self::parse(s).unwrap_or_else(|| {
            log::debug!("Unknown level tag {:?}, using dormant", s);
            Level::Dormant
        })
    }

    /// Static tuning for this tier
    pub fn profile(&self) -> LevelProfile {
        match self {
            Level::Dormant => LevelProfile {
                base_size: 80.0,
                particle_density: 15.0,
                ember_spawn_probability: 0.3,
                glow_intensity: 0.6,
                flame_height_multiplier: 1.2,
            },
            Level::Building => LevelProfile {
                base_size: 95.0,
                particle_density: 18.0,
                ember_spawn_probability: 0.45,
                glow_intensity: 0.75,
                flame_height_multiplier: 1.3,
            },
            Level::Strong => LevelProfile {
                base_size: 110.0,
                particle_density: 23.0,
                ember_spawn_probability: 0.55,
                glow_intensity: 0.95,
                flame_height_multiplier: 1.4,
            },
            Level::Peak => LevelProfile {
                base_size: 130.0,
                particle_density: 30.0,
                ember_spawn_probability: 0.7,
                glow_intensity: 1.2,
                flame_height_multiplier: 1.5,
            },
        }
    }
}

/// Static tuning bundle selected by progression tier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelProfile {
    /// Flame footprint in px (> 0)
    pub base_size: f32,
    /// Flame spawn trials per tick at unit intensity (> 0)
    pub particle_density: f32,
    /// Ember spawn chance per tick at unit intensity
    pub ember_spawn_probability: f32,
    /// Scene glow strength
    pub glow_intensity: f32,
    /// Upward velocity multiplier
    pub flame_height_multiplier: f32,
}

/// Phase of a respiration cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BreathPhase {
    Inhale,
    #[serde(alias = "hold")]
    HoldFull,
    Exhale,
    HoldEmpty,
}

impl BreathPhase {
    pub const ALL: [BreathPhase; 4] = [
        BreathPhase::Inhale,
        BreathPhase::HoldFull,
        BreathPhase::Exhale,
        BreathPhase::HoldEmpty,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BreathPhase::Inhale => "inhale",
            BreathPhase::HoldFull => "hold-full",
            BreathPhase::Exhale => "exhale",
            BreathPhase::HoldEmpty => "hold-empty",
        }
    }

    /// Parse a phase tag as emitted by the breathing sequencer
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "inhale" => Some(BreathPhase::Inhale),
            "hold" | "hold-full" => Some(BreathPhase::HoldFull),
            "exhale" => Some(BreathPhase::Exhale),
            "hold-empty" => Some(BreathPhase::HoldEmpty),
            _ => None,
        }
    }
}

/// Desired scale/intensity implied by the current breath
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreathTarget {
    pub scale: f32,
    pub intensity: f32,
}

impl BreathTarget {
    pub const fn new(scale: f32, intensity: f32) -> Self {
        Self { scale, intensity }
    }
}

/// Phase -> target table, plus the resting target used when not breathing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreathTargets {
    pub inhale: BreathTarget,
    pub hold_full: BreathTarget,
    pub exhale: BreathTarget,
    pub hold_empty: BreathTarget,
    pub idle: BreathTarget,
}

impl Default for BreathTargets {
    fn default() -> Self {
        Self {
            inhale: BreathTarget::new(1.4, 1.3),
            hold_full: BreathTarget::new(1.1, 1.1),
            exhale: BreathTarget::new(0.7, 0.8),
            hold_empty: BreathTarget::new(0.9, 0.9),
            idle: BreathTarget::new(1.0, 1.0),
        }
    }
}

impl BreathTargets {
    /// Target for the given breathing state.
    ///
    /// Breathing with no known phase falls back to hold-empty.
    pub fn target_for(&self, is_breathing: bool, phase: Option<BreathPhase>) -> BreathTarget {
        if !is_breathing {
            return self.idle;
        }
        match phase {
            Some(BreathPhase::Inhale) => self.inhale,
            Some(BreathPhase::HoldFull) => self.hold_full,
            Some(BreathPhase::Exhale) => self.exhale,
            Some(BreathPhase::HoldEmpty) | None => self.hold_empty,
        }
    }
}

/// Optional covenant whose color tints the scene glow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Covenant {
    Respite,
    Focus,
    Vigor,
}

impl Covenant {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "respite" => Some(Covenant::Respite),
            "focus" => Some(Covenant::Focus),
            "vigor" => Some(Covenant::Vigor),
            _ => None,
        }
    }

    /// Glow color (opaque; the compositor applies its own alpha)
    pub fn glow_color(&self) -> Rgba {
        match self {
            Covenant::Respite => Rgba::rgb(59, 130, 246),
            Covenant::Focus => Rgba::rgb(203, 213, 225),
            Covenant::Vigor => Rgba::rgb(251, 191, 36),
        }
    }
}

/// Resolved constants for one set of inputs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tuning {
    pub profile: LevelProfile,
    pub target: BreathTarget,
}

/// Resolve `(level, is_breathing, phase)` into tuning constants
pub fn resolve(
    level: Level,
    is_breathing: bool,
    phase: Option<BreathPhase>,
    targets: &BreathTargets,
) -> Tuning {
    Tuning {
        profile: level.profile(),
        target: targets.target_for(is_breathing, phase),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiles_non_decreasing() {
        for pair in Level::ALL.windows(2) {
            let lo = pair[0].profile();
            let hi = pair[1].profile();
            assert!(hi.base_size >= lo.base_size, "{:?} -> {:?}", pair[0], pair[1]);
            assert!(hi.particle_density >= lo.particle_density);
            assert!(hi.ember_spawn_probability >= lo.ember_spawn_probability);
            assert!(hi.glow_intensity >= lo.glow_intensity);
            assert!(hi.flame_height_multiplier >= lo.flame_height_multiplier);
        }
    }

    #[test]
    fn test_profiles_positive() {
        for level in Level::ALL {
            let p = level.profile();
            assert!(p.base_size > 0.0);
            assert!(p.particle_density > 0.0);
        }
    }

    #[test]
    fn test_level_tags() {
        assert_eq!(Level::from_tag("first-flame"), Level::Peak);
        assert_eq!(Level::from_tag("Roaring"), Level::Strong);
        assert_eq!(Level::from_tag("steady-flame"), Level::Building);
        assert_eq!(Level::from_tag("peak"), Level::Peak);
        assert_eq!(Level::from_tag("inferno"), Level::Dormant);
        assert_eq!(Level::from_tag(""), Level::Dormant);
    }

    #[test]
    fn test_phase_tags() {
        assert_eq!(BreathPhase::parse("hold"), Some(BreathPhase::HoldFull));
        assert_eq!(BreathPhase::parse("hold-empty"), Some(BreathPhase::HoldEmpty));
        assert_eq!(BreathPhase::parse("sigh"), None);
    }

    #[test]
    fn test_idle_ignores_phase() {
        let targets = BreathTargets::default();
        for phase in BreathPhase::ALL {
            assert_eq!(targets.target_for(false, Some(phase)), targets.idle);
        }
    }

    #[test]
    fn test_missing_phase_is_hold_empty() {
        let targets = BreathTargets::default();
        assert_eq!(targets.target_for(true, None), targets.hold_empty);
    }

    #[test]
    fn test_inhale_expands_exhale_contracts() {
        let targets = BreathTargets::default();
        let inhale = targets.target_for(true, Some(BreathPhase::Inhale));
        let exhale = targets.target_for(true, Some(BreathPhase::Exhale));
        assert!(inhale.scale > targets.idle.scale);
        assert!(exhale.scale < targets.idle.scale);
        assert!(inhale.intensity > exhale.intensity);
    }

    #[test]
    fn test_resolve_is_pure() {
        let targets = BreathTargets::default();
        let a = resolve(Level::Strong, true, Some(BreathPhase::Exhale), &targets);
        let b = resolve(Level::Strong, true, Some(BreathPhase::Exhale), &targets);
        assert_eq!(a, b);
        assert_eq!(a.profile, Level::Strong.profile());
        assert_eq!(a.target, targets.exhale);
    }

    #[test]
    fn test_serde_tags() {
        let phase: BreathPhase = serde_json::from_str("\"hold\"").unwrap();
        assert_eq!(phase, BreathPhase::HoldFull);
        let level: Level = serde_json::from_str("\"peak\"").unwrap();
        assert_eq!(level, Level::Peak);
    }
}
