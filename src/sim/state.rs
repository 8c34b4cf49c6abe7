//! Flame state owned by one engine instance
//!
//! Pools, smoothing and the simulation clock. Nothing here is shared between
//! engines: two flames on one page each own a `FlameState`.

use glam::Vec2;

use super::particle::{Ember, FlameParticle, SpawnContext};
use super::profile::{BreathPhase, Covenant, Level, Tuning, resolve};
use super::smoothing::Smoother;
use crate::emission_origin;
use crate::settings::Settings;

/// External inputs fed in by the session collaborators
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FlameInputs {
    pub level: Level,
    /// Whether breath phases drive the flame (false = idle decoration)
    pub is_breathing: bool,
    /// Current phase; `None` when the sequencer is not running
    pub phase: Option<BreathPhase>,
    pub covenant: Option<Covenant>,
}

impl FlameInputs {
    /// Idle (decorative) flame at the given level
    pub fn idle(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// Phase-driven flame
    pub fn breathing(level: Level, phase: BreathPhase) -> Self {
        Self {
            level,
            is_breathing: true,
            phase: Some(phase),
            covenant: None,
        }
    }

    pub fn with_covenant(mut self, covenant: Covenant) -> Self {
        self.covenant = Some(covenant);
        self
    }

    /// Inputs from host string tags (e.g. canvas `data-*` attributes).
    ///
    /// Missing or unknown tags fall back: dormant level, no phase, no covenant.
    /// Breathing is on for `true`, `1` or `yes`.
    pub fn from_tags(
        level: Option<&str>,
        phase: Option<&str>,
        breathing: Option<&str>,
        covenant: Option<&str>,
    ) -> Self {
        let is_breathing = breathing
            .map(|b| matches!(b.trim().to_lowercase().as_str(), "true" | "1" | "yes"))
            .unwrap_or(false);
        Self {
            level: level.map(Level::from_tag).unwrap_or_default(),
            is_breathing,
            phase: phase.and_then(BreathPhase::parse),
            covenant: covenant.and_then(Covenant::parse),
        }
    }
}

/// Complete simulation state for one flame
#[derive(Debug, Clone)]
pub struct FlameState {
    pub inputs: FlameInputs,
    /// Constants resolved from `inputs`
    pub tuning: Tuning,
    /// Flame base in surface px
    pub origin: Vec2,
    /// Smoothed breath scale
    pub scale: Smoother,
    /// Smoothed breath intensity
    pub intensity: Smoother,
    /// Flame-body pool
    pub flames: Vec<FlameParticle>,
    /// Ember pool
    pub embers: Vec<Ember>,
    /// Simulation clock in seconds
    pub time: f32,
    /// Ticks simulated since start
    pub time_ticks: u64,
    /// Turbulence multiplier (reduced motion)
    pub turbulence_scale: f32,
}

impl FlameState {
    /// Fresh state with empty pools and smoothing at rest (1.0)
    pub fn new(inputs: FlameInputs, settings: &Settings) -> Self {
        let (width, height) = settings.surface_size();
        Self {
            inputs,
            tuning: resolve(
                inputs.level,
                inputs.is_breathing,
                inputs.phase,
                &settings.breath_targets,
            ),
            origin: emission_origin(width, height),
            scale: Smoother::new(1.0, settings.scale_smoothing),
            intensity: Smoother::new(1.0, settings.intensity_smoothing),
            flames: Vec::new(),
            embers: Vec::new(),
            time: 0.0,
            time_ticks: 0,
            turbulence_scale: if settings.reduced_motion { 0.3 } else { 1.0 },
        }
    }

    /// Swap inputs without touching live particles or current smoothing values
    pub fn retarget(&mut self, inputs: FlameInputs, settings: &Settings) {
        self.inputs = inputs;
        self.tuning = resolve(
            inputs.level,
            inputs.is_breathing,
            inputs.phase,
            &settings.breath_targets,
        );
    }

    /// Spawn context for the current tick
    pub fn spawn_context(&self) -> SpawnContext {
        SpawnContext {
            profile: self.tuning.profile,
            origin: self.origin,
            intensity: self.intensity.value,
            turbulence_scale: self.turbulence_scale,
        }
    }

    /// Total live particles across pools
    pub fn population(&self) -> usize {
        self.flames.len() + self.embers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tags() {
        let inputs = FlameInputs::from_tags(Some("roaring"), Some("hold"), Some("true"), Some("vigor"));
        assert_eq!(inputs.level, Level::Strong);
        assert_eq!(inputs.phase, Some(BreathPhase::HoldFull));
        assert!(inputs.is_breathing);
        assert_eq!(inputs.covenant, Some(Covenant::Vigor));

        let fallback = FlameInputs::from_tags(Some("inferno"), Some("gasp"), None, Some(""));
        assert_eq!(fallback, FlameInputs::idle(Level::Dormant));
    }

    #[test]
    fn test_new_state_at_rest() {
        let settings = Settings::default();
        let state = FlameState::new(FlameInputs::idle(Level::Peak), &settings);
        assert_eq!(state.population(), 0);
        assert_eq!(state.scale.value, 1.0);
        assert_eq!(state.intensity.value, 1.0);
        assert_eq!(state.origin, Vec2::new(200.0, 375.0));
        assert_eq!(state.turbulence_scale, 1.0);
    }

    #[test]
    fn test_retarget_keeps_smoothing_value() {
        let settings = Settings::default();
        let mut state = FlameState::new(FlameInputs::breathing(Level::Building, BreathPhase::Inhale), &settings);
        state.scale.value = 1.25;
        state.retarget(FlameInputs::breathing(Level::Building, BreathPhase::Exhale), &settings);
        assert_eq!(state.scale.value, 1.25);
        assert_eq!(state.tuning.target, settings.breath_targets.exhale);
    }

    #[test]
    fn test_tuning_always_matches_inputs() {
        let settings = Settings::default();
        for level in Level::ALL {
            let state = FlameState::new(FlameInputs::idle(level), &settings);
            assert_eq!(state.tuning.profile, level.profile());
            assert_eq!(state.tuning.target, settings.breath_targets.idle);

            let mut copy = state.clone();
            copy.retarget(FlameInputs::breathing(level, BreathPhase::Inhale), &settings);
            assert_eq!(copy.tuning.profile, level.profile());
            assert_eq!(copy.tuning.target, settings.breath_targets.inhale);
        }
    }

    #[test]
    fn test_reduced_motion_damps_turbulence() {
        let settings = Settings {
            reduced_motion: true,
            ..Settings::default()
        };
        let state = FlameState::new(FlameInputs::default(), &settings);
        assert!(state.turbulence_scale < 1.0);
        assert_eq!(state.spawn_context().turbulence_scale, state.turbulence_scale);
    }
}
