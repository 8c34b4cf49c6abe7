//! Flame simulation module
//!
//! All particle logic lives here. This module must stay free of rendering and
//! platform code:
//! - Fixed step per tick (`SIM_DT`)
//! - Injected RNG only
//! - Engine-owned pools, no globals

pub mod particle;
pub mod profile;
pub mod rng;
pub mod smoothing;
pub mod state;
pub mod tick;

pub use particle::{Ember, FlameParticle, SpawnContext};
pub use profile::{
    BreathPhase, BreathTarget, BreathTargets, Covenant, Level, LevelProfile, Tuning, resolve,
};
pub use rng::{RandomSource, RngState};
pub use smoothing::Smoother;
pub use state::{FlameInputs, FlameState};
pub use tick::{SpawnReport, advance_embers, advance_flames, emit, tick, turbulence_offset};
