//! Bonfire Flame - A breath-driven procedural fire
//!
//! Core modules:
//! - `sim`: Particle simulation (profiles, smoothing, emitter, integrator)
//! - `color`: Heat and age color ramps
//! - `renderer`: Layered compositor and WebGPU presentation
//! - `engine`: Frame scheduling and start/stop lifecycle
//! - `platform`: Browser frame scheduling
//! - `settings`: Tunable configuration

pub mod color;
pub mod engine;
pub mod error;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use engine::{FlameEngine, FlameSurface, FrameHandle, FrameScheduler, ManualScheduler};
pub use error::RenderError;
pub use settings::{QualityPreset, Settings};

use glam::Vec2;

/// Flame configuration constants
pub mod consts {
    /// Simulation time advanced per tick (~60 Hz)
    pub const SIM_DT: f32 = 0.016;

    /// Logical drawing surface dimensions
    pub const SURFACE_WIDTH: f32 = 400.0;
    pub const SURFACE_HEIGHT: f32 = 500.0;
    /// Emission origin sits this far down the surface
    pub const BASE_Y_FRACTION: f32 = 0.75;

    /// Probability that each flame spawn trial produces a particle
    pub const FLAME_SPAWN_CHANCE: f32 = 0.3;

    /// Per-tick velocity damping for flame-body particles
    pub const FLAME_DAMPING_Y: f32 = 0.975;
    pub const FLAME_DAMPING_X: f32 = 0.96;
    /// Heat decay while young (age ratio below `HEAT_YOUNG_RATIO`) and after
    pub const HEAT_DECAY_YOUNG: f32 = 0.995;
    pub const HEAT_DECAY_OLD: f32 = 0.98;
    pub const HEAT_YOUNG_RATIO: f32 = 0.3;

    /// Embers accelerate upward and drift sideways less each tick
    pub const EMBER_LIFT: f32 = 0.02;
    pub const EMBER_DAMPING_X: f32 = 0.99;

    /// Particles fainter than this are not composited
    pub const MIN_VISIBLE_ALPHA: f32 = 0.01;
    /// Heat above which a flame particle gets the white pinpoint layer
    pub const HOT_CORE_HEAT: f32 = 0.8;
    /// Base bloom must never hide the particles beneath it
    pub const BLOOM_MAX_ALPHA: f32 = 0.4;

    /// Reference base size that maps to unscaled particle sizes
    pub const REFERENCE_BASE_SIZE: f32 = 100.0;
}

/// Emission origin (flame base) for a surface of the given size
#[inline]
pub fn emission_origin(width: f32, height: f32) -> Vec2 {
    Vec2::new(width / 2.0, height * consts::BASE_Y_FRACTION)
}

/// Linear interpolation between two scalars
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
