//! Particle kinds and their factories
//!
//! A particle captures everything it needs at spawn time. Later input changes
//! only affect future spawns, never live particles.

use glam::Vec2;
use std::f32::consts::{PI, TAU};

use super::profile::LevelProfile;
use super::rng::RandomSource;
use crate::consts::REFERENCE_BASE_SIZE;

/// Spawn-time inputs shared by all factories
#[derive(Debug, Clone, Copy)]
pub struct SpawnContext {
    pub profile: LevelProfile,
    /// Flame base in surface px
    pub origin: Vec2,
    /// Smoothed intensity at the moment of spawning
    pub intensity: f32,
    /// Turbulence multiplier (1.0 normally, lower for reduced motion)
    pub turbulence_scale: f32,
}

/// A flame-body particle: heat-colored, turbulent
#[derive(Debug, Clone, PartialEq)]
pub struct FlameParticle {
    pub pos: Vec2,
    /// Velocity in px/tick (negative y is upward)
    pub vel: Vec2,
    /// Ticks survived
    pub age: u32,
    /// Removed on the tick `age` reaches this
    pub max_life: u32,
    pub size: f32,
    /// 0-1, drives the heat color ramp
    pub heat: f32,
    /// Turbulence amplitude in px/tick
    pub turbulence: f32,
    pub angle: f32,
    pub angle_velocity: f32,
}

impl FlameParticle {
    /// Spawn a particle near the flame base
    pub fn spawn(ctx: &SpawnContext, rng: &mut impl RandomSource) -> Self {
        let profile = &ctx.profile;
        let spread = (rng.unit() - 0.5) * PI * 0.7; // ±63 degrees
        let distance = rng.unit() * profile.base_size * 0.4;
        let speed = rng.range(1.5, 3.5);

        Self {
            pos: Vec2::new(
                ctx.origin.x + spread.cos() * distance,
                ctx.origin.y - spread.sin().abs() * distance * 0.3,
            ),
            vel: Vec2::new(
                spread.cos() * speed * 0.3,
                -speed * profile.flame_height_multiplier,
            ),
            age: 0,
            max_life: 60 + (rng.unit() * 60.0) as u32,
            size: rng.range(8.0, 20.0) * profile.base_size / REFERENCE_BASE_SIZE,
            heat: rng.range(0.7, 1.0),
            turbulence: rng.range(-1.5, 1.5) * ctx.intensity * ctx.turbulence_scale,
            angle: rng.unit() * TAU,
            angle_velocity: (rng.unit() - 0.5) * 0.1,
        }
    }

    /// Age divided by max lifetime, in [0, 1]
    #[inline]
    pub fn age_ratio(&self) -> f32 {
        age_ratio(self.age, self.max_life)
    }
}

/// A glowing ember: small, near-ballistic, age-colored
#[derive(Debug, Clone, PartialEq)]
pub struct Ember {
    pub pos: Vec2,
    pub vel: Vec2,
    pub age: u32,
    pub max_life: u32,
    pub size: f32,
    /// 0-1 peak opacity
    pub brightness: f32,
}

impl Ember {
    pub fn spawn(ctx: &SpawnContext, rng: &mut impl RandomSource) -> Self {
        let profile = &ctx.profile;
        let launch = (rng.unit() - 0.5) * PI * 0.4;

        Self {
            pos: Vec2::new(
                ctx.origin.x + (rng.unit() - 0.5) * profile.base_size * 0.8,
                ctx.origin.y - 20.0,
            ),
            vel: Vec2::new(
                launch.sin() * rng.range(0.5, 1.0),
                -rng.range(0.5, 1.5) * profile.flame_height_multiplier,
            ),
            age: 0,
            max_life: 120 + (rng.unit() * 80.0) as u32,
            size: rng.range(1.0, 3.0),
            brightness: rng.range(0.6, 1.0),
        }
    }

    #[inline]
    pub fn age_ratio(&self) -> f32 {
        age_ratio(self.age, self.max_life)
    }
}

#[inline]
fn age_ratio(age: u32, max_life: u32) -> f32 {
    if max_life == 0 {
        1.0
    } else {
        (age as f32 / max_life as f32).min(1.0)
    }
}
