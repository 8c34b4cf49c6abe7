//! One simulation step: smoothing, emission, integration
//!
//! Exactly one `tick` runs per scheduled frame. Spawning and motion draw from
//! the injected `RandomSource`, so aggregate statistics are reproducible for a
//! fixed seed even though individual trajectories are not meaningful.

use glam::Vec2;

use super::particle::{Ember, FlameParticle};
use super::rng::RandomSource;
use super::state::FlameState;
use crate::consts::*;

/// Particles created during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpawnReport {
    pub flames: usize,
    pub embers: usize,
}

/// Number of flame spawn trials for a density at the given intensity
#[inline]
pub fn flame_spawn_trials(particle_density: f32, intensity: f32) -> u32 {
    (particle_density * intensity).max(0.0).ceil() as u32
}

/// Per-tick ember spawn probability
#[inline]
pub fn ember_spawn_chance(ember_probability: f32, intensity: f32) -> f32 {
    (ember_probability * intensity).clamp(0.0, 1.0)
}

/// Push new particles into the pools using the current tuning and intensity
pub fn emit(state: &mut FlameState, rng: &mut impl RandomSource) -> SpawnReport {
    let ctx = state.spawn_context();
    let mut report = SpawnReport::default();

    // Independent trials rather than a flat count keep spawning from clumping
    for _ in 0..flame_spawn_trials(ctx.profile.particle_density, ctx.intensity) {
        if rng.chance(FLAME_SPAWN_CHANCE) {
            state.flames.push(FlameParticle::spawn(&ctx, rng));
            report.flames += 1;
        }
    }

    if rng.chance(ember_spawn_chance(ctx.profile.ember_spawn_probability, ctx.intensity)) {
        state.embers.push(Ember::spawn(&ctx, rng));
        report.embers += 1;
    }

    report
}

/// Multi-frequency turbulence offset for a flame particle at time `t`
#[inline]
pub fn turbulence_offset(p: &FlameParticle, t: f32) -> Vec2 {
    let a = p.turbulence;
    let dx = (t * 2.0 + p.angle).sin() * a + (t * 3.5 + p.angle * 2.0).cos() * a * 0.5;
    let dy = (t * 1.2 + p.pos.y * 0.01).sin() * a * 0.3;
    Vec2::new(dx, dy)
}

/// Advance every flame particle one tick and drop the expired ones
pub fn advance_flames(flames: &mut Vec<FlameParticle>, time: f32, scale: f32) {
    flames.retain_mut(|p| {
        p.age += 1;

        let offset = turbulence_offset(p, time);
        p.pos += p.vel * scale + offset;
        p.angle += p.angle_velocity;

        // Drag and buoyancy loss
        p.vel.y *= FLAME_DAMPING_Y;
        p.vel.x *= FLAME_DAMPING_X;

        // Cools slowly while young, faster with age
        p.heat *= if p.age_ratio() < HEAT_YOUNG_RATIO {
            HEAT_DECAY_YOUNG
        } else {
            HEAT_DECAY_OLD
        };

        p.age < p.max_life
    });
}

/// Advance every ember one tick and drop the expired ones
pub fn advance_embers(embers: &mut Vec<Ember>, scale: f32) {
    embers.retain_mut(|e| {
        e.age += 1;
        e.pos += e.vel * scale;
        e.vel.y -= EMBER_LIFT;
        e.vel.x *= EMBER_DAMPING_X;
        e.age < e.max_life
    });
}

/// Advance the flame by one fixed step
pub fn tick(state: &mut FlameState, rng: &mut impl RandomSource) -> SpawnReport {
    state.time += SIM_DT;
    state.time_ticks += 1;

    let target = state.tuning.target;
    state.scale.step(target.scale);
    state.intensity.step(target.intensity);

    let report = emit(state, rng);

    let scale = state.scale.value;
    advance_flames(&mut state.flames, state.time, scale);
    advance_embers(&mut state.embers, scale);

    report
}
