//! Layered flame compositor
//!
//! Turns a `FlameState` into an ordered list of radial-gradient sprites. The
//! list is backend-agnostic: the WebGPU pipeline draws it with instancing, and
//! tests inspect it directly.
//!
//! Z-order: ambient glow -> flame particles -> base bloom -> embers.

use glam::Vec2;

use crate::color::{Rgba, age_color, fade_alpha, heat_color};
use crate::consts::{BLOOM_MAX_ALPHA, HOT_CORE_HEAT, MIN_VISIBLE_ALPHA};
use crate::settings::QualityPreset;
use crate::sim::{Ember, FlameParticle, FlameState};

/// Maximum gradient stops per sprite (must match the shader)
pub const MAX_STOPS: usize = 4;

/// Share of the covenant color mixed into the ambient glow
const COVENANT_TINT: f32 = 0.35;

/// What a sprite represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    AmbientGlow,
    Halo,
    OuterGlow,
    Core,
    HotCore,
    Bloom,
    EmberGlow,
    EmberCore,
}

/// One color stop at a normalized radius
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub offset: f32,
    pub color: Rgba,
}

impl ColorStop {
    pub const fn new(offset: f32, color: Rgba) -> Self {
        Self { offset, color }
    }
}

/// A filled circle shaded by a radial gradient from its center
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlowSprite {
    pub layer: Layer,
    pub center: Vec2,
    pub radius: f32,
    pub stops: [ColorStop; MAX_STOPS],
    pub stop_count: usize,
}

impl GlowSprite {
    /// Build a sprite from up to `MAX_STOPS` stops (extra stops are dropped)
    pub fn radial(layer: Layer, center: Vec2, radius: f32, stops: &[ColorStop]) -> Self {
        let mut packed = [ColorStop::new(1.0, Rgba::TRANSPARENT); MAX_STOPS];
        let stop_count = stops.len().min(MAX_STOPS);
        packed[..stop_count].copy_from_slice(&stops[..stop_count]);
        Self {
            layer,
            center,
            radius,
            stops: packed,
            stop_count,
        }
    }

    /// Stops actually in use
    pub fn stops(&self) -> &[ColorStop] {
        &self.stops[..self.stop_count]
    }

    /// Opacity at the center
    pub fn peak_alpha(&self) -> f32 {
        self.stops()
            .iter()
            .map(|s| s.color.a)
            .fold(0.0, f32::max)
    }
}

/// Everything to draw for one frame, back to front
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    pub sprites: Vec<GlowSprite>,
}

impl DrawList {
    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    /// Number of sprites on a given layer
    pub fn count(&self, layer: Layer) -> usize {
        self.sprites.iter().filter(|s| s.layer == layer).count()
    }

    fn push(&mut self, sprite: GlowSprite) {
        if sprite.radius > 0.0 && sprite.radius.is_finite() {
            self.sprites.push(sprite);
        }
    }
}

/// Composite the whole scene
pub fn composite(state: &FlameState, quality: QualityPreset) -> DrawList {
    // 4 layers per flame particle at most, 2 per ember, 2 scene passes
    let mut list = DrawList {
        sprites: Vec::with_capacity(state.flames.len() * 4 + state.embers.len() * 2 + 2),
    };

    list.push(ambient_glow(state));

    let scale = state.scale.value;
    for particle in &state.flames {
        flame_layers(&mut list, particle, scale, quality);
    }

    list.push(base_bloom(state));

    for ember in &state.embers {
        ember_layers(&mut list, ember);
    }

    list
}

/// Scene-wide glow centered above the flame base
pub fn ambient_glow(state: &FlameState) -> GlowSprite {
    let profile = &state.tuning.profile;
    let scale = state.scale.value;
    let strength = profile.glow_intensity * state.intensity.value;

    let mut inner = Rgba::rgb(255, 150, 50);
    if let Some(covenant) = state.inputs.covenant {
        inner = inner.mix(covenant.glow_color(), COVENANT_TINT);
    }

    GlowSprite::radial(
        Layer::AmbientGlow,
        state.origin - Vec2::new(0.0, profile.base_size * scale * 0.5),
        profile.base_size * scale * (1.5 + 0.5 * strength),
        &[
            ColorStop::new(0.0, inner.with_alpha(0.15 * strength)),
            ColorStop::new(0.5, Rgba::rgb(255, 100, 0).with_alpha(0.05 * strength)),
            ColorStop::new(1.0, Rgba::TRANSPARENT),
        ],
    )
}

/// Bright bloom at the flame base; peak alpha never exceeds `BLOOM_MAX_ALPHA`
pub fn base_bloom(state: &FlameState) -> GlowSprite {
    let profile = &state.tuning.profile;
    let bloom_size = profile.base_size * state.scale.value * 0.6;
    let peak = (0.4 * profile.glow_intensity * state.intensity.value).clamp(0.0, BLOOM_MAX_ALPHA);

    GlowSprite::radial(
        Layer::Bloom,
        state.origin - Vec2::new(0.0, bloom_size * 0.3),
        bloom_size * 1.5,
        &[
            ColorStop::new(0.0, Rgba::new(255, 255, 200, peak)),
            ColorStop::new(0.3, Rgba::new(255, 200, 100, peak * 0.75)),
            ColorStop::new(0.6, Rgba::new(255, 150, 50, peak * 0.375)),
            ColorStop::new(1.0, Rgba::TRANSPARENT),
        ],
    )
}

/// Concentric layers for one flame particle: halo, outer glow, core, hot pinpoint.
///
/// Outer glow and core are always drawn, so every visible particle gets at
/// least two layers.
pub fn flame_layers(list: &mut DrawList, p: &FlameParticle, scale: f32, quality: QualityPreset) {
    let ratio = p.age_ratio();
    let alpha = fade_alpha(ratio);
    if alpha <= MIN_VISIBLE_ALPHA {
        return;
    }

    let size = p.size * scale * (1.0 - ratio * 0.4);
    let heat = p.heat;

    if quality.halo_layer() {
        list.push(GlowSprite::radial(
            Layer::Halo,
            p.pos,
            size * 2.5,
            &[
                ColorStop::new(0.0, heat_color(heat, alpha * 0.3)),
                ColorStop::new(0.4, heat_color(heat * 0.8, alpha * 0.15)),
                ColorStop::new(1.0, Rgba::TRANSPARENT),
            ],
        ));
    }

    list.push(GlowSprite::radial(
        Layer::OuterGlow,
        p.pos,
        size * 1.5,
        &[
            ColorStop::new(0.0, heat_color(heat, alpha * 0.6)),
            ColorStop::new(0.5, heat_color(heat * 0.9, alpha * 0.3)),
            ColorStop::new(1.0, Rgba::TRANSPARENT),
        ],
    ));

    list.push(GlowSprite::radial(
        Layer::Core,
        p.pos,
        size,
        &[
            ColorStop::new(0.0, heat_color(heat, alpha)),
            ColorStop::new(0.6, heat_color(heat * 0.95, alpha * 0.8)),
            ColorStop::new(1.0, heat_color(heat * 0.7, alpha * 0.3)),
        ],
    ));

    if quality.hot_core_layer() && heat > HOT_CORE_HEAT {
        list.push(GlowSprite::radial(
            Layer::HotCore,
            p.pos,
            size * 0.4,
            &[
                ColorStop::new(0.0, Rgba::WHITE.with_alpha(alpha)),
                ColorStop::new(0.5, heat_color(1.0, alpha * 0.8)),
                ColorStop::new(1.0, Rgba::TRANSPARENT),
            ],
        ));
    }
}

/// Glow and solid core for one ember
pub fn ember_layers(list: &mut DrawList, e: &Ember) {
    let ratio = e.age_ratio();
    let alpha = (1.0 - ratio) * e.brightness;
    if alpha <= MIN_VISIBLE_ALPHA {
        return;
    }

    let size = e.size * (1.0 - ratio * 0.5);
    let color = age_color(ratio, alpha);

    list.push(GlowSprite::radial(
        Layer::EmberGlow,
        e.pos,
        size * 3.0,
        &[
            ColorStop::new(0.0, color.with_alpha(alpha * 0.6)),
            ColorStop::new(0.5, age_color((ratio + 0.3).min(1.0), alpha * 0.3)),
            ColorStop::new(1.0, Rgba::TRANSPARENT),
        ],
    ));
    list.push(GlowSprite::radial(
        Layer::EmberCore,
        e.pos,
        size,
        &[ColorStop::new(0.0, color), ColorStop::new(1.0, color)],
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::{BreathPhase, Covenant, FlameInputs, Level, RngState, tick};

    fn particle(heat: f32, age: u32) -> FlameParticle {
        FlameParticle {
            pos: Vec2::new(200.0, 300.0),
            vel: Vec2::ZERO,
            age,
            max_life: 100,
            size: 10.0,
            heat,
            turbulence: 0.0,
            angle: 0.0,
            angle_velocity: 0.0,
        }
    }

    fn layers_for(p: &FlameParticle, quality: QualityPreset) -> Vec<Layer> {
        let mut list = DrawList::default();
        flame_layers(&mut list, p, 1.0, quality);
        list.sprites.iter().map(|s| s.layer).collect()
    }

    #[test]
    fn test_empty_scene_has_glow_and_bloom() {
        let state = FlameState::new(FlameInputs::idle(Level::Dormant), &Settings::default());
        let list = composite(&state, QualityPreset::High);
        let layers: Vec<Layer> = list.sprites.iter().map(|s| s.layer).collect();
        assert_eq!(layers, vec![Layer::AmbientGlow, Layer::Bloom]);
    }

    #[test]
    fn test_layer_counts_follow_quality() {
        let hot = particle(0.9, 50);
        assert_eq!(
            layers_for(&hot, QualityPreset::High),
            vec![Layer::Halo, Layer::OuterGlow, Layer::Core, Layer::HotCore]
        );
        assert_eq!(
            layers_for(&hot, QualityPreset::Medium),
            vec![Layer::OuterGlow, Layer::Core, Layer::HotCore]
        );
        assert_eq!(layers_for(&hot, QualityPreset::Low), vec![Layer::OuterGlow, Layer::Core]);

        let warm = particle(0.5, 50);
        assert_eq!(
            layers_for(&warm, QualityPreset::High),
            vec![Layer::Halo, Layer::OuterGlow, Layer::Core]
        );
        assert_eq!(layers_for(&warm, QualityPreset::Low), vec![Layer::OuterGlow, Layer::Core]);
    }

    #[test]
    fn test_every_visible_particle_has_two_to_four_layers() {
        for quality in [QualityPreset::Low, QualityPreset::Medium, QualityPreset::High] {
            for heat in [0.0, 0.3, 0.5, 0.8, 0.85, 1.0] {
                for age in [5, 50, 95] {
                    let n = layers_for(&particle(heat, age), quality).len();
                    assert!(
                        (2..=4).contains(&n),
                        "{} layers at heat {} age {} ({})",
                        n,
                        heat,
                        age,
                        quality.as_str()
                    );
                }
            }
        }
    }

    #[test]
    fn test_layers_shrink_and_brighten_inward() {
        let mut list = DrawList::default();
        flame_layers(&mut list, &particle(0.95, 50), 1.0, QualityPreset::High);
        for pair in list.sprites.windows(2) {
            assert!(pair[1].radius < pair[0].radius);
            assert!(pair[1].peak_alpha() >= pair[0].peak_alpha());
        }
    }

    #[test]
    fn test_newborn_particle_invisible() {
        assert!(layers_for(&particle(1.0, 0), QualityPreset::High).is_empty());
        assert!(layers_for(&particle(1.0, 100), QualityPreset::High).is_empty());
    }

    #[test]
    fn test_bloom_alpha_capped() {
        let settings = Settings::default();
        let mut state = FlameState::new(FlameInputs::breathing(Level::Peak, BreathPhase::Inhale), &settings);
        state.intensity.value = 1.3;
        let bloom = base_bloom(&state);
        assert!(bloom.peak_alpha() <= BLOOM_MAX_ALPHA + f32::EPSILON);
    }

    #[test]
    fn test_ambient_glow_scales_with_level() {
        let settings = Settings::default();
        let low = ambient_glow(&FlameState::new(FlameInputs::idle(Level::Dormant), &settings));
        let high = ambient_glow(&FlameState::new(FlameInputs::idle(Level::Peak), &settings));
        assert!(high.radius > low.radius);
        assert!(high.peak_alpha() > low.peak_alpha());
    }

    #[test]
    fn test_covenant_tints_ambient_glow() {
        let settings = Settings::default();
        let plain = FlameState::new(FlameInputs::idle(Level::Strong), &settings);
        let tinted = FlameState::new(
            FlameInputs::idle(Level::Strong).with_covenant(Covenant::Respite),
            &settings,
        );
        let a = ambient_glow(&plain).stops[0].color;
        let b = ambient_glow(&tinted).stops[0].color;
        assert!(b.b > a.b, "respite glow is bluer");
        assert_eq!(a.a, b.a);
    }

    #[test]
    fn test_z_order_after_simulation() {
        let settings = Settings::default();
        let mut state = FlameState::new(FlameInputs::idle(Level::Peak), &settings);
        let mut rng = RngState::new(8).to_rng();
        for _ in 0..90 {
            tick(&mut state, &mut rng);
        }
        let list = composite(&state, QualityPreset::High);
        assert_eq!(list.sprites[0].layer, Layer::AmbientGlow);
        let bloom_at = list
            .sprites
            .iter()
            .position(|s| s.layer == Layer::Bloom)
            .unwrap();
        assert!(list.sprites[..bloom_at]
            .iter()
            .skip(1)
            .all(|s| matches!(s.layer, Layer::Halo | Layer::OuterGlow | Layer::Core | Layer::HotCore)));
        assert!(list.sprites[bloom_at + 1..]
            .iter()
            .all(|s| matches!(s.layer, Layer::EmberGlow | Layer::EmberCore)));
        assert!(list.count(Layer::Core) > 0);
    }

    #[test]
    fn test_stop_overflow_truncated() {
        let stops = [ColorStop::new(0.0, Rgba::WHITE); 6];
        let sprite = GlowSprite::radial(Layer::Core, Vec2::ZERO, 1.0, &stops);
        assert_eq!(sprite.stops().len(), MAX_STOPS);
    }
}
