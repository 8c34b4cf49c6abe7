//! Flame color ramps
//!
//! Pure functions from a normalized driver (heat or age ratio) to a color.
//! Ramps are piecewise linear between anchor colors, so there is no visible
//! step at a band boundary.

use std::f32::consts::PI;
use std::fmt;

use crate::lerp;

/// 8-bit RGB with a floating alpha, the shape a 2D canvas expects
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0.0);
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 1.0);

    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Same color, different alpha (clamped to 0-1)
    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Blend RGB toward `other` by `t`; alpha is kept
    pub fn mix(self, other: Rgba, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let ch = |a: u8, b: u8| lerp(a as f32, b as f32, t).round() as u8;
        Self {
            r: ch(self.r, other.r),
            g: ch(self.g, other.g),
            b: ch(self.b, other.b),
            a: self.a,
        }
    }

    /// Normalized `[r, g, b, a]` for GPU upload
    pub fn to_array(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a,
        ]
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

type Anchor = (f32, [f32; 3]);

// Deep red -> deep orange -> orange -> bright yellow -> white hot, with the
// band edges at 0.2, 0.4, 0.7 and 0.9 as anchors
const HEAT_ANCHORS: [Anchor; 6] = [
    (0.0, [180.0, 0.0, 0.0]),
    (0.2, [255.0, 40.0, 30.0]),
    (0.4, [255.0, 110.0, 0.0]),
    (0.7, [255.0, 200.0, 0.0]),
    (0.9, [255.0, 255.0, 120.0]),
    (1.0, [255.0, 255.0, 255.0]),
];

// Fresh embers are pale gold, dying ones dull red
const AGE_ANCHORS: [Anchor; 5] = [
    (0.0, [255.0, 240.0, 170.0]),
    (0.3, [255.0, 200.0, 100.0]),
    (0.6, [255.0, 150.0, 50.0]),
    (0.85, [220.0, 80.0, 20.0]),
    (1.0, [140.0, 30.0, 10.0]),
];

fn sample(anchors: &[Anchor], x: f32, alpha: f32) -> Rgba {
    let x = if x.is_finite() { x.clamp(0.0, 1.0) } else { 0.0 };
    let mut rgb = anchors[anchors.len() - 1].1;
    for pair in anchors.windows(2) {
        let (x0, c0) = pair[0];
        let (x1, c1) = pair[1];
        if x <= x1 {
            let t = (x - x0) / (x1 - x0);
            rgb = [lerp(c0[0], c1[0], t), lerp(c0[1], c1[1], t), lerp(c0[2], c1[2], t)];
            break;
        }
    }
    Rgba::new(
        rgb[0].round() as u8,
        rgb[1].round() as u8,
        rgb[2].round() as u8,
        alpha.clamp(0.0, 1.0),
    )
}

/// Flame-body color for a heat in [0, 1]
pub fn heat_color(heat: f32, alpha: f32) -> Rgba {
    sample(&HEAT_ANCHORS, heat, alpha)
}

/// Ember color for an age ratio in [0, 1]
pub fn age_color(age_ratio: f32, alpha: f32) -> Rgba {
    sample(&AGE_ANCHORS, age_ratio, alpha)
}

/// Fade-in/fade-out bump: `sin(r·π)·(1 − 0.6r)`.
///
/// Exactly zero at both ends and positive strictly between.
pub fn fade_alpha(age_ratio: f32) -> f32 {
    if !(age_ratio > 0.0 && age_ratio < 1.0) {
        return 0.0;
    }
    ((age_ratio * PI).sin() * (1.0 - age_ratio * 0.6)).max(0.0)
}
