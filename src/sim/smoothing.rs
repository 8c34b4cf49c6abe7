//! First-order low-pass smoothing for breath scale and intensity

/// Exponential approach toward a target: `value += (target - value) * k`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Smoother {
    pub value: f32,
    k: f32,
}

impl Smoother {
    /// Create a smoother starting at `value`.
    ///
    /// `k` is clamped into (0, 1]; a non-finite `k` becomes 1.
    pub fn new(value: f32, k: f32) -> Self {
        Self {
            value,
            k: clamp_factor(k),
        }
    }

    pub fn factor(&self) -> f32 {
        self.k
    }

    /// Advance one tick toward `target` and return the new value
    #[inline]
    pub fn step(&mut self, target: f32) -> f32 {
        self.value += (target - self.value) * self.k;
        self.value
    }

    /// Ticks needed for a step input to close all but `tolerance` of the gap.
    ///
    /// Depends only on `k`, never on the size of the step.
    pub fn frames_to_settle(k: f32, tolerance: f32) -> u32 {
        let k = clamp_factor(k);
        if k >= 1.0 {
            return 1;
        }
        let tolerance = tolerance.clamp(f32::MIN_POSITIVE, 1.0);
        ((tolerance as f64).ln() / (1.0 - k as f64).ln()).ceil().max(1.0) as u32
    }
}

fn clamp_factor(k: f32) -> f32 {
    if k.is_finite() { k.clamp(f32::EPSILON, 1.0) } else { 1.0 }
}
