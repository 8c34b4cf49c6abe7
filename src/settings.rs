//! Flame settings and preferences
//!
//! Read from LocalStorage on the web (written by the host page).

use serde::{Deserialize, Serialize};

use crate::consts::{SURFACE_HEIGHT, SURFACE_WIDTH};
use crate::sim::BreathTargets;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    Medium,
    #[default]
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Whether flame particles get the far atmospheric halo
    pub fn halo_layer(&self) -> bool {
        matches!(self, QualityPreset::High)
    }

    /// Whether hot particles get the white pinpoint
    pub fn hot_core_layer(&self) -> bool {
        !matches!(self, QualityPreset::Low)
    }
}

/// Flame settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Surface ===
    /// Logical drawing surface width in px
    pub surface_width: f32,
    /// Logical drawing surface height in px
    pub surface_height: f32,

    // === Breath response ===
    /// Smoothing factor for breath scale, in (0, 1]
    pub scale_smoothing: f32,
    /// Smoothing factor for breath intensity, in (0, 1]
    pub intensity_smoothing: f32,
    /// Phase -> scale/intensity table
    pub breath_targets: BreathTargets,

    // === Accessibility ===
    /// Reduced motion (damps flame turbulence)
    pub reduced_motion: bool,

    // === Determinism ===
    /// Fixed RNG seed; `None` seeds from the clock
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::High,

            surface_width: SURFACE_WIDTH,
            surface_height: SURFACE_HEIGHT,

            scale_smoothing: 0.03,
            intensity_smoothing: 0.05,
            breath_targets: BreathTargets::default(),

            reduced_motion: false,

            seed: None,
        }
    }
}

impl Settings {
    /// Surface size as `(width, height)`
    pub fn surface_size(&self) -> (f32, f32) {
        (self.surface_width, self.surface_height)
    }

    /// Copy with out-of-range values replaced by usable ones
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let factor = |k: f32, fallback: f32| {
            if k.is_finite() && k > 0.0 { k.min(1.0) } else { fallback }
        };
        let size = |v: f32, fallback: f32| if v.is_finite() && v > 0.0 { v } else { fallback };
        Self {
            surface_width: size(self.surface_width, defaults.surface_width),
            surface_height: size(self.surface_height, defaults.surface_height),
            scale_smoothing: factor(self.scale_smoothing, defaults.scale_smoothing),
            intensity_smoothing: factor(self.intensity_smoothing, defaults.intensity_smoothing),
            ..self.clone()
        }
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "bonfire_flame_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str::<Settings>(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings.sanitized();
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}
