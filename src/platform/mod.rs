//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Frame scheduling (`requestAnimationFrame` on web)
//! - Host preferences (reduced motion)
//! - Canvas backing size for the device pixel ratio

#[cfg(target_arch = "wasm32")]
pub mod web;

#[cfg(target_arch = "wasm32")]
pub use web::RafScheduler;

/// Whether the host asked for reduced motion
#[cfg(target_arch = "wasm32")]
pub fn prefers_reduced_motion() -> bool {
    web_sys::window()
        .and_then(|w| w.match_media("(prefers-reduced-motion: reduce)").ok())
        .flatten()
        .map(|mq| mq.matches())
        .unwrap_or(false)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn prefers_reduced_motion() -> bool {
    false
}

/// Physical backing size for a logical surface at the given device pixel ratio.
///
/// A missing or nonsensical ratio counts as 1; neither side drops below 1 px.
pub fn backing_size(logical: (f32, f32), device_pixel_ratio: f64) -> (u32, u32) {
    let dpr = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
        device_pixel_ratio
    } else {
        1.0
    };
    let side = |px: f32| ((px as f64 * dpr).round() as u32).max(1);
    (side(logical.0), side(logical.1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backing_size_follows_pixel_ratio() {
        assert_eq!(backing_size((400.0, 500.0), 1.0), (400, 500));
        assert_eq!(backing_size((400.0, 500.0), 2.0), (800, 1000));
        assert_eq!(backing_size((400.0, 500.0), 1.5), (600, 750));
    }

    #[test]
    fn test_backing_size_bad_ratio() {
        assert_eq!(backing_size((400.0, 500.0), 0.0), (400, 500));
        assert_eq!(backing_size((400.0, 500.0), f64::NAN), (400, 500));
        assert_eq!(backing_size((0.2, 0.2), 1.0), (1, 1));
    }
}
