//! Frame scheduling and flame lifecycle
//!
//! A `FlameEngine` owns everything one flame needs: its pools, smoothing, RNG,
//! pending frame handle and presentation surface. Nothing is global, so any
//! number of engines can run side by side.
//!
//! The host drives the engine through a `FrameScheduler`. Each scheduled
//! frame runs exactly one simulation tick, composites the scene, presents it
//! and requests the next frame. `stop()` cancels the outstanding frame before
//! clearing the pools. A callback only runs if its handle is the one pending;
//! anything else is stale and ignored.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::error::RenderError;
use crate::renderer::compositor::{DrawList, composite};
use crate::settings::Settings;
use crate::sim::{FlameInputs, FlameState, RandomSource, SpawnReport, tick};

/// Opaque id of a scheduled frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Host per-frame callback service (`requestAnimationFrame` on the web)
pub trait FrameScheduler {
    /// Ask for one callback on the next frame; `None` if the host refused
    fn request_frame(&mut self) -> Option<FrameHandle>;

    /// Cancel a callback that has not fired yet
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Something that can show a composited frame
pub trait FlameSurface {
    fn present(&mut self, frame: &DrawList) -> Result<(), RenderError>;
}

/// Scheduler driven by hand: native runs and tests decide when frames fire
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: u64,
    pending: Vec<FrameHandle>,
    cancelled: Vec<FrameHandle>,
    requested: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Callbacks waiting to fire
    pub fn pending(&self) -> &[FrameHandle] {
        &self.pending
    }

    /// Every handle cancelled so far
    pub fn cancelled(&self) -> &[FrameHandle] {
        &self.cancelled
    }

    /// Total frames requested
    pub fn requested(&self) -> u64 {
        self.requested
    }

    /// Remove and return the callbacks due this frame
    pub fn take_due(&mut self) -> Vec<FrameHandle> {
        std::mem::take(&mut self.pending)
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> Option<FrameHandle> {
        self.next_id += 1;
        self.requested += 1;
        let handle = FrameHandle(self.next_id);
        self.pending.push(handle);
        Some(handle)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.pending.retain(|h| *h != handle);
        self.cancelled.push(handle);
    }
}

/// Seed for engines that were not given one
pub fn clock_seed() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now() as u64
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default()
    }
}

/// One self-contained flame
pub struct FlameEngine<F, S, R = Pcg32> {
    settings: Settings,
    state: FlameState,
    scheduler: S,
    surface: Option<F>,
    rng: R,
    pending: Option<FrameHandle>,
    last_timestamp: Option<f64>,
    last_report: SpawnReport,
}

impl<F, S> FlameEngine<F, S, Pcg32>
where
    F: FlameSurface,
    S: FrameScheduler,
{
    /// Engine seeded from `settings.seed`, or the clock when unset
    pub fn new(inputs: FlameInputs, settings: Settings, scheduler: S, surface: Option<F>) -> Self {
        let seed = settings.seed.unwrap_or_else(clock_seed);
        log::debug!("Flame engine seed: {}", seed);
        Self::with_rng(inputs, settings, scheduler, surface, Pcg32::seed_from_u64(seed))
    }
}

impl<F, S, R> FlameEngine<F, S, R>
where
    F: FlameSurface,
    S: FrameScheduler,
    R: RandomSource,
{
    pub fn with_rng(
        inputs: FlameInputs,
        settings: Settings,
        scheduler: S,
        surface: Option<F>,
        rng: R,
    ) -> Self {
        let settings = settings.sanitized();
        Self {
            state: FlameState::new(inputs, &settings),
            settings,
            scheduler,
            surface,
            rng,
            pending: None,
            last_timestamp: None,
            last_report: SpawnReport::default(),
        }
    }

    /// Begin requesting frames. Returns whether the engine is running.
    ///
    /// Without a surface this is a silent no-op: the host is not ready yet.
    pub fn start(&mut self) -> bool {
        if self.pending.is_some() {
            return true;
        }
        if self.surface.is_none() {
            log::debug!("No drawing surface, flame not started");
            return false;
        }
        self.pending = self.scheduler.request_frame();
        match self.pending {
            Some(_) => log::info!(
                "Flame started (level: {}, breathing: {})",
                self.state.inputs.level.as_str(),
                self.state.inputs.is_breathing
            ),
            None => log::warn!("Host refused a frame callback, flame not started"),
        }
        self.pending.is_some()
    }

    /// Cancel the pending frame and discard all simulation state
    pub fn stop(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_frame(handle);
            log::info!("Flame stopped after {} ticks", self.state.time_ticks);
        }
        self.state = FlameState::new(self.state.inputs, &self.settings);
        self.last_timestamp = None;
        self.last_report = SpawnReport::default();
    }

    /// Host frame callback for `handle`: one tick, composite, present,
    /// schedule the next
    pub fn on_frame(&mut self, handle: FrameHandle, timestamp: f64) {
        if self.pending != Some(handle) {
            log::trace!("Ignoring stale frame callback {:?}", handle);
            return;
        }
        self.pending = None;
        self.last_timestamp = Some(timestamp);

        self.last_report = tick(&mut self.state, &mut self.rng);

        if let Some(surface) = self.surface.as_mut() {
            let frame = composite(&self.state, self.settings.quality);
            if let Err(e) = surface.present(&frame) {
                log::warn!("Frame present failed: {}", e);
            }
        }

        self.pending = self.scheduler.request_frame();
    }

    /// Feed new session inputs. A level change restarts with fresh pools;
    /// anything else only retargets smoothing and future spawns.
    pub fn set_inputs(&mut self, inputs: FlameInputs) {
        if inputs == self.state.inputs {
            return;
        }
        if inputs.level != self.state.inputs.level {
            let was_running = self.is_running();
            self.stop();
            self.state = FlameState::new(inputs, &self.settings);
            log::info!("Flame level -> {}", inputs.level.as_str());
            if was_running {
                self.start();
            }
        } else {
            self.state.retarget(inputs, &self.settings);
        }
    }

    /// Install (or replace) the presentation surface
    pub fn attach_surface(&mut self, surface: F) {
        self.surface = Some(surface);
    }

    pub fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    pub fn state(&self) -> &FlameState {
        &self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn surface(&self) -> Option<&F> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut F> {
        self.surface.as_mut()
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Ticks simulated since the last start
    pub fn tick_count(&self) -> u64 {
        self.state.time_ticks
    }

    /// Particles spawned by the most recent tick
    pub fn last_report(&self) -> SpawnReport {
        self.last_report
    }

    /// Host timestamp of the most recent frame
    pub fn last_timestamp(&self) -> Option<f64> {
        self.last_timestamp
    }
}

impl<F, R> FlameEngine<F, ManualScheduler, R>
where
    F: FlameSurface,
    R: RandomSource,
{
    /// Fire every due callback once. Returns how many fired.
    pub fn pump(&mut self, timestamp: f64) -> usize {
        let due = self.scheduler.take_due();
        for handle in &due {
            self.on_frame(*handle, timestamp);
        }
        due.len()
    }

    /// Pump `frames` frames at a nominal 60 Hz
    pub fn run_frames(&mut self, frames: u32) {
        let base = self.last_timestamp.unwrap_or(0.0);
        for i in 1..=frames {
            self.pump(base + i as f64 * 1000.0 / 60.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{BreathPhase, Level};

    /// Surface that records what it was asked to show
    #[derive(Default)]
    struct RecordingSurface {
        frames: usize,
        last_sprites: usize,
        fail: bool,
    }

    impl FlameSurface for RecordingSurface {
        fn present(&mut self, frame: &DrawList) -> Result<(), RenderError> {
            if self.fail {
                return Err(RenderError::SurfaceUnavailable("test".into()));
            }
            self.frames += 1;
            self.last_sprites = frame.len();
            Ok(())
        }
    }

    fn engine(inputs: FlameInputs) -> FlameEngine<RecordingSurface, ManualScheduler> {
        let settings = Settings {
            seed: Some(7),
            ..Settings::default()
        };
        FlameEngine::new(
            inputs,
            settings,
            ManualScheduler::new(),
            Some(RecordingSurface::default()),
        )
    }

    #[test]
    fn test_one_tick_per_frame() {
        let mut e = engine(FlameInputs::idle(Level::Strong));
        assert!(e.start());
        e.run_frames(30);
        assert_eq!(e.tick_count(), 30);
        assert_eq!(e.surface().map(|s| s.frames), Some(30));
        // Exactly one callback outstanding at any time
        assert_eq!(e.scheduler().pending().len(), 1);
    }

    #[test]
    fn test_start_is_idempotent() {
        let mut e = engine(FlameInputs::idle(Level::Dormant));
        assert!(e.start());
        assert!(e.start());
        assert_eq!(e.scheduler().requested(), 1);
    }

    #[test]
    fn test_no_updates_after_stop() {
        let mut e = engine(FlameInputs::idle(Level::Peak));
        e.start();
        e.run_frames(20);
        assert!(e.state().population() > 0);

        e.stop();
        assert!(!e.is_running());
        assert_eq!(e.scheduler().cancelled().len(), 1);
        assert!(e.scheduler().pending().is_empty());
        assert_eq!(e.state().population(), 0);

        let cancelled = e.scheduler().cancelled()[0];
        for i in 0..10 {
            e.run_frames(1);
            // A callback the host fires after cancellation is ignored too
            e.on_frame(cancelled, i as f64);
        }
        assert_eq!(e.tick_count(), 0);
        assert_eq!(e.state().population(), 0);
        assert_eq!(e.surface().map(|s| s.frames), Some(20));
    }

    #[test]
    fn test_stale_handle_does_not_double_schedule() {
        let mut e = engine(FlameInputs::idle(Level::Strong));
        e.start();
        let first = e.scheduler().pending()[0];
        e.stop();
        e.start();
        let fresh = e.scheduler().pending()[0];
        assert_ne!(first, fresh);

        // The old callback races in while the fresh one is still pending
        e.on_frame(first, 1.0);
        assert_eq!(e.tick_count(), 0);
        assert!(e.is_running());
        assert_eq!(e.scheduler().pending(), &[fresh]);
        assert_eq!(e.scheduler().requested(), 2);

        assert_eq!(e.pump(2.0), 1);
        assert_eq!(e.tick_count(), 1);
        assert_eq!(e.scheduler().pending().len(), 1);
        assert_eq!(e.scheduler().requested(), 3);

        // A handle that already fired does nothing the second time
        e.on_frame(fresh, 3.0);
        assert_eq!(e.tick_count(), 1);
        assert_eq!(e.scheduler().requested(), 3);
    }

    #[test]
    fn test_missing_surface_is_silent_noop() {
        let mut e: FlameEngine<RecordingSurface, ManualScheduler> = FlameEngine::new(
            FlameInputs::idle(Level::Peak),
            Settings::default(),
            ManualScheduler::new(),
            None,
        );
        assert!(!e.start());
        assert_eq!(e.scheduler().requested(), 0);
        e.run_frames(5);
        assert_eq!(e.tick_count(), 0);

        e.attach_surface(RecordingSurface::default());
        assert!(e.start());
        e.run_frames(5);
        assert_eq!(e.tick_count(), 5);
    }

    #[test]
    fn test_restart_begins_empty() {
        let mut e = engine(FlameInputs::idle(Level::Building));
        e.start();
        e.run_frames(60);
        e.stop();
        e.start();
        assert_eq!(e.state().population(), 0);
        assert_eq!(e.state().scale.value, 1.0);
        e.run_frames(1);
        assert_eq!(e.tick_count(), 1);
    }

    #[test]
    fn test_level_change_restarts_fresh() {
        let mut e = engine(FlameInputs::idle(Level::Dormant));
        e.start();
        e.run_frames(40);
        e.set_inputs(FlameInputs::idle(Level::Peak));
        assert!(e.is_running());
        assert_eq!(e.state().population(), 0);
        assert_eq!(e.tick_count(), 0);
        assert_eq!(e.state().tuning.profile, Level::Peak.profile());
        assert_eq!(e.scheduler().cancelled().len(), 1);
    }

    #[test]
    fn test_phase_change_keeps_live_particles() {
        let mut e = engine(FlameInputs::breathing(Level::Strong, BreathPhase::Inhale));
        e.start();
        e.run_frames(40);
        let before = e.state().flames.clone();
        let ticks = e.tick_count();

        e.set_inputs(FlameInputs::breathing(Level::Strong, BreathPhase::Exhale));
        assert_eq!(e.tick_count(), ticks);
        assert_eq!(e.state().flames, before);
        assert_eq!(e.state().tuning.target.scale, 0.7);
        assert!(e.scheduler().cancelled().is_empty());
    }

    #[test]
    fn test_peak_inhale_outburns_dormant_hold_empty() {
        let mut peak = engine(FlameInputs::breathing(Level::Peak, BreathPhase::Inhale));
        let mut dormant = engine(FlameInputs::breathing(Level::Dormant, BreathPhase::HoldEmpty));
        peak.start();
        dormant.start();
        peak.run_frames(120);
        dormant.run_frames(120);

        assert_eq!(peak.tick_count(), 120);
        assert_eq!(dormant.tick_count(), 120);
        assert!(peak.state().scale.value > 1.2);
        assert!(dormant.state().scale.value < 1.0);
        assert!(
            peak.state().flames.len() > dormant.state().flames.len(),
            "peak {} vs dormant {}",
            peak.state().flames.len(),
            dormant.state().flames.len()
        );
        let peak_sprites = peak.surface().map(|s| s.last_sprites).unwrap_or_default();
        let dormant_sprites = dormant.surface().map(|s| s.last_sprites).unwrap_or_default();
        assert!(peak_sprites > dormant_sprites);
    }

    #[test]
    fn test_engines_share_nothing() {
        let mut a = engine(FlameInputs::idle(Level::Peak));
        let mut b = engine(FlameInputs::idle(Level::Peak));
        a.start();
        b.start();
        a.run_frames(30);
        assert_eq!(b.tick_count(), 0);
        assert_eq!(b.state().population(), 0);

        a.stop();
        b.run_frames(10);
        assert_eq!(b.tick_count(), 10);
    }

    #[test]
    fn test_present_errors_do_not_stop_simulation() {
        let mut e = engine(FlameInputs::idle(Level::Strong));
        if let Some(s) = e.surface_mut() {
            s.fail = true;
        }
        e.start();
        e.run_frames(10);
        assert_eq!(e.tick_count(), 10);
        assert!(e.is_running());
    }

    #[test]
    fn test_same_seed_same_frames() {
        let mut a = engine(FlameInputs::idle(Level::Strong));
        let mut b = engine(FlameInputs::idle(Level::Strong));
        a.start();
        b.start();
        a.run_frames(50);
        b.run_frames(50);
        assert_eq!(a.state().flames, b.state().flames);
        assert_eq!(
            a.surface().map(|s| s.last_sprites),
            b.surface().map(|s| s.last_sprites)
        );
    }
}
