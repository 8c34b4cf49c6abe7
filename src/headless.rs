//! Headless flame runs driven by a manual scheduler

use anyhow::{Context, Result};
use serde::Serialize;

use bonfire_flame::renderer::{DrawList, Layer};
use bonfire_flame::sim::{BreathPhase, Covenant, FlameInputs, Level};
use bonfire_flame::{FlameEngine, FlameSurface, ManualScheduler, QualityPreset, RenderError, Settings};

use crate::cli::Cli;

/// Surface that only measures the frames it is shown
#[derive(Debug, Default)]
struct StatsSurface {
    frames: u64,
    total_sprites: u64,
    peak_sprites: usize,
    last_sprites: usize,
    bloom_alpha: f32,
}

impl FlameSurface for StatsSurface {
    fn present(&mut self, frame: &DrawList) -> Result<(), RenderError> {
        self.frames += 1;
        self.total_sprites += frame.len() as u64;
        self.peak_sprites = self.peak_sprites.max(frame.len());
        self.last_sprites = frame.len();
        self.bloom_alpha = frame
            .sprites
            .iter()
            .filter(|s| s.layer == Layer::Bloom)
            .map(|s| s.peak_alpha())
            .fold(0.0, f32::max);
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct RunSummary {
    level: &'static str,
    phase: Option<&'static str>,
    frames: u64,
    flames: usize,
    embers: usize,
    sprites: usize,
    mean_sprites: f32,
    peak_sprites: usize,
    bloom_alpha: f32,
    scale: f32,
    intensity: f32,
}

fn load_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = match &cli.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str::<Settings>(&json)
                .with_context(|| format!("parsing {}", path.display()))?
        }
        None => Settings::load(),
    };

    if let Some(q) = &cli.quality {
        settings.quality = QualityPreset::parse(q)
            .with_context(|| format!("unknown quality preset {:?}", q))?;
    }
    if cli.seed.is_some() {
        settings.seed = cli.seed;
    }
    settings.reduced_motion |= cli.reduced_motion;
    Ok(settings.sanitized())
}

fn run_one(inputs: FlameInputs, settings: &Settings, frames: u32) -> RunSummary {
    let mut engine = FlameEngine::new(
        inputs,
        settings.clone(),
        ManualScheduler::new(),
        Some(StatsSurface::default()),
    );
    engine.start();
    engine.run_frames(frames);

    let state = engine.state();
    let stats = engine.surface().map(|s| (s.frames, s.total_sprites, s.peak_sprites, s.last_sprites, s.bloom_alpha));
    let (frames_shown, total, peak, last, bloom) = stats.unwrap_or_default();

    RunSummary {
        level: inputs.level.as_str(),
        phase: inputs.phase.map(|p| p.as_str()),
        frames: engine.tick_count(),
        flames: state.flames.len(),
        embers: state.embers.len(),
        sprites: last,
        mean_sprites: if frames_shown > 0 { total as f32 / frames_shown as f32 } else { 0.0 },
        peak_sprites: peak,
        bloom_alpha: bloom,
        scale: state.scale.value,
        intensity: state.intensity.value,
    }
}

/// Levels to run: the one named on the command line, or all of them
fn selected_levels(cli: &Cli) -> Result<Vec<Level>> {
    match &cli.level {
        Some(tag) => {
            let level = Level::parse(tag).with_context(|| format!("unknown level {:?}", tag))?;
            Ok(vec![level])
        }
        None => Ok(Level::ALL.to_vec()),
    }
}

pub fn run(cli: &Cli) -> Result<()> {
    let settings = load_settings(cli)?;

    let levels = selected_levels(cli)?;
    let phase = match &cli.phase {
        Some(tag) => Some(BreathPhase::parse(tag).with_context(|| format!("unknown breath phase {:?}", tag))?),
        None => None,
    };
    let covenant = match &cli.covenant {
        Some(tag) => Some(Covenant::parse(tag).with_context(|| format!("unknown covenant {:?}", tag))?),
        None => None,
    };

    log::info!(
        "Running {} level(s) for {} frames at {} quality",
        levels.len(),
        cli.frames,
        settings.quality.as_str()
    );

    if !cli.json {
        println!(
            "{:<10} {:<11} {:>6} {:>7} {:>7} {:>8} {:>9} {:>6} {:>6}",
            "level", "phase", "frames", "flames", "embers", "sprites", "mean", "bloom", "scale"
        );
    }

    for level in levels {
        let mut inputs = match phase {
            Some(p) => FlameInputs::breathing(level, p),
            None => FlameInputs::idle(level),
        };
        inputs.covenant = covenant;

        let summary = run_one(inputs, &settings, cli.frames);
        if cli.json {
            println!("{}", serde_json::to_string(&summary)?);
        } else {
            println!(
                "{:<10} {:<11} {:>6} {:>7} {:>7} {:>8} {:>9.1} {:>6.3} {:>6.3}",
                summary.level,
                summary.phase.unwrap_or("idle"),
                summary.frames,
                summary.flames,
                summary.embers,
                summary.sprites,
                summary.mean_sprites,
                summary.bloom_alpha,
                summary.scale
            );
        }
    }

    Ok(())
}
