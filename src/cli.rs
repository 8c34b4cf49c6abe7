//! Command line for the headless flame runner

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(name = "bonfire-flame")]
#[command(about = "Run the breath-driven flame simulation headless and report statistics", long_about = None)]
#[command(version)]
#[command(author)]
pub struct Cli {
    /// Flame level (dormant, building, strong, peak or a progression tag).
    /// Every level is run when omitted.
    #[arg(short, long)]
    pub level: Option<String>,

    /// Breath phase (inhale, hold, exhale, hold-empty); idle flame when omitted
    #[arg(short, long)]
    pub phase: Option<String>,

    /// Covenant tint for the ambient glow (respite, focus, vigor)
    #[arg(short, long)]
    pub covenant: Option<String>,

    /// Frames to simulate per run
    #[arg(short, long, default_value_t = 300)]
    pub frames: u32,

    /// Quality preset (low, medium, high)
    #[arg(short, long)]
    pub quality: Option<String>,

    /// RNG seed
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Damp flame turbulence
    #[arg(long)]
    pub reduced_motion: bool,

    /// Settings JSON file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print one JSON object per run instead of a table
    #[arg(long)]
    pub json: bool,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
