//! Flame rendering
//!
//! The compositor turns simulation state into a backend-agnostic draw list of
//! radial-gradient sprites; the glow pipeline presents it with WebGPU.

pub mod compositor;
pub mod glow_pipeline;
pub mod instance;

pub use compositor::{ColorStop, DrawList, GlowSprite, Layer, composite};
pub use glow_pipeline::GlowRenderState;
pub use instance::GlowInstance;
