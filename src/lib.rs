//! neon-knots
//!
//! A rotating field of neon torus knots and an extruded 3D text label,
//! rendered with wgpu in a winit window.

pub mod app;
pub mod config;
pub mod gfx;
pub mod sampling;
pub mod text;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::NeonKnotsApp;
pub use config::DemoConfig;
