//! # Graphics Module
//!
//! Everything that ends up on screen: the orbit camera, CPU-side geometry
//! generation, the wgpu render engine, GPU resources and the scene.
//!
//! ## Architecture Overview
//!
//! - **Camera System** ([`camera`]) - Orbit camera with damped rotate, pan and zoom
//! - **Geometry** ([`geometry`]) - Torus knots, triangulation and extrusion
//! - **Rendering Pipeline** ([`rendering`]) - Forward PBR pass with MSAA
//! - **Scene Management** ([`scene`]) - Objects, meshes and their transforms
//! - **Resource Management** ([`resources`]) - Materials, global uniforms and render targets
//!
//! CPU state is built first; [`RenderEngine::init_scene`] uploads it once a
//! device exists.

pub mod camera;
pub mod geometry;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use camera::orbit_camera::OrbitCamera;
pub use rendering::render_engine::RenderEngine;
