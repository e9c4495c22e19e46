//! # Scene Management Module
//!
//! Objects, their meshes and transforms, and the [`Scene`] that owns them
//! together with materials, lights and the camera.
//!
//! - [`Scene`] - builds the knot field and drives per-frame state
//! - [`Object`] - one drawable with meshes, a material and a transform
//! - [`Vertex3D`] - vertex format shared by all meshes

pub mod object;
pub mod scene;
pub mod vertex;

// Re-export main types
pub use object::{DrawObject, Mesh, Object};
pub use scene::Scene;
pub use vertex::Vertex3D;
