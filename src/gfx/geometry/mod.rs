//! # Procedural Geometry Generation
//!
//! Builds the meshes the knot field needs without any model files.
//!
//! ## Supported Shapes
//!
//! - **Torus knot**: (p, q) knot swept by a circular tube
//! - **Extruded outlines**: closed 2D contours (with holes) extruded along +Z,
//!   used for the text label
//!
//! ## Usage
//!
//! ```rust
//! use neon_knots::gfx::geometry::generate_torus_knot;
//!
//! // Knot of radius 1.0 with a 0.1 tube, 100 x 16 segments, (2, 3) winding
//! let knot = generate_torus_knot(1.0, 0.1, 100, 16, 2, 3);
//! assert_eq!(knot.triangle_count(), 100 * 16 * 2);
//! ```

pub mod extrude;
pub mod primitives;
pub mod triangulate;

pub use extrude::{extrude_shapes, Shape};
pub use primitives::*;

/// Represents generated geometry data ready for GPU upload
#[derive(Debug, Clone, Default)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Normal vectors (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices (counter-clockwise winding)
    pub indices: Vec<u32>,
}

impl GeometryData {
    /// Create a new empty geometry data structure
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of vertices in this geometry
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of triangles in this geometry
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Convert to the vertex format used by the renderer
    pub fn to_scene_format(&self) -> (Vec<crate::gfx::scene::vertex::Vertex3D>, Vec<u32>) {
        use crate::gfx::scene::vertex::Vertex3D;

        let vertices: Vec<Vertex3D> = (0..self.vertices.len())
            .map(|i| Vertex3D {
                position: self.vertices[i],
                normal: self.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
            })
            .collect();

        (vertices, self.indices.clone())
    }
}
