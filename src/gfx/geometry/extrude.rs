//! # Outline Extrusion
//!
//! Turns flat shapes (an outer contour plus holes, in the XY plane) into a
//! closed solid between `z = 0` and `z = depth`. Caps are triangulated with
//! [`triangulate`](super::triangulate::triangulate); side walls get one quad
//! per contour edge with a flat outward normal.

use super::{
    triangulate::{signed_area, triangulate},
    GeometryData,
};

/// A filled 2D region: one outer contour and any number of holes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Shape {
    pub outer: Vec<[f32; 2]>,
    pub holes: Vec<Vec<[f32; 2]>>,
}

impl Shape {
    pub fn new(outer: Vec<[f32; 2]>) -> Self {
        Self {
            outer,
            holes: Vec::new(),
        }
    }

    pub fn with_hole(mut self, hole: Vec<[f32; 2]>) -> Self {
        self.holes.push(hole);
        self
    }
}

/// Extrudes every shape along +Z and merges the results into one mesh
pub fn extrude_shapes(shapes: &[Shape], depth: f32) -> GeometryData {
    let mut data = GeometryData::new();
    for shape in shapes {
        extrude_shape(&mut data, shape, depth);
    }
    data
}

fn extrude_shape(data: &mut GeometryData, shape: &Shape, depth: f32) {
    if shape.outer.len() < 3 {
        return;
    }

    let mut cap_points: Vec<[f32; 2]> = shape.outer.clone();
    for hole in &shape.holes {
        cap_points.extend_from_slice(hole);
    }
    let triangles = triangulate(&shape.outer, &shape.holes);

    // Front cap faces +Z
    let front_base = data.vertices.len() as u32;
    for p in &cap_points {
        data.vertices.push([p[0], p[1], depth]);
        data.normals.push([0.0, 0.0, 1.0]);
    }
    for t in &triangles {
        data.indices
            .extend_from_slice(&[front_base + t[0], front_base + t[1], front_base + t[2]]);
    }

    // Back cap faces -Z, so its winding is flipped
    let back_base = data.vertices.len() as u32;
    for p in &cap_points {
        data.vertices.push([p[0], p[1], 0.0]);
        data.normals.push([0.0, 0.0, -1.0]);
    }
    for t in &triangles {
        data.indices
            .extend_from_slice(&[back_base + t[0], back_base + t[2], back_base + t[1]]);
    }

    add_walls(data, &shape.outer, true, depth);
    for hole in &shape.holes {
        add_walls(data, hole, false, depth);
    }
}

/// Side quads for one contour; outer contours run CCW, holes CW
fn add_walls(data: &mut GeometryData, contour: &[[f32; 2]], is_outer: bool, depth: f32) {
    if contour.len() < 3 {
        return;
    }

    let ccw = signed_area(contour) > 0.0;
    let mut ring: Vec<[f32; 2]> = contour.to_vec();
    if ccw != is_outer {
        ring.reverse();
    }

    let n = ring.len();
    for i in 0..n {
        let p0 = ring[i];
        let p1 = ring[(i + 1) % n];
        let dx = p1[0] - p0[0];
        let dy = p1[1] - p0[1];
        let len = (dx * dx + dy * dy).sqrt();
        if len <= f32::EPSILON {
            continue;
        }
        let normal = [dy / len, -dx / len, 0.0];

        let base = data.vertices.len() as u32;
        data.vertices.push([p0[0], p0[1], 0.0]);
        data.vertices.push([p1[0], p1[1], 0.0]);
        data.vertices.push([p1[0], p1[1], depth]);
        data.vertices.push([p0[0], p0[1], depth]);
        data.normals.extend_from_slice(&[normal; 4]);

        data.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(min: f32, max: f32) -> Vec<[f32; 2]> {
        vec![[min, min], [max, min], [max, max], [min, max]]
    }

    fn face_normal(data: &GeometryData, tri: &[u32]) -> [f32; 3] {
        let a = data.vertices[tri[0] as usize];
        let b = data.vertices[tri[1] as usize];
        let c = data.vertices[tri[2] as usize];
        let e1 = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
        let e2 = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
        [
            e1[1] * e2[2] - e1[2] * e2[1],
            e1[2] * e2[0] - e1[0] * e2[2],
            e1[0] * e2[1] - e1[1] * e2[0],
        ]
    }

    #[test]
    fn test_extruded_square_is_a_box() {
        let data = extrude_shapes(&[Shape::new(square(0.0, 1.0))], 0.2);

        // 2 caps * 2 triangles + 4 walls * 2 triangles
        assert_eq!(data.triangle_count(), 12);
        assert_eq!(data.vertex_count(), 4 + 4 + 4 * 4);
        assert_eq!(data.normals.len(), data.vertices.len());

        for v in &data.vertices {
            assert!(v[2] == 0.0 || (v[2] - 0.2).abs() < 1e-6);
        }
    }

    #[test]
    fn test_winding_agrees_with_normals() {
        let shape = Shape::new(square(0.0, 4.0)).with_hole(square(1.0, 2.0));
        let data = extrude_shapes(&[shape], 0.5);

        for tri in data.indices.chunks(3) {
            let geometric = face_normal(&data, tri);
            let stored = data.normals[tri[0] as usize];
            let dot = geometric[0] * stored[0] + geometric[1] * stored[1] + geometric[2] * stored[2];
            assert!(dot > 0.0, "triangle {:?} faces away from its normal", tri);
        }
    }

    #[test]
    fn test_clockwise_outer_is_handled() {
        let mut outer = square(0.0, 1.0);
        outer.reverse();
        let data = extrude_shapes(&[Shape::new(outer)], 1.0);

        // Wall normals point away from the square's center
        for (v, n) in data.vertices.iter().zip(&data.normals) {
            if n[2] == 0.0 {
                let to_vertex = [v[0] - 0.5, v[1] - 0.5];
                assert!(to_vertex[0] * n[0] + to_vertex[1] * n[1] > 0.0);
            }
        }
    }

    #[test]
    fn test_degenerate_shape_is_skipped() {
        let data = extrude_shapes(&[Shape::new(vec![[0.0, 0.0], [1.0, 0.0]])], 1.0);
        assert!(data.is_empty());
    }
}
