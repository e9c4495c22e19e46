//! # Primitive Shape Generation
//!
//! Torus knot generation. Normals point away from the tube's center line.

use cgmath::{InnerSpace, Vector3};
use std::f32::consts::PI;

use super::GeometryData;

/// Generate a (p, q) torus knot centered at the origin
///
/// # Arguments
/// * `radius` - Radius of the knot's center curve
/// * `tube` - Radius of the swept tube
/// * `tubular_segments` - Segments along the knot curve
/// * `radial_segments` - Segments around the tube
/// * `p` - Windings around the axis of rotational symmetry
/// * `q` - Windings around the interior circle of the torus
///
/// Produces `(tubular_segments + 1) * (radial_segments + 1)` vertices; the
/// seam vertices are duplicated so each ring closes on itself.
pub fn generate_torus_knot(
    radius: f32,
    tube: f32,
    tubular_segments: u32,
    radial_segments: u32,
    p: u32,
    q: u32,
) -> GeometryData {
    let mut data = GeometryData::new();

    let tubular = tubular_segments.max(3);
    let radial = radial_segments.max(3);
    let p = p.max(1) as f32;
    let q = q as f32;

    for i in 0..=tubular {
        // u runs p full turns so the curve closes
        let u = i as f32 / tubular as f32 * p * PI * 2.0;

        // Frenet-like frame from the curve and a point slightly ahead
        let p1 = knot_curve_point(u, p, q, radius);
        let p2 = knot_curve_point(u + 0.01, p, q, radius);

        let tangent = p2 - p1;
        let mut normal = p2 + p1;
        let binormal = tangent.cross(normal).normalize();
        normal = binormal.cross(tangent).normalize();

        for j in 0..=radial {
            let v = j as f32 / radial as f32 * PI * 2.0;
            let cx = -tube * v.cos();
            let cy = tube * v.sin();

            let vertex = p1 + normal * cx + binormal * cy;
            let vertex_normal = (vertex - p1).normalize();

            data.vertices.push(vertex.into());
            data.normals.push(vertex_normal.into());
        }
    }

    for j in 1..=tubular {
        for i in 1..=radial {
            let a = (radial + 1) * (j - 1) + (i - 1);
            let b = (radial + 1) * j + (i - 1);
            let c = (radial + 1) * j + i;
            let d = (radial + 1) * (j - 1) + i;

            // First triangle
            data.indices.push(a);
            data.indices.push(b);
            data.indices.push(d);

            // Second triangle
            data.indices.push(b);
            data.indices.push(c);
            data.indices.push(d);
        }
    }

    data
}

fn knot_curve_point(u: f32, p: f32, q: f32, radius: f32) -> Vector3<f32> {
    let cu = u.cos();
    let su = u.sin();
    let qu_over_p = q / p * u;
    let cs = qu_over_p.cos();

    Vector3::new(
        radius * (2.0 + cs) * 0.5 * cu,
        radius * (2.0 + cs) * su * 0.5,
        radius * qu_over_p.sin() * 0.5,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_torus_knot_generation() {
        let knot = generate_torus_knot(0.5, 0.1, 100, 16, 2, 3);
        assert_eq!(knot.vertex_count(), 101 * 17);
        assert_eq!(knot.normals.len(), knot.vertices.len());
        assert_eq!(knot.indices.len(), 100 * 16 * 6);
        assert_eq!(knot.triangle_count(), 3200);

        let max_index = *knot.indices.iter().max().unwrap();
        assert!((max_index as usize) < knot.vertex_count());
    }

    #[test]
    fn test_torus_knot_normals_are_unit_length() {
        let knot = generate_torus_knot(1.2, 0.1, 64, 8, 2, 3);
        for n in &knot.normals {
            let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            assert!((len - 1.0).abs() < 1e-3, "normal length {}", len);
        }
    }

    #[test]
    fn test_torus_knot_scales_with_radius() {
        let extent = |data: &GeometryData| {
            data.vertices
                .iter()
                .map(|v| (v[0] * v[0] + v[1] * v[1]).sqrt())
                .fold(0.0f32, f32::max)
        };
        let small = generate_torus_knot(0.3, 0.1, 100, 16, 2, 3);
        let large = generate_torus_knot(1.5, 0.1, 100, 16, 2, 3);

        // Center curve reaches 1.5 * radius from the axis, plus the tube
        assert!((extent(&small) - (0.45 + 0.1)).abs() < 0.02);
        assert!((extent(&large) - (2.25 + 0.1)).abs() < 0.02);
    }

    #[test]
    fn test_segment_counts_are_clamped() {
        let knot = generate_torus_knot(1.0, 0.1, 0, 1, 2, 3);
        assert_eq!(knot.vertex_count(), 4 * 4);
    }
}
