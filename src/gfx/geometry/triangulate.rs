//! # Polygon Triangulation
//!
//! Ear-clipping triangulation for simple polygons with holes. Holes are
//! stitched into the outer contour through a zero-width bridge, then the
//! merged polygon is clipped ear by ear.
//!
//! Input contours may have any winding; the outer contour is normalised to
//! counter-clockwise and holes to clockwise. Returned triangles index into
//! the concatenation `outer ++ holes[0] ++ holes[1] ++ ...` and are
//! counter-clockwise.

const EPSILON: f32 = 1e-7;

/// Signed area of a closed contour (positive = counter-clockwise)
pub fn signed_area(points: &[[f32; 2]]) -> f32 {
    let n = points.len();
    let mut area = 0.0;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        area += a[0] * b[1] - b[0] * a[1];
    }
    area * 0.5
}

/// Even-odd point-in-polygon test
pub fn contains_point(polygon: &[[f32; 2]], point: [f32; 2]) -> bool {
    let mut inside = false;
    let n = polygon.len();
    let mut j = n.wrapping_sub(1);
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[j];
        if (a[1] > point[1]) != (b[1] > point[1]) {
            let x = (b[0] - a[0]) * (point[1] - a[1]) / (b[1] - a[1]) + a[0];
            if point[0] < x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Triangulates `outer` minus `holes`
///
/// Returns index triples into the concatenated input points. Contours with
/// fewer than three points are ignored.
pub fn triangulate(outer: &[[f32; 2]], holes: &[Vec<[f32; 2]>]) -> Vec<[u32; 3]> {
    if outer.len() < 3 {
        return Vec::new();
    }

    let mut points: Vec<[f32; 2]> = outer.to_vec();
    let mut polygon: Vec<usize> = (0..outer.len()).collect();
    if signed_area(outer) < 0.0 {
        polygon.reverse();
    }

    // Holes become clockwise index rings into `points`
    let mut hole_rings: Vec<Vec<usize>> = Vec::new();
    for hole in holes {
        let offset = points.len();
        points.extend_from_slice(hole);
        if hole.len() < 3 {
            continue;
        }
        let mut ring: Vec<usize> = (offset..offset + hole.len()).collect();
        if signed_area(hole) > 0.0 {
            ring.reverse();
        }
        hole_rings.push(ring);
    }

    // Bridge holes from right to left so earlier bridges never cross later holes
    hole_rings.sort_by(|a, b| {
        let ax = rightmost(&points, a).1;
        let bx = rightmost(&points, b).1;
        bx.partial_cmp(&ax).unwrap_or(std::cmp::Ordering::Equal)
    });

    for (hole_idx, ring) in hole_rings.iter().enumerate() {
        let (m_pos, _) = rightmost(&points, ring);
        let m = ring[m_pos];
        // Unmerged holes, this one included, can block the bridge
        let others = &hole_rings[hole_idx..];

        let Some(bridge_pos) = find_bridge(&points, &polygon, others, m) else {
            log::debug!("No visible bridge for hole, skipping it");
            continue;
        };

        // outer[..=v] ++ hole[m..] ++ hole[..=m] ++ outer[v..]
        let mut merged = Vec::with_capacity(polygon.len() + ring.len() + 2);
        merged.extend_from_slice(&polygon[..=bridge_pos]);
        merged.extend_from_slice(&ring[m_pos..]);
        merged.extend_from_slice(&ring[..=m_pos]);
        merged.extend_from_slice(&polygon[bridge_pos..]);
        polygon = merged;
    }

    clip_ears(&points, polygon)
}

fn rightmost(points: &[[f32; 2]], ring: &[usize]) -> (usize, f32) {
    let mut best = (0, f32::MIN);
    for (pos, &idx) in ring.iter().enumerate() {
        if points[idx][0] > best.1 {
            best = (pos, points[idx][0]);
        }
    }
    best
}

/// Position in `polygon` of the closest vertex that `m` can see
fn find_bridge(
    points: &[[f32; 2]],
    polygon: &[usize],
    holes: &[Vec<usize>],
    m: usize,
) -> Option<usize> {
    let mp = points[m];
    let mut candidates: Vec<(usize, f32)> = polygon
        .iter()
        .enumerate()
        .map(|(pos, &idx)| {
            let p = points[idx];
            let dx = p[0] - mp[0];
            let dy = p[1] - mp[1];
            // Prefer vertices to the right, which is where a visible one usually sits
            let penalty = if dx >= 0.0 { 0.0 } else { 1.0e6 };
            (pos, dx * dx + dy * dy + penalty)
        })
        .collect();
    candidates.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    candidates.into_iter().map(|(pos, _)| pos).find(|&pos| {
        let v = polygon[pos];
        let n = polygon.len();
        let prev = polygon[(pos + n - 1) % n];
        let next = polygon[(pos + 1) % n];
        locally_inside(points, prev, v, next, m)
            && !ring_blocks(points, polygon, mp, points[v])
            && !holes
                .iter()
                .any(|ring| ring_blocks(points, ring, mp, points[v]))
    })
}

/// Whether the segment a-b crosses any edge of the ring (shared endpoints excluded)
fn ring_blocks(points: &[[f32; 2]], ring: &[usize], a: [f32; 2], b: [f32; 2]) -> bool {
    let n = ring.len();
    (0..n).any(|i| {
        let c = points[ring[i]];
        let d = points[ring[(i + 1) % n]];
        if same_point(c, a) || same_point(c, b) || same_point(d, a) || same_point(d, b) {
            return false;
        }
        segments_intersect(a, b, c, d)
    })
}

/// Whether the diagonal v->m leaves v into the polygon interior
fn locally_inside(points: &[[f32; 2]], prev: usize, v: usize, next: usize, m: usize) -> bool {
    let (a, b, c, p) = (points[prev], points[v], points[next], points[m]);
    if cross(a, b, c) >= 0.0 {
        // Convex corner: m must lie left of both edges
        cross(a, b, p) >= 0.0 && cross(b, c, p) >= 0.0
    } else {
        // Reflex corner: left of either edge is enough
        cross(a, b, p) >= 0.0 || cross(b, c, p) >= 0.0
    }
}

fn clip_ears(points: &[[f32; 2]], mut polygon: Vec<usize>) -> Vec<[u32; 3]> {
    let mut triangles = Vec::with_capacity(polygon.len().saturating_sub(2));

    while polygon.len() > 3 {
        let n = polygon.len();
        let ear = (0..n).find(|&i| is_ear(points, &polygon, i));

        let i = match ear {
            Some(i) => i,
            None => {
                // Self-touching input: clip the most convex corner and carry on
                log::trace!("No ear found among {} vertices, forcing a clip", n);
                (0..n)
                    .max_by(|&x, &y| {
                        corner_cross(points, &polygon, x)
                            .partial_cmp(&corner_cross(points, &polygon, y))
                            .unwrap_or(std::cmp::Ordering::Equal)
                    })
                    .unwrap_or(0)
            }
        };

        let prev = polygon[(i + n - 1) % n];
        let next = polygon[(i + 1) % n];
        if corner_cross(points, &polygon, i).abs() > EPSILON {
            triangles.push([prev as u32, polygon[i] as u32, next as u32]);
        }
        polygon.remove(i);
    }

    if polygon.len() == 3 && corner_cross(points, &polygon, 1).abs() > EPSILON {
        triangles.push([polygon[0] as u32, polygon[1] as u32, polygon[2] as u32]);
    }

    triangles
}

fn corner_cross(points: &[[f32; 2]], polygon: &[usize], i: usize) -> f32 {
    let n = polygon.len();
    cross(
        points[polygon[(i + n - 1) % n]],
        points[polygon[i]],
        points[polygon[(i + 1) % n]],
    )
}

fn is_ear(points: &[[f32; 2]], polygon: &[usize], i: usize) -> bool {
    let n = polygon.len();
    let a = points[polygon[(i + n - 1) % n]];
    let b = points[polygon[i]];
    let c = points[polygon[(i + 1) % n]];

    if cross(a, b, c) <= EPSILON {
        return false;
    }

    polygon.iter().all(|&idx| {
        let p = points[idx];
        // Bridge duplicates share positions with the corner; they never block it
        if same_point(p, a) || same_point(p, b) || same_point(p, c) {
            return true;
        }
        !point_in_triangle(a, b, c, p)
    })
}

fn cross(a: [f32; 2], b: [f32; 2], c: [f32; 2]) -> f32 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}

fn same_point(a: [f32; 2], b: [f32; 2]) -> bool {
    (a[0] - b[0]).abs() <= EPSILON && (a[1] - b[1]).abs() <= EPSILON
}

fn point_in_triangle(a: [f32; 2], b: [f32; 2], c: [f32; 2], p: [f32; 2]) -> bool {
    cross(a, b, p) >= 0.0 && cross(b, c, p) >= 0.0 && cross(c, a, p) >= 0.0
}

fn segments_intersect(p1: [f32; 2], p2: [f32; 2], q1: [f32; 2], q2: [f32; 2]) -> bool {
    let d1 = cross(q1, q2, p1);
    let d2 = cross(q1, q2, p2);
    let d3 = cross(p1, p2, q1);
    let d4 = cross(p1, p2, q2);
    ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
}
