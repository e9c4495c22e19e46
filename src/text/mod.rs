//! # Text Label
//!
//! Typeface loading, text layout and the extruded label mesh.

pub mod loader;
pub mod typeface;

use thiserror::Error;

use crate::{
    config::LabelSettings,
    gfx::geometry::{extrude_shapes, GeometryData},
};

pub use loader::{FontLoad, FontLoader};
pub use typeface::Typeface;

#[derive(Debug, Error)]
pub enum FontError {
    #[error("font request failed: {0}")]
    Fetch(#[from] ureq::Error),
    #[error("invalid typeface JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("malformed outline for glyph {glyph:?} at token {token:?}")]
    Outline { glyph: String, token: String },
    #[error("could not start the font fetch thread: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("font fetch ended without a result")]
    Canceled,
}

/// Lays out the label text and extrudes it into a closed mesh
pub fn build_label_geometry(
    typeface: &Typeface,
    settings: &LabelSettings,
) -> Result<GeometryData, FontError> {
    let shapes = typeface.generate_shapes(&settings.text, settings.size, settings.curve_segments)?;
    Ok(extrude_shapes(&shapes, settings.depth))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLOCK_FONT: &str = r#"{
        "glyphs": {
            "H": { "ha": 800, "o": "m 0 0 l 200 0 l 200 400 l 600 400 l 600 0 l 800 0 l 800 1000 l 600 1000 l 600 600 l 200 600 l 200 1000 l 0 1000 l 0 0" },
            "O": { "ha": 1000, "o": "m 0 0 l 1000 0 l 1000 1000 l 0 1000 l 0 0 m 250 250 l 250 750 l 750 750 l 750 250 l 250 250" },
            " ": { "ha": 300 }
        },
        "resolution": 1000,
        "boundingBox": { "yMin": 0, "yMax": 1000 }
    }"#;

    fn front_cap_area(geometry: &GeometryData) -> f32 {
        geometry
            .indices
            .chunks(3)
            .filter(|tri| geometry.normals[tri[0] as usize][2] == 1.0)
            .map(|tri| {
                let [a, b, c] = [0, 1, 2].map(|k| geometry.vertices[tri[k] as usize]);
                ((b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])) * 0.5
            })
            .sum()
    }

    #[test]
    fn test_label_mesh_is_closed_and_extruded() {
        let typeface = Typeface::from_json(BLOCK_FONT).unwrap();
        let settings = LabelSettings {
            text: "HO H".to_string(),
            ..LabelSettings::default()
        };
        let geometry = build_label_geometry(&typeface, &settings).unwrap();

        assert!(!geometry.is_empty());
        let has_front = geometry.normals.iter().any(|n| n[2] == 1.0);
        let has_back = geometry.normals.iter().any(|n| n[2] == -1.0);
        let has_sides = geometry.normals.iter().any(|n| n[2] == 0.0);
        assert!(has_front && has_back && has_sides);

        for v in &geometry.vertices {
            assert!(v[2] == 0.0 || (v[2] - 0.2).abs() < 1e-6);
        }

        // One quad per contour edge: 12 + 12 for the two H's, 4 + 4 for the O ring
        let wall_triangles = geometry
            .indices
            .chunks(3)
            .filter(|tri| geometry.normals[tri[0] as usize][2] == 0.0)
            .count();
        assert_eq!(wall_triangles, 2 * (12 + 12 + 4 + 4));

        // Front cap covers both H's (480000 units each) and the O ring (750000)
        let scale = 0.5 / 1000.0;
        let expected_area = (2.0 * 480_000.0 + 750_000.0) * scale * scale;
        assert!((front_cap_area(&geometry) - expected_area).abs() < 1e-4);
    }

    #[test]
    fn test_blank_label_is_empty() {
        let typeface = Typeface::from_json(BLOCK_FONT).unwrap();
        let settings = LabelSettings {
            text: "   ".to_string(),
            ..LabelSettings::default()
        };
        assert!(build_label_geometry(&typeface, &settings).unwrap().is_empty());
    }
}
