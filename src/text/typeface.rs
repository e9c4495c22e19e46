//! # Typeface Fonts
//!
//! Parses the JSON typeface format (glyph outlines as `m`/`l`/`q`/`b` command
//! strings in font units) and lays text out into flat [`Shape`]s ready for
//! extrusion.

use std::{collections::HashMap, str::SplitWhitespace};

use serde::Deserialize;

use super::FontError;
use crate::gfx::geometry::{
    triangulate::{contains_point, signed_area},
    Shape,
};

/// Glyph substituted for characters the font lacks
const FALLBACK_GLYPH: &str = "?";

#[derive(Debug, Clone, Deserialize)]
pub struct Glyph {
    /// Horizontal advance in font units
    pub ha: f32,
    /// Outline commands; absent for blank glyphs such as space
    #[serde(default)]
    pub o: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct BoundingBox {
    #[serde(rename = "yMin")]
    pub y_min: f32,
    #[serde(rename = "yMax")]
    pub y_max: f32,
}

/// A parsed typeface: glyphs keyed by the character they draw
#[derive(Debug, Clone, Deserialize)]
pub struct Typeface {
    pub glyphs: HashMap<String, Glyph>,
    /// Font units per em
    pub resolution: f32,
    #[serde(rename = "boundingBox")]
    pub bounding_box: BoundingBox,
    #[serde(rename = "underlineThickness", default)]
    pub underline_thickness: f32,
    #[serde(rename = "familyName", default)]
    pub family_name: String,
}

/// One drawing command of a glyph outline, in font units
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo([f32; 2]),
    LineTo([f32; 2]),
    QuadTo { control: [f32; 2], to: [f32; 2] },
    CubicTo { control1: [f32; 2], control2: [f32; 2], to: [f32; 2] },
}

impl Typeface {
    pub fn from_json(json: &str) -> Result<Self, FontError> {
        let typeface: Typeface = serde_json::from_str(json)?;
        log::debug!(
            "Parsed typeface '{}' with {} glyphs",
            typeface.family_name,
            typeface.glyphs.len()
        );
        Ok(typeface)
    }

    /// Looks up the glyph for `c`, falling back to `?`
    pub fn glyph(&self, c: char) -> Option<&Glyph> {
        let mut buf = [0u8; 4];
        self.glyphs
            .get(c.encode_utf8(&mut buf) as &str)
            .or_else(|| self.glyphs.get(FALLBACK_GLYPH))
    }

    /// Distance between baselines for text of the given size
    pub fn line_height(&self, size: f32) -> f32 {
        (self.bounding_box.y_max - self.bounding_box.y_min + self.underline_thickness)
            * self.scale(size)
    }

    fn scale(&self, size: f32) -> f32 {
        size / self.resolution
    }

    /// Lays `text` out from the origin and returns its filled shapes
    ///
    /// Each glyph advances the pen by its `ha`; `\n` returns to x = 0 one
    /// line lower. Curves are flattened into `curve_segments` pieces.
    pub fn generate_shapes(
        &self,
        text: &str,
        size: f32,
        curve_segments: u32,
    ) -> Result<Vec<Shape>, FontError> {
        let scale = self.scale(size);
        let line_height = self.line_height(size);
        let segments = curve_segments.max(1);

        let mut shapes = Vec::new();
        let mut offset = [0.0f32, 0.0f32];

        for c in text.chars() {
            if c == '\n' {
                offset = [0.0, offset[1] - line_height];
                continue;
            }

            let Some(glyph) = self.glyph(c) else {
                log::warn!("Typeface has no glyph for {:?} and no fallback", c);
                continue;
            };

            if let Some(outline) = &glyph.o {
                let commands = parse_outline(&c.to_string(), outline)?;
                let contours = flatten(&commands, scale, offset, segments);
                shapes.extend(classify_contours(contours));
            }
            offset[0] += glyph.ha * scale;
        }

        Ok(shapes)
    }
}

/// Parses an outline string such as `"m 0 0 l 10 0 q 10 10 5 5"`
///
/// `q` and `b` list the end point before their control points.
pub fn parse_outline(glyph: &str, outline: &str) -> Result<Vec<PathCommand>, FontError> {
    let mut tokens = outline.split_whitespace();
    let mut commands = Vec::new();

    while let Some(action) = tokens.next() {
        let command = match action {
            "m" => PathCommand::MoveTo(next_point(glyph, &mut tokens)?),
            "l" => PathCommand::LineTo(next_point(glyph, &mut tokens)?),
            "q" => {
                let to = next_point(glyph, &mut tokens)?;
                let control = next_point(glyph, &mut tokens)?;
                PathCommand::QuadTo { control, to }
            }
            "b" => {
                let to = next_point(glyph, &mut tokens)?;
                let control1 = next_point(glyph, &mut tokens)?;
                let control2 = next_point(glyph, &mut tokens)?;
                PathCommand::CubicTo {
                    control1,
                    control2,
                    to,
                }
            }
            other => {
                return Err(FontError::Outline {
                    glyph: glyph.to_string(),
                    token: other.to_string(),
                })
            }
        };
        commands.push(command);
    }

    Ok(commands)
}

fn next_point(glyph: &str, tokens: &mut SplitWhitespace<'_>) -> Result<[f32; 2], FontError> {
    let x = next_coordinate(glyph, tokens)?;
    let y = next_coordinate(glyph, tokens)?;
    Ok([x, y])
}

fn next_coordinate(glyph: &str, tokens: &mut SplitWhitespace<'_>) -> Result<f32, FontError> {
    let token = tokens.next().ok_or_else(|| FontError::Outline {
        glyph: glyph.to_string(),
        token: "<end of outline>".to_string(),
    })?;
    token.parse::<f32>().map_err(|_| FontError::Outline {
        glyph: glyph.to_string(),
        token: token.to_string(),
    })
}

/// Turns commands into closed polylines in label space
fn flatten(
    commands: &[PathCommand],
    scale: f32,
    offset: [f32; 2],
    segments: u32,
) -> Vec<Vec<[f32; 2]>> {
    let place = |p: [f32; 2]| [p[0] * scale + offset[0], p[1] * scale + offset[1]];

    let mut contours: Vec<Vec<[f32; 2]>> = Vec::new();
    let mut current: Vec<[f32; 2]> = Vec::new();

    for command in commands {
        match *command {
            PathCommand::MoveTo(p) => {
                if !current.is_empty() {
                    contours.push(std::mem::take(&mut current));
                }
                current.push(place(p));
            }
            PathCommand::LineTo(p) => current.push(place(p)),
            PathCommand::QuadTo { control, to } => {
                let start = current.last().copied().unwrap_or(place(to));
                let (c, e) = (place(control), place(to));
                for i in 1..=segments {
                    let t = i as f32 / segments as f32;
                    let u = 1.0 - t;
                    current.push([
                        u * u * start[0] + 2.0 * u * t * c[0] + t * t * e[0],
                        u * u * start[1] + 2.0 * u * t * c[1] + t * t * e[1],
                    ]);
                }
            }
            PathCommand::CubicTo {
                control1,
                control2,
                to,
            } => {
                let start = current.last().copied().unwrap_or(place(to));
                let (c1, c2, e) = (place(control1), place(control2), place(to));
                for i in 1..=segments {
                    let t = i as f32 / segments as f32;
                    let u = 1.0 - t;
                    let (a, b, c, d) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
                    current.push([
                        a * start[0] + b * c1[0] + c * c2[0] + d * e[0],
                        a * start[1] + b * c1[1] + c * c2[1] + d * e[1],
                    ]);
                }
            }
        }
    }
    if !current.is_empty() {
        contours.push(current);
    }

    for contour in &mut contours {
        // Outlines usually repeat the start point to close themselves
        if contour.len() > 1 && contour.first() == contour.last() {
            contour.pop();
        }
    }
    contours.retain(|contour| contour.len() >= 3);
    contours
}

/// Groups contours into shapes by nesting depth
///
/// A contour inside an odd number of others is a hole of the smallest
/// contour enclosing it; every other contour is an outer boundary.
fn classify_contours(contours: Vec<Vec<[f32; 2]>>) -> Vec<Shape> {
    let areas: Vec<f32> = contours
        .iter()
        .map(|c| signed_area(c).abs())
        .collect();

    let containers: Vec<Vec<usize>> = contours
        .iter()
        .enumerate()
        .map(|(i, contour)| {
            (0..contours.len())
                .filter(|&j| j != i && areas[j] > areas[i] && contains_point(&contours[j], contour[0]))
                .collect()
        })
        .collect();

    let mut shape_of: Vec<Option<usize>> = vec![None; contours.len()];
    let mut shapes = Vec::new();
    for (i, contour) in contours.iter().enumerate() {
        if containers[i].len() % 2 == 0 {
            shape_of[i] = Some(shapes.len());
            shapes.push(Shape::new(contour.clone()));
        }
    }

    for (i, contour) in contours.into_iter().enumerate() {
        if containers[i].len() % 2 == 0 {
            continue;
        }
        let parent = containers[i]
            .iter()
            .copied()
            .filter(|&j| containers[j].len() % 2 == 0)
            .min_by(|&a, &b| areas[a].total_cmp(&areas[b]))
            .and_then(|j| shape_of[j]);
        match parent {
            Some(index) => shapes[index].holes.push(contour),
            None => shapes.push(Shape::new(contour)),
        }
    }

    shapes
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A tiny font: "I" is a bar, "O" a square ring, space has no outline
    const FONT: &str = r#"{
        "glyphs": {
            "I": { "ha": 400, "o": "m 100 0 l 300 0 l 300 1000 l 100 1000" },
            "O": { "ha": 1000, "o": "m 0 0 l 1000 0 l 1000 1000 l 0 1000 l 0 0 m 250 250 l 250 750 l 750 750 l 750 250 l 250 250" },
            " ": { "ha": 300 },
            "?": { "ha": 500, "o": "m 0 0 l 500 0 l 250 500" },
            "Q": { "ha": 600, "o": "m 0 0 q 600 0 300 300 l 300 600" }
        },
        "familyName": "Test Sans",
        "resolution": 1000,
        "boundingBox": { "yMin": -200, "xMin": 0, "yMax": 1000, "xMax": 1000 },
        "underlineThickness": 50
    }"#;

    fn font() -> Typeface {
        Typeface::from_json(FONT).expect("fixture parses")
    }

    #[test]
    fn test_parses_typeface_metadata() {
        let font = font();
        assert_eq!(font.family_name, "Test Sans");
        assert_eq!(font.resolution, 1000.0);
        assert_eq!(font.glyphs.len(), 5);
        assert!(font.glyphs[" "].o.is_none());
        // (1000 + 200 + 50) / 1000 * 0.5
        assert!((font.line_height(0.5) - 0.625).abs() < 1e-6);
    }

    #[test]
    fn test_parse_outline_orders_end_point_first() {
        let commands = parse_outline("x", "m 0 0 q 10 0 5 5 b 20 0 12 4 18 4").unwrap();
        assert_eq!(
            commands,
            vec![
                PathCommand::MoveTo([0.0, 0.0]),
                PathCommand::QuadTo {
                    control: [5.0, 5.0],
                    to: [10.0, 0.0]
                },
                PathCommand::CubicTo {
                    control1: [12.0, 4.0],
                    control2: [18.0, 4.0],
                    to: [20.0, 0.0]
                },
            ]
        );
    }

    #[test]
    fn test_malformed_outline_is_an_error() {
        assert!(matches!(
            parse_outline("A", "m 0 zero"),
            Err(FontError::Outline { token, .. }) if token == "zero"
        ));
        assert!(matches!(
            parse_outline("A", "m 0 0 l 5"),
            Err(FontError::Outline { .. })
        ));
        assert!(matches!(
            parse_outline("A", "m 0 0 z"),
            Err(FontError::Outline { token, .. }) if token == "z"
        ));
    }

    #[test]
    fn test_invalid_json_is_a_parse_error() {
        assert!(matches!(
            Typeface::from_json("{ \"glyphs\": "),
            Err(FontError::Parse(_))
        ));
    }

    #[test]
    fn test_ring_glyph_becomes_shape_with_hole() {
        let shapes = font().generate_shapes("O", 1.0, 12).unwrap();
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].outer.len(), 4);
        assert_eq!(shapes[0].holes.len(), 1);
        assert_eq!(shapes[0].holes[0].len(), 4);
    }

    #[test]
    fn test_layout_advances_and_scales() {
        let shapes = font().generate_shapes("I I", 0.5, 12).unwrap();
        assert_eq!(shapes.len(), 2);

        // Second bar starts after "I" (400) and " " (300), scaled by 0.5 / 1000
        let first_x = shapes[0].outer[0][0];
        let second_x = shapes[1].outer[0][0];
        assert!((first_x - 0.05).abs() < 1e-6);
        assert!((second_x - (0.35 + 0.05)).abs() < 1e-6);
    }

    #[test]
    fn test_newline_moves_down_one_line() {
        let shapes = font().generate_shapes("I\nI", 1.0, 12).unwrap();
        assert_eq!(shapes.len(), 2);
        let dy = shapes[0].outer[0][1] - shapes[1].outer[0][1];
        assert!((dy - 1.25).abs() < 1e-6);
        assert_eq!(shapes[0].outer[0][0], shapes[1].outer[0][0]);
    }

    #[test]
    fn test_missing_glyph_uses_fallback() {
        let font = font();
        let shapes = font.generate_shapes("#", 1.0, 12).unwrap();
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].outer.len(), 3);
    }

    #[test]
    fn test_curves_are_flattened() {
        let shapes = font().generate_shapes("Q", 1.0, 12).unwrap();
        assert_eq!(shapes.len(), 1);
        // start + 12 curve points + final line point
        assert_eq!(shapes[0].outer.len(), 14);
        let end_of_curve = shapes[0].outer[12];
        assert!((end_of_curve[0] - 0.6).abs() < 1e-6);
        assert!(end_of_curve[1].abs() < 1e-6);
    }
}
