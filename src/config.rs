//! # Demo Configuration
//!
//! Every tunable of the knot field lives in [`DemoConfig`]. The defaults
//! reproduce the stock scene; the `with_*` methods follow the same builder
//! pattern as [`PipelineConfig`](crate::gfx::rendering::PipelineConfig).

use cgmath::Vector3;

/// Environment variable holding an optional `u64` seed for the knot sampler.
pub const SEED_ENV_VAR: &str = "NEON_KNOTS_SEED";

/// The eight neon colors a knot can be painted with, as `0xRRGGBB`.
pub const NEON_PALETTE: [u32; 8] = [
    0x00ff00, // green
    0x00ffff, // blue
    0xff00ff, // pink
    0xffff00, // yellow
    0xff5733, // orange
    0x8b00ff, // purple
    0xff1493, // deep pink
    0x00ff7f, // spring green
];

/// Torus-knot tessellation and surface parameters shared by every knot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KnotStyle {
    pub tube_radius: f32,
    pub tubular_segments: u32,
    pub radial_segments: u32,
    pub p: u32,
    pub q: u32,
    pub emissive_intensity: f32,
    pub roughness: f32,
    pub metallic: f32,
}

impl Default for KnotStyle {
    fn default() -> Self {
        Self {
            tube_radius: 0.1,
            tubular_segments: 100,
            radial_segments: 16,
            p: 2,
            q: 3,
            emissive_intensity: 1.5,
            roughness: 0.2,
            metallic: 0.8,
        }
    }
}

/// Camera and orbit controller settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSettings {
    /// Vertical field of view in degrees
    pub fov_y_degrees: f32,
    pub znear: f32,
    pub zfar: f32,
    /// Initial eye distance from the origin along +Z
    pub distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov_y_degrees: 75.0,
            znear: 0.1,
            zfar: 1000.0,
            distance: 10.0,
            min_distance: 5.0,
            max_distance: 20.0,
            damping_factor: 0.1,
            rotate_speed: 0.005,
            zoom_speed: 1.0,
        }
    }
}

/// Text label settings
#[derive(Debug, Clone, PartialEq)]
pub struct LabelSettings {
    pub text: String,
    pub font_url: String,
    pub size: f32,
    pub depth: f32,
    pub curve_segments: u32,
    pub position: Vector3<f32>,
    pub color: u32,
}

impl Default for LabelSettings {
    fn default() -> Self {
        Self {
            text: "PENASO - ACT 2".to_string(),
            font_url: "https://threejs.org/examples/fonts/helvetiker_regular.typeface.json"
                .to_string(),
            size: 0.5,
            depth: 0.2,
            curve_segments: 12,
            position: Vector3::new(-3.0, 0.0, 0.0),
            color: 0xffffff,
        }
    }
}

/// Ambient + point light pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSettings {
    pub ambient_color: u32,
    pub ambient_intensity: f32,
    pub point_color: u32,
    pub point_intensity: f32,
    pub point_position: [f32; 3],
}

impl Default for LightSettings {
    fn default() -> Self {
        Self {
            ambient_color: 0xaaaaaa,
            ambient_intensity: 0.5,
            point_color: 0xffffff,
            point_intensity: 1.0,
            point_position: [10.0, 10.0, 10.0],
        }
    }
}

/// Complete configuration for the knot field demo
#[derive(Debug, Clone, PartialEq)]
pub struct DemoConfig {
    pub knot_count: usize,
    pub palette: Vec<u32>,
    /// Half-open range the primary knot radius is drawn from
    pub knot_radius_range: (f32, f32),
    /// Knots are placed uniformly in a cube of this half-width
    pub spread: f32,
    /// Radians added to each knot's X and Y rotation per frame
    pub rotation_step: f32,
    pub knot_style: KnotStyle,
    pub camera: CameraSettings,
    pub lights: LightSettings,
    pub label: LabelSettings,
    pub window_size: (u32, u32),
    pub vsync: bool,
    pub msaa_samples: u32,
    pub seed: Option<u64>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            knot_count: 50,
            palette: NEON_PALETTE.to_vec(),
            knot_radius_range: (0.3, 1.5),
            spread: 5.0,
            rotation_step: 0.01,
            knot_style: KnotStyle::default(),
            camera: CameraSettings::default(),
            lights: LightSettings::default(),
            label: LabelSettings::default(),
            window_size: (1200, 800),
            vsync: true,
            msaa_samples: 4,
            seed: None,
        }
    }
}

impl DemoConfig {
    /// Default configuration with the seed taken from [`SEED_ENV_VAR`]
    ///
    /// An unparsable value is logged and ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(raw) = std::env::var(SEED_ENV_VAR) {
            match raw.trim().parse::<u64>() {
                Ok(seed) => config.seed = Some(seed),
                Err(e) => log::warn!("Ignoring {}={:?}: {}", SEED_ENV_VAR, raw, e),
            }
        }
        config
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_knot_count(mut self, count: usize) -> Self {
        self.knot_count = count;
        self
    }

    pub fn with_label_text(mut self, text: &str) -> Self {
        self.label.text = text.to_owned();
        self
    }

    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_stock_scene() {
        let config = DemoConfig::default();
        assert_eq!(config.knot_count, 50);
        assert_eq!(config.palette.len(), 8);
        assert_eq!(config.knot_radius_range, (0.3, 1.5));
        assert_eq!(config.spread, 5.0);
        assert_eq!(config.rotation_step, 0.01);
        assert_eq!(config.camera.min_distance, 5.0);
        assert_eq!(config.camera.max_distance, 20.0);
        assert_eq!(config.camera.damping_factor, 0.1);
        assert_eq!(config.label.text, "PENASO - ACT 2");
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_builder_methods() {
        let config = DemoConfig::default()
            .with_seed(7)
            .with_knot_count(3)
            .with_label_text("HI")
            .with_vsync(false);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.knot_count, 3);
        assert_eq!(config.label.text, "HI");
        assert!(!config.vsync);
    }
}
