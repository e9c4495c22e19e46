//! # Knot Sampling
//!
//! Random draws used by the scene builder: palette color, primary radius and
//! position for each knot. The sampler owns its RNG so a seed makes a whole
//! scene reproducible.

use cgmath::Vector3;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::config::{DemoConfig, NEON_PALETTE};

/// One knot's worth of random parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KnotSample {
    pub color: u32,
    pub radius: f32,
    pub position: Vector3<f32>,
}

pub struct KnotSampler {
    rng: StdRng,
    palette: Vec<u32>,
    radius_range: (f32, f32),
    spread: f32,
}

impl KnotSampler {
    /// Creates a sampler from the config, seeded if `config.seed` is set
    pub fn new(config: &DemoConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let palette = if config.palette.is_empty() {
            log::warn!("Empty knot palette, falling back to the neon palette");
            NEON_PALETTE.to_vec()
        } else {
            config.palette.clone()
        };

        Self {
            rng,
            palette,
            radius_range: config.knot_radius_range,
            spread: config.spread,
        }
    }

    /// Uniform pick from the palette
    pub fn color(&mut self) -> u32 {
        let index = self.rng.random_range(0..self.palette.len());
        self.palette[index]
    }

    /// Uniform draw from the half-open radius range
    pub fn radius(&mut self) -> f32 {
        let (min, max) = self.radius_range;
        if min >= max {
            return min;
        }
        self.rng.random_range(min..max)
    }

    /// Uniform point in the cube of half-width `spread` around the origin
    pub fn position(&mut self) -> Vector3<f32> {
        let extent = self.spread * 2.0;
        Vector3::new(
            (self.rng.random::<f32>() - 0.5) * extent,
            (self.rng.random::<f32>() - 0.5) * extent,
            (self.rng.random::<f32>() - 0.5) * extent,
        )
    }

    pub fn sample_knot(&mut self) -> KnotSample {
        KnotSample {
            color: self.color(),
            radius: self.radius(),
            position: self.position(),
        }
    }

    pub fn palette(&self) -> &[u32] {
        &self.palette
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_stay_in_bounds() {
        let config = DemoConfig::default().with_seed(42);
        let mut sampler = KnotSampler::new(&config);

        for _ in 0..1000 {
            let knot = sampler.sample_knot();
            assert!(NEON_PALETTE.contains(&knot.color));
            assert!(knot.radius >= 0.3 && knot.radius < 1.5);
            for axis in [knot.position.x, knot.position.y, knot.position.z] {
                assert!((-5.0..=5.0).contains(&axis), "axis {} out of range", axis);
            }
        }
    }

    #[test]
    fn test_seeded_sampler_is_reproducible() {
        let config = DemoConfig::default().with_seed(1234);
        let mut a = KnotSampler::new(&config);
        let mut b = KnotSampler::new(&config);

        for _ in 0..50 {
            assert_eq!(a.sample_knot(), b.sample_knot());
        }
    }

    #[test]
    fn test_empty_palette_falls_back() {
        let mut config = DemoConfig::default().with_seed(1);
        config.palette.clear();
        let mut sampler = KnotSampler::new(&config);
        assert_eq!(sampler.palette(), &NEON_PALETTE);
        assert!(NEON_PALETTE.contains(&sampler.color()));
    }

    #[test]
    fn test_degenerate_radius_range() {
        let mut config = DemoConfig::default().with_seed(1);
        config.knot_radius_range = (0.7, 0.7);
        let mut sampler = KnotSampler::new(&config);
        assert_eq!(sampler.radius(), 0.7);
    }
}
