//! Land height field: fractal simplex noise sampled on unit-sphere points.
//!
//! Sampling in 3D avoids the poles and seams a lat/long mapping would add.

use glam::DVec3;
use noise::{NoiseFn, Simplex};
use serde::{Deserialize, Serialize};

/// Shape of the land height field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeightmapParams {
    pub seed: u32,
    pub octaves: u32,
    /// Frequency ratio between octaves.
    pub lacunarity: f64,
    /// Amplitude ratio between octaves.
    pub persistence: f64,
    /// First-octave frequency, in cycles per sphere radius.
    pub base_frequency: f64,
    /// First-octave amplitude, as a fraction of the sphere radius.
    pub amplitude: f64,
    /// Fold each octave into ridges (`1 - 2|n|`), for mountain chains.
    pub ridged: bool,
    /// Offset the sampling point by a low-frequency vector field of this
    /// strength before summing octaves. `0` disables warping.
    pub warp: f64,
}

impl Default for HeightmapParams {
    fn default() -> Self {
        Self {
            seed: 0,
            octaves: 6,
            lacunarity: 2.0,
            persistence: 0.5,
            base_frequency: 1.5,
            amplitude: 0.06,
            ridged: false,
            warp: 0.0,
        }
    }
}

impl HeightmapParams {
    /// `(frequency, amplitude)` of each octave, first to last.
    fn octaves(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        (0..self.octaves).scan(
            (self.base_frequency, self.amplitude),
            |(frequency, amplitude), _| {
                let octave = (*frequency, *amplitude);
                *frequency *= self.lacunarity;
                *amplitude *= self.persistence;
                Some(octave)
            },
        )
    }
}

/// Evaluates a [`HeightmapParams`] field.
pub struct HeightmapSampler {
    noise: Simplex,
    warp_noise: Simplex,
    params: HeightmapParams,
}

impl HeightmapSampler {
    pub fn new(params: HeightmapParams) -> Self {
        Self {
            noise: Simplex::new(params.seed),
            warp_noise: Simplex::new(params.seed ^ 0x9e37_79b9),
            params,
        }
    }

    /// Height offset at `point`, within `±max_amplitude()`.
    pub fn sample(&self, point: DVec3) -> f64 {
        let point = self.warped(point);
        self.params
            .octaves()
            .map(|(frequency, amplitude)| {
                let p = point * frequency;
                let n = self.noise.get([p.x, p.y, p.z]);
                let n = if self.params.ridged {
                    1.0 - 2.0 * n.abs()
                } else {
                    n
                };
                n * amplitude
            })
            .sum()
    }

    fn warped(&self, point: DVec3) -> DVec3 {
        if self.params.warp == 0.0 {
            return point;
        }
        let p = point * self.params.base_frequency * 0.5;
        let offset = DVec3::new(
            self.warp_noise.get([p.x, p.y, p.z]),
            self.warp_noise.get([p.y + 31.7, p.z, p.x]),
            self.warp_noise.get([p.z, p.x - 47.3, p.y]),
        );
        point + offset * self.params.warp
    }

    /// Sum of all octave amplitudes; bounds `|sample|`.
    pub fn max_amplitude(&self) -> f64 {
        self.params.octaves().map(|(_, amplitude)| amplitude.abs()).sum()
    }

    pub fn params(&self) -> &HeightmapParams {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fibonacci_sphere(n: usize) -> impl Iterator<Item = DVec3> {
        let golden = std::f64::consts::PI * (3.0 - 5.0_f64.sqrt());
        (0..n).map(move |i| {
            let y = 1.0 - 2.0 * (i as f64 + 0.5) / n as f64;
            let r = (1.0 - y * y).sqrt();
            let theta = golden * i as f64;
            DVec3::new(r * theta.cos(), y, r * theta.sin())
        })
    }

    #[test]
    fn test_octave_schedule() {
        let params = HeightmapParams {
            octaves: 3,
            base_frequency: 1.0,
            amplitude: 0.8,
            ..Default::default()
        };
        let octaves: Vec<_> = params.octaves().collect();
        assert_eq!(octaves, vec![(1.0, 0.8), (2.0, 0.4), (4.0, 0.2)]);
    }

    #[test]
    fn test_samples_are_bounded() {
        for params in [
            HeightmapParams::default(),
            HeightmapParams {
                ridged: true,
                warp: 0.3,
                ..Default::default()
            },
        ] {
            let sampler = HeightmapSampler::new(params);
            let bound = sampler.max_amplitude() + 1e-12;
            assert!(fibonacci_sphere(1500).all(|p| sampler.sample(p).abs() <= bound));
        }
    }

    #[test]
    fn test_seed_changes_the_field() {
        let a = HeightmapSampler::new(HeightmapParams::default());
        let b = HeightmapSampler::new(HeightmapParams {
            seed: 77,
            ..Default::default()
        });
        assert!(fibonacci_sphere(32).any(|p| a.sample(p) != b.sample(p)));
    }

    #[test]
    fn test_same_params_are_deterministic() {
        let params = HeightmapParams {
            warp: 0.2,
            ..Default::default()
        };
        let a = HeightmapSampler::new(params.clone());
        let b = HeightmapSampler::new(params);
        for p in fibonacci_sphere(16) {
            assert_eq!(a.sample(p).to_bits(), b.sample(p).to_bits());
        }
    }

    #[test]
    fn test_flat_field() {
        let sampler = HeightmapSampler::new(HeightmapParams {
            octaves: 0,
            ..Default::default()
        });
        assert_eq!(sampler.max_amplitude(), 0.0);
        assert_eq!(sampler.sample(DVec3::Y), 0.0);
    }
}
