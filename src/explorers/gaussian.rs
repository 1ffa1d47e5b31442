use super::base_explorer::{numel, BaseExplorer};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use tch::Tensor;

/// Zero-mean Gaussian noise with a fixed scale.
pub struct GaussianNoise {
    sigma: f32,
    rng: StdRng,
}

impl GaussianNoise {
    pub fn new(sigma: f64, seed: u64) -> Self {
        assert!(sigma >= 0.0 && sigma.is_finite());
        GaussianNoise {
            sigma: sigma as f32,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl BaseExplorer for GaussianNoise {
    fn sample(&mut self, shape: &[i64]) -> Tensor {
        let values: Vec<f32> = (0..numel(shape))
            .map(|_| self.sigma * self.rng.sample::<f32, _>(StandardNormal))
            .collect();
        Tensor::from_slice(&values).view(shape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let explorer = GaussianNoise::new(0.1, 0);
        assert!((explorer.sigma - 0.1).abs() < 1e-7);
    }

    #[test]
    #[should_panic]
    fn test_new_negative_sigma() {
        GaussianNoise::new(-0.1, 0);
    }

    #[test]
    fn test_sample_shape_and_scale() {
        let mut explorer = GaussianNoise::new(0.5, 3);
        let noise = explorer.sample(&[100, 4]);
        assert_eq!(noise.size(), vec![100, 4]);
        let std = noise.std(true).double_value(&[]);
        assert!((std - 0.5).abs() < 0.1);
    }

    #[test]
    fn test_zero_sigma_is_silent() {
        let mut explorer = GaussianNoise::new(0.0, 3);
        let noise = explorer.sample(&[8, 2]);
        assert_eq!(noise.abs().max().double_value(&[]), 0.0);
    }

    #[test]
    fn test_seeded_sampling_is_reproducible() {
        let mut a = GaussianNoise::new(0.2, 11);
        let mut b = GaussianNoise::new(0.2, 11);
        assert!(a.sample(&[5, 3]).equal(&b.sample(&[5, 3])));
    }
}
