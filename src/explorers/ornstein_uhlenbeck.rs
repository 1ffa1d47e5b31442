use super::base_explorer::{numel, BaseExplorer};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use tch::Tensor;

/// Temporally correlated noise following an Ornstein-Uhlenbeck process:
/// `x ← x + θ·(μ − x)·dt + σ·√dt·N(0, 1)`.
///
/// The process state restarts from `μ` on `reset`. When the requested shape
/// changes, the flat state is truncated or extended with `μ`, so elements
/// that remain keep their process.
pub struct OrnsteinUhlenbeckNoise {
    mu: f32,
    theta: f32,
    sigma: f32,
    dt: f32,
    state: Vec<f32>,
    rng: StdRng,
}

impl OrnsteinUhlenbeckNoise {
    pub fn new(mu: f64, theta: f64, sigma: f64, dt: f64, seed: u64) -> Self {
        assert!(theta >= 0.0);
        assert!(sigma >= 0.0);
        assert!(dt > 0.0);
        OrnsteinUhlenbeckNoise {
            mu: mu as f32,
            theta: theta as f32,
            sigma: sigma as f32,
            dt: dt as f32,
            state: vec![],
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl BaseExplorer for OrnsteinUhlenbeckNoise {
    fn sample(&mut self, shape: &[i64]) -> Tensor {
        let n = numel(shape);
        self.state.resize(n, self.mu);
        let diffusion = self.sigma * self.dt.sqrt();
        for x in self.state.iter_mut() {
            let z: f32 = self.rng.sample(StandardNormal);
            *x += self.theta * (self.mu - *x) * self.dt + diffusion * z;
        }
        Tensor::from_slice(&self.state).view(shape)
    }

    fn reset(&mut self) {
        self.state.iter_mut().for_each(|x| *x = self.mu);
    }
}
