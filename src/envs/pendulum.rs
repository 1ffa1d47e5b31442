use super::base_env::{ActionBounds, Environment, Info, Step};
use crate::error::{Error, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::PI;

const MAX_SPEED: f32 = 8.0;
const MAX_TORQUE: f32 = 2.0;
const DT: f32 = 0.05;
const G: f32 = 10.0;
const M: f32 = 1.0;
const L: f32 = 1.0;

/// Classic inverted pendulum swing-up with a continuous torque action.
///
/// Observation is `[cos θ, sin θ, θ̇]`, action is a torque in
/// `[-2, 2]`, reward is `-(θ² + 0.1·θ̇² + 0.001·u²)` with θ normalized to
/// `[-π, π)`. Episodes are truncated after `max_steps`.
#[derive(Debug, Clone)]
pub struct Pendulum {
    theta: f32,
    theta_dot: f32,
    steps: usize,
    max_steps: usize,
    rng: StdRng,
}

impl Pendulum {
    pub fn new(max_steps: usize) -> Self {
        Pendulum {
            theta: 0.0,
            theta_dot: 0.0,
            steps: 0,
            max_steps,
            rng: StdRng::seed_from_u64(0),
        }
    }

    fn get_state(&self) -> Vec<f32> {
        vec![self.theta.cos(), self.theta.sin(), self.theta_dot]
    }

    fn angle_normalize(x: f32) -> f32 {
        (x + PI).rem_euclid(2.0 * PI) - PI
    }
}

impl Environment for Pendulum {
    fn reset(&mut self) -> Result<Vec<f32>> {
        self.theta = self.rng.gen_range(-PI..PI);
        self.theta_dot = self.rng.gen_range(-1.0..1.0);
        self.steps = 0;
        Ok(self.get_state())
    }

    fn step(&mut self, action: &[f32]) -> Result<Step> {
        let torque = match action {
            [u] => u.clamp(-MAX_TORQUE, MAX_TORQUE),
            _ => {
                return Err(Error::environment(format!(
                    "Pendulum expects a 1-d action, got {}",
                    action.len()
                )))
            }
        };

        let cost = Self::angle_normalize(self.theta).powi(2)
            + 0.1 * self.theta_dot.powi(2)
            + 0.001 * torque.powi(2);

        let theta_acc =
            -3.0 * G / (2.0 * L) * (self.theta + PI).sin() + 3.0 / (M * L * L) * torque;
        self.theta_dot = (self.theta_dot + theta_acc * DT).clamp(-MAX_SPEED, MAX_SPEED);
        self.theta += self.theta_dot * DT;
        self.steps += 1;

        Ok(Step {
            obs: self.get_state(),
            reward: -cost as f64,
            done: self.steps >= self.max_steps,
            info: Info::new(),
        })
    }

    fn seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    fn observation_shape(&self) -> Vec<usize> {
        vec![3]
    }

    fn action_shape(&self) -> Vec<usize> {
        vec![1]
    }

    fn action_bounds(&self) -> ActionBounds {
        ActionBounds::symmetric(1, MAX_TORQUE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pendulum_seeded_reset_is_reproducible() {
        let mut a = Pendulum::new(200);
        let mut b = Pendulum::new(200);
        a.seed(7);
        b.seed(7);
        assert_eq!(a.reset().unwrap(), b.reset().unwrap());
    }

    #[test]
    fn test_pendulum_step_bounds() {
        let mut env = Pendulum::new(3);
        env.seed(1);
        env.reset().unwrap();
        for i in 0..3 {
            let step = env.step(&[10.0]).unwrap();
            assert_eq!(step.obs.len(), 3);
            assert!(step.obs[2].abs() <= MAX_SPEED);
            assert!(step.reward <= 0.0);
            assert_eq!(step.done, i == 2);
        }
    }

    #[test]
    fn test_angle_normalize() {
        assert!((Pendulum::angle_normalize(2.0 * PI + 0.5) - 0.5).abs() < 1e-5);
        assert!((Pendulum::angle_normalize(-0.5) + 0.5).abs() < 1e-5);
    }
}
