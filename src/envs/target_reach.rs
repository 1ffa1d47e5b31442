use super::base_env::{ActionBounds, Environment, Info, Step};
use crate::error::{Error, Result};

/// One-dimensional deterministic task: the agent is shown `target` and is
/// rewarded `-(action - target)^2` at every step. Episodes last `max_steps`.
#[derive(Debug, Clone)]
pub struct TargetReach {
    target: f32,
    max_steps: usize,
    steps: usize,
}

impl TargetReach {
    pub fn new(target: f32, max_steps: usize) -> Self {
        assert!((-1.0..=1.0).contains(&target));
        assert!(max_steps > 0);
        TargetReach {
            target,
            max_steps,
            steps: 0,
        }
    }

    fn observe(&self) -> Vec<f32> {
        vec![self.target]
    }
}

impl Environment for TargetReach {
    fn reset(&mut self) -> Result<Vec<f32>> {
        self.steps = 0;
        Ok(self.observe())
    }

    fn step(&mut self, action: &[f32]) -> Result<Step> {
        if action.len() != 1 {
            return Err(Error::environment(format!(
                "TargetReach expects a 1-d action, got {}",
                action.len()
            )));
        }
        self.steps += 1;
        let a = action[0].clamp(-1.0, 1.0);
        let reward = -((a - self.target) as f64).powi(2);
        Ok(Step {
            obs: self.observe(),
            reward,
            done: self.steps >= self.max_steps,
            info: Info::new(),
        })
    }

    // Deterministic; nothing to seed.
    fn seed(&mut self, _seed: u64) {}

    fn observation_shape(&self) -> Vec<usize> {
        vec![1]
    }

    fn action_shape(&self) -> Vec<usize> {
        vec![1]
    }

    fn action_bounds(&self) -> ActionBounds {
        ActionBounds::symmetric(1, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_reach_reward() {
        let mut env = TargetReach::new(0.5, 3);
        assert_eq!(env.reset().unwrap(), vec![0.5]);
        let step = env.step(&[0.5]).unwrap();
        assert_eq!(step.reward, 0.0);
        let step = env.step(&[-0.5]).unwrap();
        assert!((step.reward + 1.0).abs() < 1e-9);
        assert!(!step.done);
        let step = env.step(&[0.0]).unwrap();
        assert!(step.done);
    }

    #[test]
    fn test_target_reach_rejects_wrong_action_size() {
        let mut env = TargetReach::new(0.0, 3);
        env.reset().unwrap();
        assert!(matches!(env.step(&[0.0, 1.0]), Err(Error::Environment(_))));
    }
}
