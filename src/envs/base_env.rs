use crate::error::{Error, Result};
use serde_json::{Map, Value};

/// Auxiliary data a simulator may attach to a step.
pub type Info = Map<String, Value>;

/// The result of advancing one simulator by one action.
#[derive(Debug, Clone)]
pub struct Step {
    pub obs: Vec<f32>,
    pub reward: f64,
    pub done: bool,
    pub info: Info,
}

/// Elementwise `[low, high]` box the actions of an environment live in.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionBounds {
    pub low: Vec<f32>,
    pub high: Vec<f32>,
}

impl ActionBounds {
    pub fn new(low: Vec<f32>, high: Vec<f32>) -> Result<Self> {
        if low.len() != high.len() || low.is_empty() {
            return Err(Error::Argument(format!(
                "action bounds must be non-empty and equally sized, got {} and {}",
                low.len(),
                high.len()
            )));
        }
        if low.iter().zip(&high).any(|(l, h)| l > h) {
            return Err(Error::Argument(
                "action lower bound exceeds upper bound".to_string(),
            ));
        }
        Ok(ActionBounds { low, high })
    }

    /// Same scalar interval on every action dimension.
    pub fn symmetric(action_size: usize, max_action: f32) -> Self {
        ActionBounds {
            low: vec![-max_action; action_size],
            high: vec![max_action; action_size],
        }
    }

    pub fn len(&self) -> usize {
        self.low.len()
    }

    pub fn contains(&self, action: &[f32]) -> bool {
        action.len() == self.len()
            && action
                .iter()
                .zip(self.low.iter().zip(&self.high))
                .all(|(a, (l, h))| l <= a && a <= h)
    }
}

/// A single simulator.
pub trait Environment: Send {
    fn reset(&mut self) -> Result<Vec<f32>>;
    fn step(&mut self, action: &[f32]) -> Result<Step>;
    fn seed(&mut self, seed: u64);
    fn observation_shape(&self) -> Vec<usize>;
    fn action_shape(&self) -> Vec<usize>;
    fn action_bounds(&self) -> ActionBounds;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_bounds_new() {
        let bounds = ActionBounds::new(vec![-1.0, 0.0], vec![1.0, 2.0]).unwrap();
        assert_eq!(bounds.len(), 2);
        assert!(bounds.contains(&[0.5, 2.0]));
        assert!(!bounds.contains(&[0.5, 2.5]));
        assert!(!bounds.contains(&[0.5]));
    }

    #[test]
    fn test_action_bounds_rejects_inverted() {
        let result = ActionBounds::new(vec![1.0], vec![-1.0]);
        assert!(matches!(result, Err(Error::Argument(_))));
    }

    #[test]
    fn test_action_bounds_symmetric() {
        let bounds = ActionBounds::symmetric(3, 2.0);
        assert_eq!(bounds.low, vec![-2.0; 3]);
        assert_eq!(bounds.high, vec![2.0; 3]);
    }
}
