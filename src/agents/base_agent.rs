use crate::error::Result;
use crate::memory::Batch;
use tch::{Device, Tensor};

/// Losses reported by one policy update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpdateStats {
    pub actor_loss: f64,
    pub critic_loss: f64,
}

pub trait BaseAgent {
    /// Actions for a `[batch, obs]` tensor. With `exploration` the agent
    /// perturbs its greedy choice; the result always respects the action
    /// bounds.
    fn act(&mut self, obs: &Tensor, exploration: bool) -> Tensor;
    fn update(&mut self, batch: &Batch) -> Result<UpdateStats>;
    /// Called each time one slot of the pool ends an exploring episode.
    fn reset_exploration(&mut self) {}
    fn device(&self) -> Device;
    fn get_statistics(&self) -> Vec<(String, f64)>;
    fn save(&self, dirname: &str) -> Result<()>;
    fn load(&mut self, dirname: &str) -> Result<()>;
}
