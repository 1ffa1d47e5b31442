use tch::nn::VarStore;
use tch::{Device, Tensor};

/// Critic: maps `[batch, obs]` and `[batch, action]` tensors to a
/// `[batch, 1]` value estimate.
pub trait BaseQFunction {
    fn forward(&self, obs: &Tensor, action: &Tensor) -> Tensor;
    fn device(&self) -> Device;
    fn var_store(&self) -> &VarStore;
    fn var_store_mut(&mut self) -> &mut VarStore;
    fn clone(&self) -> Box<dyn BaseQFunction>;
}
