use tch::nn::VarStore;
use tch::{Device, Tensor};

/// Actor: maps a `[batch, obs]` tensor to a `[batch, action]` tensor.
pub trait BaseDeterministicPolicy {
    fn forward(&self, x: &Tensor) -> Tensor;
    fn device(&self) -> Device;
    fn var_store(&self) -> &VarStore;
    fn var_store_mut(&mut self) -> &mut VarStore;
    /// Independent copy with its own parameters, same values.
    fn clone(&self) -> Box<dyn BaseDeterministicPolicy>;
}
