pub mod batch_states;
pub mod soft_update;
pub mod weight_initializer;
