mod replay_buffer;
mod transition;

pub use replay_buffer::ReplayBuffer;
pub use transition::{Batch, Transition};
