mod base_agent;
mod ddpg;

pub use base_agent::{BaseAgent, UpdateStats};
pub use ddpg::DDPG;
