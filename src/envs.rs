mod base_env;
mod pendulum;
mod target_reach;
mod vector_env;
mod web_env;

pub use base_env::{ActionBounds, Environment, Info, Step};
pub use pendulum::Pendulum;
pub use target_reach::TargetReach;
pub use vector_env::{DummyVectorEnv, ParallelVectorEnv, VecStep, VectorEnv};
pub use web_env::WebEnv;
