mod base_explorer;
mod gaussian;
mod ornstein_uhlenbeck;

pub use base_explorer::BaseExplorer;
pub use gaussian::GaussianNoise;
pub use ornstein_uhlenbeck::OrnsteinUhlenbeckNoise;
