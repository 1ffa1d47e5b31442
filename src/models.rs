mod policy_based {
    pub mod base_policy_network;
    pub mod fc_deterministic_policy;
}

mod value_based {
    pub mod base_q_network;
    pub mod fc_q_network;
}

pub use policy_based::base_policy_network::BaseDeterministicPolicy;
pub use policy_based::fc_deterministic_policy::FCDeterministicPolicy;

pub use value_based::base_q_network::BaseQFunction;
pub use value_based::fc_q_network::FCQNetwork;
