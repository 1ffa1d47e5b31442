use crate::envs::Info;

/// One environment step as stored in the replay buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub obs: Vec<f32>,
    pub act: Vec<f32>,
    pub rew: f64,
    pub obs_next: Vec<f32>,
    pub done: bool,
    pub info: Info,
}

/// Index-aligned columns of sampled transitions.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    pub obs: Vec<Vec<f32>>,
    pub act: Vec<Vec<f32>>,
    pub rew: Vec<f64>,
    pub obs_next: Vec<Vec<f32>>,
    pub done: Vec<bool>,
}

impl Batch {
    pub fn with_capacity(capacity: usize) -> Self {
        Batch {
            obs: Vec::with_capacity(capacity),
            act: Vec::with_capacity(capacity),
            rew: Vec::with_capacity(capacity),
            obs_next: Vec::with_capacity(capacity),
            done: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, transition: &Transition) {
        self.obs.push(transition.obs.clone());
        self.act.push(transition.act.clone());
        self.rew.push(transition.rew);
        self.obs_next.push(transition.obs_next.clone());
        self.done.push(transition.done);
    }

    pub fn len(&self) -> usize {
        self.obs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obs.is_empty()
    }
}
