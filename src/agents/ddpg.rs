use super::base_agent::{BaseAgent, UpdateStats};
use crate::config::{NoiseKind, TrainConfig};
use crate::envs::ActionBounds;
use crate::error::{Error, Result};
use crate::explorers::{BaseExplorer, GaussianNoise, OrnsteinUhlenbeckNoise};
use crate::memory::Batch;
use crate::misc::batch_states::batch_states;
use crate::misc::soft_update::soft_update;
use crate::models::{BaseDeterministicPolicy, BaseQFunction, FCDeterministicPolicy, FCQNetwork};
use std::path::Path;
use tch::nn::{self, OptimizerConfig, VarStore};
use tch::{no_grad, no_grad_guard, Device, Kind, Tensor};
use tracing::debug;

/// Deep Deterministic Policy Gradient.
///
/// Owns an actor, a critic and slowly tracking copies of both. Targets are
/// never optimized directly; after every update they move toward the online
/// networks by `θ′ ← τ·θ + (1 − τ)·θ′`.
pub struct DDPG {
    actor: Box<dyn BaseDeterministicPolicy>,
    target_actor: Box<dyn BaseDeterministicPolicy>,
    critic: Box<dyn BaseQFunction>,
    target_critic: Box<dyn BaseQFunction>,
    actor_optimizer: nn::Optimizer,
    critic_optimizer: nn::Optimizer,
    explorer: Box<dyn BaseExplorer>,
    action_bounds: ActionBounds,
    tau: f64,
    gamma: f64,
    n_updates: usize,
    last_stats: Option<UpdateStats>,
}

impl DDPG {
    pub fn new(
        actor: Box<dyn BaseDeterministicPolicy>,
        actor_optimizer: nn::Optimizer,
        critic: Box<dyn BaseQFunction>,
        critic_optimizer: nn::Optimizer,
        explorer: Box<dyn BaseExplorer>,
        action_bounds: ActionBounds,
        tau: f64,
        gamma: f64,
    ) -> Result<Self> {
        if !(tau > 0.0 && tau <= 1.0) {
            return Err(Error::Argument(format!("tau must be in (0, 1], got {}", tau)));
        }
        if !(0.0..1.0).contains(&gamma) {
            return Err(Error::Argument(format!(
                "gamma must be in [0, 1), got {}",
                gamma
            )));
        }
        let target_actor = actor.clone();
        let target_critic = critic.clone();
        Ok(DDPG {
            actor,
            target_actor,
            critic,
            target_critic,
            actor_optimizer,
            critic_optimizer,
            explorer,
            action_bounds,
            tau,
            gamma,
            n_updates: 0,
            last_stats: None,
        })
    }

    /// Builds the fully connected actor/critic pair, their Adam optimizers and
    /// the configured noise process.
    pub fn from_config(
        config: &TrainConfig,
        observation_size: usize,
        action_bounds: ActionBounds,
        device: Device,
    ) -> Result<Self> {
        let action_size = action_bounds.len() as i64;

        let actor_vs = VarStore::new(device);
        let actor_optimizer = nn::Adam {
            wd: config.actor_wd,
            ..Default::default()
        }
        .build(&actor_vs, config.actor_lr)?;
        let actor = Box::new(FCDeterministicPolicy::new(
            actor_vs,
            observation_size as i64,
            action_size,
            config.layer_num,
            config.hidden_size,
            Some(action_bounds.low.clone()),
            Some(action_bounds.high.clone()),
        ));

        let critic_vs = VarStore::new(device);
        let critic_optimizer = nn::Adam {
            wd: config.critic_wd,
            ..Default::default()
        }
        .build(&critic_vs, config.critic_lr)?;
        let critic = Box::new(FCQNetwork::new(
            critic_vs,
            observation_size as i64,
            action_size,
            config.layer_num,
            config.hidden_size,
        ));

        let explorer: Box<dyn BaseExplorer> = match config.noise {
            NoiseKind::Gaussian => Box::new(GaussianNoise::new(config.exploration_noise, config.seed)),
            NoiseKind::OrnsteinUhlenbeck => Box::new(OrnsteinUhlenbeckNoise::new(
                0.0,
                0.15,
                config.exploration_noise,
                1e-2,
                config.seed,
            )),
        };

        DDPG::new(
            actor,
            actor_optimizer,
            critic,
            critic_optimizer,
            explorer,
            action_bounds,
            config.tau,
            config.gamma,
        )
    }

    fn clip(&self, action: Tensor) -> Tensor {
        let device = action.device();
        let low = Tensor::from_slice(&self.action_bounds.low).to_device(device);
        let high = Tensor::from_slice(&self.action_bounds.high).to_device(device);
        action.maximum(&low).minimum(&high)
    }

    fn _compute_target_q(&self, obs_next: &Tensor, rew: &Tensor, not_done: &Tensor) -> Tensor {
        no_grad(|| {
            let next_action = self.target_actor.forward(obs_next);
            let next_q = self.target_critic.forward(obs_next, &next_action).view([-1]);
            rew + next_q * not_done * self.gamma
        })
    }

    fn _update_critic(&mut self, obs: &Tensor, act: &Tensor, target_q: &Tensor) -> Result<f64> {
        let current_q = self.critic.forward(obs, act).view([-1]);
        let critic_loss = (current_q - target_q).square().mean(Kind::Float);
        let value = check_finite("critic", critic_loss.double_value(&[]))?;
        self.critic_optimizer.zero_grad();
        critic_loss.backward();
        self.critic_optimizer.step();
        Ok(value)
    }

    // Critic variables are frozen so the actor loss only reaches θ_a.
    fn _update_actor(&mut self, obs: &Tensor) -> Result<f64> {
        self.critic.var_store_mut().freeze();
        let actor_loss = -self
            .critic
            .forward(obs, &self.actor.forward(obs))
            .mean(Kind::Float);
        let result = check_finite("actor", actor_loss.double_value(&[]));
        if result.is_ok() {
            self.actor_optimizer.zero_grad();
            actor_loss.backward();
            self.actor_optimizer.step();
        }
        self.critic.var_store_mut().unfreeze();
        result
    }

    fn _sync_target_model(&mut self) {
        soft_update(self.target_actor.var_store(), self.actor.var_store(), self.tau);
        soft_update(self.target_critic.var_store(), self.critic.var_store(), self.tau);
    }

    pub fn get_actor(&self) -> &dyn BaseDeterministicPolicy {
        self.actor.as_ref()
    }

    pub fn get_target_actor(&self) -> &dyn BaseDeterministicPolicy {
        self.target_actor.as_ref()
    }

    pub fn get_critic(&self) -> &dyn BaseQFunction {
        self.critic.as_ref()
    }

    pub fn get_target_critic(&self) -> &dyn BaseQFunction {
        self.target_critic.as_ref()
    }

    pub fn tau(&self) -> f64 {
        self.tau
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }
}

fn check_finite(loss: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::NumericDivergence { loss, value })
    }
}

impl BaseAgent for DDPG {
    fn act(&mut self, obs: &Tensor, exploration: bool) -> Tensor {
        let _guard = no_grad_guard();
        let obs = obs.to_device(self.actor.device());
        let mut action = self.actor.forward(&obs);
        if exploration {
            let noise = self.explorer.sample(&action.size());
            action = action + noise.to_device(obs.device());
        }
        self.clip(action)
    }

    fn reset_exploration(&mut self) {
        self.explorer.reset();
    }

    fn update(&mut self, batch: &Batch) -> Result<UpdateStats> {
        if batch.is_empty() {
            return Err(Error::Argument("cannot update on an empty batch".to_string()));
        }
        let device = self.actor.device();
        let obs = batch_states(&batch.obs, device);
        let act = batch_states(&batch.act, device);
        let obs_next = batch_states(&batch.obs_next, device);
        let rew = Tensor::from_slice(&batch.rew)
            .to_kind(Kind::Float)
            .to_device(device);
        let not_done: Vec<f32> = batch
            .done
            .iter()
            .map(|&done| if done { 0.0 } else { 1.0 })
            .collect();
        let not_done = Tensor::from_slice(&not_done).to_device(device);

        let target_q = self._compute_target_q(&obs_next, &rew, &not_done);
        let critic_loss = self._update_critic(&obs, &act, &target_q)?;
        let actor_loss = self._update_actor(&obs)?;
        self._sync_target_model();

        self.n_updates += 1;
        let stats = UpdateStats {
            actor_loss,
            critic_loss,
        };
        self.last_stats = Some(stats);
        debug!(update = self.n_updates, actor_loss, critic_loss, "ddpg update");
        Ok(stats)
    }

    fn device(&self) -> Device {
        self.actor.device()
    }

    fn get_statistics(&self) -> Vec<(String, f64)> {
        let mut statistics = vec![("n_updates".to_string(), self.n_updates as f64)];
        if let Some(stats) = self.last_stats {
            statistics.push(("actor_loss".to_string(), stats.actor_loss));
            statistics.push(("critic_loss".to_string(), stats.critic_loss));
        }
        statistics
    }

    fn save(&self, dirname: &str) -> Result<()> {
        let dir = Path::new(dirname);
        std::fs::create_dir_all(dir)?;
        self.actor.var_store().save(dir.join("actor.ot"))?;
        self.target_actor.var_store().save(dir.join("target_actor.ot"))?;
        self.critic.var_store().save(dir.join("critic.ot"))?;
        self.target_critic.var_store().save(dir.join("target_critic.ot"))?;
        Ok(())
    }

    fn load(&mut self, dirname: &str) -> Result<()> {
        let dir = Path::new(dirname);
        self.actor.var_store_mut().load(dir.join("actor.ot"))?;
        self.target_actor.var_store_mut().load(dir.join("target_actor.ot"))?;
        self.critic.var_store_mut().load(dir.join("critic.ot"))?;
        self.target_critic.var_store_mut().load(dir.join("target_critic.ot"))?;
        Ok(())
    }
}
