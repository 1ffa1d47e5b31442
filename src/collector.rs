use crate::agents::BaseAgent;
use crate::envs::VectorEnv;
use crate::error::{Error, Result};
use crate::memory::{Batch, ReplayBuffer, Transition};
use crate::misc::batch_states::{batch_states, unbatch};
use tracing::trace;

/// Summary of one `collect` call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionResult {
    pub steps: usize,
    pub episodes: usize,
    pub mean_reward: f64,
    pub mean_length: f64,
    /// Return of every episode finished during the call.
    pub rewards: Vec<f64>,
    pub lengths: Vec<usize>,
}

impl CollectionResult {
    fn finish(steps: usize, rewards: Vec<f64>, lengths: Vec<usize>) -> Self {
        let episodes = rewards.len();
        let (mean_reward, mean_length) = if episodes == 0 {
            (0.0, 0.0)
        } else {
            (
                rewards.iter().sum::<f64>() / episodes as f64,
                lengths.iter().sum::<usize>() as f64 / episodes as f64,
            )
        };
        CollectionResult {
            steps,
            episodes,
            mean_reward,
            mean_length,
            rewards,
            lengths,
        }
    }
}

/// Drives an environment pool with an agent and optionally records the
/// resulting transitions into a replay buffer.
///
/// Each slot keeps its current observation and running episode return across
/// calls. A slot that finishes an episode in a pool without auto-reset halts;
/// halted slots are reset at the start of the next call, or mid-call once
/// every slot has halted.
///
/// When fewer steps are owed than slots are active, slots take turns in
/// round-robin order, so every slot keeps advancing across calls.
pub struct Collector<V: VectorEnv> {
    env: V,
    buffer: Option<ReplayBuffer>,
    obs: Vec<Option<Vec<f32>>>,
    // First slot offered a step when not every active slot can be stepped.
    cursor: usize,
    episode_rewards: Vec<f64>,
    episode_lengths: Vec<usize>,
    collect_step: usize,
    collect_episode: usize,
}

impl<V: VectorEnv> Collector<V> {
    pub fn new(mut env: V, buffer: Option<ReplayBuffer>) -> Result<Self> {
        let obs = env.reset()?.into_iter().map(Some).collect();
        let n = env.len();
        Ok(Collector {
            env,
            buffer,
            obs,
            cursor: 0,
            episode_rewards: vec![0.0; n],
            episode_lengths: vec![0; n],
            collect_step: 0,
            collect_episode: 0,
        })
    }

    /// Resets every slot and drops unfinished episodes.
    pub fn reset_env(&mut self) -> Result<()> {
        self.obs = self.env.reset()?.into_iter().map(Some).collect();
        self.episode_rewards.iter_mut().for_each(|r| *r = 0.0);
        self.episode_lengths.iter_mut().for_each(|l| *l = 0);
        Ok(())
    }

    fn reset_halted(&mut self) -> Result<()> {
        for id in 0..self.obs.len() {
            if self.obs[id].is_none() {
                self.obs[id] = Some(self.env.reset_slot(id)?);
            }
        }
        Ok(())
    }

    /// Active slots to step next, at most `owed` of them, in increasing order.
    ///
    /// Episode collection favours the lowest slots so the owed episodes finish
    /// as early as possible. Step collection rotates through the pool.
    fn select_slots(&mut self, owed: usize, by_episode: bool) -> Vec<usize> {
        let n = self.obs.len();
        let start = if by_episode { 0 } else { self.cursor };
        let mut ids: Vec<usize> = (0..n)
            .map(|k| (start + k) % n)
            .filter(|&id| self.obs[id].is_some())
            .take(owed)
            .collect();
        if !by_episode {
            if let Some(&last) = ids.last() {
                self.cursor = (last + 1) % n;
            }
        }
        ids.sort_unstable();
        ids
    }

    /// Collects exactly `n_steps` transitions or exactly `n_episodes`
    /// finished episodes; exactly one of the two must be given.
    ///
    /// Transitions are stored only when `exploration` is on, so evaluation
    /// runs never touch the buffer.
    pub fn collect(
        &mut self,
        agent: &mut dyn BaseAgent,
        n_steps: Option<usize>,
        n_episodes: Option<usize>,
        exploration: bool,
    ) -> Result<CollectionResult> {
        let (limit, by_episode) = match (n_steps, n_episodes) {
            (Some(steps), None) => (steps, false),
            (None, Some(episodes)) => (episodes, true),
            _ => {
                return Err(Error::Argument(
                    "exactly one of n_steps and n_episodes must be given".to_string(),
                ))
            }
        };
        if limit == 0 {
            return Ok(CollectionResult::default());
        }
        self.reset_halted()?;

        let mut steps = 0;
        let mut rewards = vec![];
        let mut lengths = vec![];
        loop {
            let progress = if by_episode { rewards.len() } else { steps };
            if progress >= limit {
                break;
            }
            let ids = self.select_slots(limit - progress, by_episode);
            if ids.is_empty() {
                self.reset_halted()?;
                continue;
            }
            let obs: Vec<Vec<f32>> = ids.iter().filter_map(|&id| self.obs[id].clone()).collect();

            let obs_batch = batch_states(&obs, agent.device());
            let actions = unbatch(&agent.act(&obs_batch, exploration))?;
            let results = self.env.step(&ids, &actions)?;
            if results.len() != ids.len() {
                return Err(Error::environment(format!(
                    "pool returned {} results for {} slots",
                    results.len(),
                    ids.len()
                )));
            }

            for (((id, obs), action), result) in ids.into_iter().zip(obs).zip(actions).zip(results) {
                steps += 1;
                self.episode_rewards[id] += result.reward;
                self.episode_lengths[id] += 1;

                if exploration {
                    if let Some(buffer) = self.buffer.as_mut() {
                        buffer.insert(Transition {
                            obs,
                            act: action,
                            rew: result.reward,
                            obs_next: result.obs.clone(),
                            done: result.done,
                            info: result.info,
                        });
                    }
                }

                if result.done {
                    trace!(
                        slot = id,
                        reward = self.episode_rewards[id],
                        length = self.episode_lengths[id],
                        "episode finished"
                    );
                    if exploration {
                        agent.reset_exploration();
                    }
                    rewards.push(self.episode_rewards[id]);
                    lengths.push(self.episode_lengths[id]);
                    self.episode_rewards[id] = 0.0;
                    self.episode_lengths[id] = 0;
                    self.obs[id] = result.reset_obs;
                } else {
                    self.obs[id] = Some(result.obs);
                }
            }
        }

        self.collect_step += steps;
        self.collect_episode += rewards.len();
        Ok(CollectionResult::finish(steps, rewards, lengths))
    }

    /// Samples a training batch from the attached buffer.
    pub fn sample(&mut self, batch_size: usize) -> Result<Batch> {
        match self.buffer.as_mut() {
            Some(buffer) => buffer.sample(batch_size),
            None => Err(Error::Argument(
                "collector has no replay buffer to sample from".to_string(),
            )),
        }
    }

    pub fn buffer(&self) -> Option<&ReplayBuffer> {
        self.buffer.as_ref()
    }

    pub fn get_buffer_len(&self) -> usize {
        self.buffer.as_ref().map_or(0, |b| b.len())
    }

    pub fn env(&self) -> &V {
        &self.env
    }

    pub fn collect_step(&self) -> usize {
        self.collect_step
    }

    pub fn collect_episode(&self) -> usize {
        self.collect_episode
    }
}
