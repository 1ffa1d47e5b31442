use crate::agents::BaseAgent;
use crate::collector::Collector;
use crate::config::TrainConfig;
use crate::envs::VectorEnv;
use crate::error::{Error, Result};
use crate::metrics::{MetricsSink, TracingSink};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

pub type StopFn = Box<dyn Fn(f64) -> bool>;

/// Totals reported at the end of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainStats {
    pub train_step: usize,
    pub train_episode: usize,
    pub test_step: usize,
    pub test_episode: usize,
    pub best_reward: f64,
    pub duration: Duration,
    /// Epochs that ran to completion, evaluation included.
    pub epochs: usize,
    pub interrupted: bool,
}

impl TrainStats {
    /// Environment steps per second over training and evaluation.
    pub fn speed(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            (self.train_step + self.test_step) as f64 / secs
        } else {
            0.0
        }
    }
}

/// Off-policy epoch loop: collect, sample, update, then evaluate.
pub struct Trainer {
    max_epochs: usize,
    step_per_epoch: usize,
    collect_per_step: usize,
    test_num: usize,
    batch_size: usize,
    stop_fn: StopFn,
    metrics: Box<dyn MetricsSink>,
    cancel: Arc<AtomicBool>,
}

impl Trainer {
    pub fn new(
        max_epochs: usize,
        step_per_epoch: usize,
        collect_per_step: usize,
        test_num: usize,
        batch_size: usize,
    ) -> Self {
        assert!(collect_per_step > 0, "collect_per_step must be positive");
        assert!(batch_size > 0, "batch_size must be positive");
        assert!(test_num > 0, "test_num must be positive");
        Trainer {
            max_epochs,
            step_per_epoch,
            collect_per_step,
            test_num,
            batch_size,
            stop_fn: Box::new(|_| false),
            metrics: Box::new(TracingSink),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn from_config(config: &TrainConfig) -> Self {
        let trainer = Trainer::new(
            config.epoch,
            config.step_per_epoch,
            config.collect_per_step,
            config.test_num,
            config.batch_size,
        );
        match config.stop_reward {
            Some(threshold) => trainer.with_stop_fn(Box::new(move |best| best >= threshold)),
            None => trainer,
        }
    }

    pub fn with_stop_fn(mut self, stop_fn: StopFn) -> Self {
        self.stop_fn = stop_fn;
        self
    }

    pub fn with_metrics(mut self, metrics: Box<dyn MetricsSink>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Setting the returned flag stops training at the next epoch boundary.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn train<V1: VectorEnv, V2: VectorEnv>(
        &mut self,
        agent: &mut dyn BaseAgent,
        train_collector: &mut Collector<V1>,
        test_collector: &mut Collector<V2>,
    ) -> Result<TrainStats> {
        let capacity = train_collector.buffer().map_or(0, |b| b.capacity());
        if capacity < self.batch_size {
            return Err(Error::Argument(format!(
                "training collector needs a replay buffer holding at least {} transitions, has {}",
                self.batch_size, capacity
            )));
        }

        let start = Instant::now();
        let mut stats = TrainStats {
            train_step: 0,
            train_episode: 0,
            test_step: 0,
            test_episode: 0,
            best_reward: f64::NEG_INFINITY,
            duration: Duration::ZERO,
            epochs: 0,
            interrupted: false,
        };

        let missing = self.batch_size.saturating_sub(train_collector.get_buffer_len());
        if missing > 0 {
            info!(steps = missing, "collecting initial data");
            let result = train_collector.collect(agent, Some(missing), None, true)?;
            stats.train_step += result.steps;
            stats.train_episode += result.episodes;
        }

        let n_iterations = self.step_per_epoch / self.collect_per_step;
        let mut n_updates = 0;
        for epoch in 1..=self.max_epochs {
            if self.cancel.load(Ordering::SeqCst) {
                warn!(epoch, "training cancelled");
                stats.interrupted = true;
                break;
            }

            let mut epoch_steps = 0;
            let mut epoch_rewards = vec![];
            let mut epoch_lengths = vec![];
            for _ in 0..n_iterations {
                let result =
                    train_collector.collect(agent, Some(self.collect_per_step), None, true)?;
                stats.train_step += result.steps;
                stats.train_episode += result.episodes;
                epoch_steps += result.steps;
                epoch_rewards.extend(result.rewards);
                epoch_lengths.extend(result.lengths);

                let batch = train_collector.sample(self.batch_size)?;
                let losses = match agent.update(&batch) {
                    Ok(losses) => losses,
                    Err(err) => {
                        if matches!(err, Error::NumericDivergence { .. }) {
                            warn!(epoch, error = %err, "halting on diverged loss");
                        }
                        return Err(err);
                    }
                };
                n_updates += 1;
                self.metrics
                    .record("loss/actor", losses.actor_loss, n_updates)?;
                self.metrics
                    .record("loss/critic", losses.critic_loss, n_updates)?;
            }

            test_collector.reset_env()?;
            let result = test_collector.collect(agent, None, Some(self.test_num), false)?;
            stats.test_step += result.steps;
            stats.test_episode += result.episodes;
            if result.mean_reward > stats.best_reward {
                stats.best_reward = result.mean_reward;
            }
            stats.epochs = epoch;

            // Mean train reward only exists for epochs that finished an episode.
            if !epoch_rewards.is_empty() {
                let n = epoch_rewards.len() as f64;
                let train_reward = epoch_rewards.iter().sum::<f64>() / n;
                let train_length = epoch_lengths.iter().sum::<usize>() as f64 / n;
                self.metrics.record("train/reward", train_reward, epoch)?;
                self.metrics.record("train/length", train_length, epoch)?;
            }
            self.metrics.record("train/steps", epoch_steps as f64, epoch)?;
            self.metrics
                .record("train/episodes", epoch_rewards.len() as f64, epoch)?;
            self.metrics.record("test/reward", result.mean_reward, epoch)?;
            self.metrics.record("test/length", result.mean_length, epoch)?;
            self.metrics.record("test/steps", result.steps as f64, epoch)?;
            self.metrics
                .record("test/episodes", result.episodes as f64, epoch)?;
            self.metrics.record("test/best_reward", stats.best_reward, epoch)?;
            self.metrics.flush()?;
            info!(
                epoch,
                test_reward = result.mean_reward,
                best_reward = stats.best_reward,
                train_step = stats.train_step,
                "epoch finished"
            );

            if (self.stop_fn)(stats.best_reward) {
                info!(epoch, best_reward = stats.best_reward, "stop condition reached");
                break;
            }
        }

        stats.duration = start.elapsed();
        Ok(stats)
    }
}
